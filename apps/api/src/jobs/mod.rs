// Job board: sample catalogue, conjunctive search, postings and applications.

pub mod board;
pub mod handlers;
