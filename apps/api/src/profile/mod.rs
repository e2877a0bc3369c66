// Profile wizard: the five-step Step Controller, list editors, resume intake and the
// persistence gateway, plus the HTTP handlers that drive them per user session.

pub mod fields;
pub mod gateway;
pub mod handlers;
pub mod list_editor;
pub mod resume;
pub mod sessions;
pub mod validation;
pub mod wizard;
