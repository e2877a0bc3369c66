// Credential-driven authentication: in-memory user directory, placeholder password
// checksums and bearer tokens resolved through a pluggable token store.

pub mod handlers;
pub mod password;
pub mod session;
pub mod users;
