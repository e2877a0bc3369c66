use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::session::{InMemoryTokenStore, TokenStore};
use crate::auth::users::UserDirectory;
use crate::config::Config;
use crate::jobs::board::JobBoard;
use crate::profile::gateway::{InMemoryProfileGateway, ProfileGateway};
use crate::profile::sessions::WizardSessions;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Present only when `DATABASE_URL` is configured.
    pub db: Option<PgPool>,
    pub config: Config,
    /// Persistence Gateway. In-memory by default, Postgres when a pool is available.
    pub gateway: Arc<dyn ProfileGateway>,
    pub tokens: Arc<dyn TokenStore>,
    pub users: Arc<UserDirectory>,
    pub wizards: WizardSessions,
    pub jobs: Arc<JobBoard>,
}

impl AppState {
    /// Storage-free state: in-memory gateway and token store, seeded users and jobs.
    pub fn in_memory(config: Config) -> Self {
        let gateway = Arc::new(InMemoryProfileGateway::new(
            config.profile_save_latency,
            config.resume_upload_latency,
        ));
        AppState {
            db: None,
            config,
            gateway,
            tokens: Arc::new(InMemoryTokenStore::new()),
            users: Arc::new(UserDirectory::with_sample_users()),
            wizards: WizardSessions::new(),
            jobs: Arc::new(JobBoard::with_sample_jobs()),
        }
    }
}
