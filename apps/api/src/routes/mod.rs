pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post},
    Router,
};

use crate::auth::handlers as auth;
use crate::jobs::handlers as jobs;
use crate::profile::handlers as profile;
use crate::profile::resume::MAX_RESUME_BYTES;
use crate::state::AppState;

/// Room above the resume policy limit so oversized files reach the validator and get
/// its message instead of a bare 413.
const RESUME_BODY_LIMIT: usize = 2 * MAX_RESUME_BYTES as usize;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Auth
        .route("/api/v1/auth/register", post(auth::handle_register))
        .route("/api/v1/auth/login", post(auth::handle_login))
        .route("/api/v1/auth/logout", post(auth::handle_logout))
        .route("/api/v1/auth/me", get(auth::handle_me))
        .route(
            "/api/v1/auth/password-strength",
            post(auth::handle_password_strength),
        )
        // Profile wizard
        .route(
            "/api/v1/profile/wizard",
            post(profile::handle_start)
                .get(profile::handle_get)
                .delete(profile::handle_discard),
        )
        .route(
            "/api/v1/profile/wizard/personal",
            patch(profile::handle_update_personal),
        )
        .route(
            "/api/v1/profile/wizard/education",
            post(profile::handle_add_education),
        )
        .route(
            "/api/v1/profile/wizard/education/:id",
            patch(profile::handle_update_education).delete(profile::handle_remove_education),
        )
        .route(
            "/api/v1/profile/wizard/experience",
            post(profile::handle_add_experience),
        )
        .route(
            "/api/v1/profile/wizard/experience/:id",
            patch(profile::handle_update_experience).delete(profile::handle_remove_experience),
        )
        .route(
            "/api/v1/profile/wizard/skills",
            post(profile::handle_add_skill),
        )
        .route(
            "/api/v1/profile/wizard/skills/:skill",
            delete(profile::handle_remove_skill),
        )
        .route(
            "/api/v1/profile/wizard/resume",
            post(profile::handle_upload_resume).layer(DefaultBodyLimit::max(RESUME_BODY_LIMIT)),
        )
        .route("/api/v1/profile/wizard/next", post(profile::handle_next))
        .route(
            "/api/v1/profile/wizard/previous",
            post(profile::handle_previous),
        )
        .route("/api/v1/profile", get(profile::handle_get_profile))
        // Job board
        .route(
            "/api/v1/jobs",
            get(jobs::handle_search).post(jobs::handle_post_job),
        )
        .route("/api/v1/jobs/:id", get(jobs::handle_get_job))
        .route("/api/v1/jobs/:id/applications", post(jobs::handle_apply))
        .with_state(state)
}
