use chrono::Utc;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::auth::password::{placeholder_checksum, verify_checksum};
use crate::errors::AppError;
use crate::models::user::{JobSeekerInfo, User, UserType};

struct UserRecord {
    user: User,
    password_checksum: String,
}

pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub user_type: UserType,
    pub job_seeker_info: Option<JobSeekerInfo>,
}

/// Registered accounts, held in process memory.
pub struct UserDirectory {
    records: RwLock<Vec<UserRecord>>,
}

impl UserDirectory {
    #[cfg(test)]
    pub fn empty() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }

    /// Directory pre-loaded with the two demo accounts (password `password123`).
    pub fn with_sample_users() -> Self {
        let sample = [
            ("John Doe", "john@example.com", UserType::Jobseeker),
            ("Jane Smith", "jane@example.com", UserType::Employer),
        ];
        let records = sample
            .into_iter()
            .map(|(name, email, user_type)| UserRecord {
                user: User {
                    id: Uuid::new_v4(),
                    name: name.to_string(),
                    email: email.to_string(),
                    user_type,
                    job_seeker_info: None,
                    created_at: Utc::now(),
                },
                password_checksum: placeholder_checksum("password123"),
            })
            .collect();
        Self {
            records: RwLock::new(records),
        }
    }

    /// Returns the account only when both email and password match.
    pub async fn authenticate(&self, email: &str, password: &str) -> Option<User> {
        self.records
            .read()
            .await
            .iter()
            .find(|r| r.user.email == email && verify_checksum(password, &r.password_checksum))
            .map(|r| r.user.clone())
    }

    /// Adds an account. Fails with `Conflict` when the email is already registered.
    pub async fn register(&self, new_user: NewUser) -> Result<User, AppError> {
        let mut records = self.records.write().await;
        if records.iter().any(|r| r.user.email == new_user.email) {
            return Err(AppError::Conflict("Email already in use".to_string()));
        }

        let job_seeker_info = match new_user.user_type {
            UserType::Jobseeker => new_user.job_seeker_info,
            UserType::Employer => None,
        };
        let user = User {
            id: Uuid::new_v4(),
            name: new_user.name,
            email: new_user.email,
            user_type: new_user.user_type,
            job_seeker_info,
            created_at: Utc::now(),
        };
        records.push(UserRecord {
            user: user.clone(),
            password_checksum: placeholder_checksum(&new_user.password),
        });
        info!("Registered {:?} account {}", user.user_type, user.id);
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str, user_type: UserType) -> NewUser {
        NewUser {
            name: "Ann Lee".to_string(),
            email: email.to_string(),
            password: "Abcdef1!".to_string(),
            user_type,
            job_seeker_info: Some(JobSeekerInfo {
                skills: vec!["Rust".to_string()],
                ..Default::default()
            }),
        }
    }

    #[tokio::test]
    async fn test_sample_users_can_log_in() {
        let directory = UserDirectory::with_sample_users();
        let john = directory
            .authenticate("john@example.com", "password123")
            .await
            .unwrap();
        assert!(john.is_job_seeker());
        let jane = directory
            .authenticate("jane@example.com", "password123")
            .await
            .unwrap();
        assert_eq!(jane.user_type, UserType::Employer);
        assert!(directory
            .authenticate("john@example.com", "wrong")
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let directory = UserDirectory::empty();
        let user = directory
            .register(new_user("ann@example.com", UserType::Jobseeker))
            .await
            .unwrap();
        assert_eq!(
            user.job_seeker_info.as_ref().map(|i| i.skills.clone()),
            Some(vec!["Rust".to_string()])
        );
        let logged_in = directory
            .authenticate("ann@example.com", "Abcdef1!")
            .await
            .unwrap();
        assert_eq!(logged_in.id, user.id);
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let directory = UserDirectory::with_sample_users();
        let err = directory
            .register(new_user("john@example.com", UserType::Jobseeker))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(msg) if msg == "Email already in use"));
    }

    #[tokio::test]
    async fn test_employers_drop_job_seeker_info() {
        let directory = UserDirectory::empty();
        let user = directory
            .register(new_user("boss@example.com", UserType::Employer))
            .await
            .unwrap();
        assert!(user.job_seeker_info.is_none());
        assert!(directory
            .authenticate("boss@example.com", "Abcdef1!")
            .await
            .is_some());
    }
}
