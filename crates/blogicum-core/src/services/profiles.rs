use std::sync::Arc;

use uuid::Uuid;

use crate::domain::User;
use crate::error::DomainError;
use crate::ports::Clock;

use super::Repositories;
use super::validation;

/// A partial profile update.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

/// The signed-in user's own account.
#[derive(Clone)]
pub struct ProfileService {
    repos: Repositories,
    clock: Arc<dyn Clock>,
}

impl ProfileService {
    pub fn new(repos: Repositories, clock: Arc<dyn Clock>) -> Self {
        Self { repos, clock }
    }

    /// The account behind an authenticated request.
    pub async fn current(&self, user_id: Uuid) -> Result<User, DomainError> {
        self.repos
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::Unauthorized)
    }

    pub async fn update(&self, user_id: Uuid, changes: ProfileChanges) -> Result<User, DomainError> {
        let mut user = self.current(user_id).await?;

        if let Some(username) = changes.username {
            validation::username(&username)?;
            if username != user.username {
                if self.repos.users.find_by_username(&username).await?.is_some() {
                    return Err(DomainError::Duplicate(format!(
                        "username {username} is already taken"
                    )));
                }
                user.username = username;
            }
        }
        if let Some(first_name) = changes.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = changes.last_name {
            user.last_name = last_name;
        }
        if let Some(email) = changes.email {
            validation::email(&email)?;
            user.email = email;
        }
        user.updated_at = self.clock.now();

        let user = self.repos.users.update(user).await?;
        tracing::info!(user_id = %user.id, "Profile updated");
        Ok(user)
    }
}
