//! User lookup and the active flag.

use std::sync::Arc;

use crate::db::DirectoryStore;
use crate::error::AppError;
use crate::models::User;

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn DirectoryStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn DirectoryStore>) -> Self {
        Self { store }
    }

    pub async fn get_user(&self, user_id: &str) -> Result<User, AppError> {
        self.store
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::UserNotFound {
                user_id: user_id.to_string(),
            })
    }

    /// Set a user's active flag and return the updated user.
    ///
    /// Existing reviewer assignments are left alone; an inactive user is
    /// only skipped for future assignments.
    pub async fn set_user_active(&self, user_id: &str, is_active: bool) -> Result<User, AppError> {
        let mut user = self.get_user(user_id).await?;

        if let Err(e) = self.store.update_user_active(user_id, is_active).await {
            log::error!(
                "[user] set active failed user_id={} is_active={}: {}",
                user_id,
                is_active,
                e
            );
            return Err(e);
        }

        user.is_active = is_active;
        log::info!("[user] user_id={} is_active={}", user_id, is_active);
        Ok(user)
    }
}
