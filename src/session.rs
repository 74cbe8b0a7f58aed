//! Admin session flag
//!
//! A single boolean kept in storage under `isAdminLoggedIn`. It gates the admin
//! views in the UI and nothing more: the credentials are fixed in source and the
//! flag is shared by every visitor.

use tracing::{info, warn};

use crate::error::{AppError, Result};
use crate::state::storage::{Storage, ADMIN_FLAG_KEY};

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin123";

#[derive(Debug, Clone)]
pub struct AdminSession {
    storage: Storage,
}

impl AdminSession {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Whether the flag is set. An unreadable flag counts as logged out.
    pub async fn is_logged_in(&self) -> bool {
        match self.storage.get::<bool>(ADMIN_FLAG_KEY).await {
            Ok(flag) => flag.unwrap_or(false),
            Err(e) => {
                warn!("Could not read admin session flag: {}", e);
                false
            }
        }
    }

    /// Check the credentials and set the flag on a match
    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        if username != ADMIN_USERNAME || password != ADMIN_PASSWORD {
            warn!("Rejected admin login for username '{}'", username);
            return Err(AppError::InvalidCredentials);
        }

        self.storage.set(ADMIN_FLAG_KEY, &true).await?;
        info!("Admin logged in");
        Ok(())
    }

    pub async fn logout(&self) -> Result<()> {
        self.storage.remove(ADMIN_FLAG_KEY).await?;
        info!("Admin logged out");
        Ok(())
    }
}
