//! Account management operations

use chrono::Utc;

use super::database::Database;
use super::models::{Role, User};
use crate::error::{CoreError, Result};
use crate::hash::{hash_password, verify_password};
use crate::utils::generate_user_id;
use crate::{DEFAULT_ADMIN_ID, USERS_KEY};

impl Database {
    /// Get all accounts, admin included
    pub fn users(&self) -> Vec<User> {
        self.store.get(USERS_KEY, Vec::new())
    }

    /// Look up an account by id
    pub fn find_user(&self, id: &str) -> Option<User> {
        self.users().into_iter().find(|u| u.id == id)
    }

    /// Id of the admin account, falling back to the default id when no
    /// admin row exists yet
    pub fn admin_id(&self) -> String {
        self.users()
            .into_iter()
            .find(|u| u.role == Role::Admin)
            .map(|admin| admin.id)
            .unwrap_or_else(|| DEFAULT_ADMIN_ID.to_string())
    }

    /// Create a new regular account.
    ///
    /// Names are unique ignoring case; a clash returns
    /// [`CoreError::UserExists`]. The uniqueness check and the insert
    /// run under one store update so two racing registrations cannot
    /// both pass the check.
    pub fn register_user(&self, name: &str, password: &str) -> Result<User> {
        let lowered = name.to_lowercase();
        self.store
            .update(USERS_KEY, Vec::new(), |users: &mut Vec<User>| {
                if users.iter().any(|u| u.name.to_lowercase() == lowered) {
                    return Err(CoreError::UserExists(name.to_string()));
                }

                let user = User {
                    id: generate_user_id(),
                    name: name.to_string(),
                    password: Some(hash_password(password)),
                    avatar: Some(String::new()),
                    role: Role::User,
                    created_at: Utc::now(),
                    total_points: 0,
                    last_active: None,
                };
                users.push(user.clone());
                Ok(user)
            })
    }

    /// Authenticate by name and password.
    ///
    /// The name lookup ignores case. A successful login is recorded in
    /// the activity log.
    pub fn login_user(&self, name: &str, password: &str) -> Result<User> {
        let lowered = name.to_lowercase();
        let user = self
            .users()
            .into_iter()
            .find(|u| u.name.to_lowercase() == lowered)
            .ok_or_else(|| CoreError::UserNotFound(name.to_string()))?;

        let matches = match &user.password {
            Some(stored) => verify_password(password, stored),
            None => false,
        };
        if !matches {
            return Err(CoreError::WrongPassword);
        }

        self.log_activity(&user.id, &user.name);
        Ok(user)
    }

    /// Replace the account sharing the given user's id; unknown ids
    /// are ignored
    pub fn update_user(&self, user: &User) {
        self.store
            .update(USERS_KEY, Vec::new(), |users: &mut Vec<User>| {
                if let Some(existing) = users.iter_mut().find(|u| u.id == user.id) {
                    *existing = user.clone();
                }
            });
    }

    /// Delete an account together with its test results and its
    /// conversation with the admin. Activity log entries stay.
    pub fn delete_user(&self, user_id: &str) {
        self.store
            .update(USERS_KEY, Vec::new(), |users: &mut Vec<User>| {
                users.retain(|u| u.id != user_id);
            });

        let admin_id = self.admin_id();
        self.delete_conversation(user_id, &admin_id);
        self.delete_results_for(user_id);
    }

    /// Stamp an account's liveness ping with the current time
    pub fn update_last_active(&self, user_id: &str) {
        self.store
            .update(USERS_KEY, Vec::new(), |users: &mut Vec<User>| {
                if let Some(user) = users.iter_mut().find(|u| u.id == user_id) {
                    user.last_active = Some(Utc::now());
                }
            });
    }

    /// Check a password against the admin account
    pub fn verify_admin_password(&self, password: &str) -> bool {
        let users = self.users();
        match users.iter().find(|u| u.role == Role::Admin) {
            Some(admin) => match &admin.password {
                Some(stored) => verify_password(password, stored),
                None => false,
            },
            None => false,
        }
    }

    /// Rotate the admin password
    pub fn update_admin_password(&self, new_password: &str) {
        self.store
            .update(USERS_KEY, Vec::new(), |users: &mut Vec<User>| {
                if let Some(admin) = users.iter_mut().find(|u| u.role == Role::Admin) {
                    admin.password = Some(hash_password(new_password));
                }
            });
    }
}
