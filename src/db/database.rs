//! Main Database API
//!
//! Owns the shared store handle plus bootstrap, reset and stats. The
//! per-collection operations live in sibling modules as further impl
//! blocks on [`Database`].

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;

use super::models::{ActivityLog, ChatMessage, ResetScope, Role, Stats, TestResult, User};
use super::questions::built_in_questions;
use crate::error::Result;
use crate::hash::hash_password;
use crate::storage::Store;
use crate::{
    ACTIVITY_LOGS_KEY, CHAT_MESSAGES_KEY, DEFAULT_ADMIN_ID, DEFAULT_ADMIN_NAME,
    DEFAULT_ADMIN_PASSWORD, QUESTIONS_KEY, RESULTS_KEY, STORE_FILENAME, USERS_KEY,
};

/// Main database interface
///
/// Cheap to clone; clones share one store handle, so every handle
/// observes the same data and the same write ordering.
#[derive(Clone)]
pub struct Database {
    /// Shared key-value store
    pub(crate) store: Arc<Store>,
}

impl Database {
    /// Open (or create) the database in the specified folder.
    ///
    /// The folder will contain an `avtotest.dat` file. Missing
    /// collections are bootstrapped; existing data is left alone.
    pub fn open(folder: &Path) -> Result<Self> {
        std::fs::create_dir_all(folder)?;
        let store = Store::open(&folder.join(STORE_FILENAME))?;
        let db = Self {
            store: Arc::new(store),
        };
        db.init();
        Ok(db)
    }

    /// Wrap an already opened store.
    ///
    /// Does not bootstrap, call [`Database::init`] once if the store
    /// may be fresh.
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Seed missing collections and ensure an admin account exists.
    ///
    /// Idempotent. The question pool is seeded only when its key is
    /// absent, and the default admin is created only when no account
    /// with the admin role exists at all, whatever its id or name.
    pub fn init(&self) {
        if !self.store.contains(QUESTIONS_KEY) {
            self.store.set(QUESTIONS_KEY, &built_in_questions());
        }

        self.store
            .update(USERS_KEY, Vec::new(), |users: &mut Vec<User>| {
                if !users.iter().any(|u| u.role == Role::Admin) {
                    users.push(User {
                        id: DEFAULT_ADMIN_ID.to_string(),
                        name: DEFAULT_ADMIN_NAME.to_string(),
                        password: Some(hash_password(DEFAULT_ADMIN_PASSWORD)),
                        avatar: Some(String::new()),
                        role: Role::Admin,
                        created_at: Utc::now(),
                        total_points: 0,
                        last_active: None,
                    });
                }
            });

        if !self.store.contains(ACTIVITY_LOGS_KEY) {
            self.store
                .set(ACTIVITY_LOGS_KEY, &Vec::<ActivityLog>::new());
        }
        if !self.store.contains(CHAT_MESSAGES_KEY) {
            self.store
                .set(CHAT_MESSAGES_KEY, &Vec::<ChatMessage>::new());
        }
    }

    /// Shared store handle, for wiring up sessions and preferences
    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// Wipe collections back to their initial state.
    ///
    /// A user reset keeps the admin account but drops everything the
    /// users produced. A question reset restores the built-in pool.
    pub fn reset(&self, scope: ResetScope) {
        if matches!(scope, ResetScope::Users | ResetScope::All) {
            let admin = self.users().into_iter().find(|u| u.role == Role::Admin);
            let survivors: Vec<User> = admin.into_iter().collect();
            self.store.set(USERS_KEY, &survivors);
            self.store.set(RESULTS_KEY, &Vec::<TestResult>::new());
            self.store
                .set(ACTIVITY_LOGS_KEY, &Vec::<ActivityLog>::new());
            self.store
                .set(CHAT_MESSAGES_KEY, &Vec::<ChatMessage>::new());
        }
        if matches!(scope, ResetScope::Questions | ResetScope::All) {
            self.store.set(QUESTIONS_KEY, &built_in_questions());
        }
    }

    /// Headline numbers for the admin dashboard
    pub fn stats(&self) -> Stats {
        Stats {
            total_questions: self.questions().len(),
            total_tests_taken: self.results().len(),
            total_users: self
                .users()
                .iter()
                .filter(|u| u.role == Role::User)
                .count(),
        }
    }
}
