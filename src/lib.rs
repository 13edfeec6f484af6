//! # AvtoTest Core
//!
//! The data and business layer of a driving-theory test trainer.
//!
//! ## Features
//!
//! - SQLite-backed key-value store with JSON documents
//! - Questions, users, test results, activity log and chat collections
//! - Password hashing compatible with stores written by earlier releases
//! - Persistent login session with liveness and deletion monitoring
//! - Daily, monthly and yearly leaderboards
//! - Theme and language preferences
//!
//! ## Example
//!
//! ```no_run
//! use avtocore::{Database, Session};
//! use std::path::Path;
//!
//! let db = Database::open(Path::new("/path/to/data")).unwrap();
//! let user = db.register_user("Ali", "1234").unwrap();
//!
//! let session = Session::new(db.clone());
//! session.login(&user);
//!
//! for question in db.questions() {
//!     println!("{}: {}", question.id, question.question_text);
//! }
//! ```

pub mod db;
pub mod error;
pub mod hash;
pub mod prefs;
pub mod session;
pub mod storage;
pub mod utils;

// Re-export main types
pub use error::{CoreError, Result};
pub use db::Database;
pub use db::models::{
    ActivityLog, AnswerKey, ChatMessage, LeaderboardEntry, Period, Question, QuestionOptions,
    ResetScope, Role, Stats, TestResult, TestResultDetail, User,
};
pub use hash::{hash_password, verify_password};
pub use prefs::{Preferences, Theme};
pub use session::{Session, SessionEvent};
pub use storage::{Store, StoreEvent};

use std::time::Duration;

/// Store key of the question pool
pub const QUESTIONS_KEY: &str = "avtotest_questions";

/// Store key of the test results collection
pub const RESULTS_KEY: &str = "avtotest_results";

/// Store key of the accounts collection
pub const USERS_KEY: &str = "avtotest_users";

/// Store key of the login activity log
pub const ACTIVITY_LOGS_KEY: &str = "avtotest_activity_logs";

/// Store key of the chat history
pub const CHAT_MESSAGES_KEY: &str = "avtotest_conversations";

/// Store key of the persisted login
pub const CURRENT_USER_KEY: &str = "avtotest_current_user";

/// Store key of the theme preference
pub const THEME_KEY: &str = "avtotest_theme";

/// Store key of the language preference
pub const LANGUAGE_KEY: &str = "avtotest_lang";

/// Store filename
pub const STORE_FILENAME: &str = "avtotest.dat";

/// Most test results kept before the oldest are evicted
pub const MAX_RESULTS: usize = 10_000;

/// Most activity log entries kept before the oldest are evicted
pub const MAX_ACTIVITY_LOGS: usize = 1_000;

/// Most chat messages kept before the oldest are evicted
pub const MAX_CHAT_MESSAGES: usize = 5_000;

/// Logins closer together than this extend the previous activity
/// entry instead of adding one, in minutes
pub const ACTIVITY_DEBOUNCE_MINUTES: i64 = 5;

/// How recent the last liveness ping must be for an account to count
/// as online, in minutes
pub const ONLINE_WINDOW_MINUTES: i64 = 5;

/// How often a logged-in session refreshes its liveness ping
pub const LIVENESS_INTERVAL: Duration = Duration::from_secs(60);

/// How often a logged-in session rechecks that its account still
/// exists when no store change wakes it first
pub const EXISTENCE_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Id of the bootstrapped admin account
pub const DEFAULT_ADMIN_ID: &str = "admin_main";

/// Name of the bootstrapped admin account
pub const DEFAULT_ADMIN_NAME: &str = "Admin";

/// Initial password of the bootstrapped admin account
pub const DEFAULT_ADMIN_PASSWORD: &str = "12345";

/// Interface language used until one is chosen
pub const DEFAULT_LANGUAGE: &str = "uz";

/// Random suffix length of generated user ids
pub const USER_ID_SUFFIX_LENGTH: usize = 9;
