//! Data access layer for AvtoTest
//!
//! This module provides the high-level Database API over the
//! key-value store: questions, accounts, test results, the activity
//! log, chat and the leaderboard.

pub mod database;
pub mod models;
pub mod questions;
pub mod users;
pub mod results;
pub mod activity;
pub mod chat;
pub mod leaderboard;

pub use database::Database;
pub use models::*;
