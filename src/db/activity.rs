//! Login activity log

use chrono::{Duration, Utc};

use super::database::Database;
use super::models::ActivityLog;
use crate::utils::generate_timestamp_id;
use crate::{ACTIVITY_DEBOUNCE_MINUTES, ACTIVITY_LOGS_KEY, MAX_ACTIVITY_LOGS};

impl Database {
    /// Get the activity log in insertion order
    pub fn activity_logs(&self) -> Vec<ActivityLog> {
        self.store.get(ACTIVITY_LOGS_KEY, Vec::new())
    }

    /// Record a login.
    ///
    /// Rapid repeat logins are debounced: when the newest entry in the
    /// whole log belongs to this user and started less than five
    /// minutes ago, only its last-seen time moves. Anything else
    /// appends a fresh entry, evicting the oldest once the log exceeds
    /// [`MAX_ACTIVITY_LOGS`] entries.
    pub fn log_activity(&self, user_id: &str, user_name: &str) {
        self.store
            .update(ACTIVITY_LOGS_KEY, Vec::new(), |logs: &mut Vec<ActivityLog>| {
                let now = Utc::now();

                match logs.last_mut() {
                    Some(last)
                        if last.user_id == user_id
                            && now.signed_duration_since(last.login_time)
                                < Duration::minutes(ACTIVITY_DEBOUNCE_MINUTES) =>
                    {
                        last.last_seen = now;
                    }
                    _ => {
                        logs.push(ActivityLog {
                            id: generate_timestamp_id(),
                            user_id: user_id.to_string(),
                            user_name: user_name.to_string(),
                            login_time: now,
                            last_seen: now,
                        });
                        if logs.len() > MAX_ACTIVITY_LOGS {
                            logs.remove(0);
                        }
                    }
                }
            });
    }
}
