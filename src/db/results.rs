//! Test result operations

use super::database::Database;
use super::models::{TestResult, User};
use crate::{MAX_RESULTS, RESULTS_KEY, USERS_KEY};

impl Database {
    /// Get every stored result in insertion order
    pub fn results(&self) -> Vec<TestResult> {
        self.store.get(RESULTS_KEY, Vec::new())
    }

    /// Get one user's results, newest first
    pub fn user_results(&self, user_id: &str) -> Vec<TestResult> {
        let mut results: Vec<TestResult> = self
            .results()
            .into_iter()
            .filter(|r| r.user_id == user_id)
            .collect();
        results.sort_by(|a, b| b.date.cmp(&a.date));
        results
    }

    /// Record a finished test and credit its points to the user.
    ///
    /// The history is capped at [`MAX_RESULTS`] entries; the oldest
    /// entry is evicted once the cap is crossed. Points are the score
    /// percentage rounded to the nearest whole number. A result for an
    /// unknown user is still stored, it just credits nobody.
    pub fn save_result(&self, result: &TestResult) {
        self.store
            .update(RESULTS_KEY, Vec::new(), |results: &mut Vec<TestResult>| {
                results.push(result.clone());
                if results.len() > MAX_RESULTS {
                    results.remove(0);
                }
            });

        let points = result.score_percentage.round() as i64;
        self.store
            .update(USERS_KEY, Vec::new(), |users: &mut Vec<User>| {
                if let Some(user) = users.iter_mut().find(|u| u.id == result.user_id) {
                    user.total_points += points;
                }
            });
    }

    /// Drop all results belonging to one user
    pub(crate) fn delete_results_for(&self, user_id: &str) {
        self.store
            .update(RESULTS_KEY, Vec::new(), |results: &mut Vec<TestResult>| {
                results.retain(|r| r.user_id != user_id);
            });
    }
}
