//! Leaderboard aggregation

use std::collections::HashMap;

use chrono::{Datelike, Local};

use super::database::Database;
use super::models::{LeaderboardEntry, Period, Role};

impl Database {
    /// Rank users by points collected inside a period.
    ///
    /// A result counts when its date matches the current local
    /// calendar day, month or year, depending on the period. Each
    /// counting result contributes its rounded score percentage.
    /// Admins and users without points in the period are left off the
    /// board; ties keep the stored account order.
    pub fn leaderboard(&self, period: Period) -> Vec<LeaderboardEntry> {
        let users = self.users();
        let results = self.results();
        let now = Local::now();

        let mut scores: HashMap<String, i64> = HashMap::new();
        for result in &results {
            let date = result.date.with_timezone(&Local);
            let in_period = match period {
                Period::Daily => {
                    date.day() == now.day()
                        && date.month() == now.month()
                        && date.year() == now.year()
                }
                Period::Monthly => date.month() == now.month() && date.year() == now.year(),
                Period::Yearly => date.year() == now.year(),
            };
            if in_period {
                *scores.entry(result.user_id.clone()).or_insert(0) +=
                    result.score_percentage.round() as i64;
            }
        }

        let mut board: Vec<LeaderboardEntry> = users
            .into_iter()
            .map(|user| {
                let period_score = scores.get(&user.id).copied().unwrap_or(0);
                LeaderboardEntry { user, period_score }
            })
            .filter(|entry| entry.user.role != Role::Admin && entry.period_score > 0)
            .collect();
        board.sort_by(|a, b| b.period_score.cmp(&a.period_score));
        board
    }
}
