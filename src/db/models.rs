//! Data models for AvtoTest entities
//!
//! Everything serializes in camelCase so stores written by earlier
//! releases parse unchanged. Optional fields are omitted from the
//! output when absent, matching the documents those releases wrote.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Regular test taker
    User,
    /// Administrator account
    Admin,
    /// Browsing without an account
    Guest,
}

/// One of the four answer choices of a question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnswerKey {
    A,
    B,
    C,
    D,
}

impl AnswerKey {
    /// Letter form, as stored in result details
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerKey::A => "A",
            AnswerKey::B => "B",
            AnswerKey::C => "C",
            AnswerKey::D => "D",
        }
    }
}

/// The four answer texts of a question
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct QuestionOptions {
    pub a: String,
    pub b: String,
    pub c: String,
    pub d: String,
}

impl QuestionOptions {
    /// Answer text for a choice
    pub fn get(&self, key: AnswerKey) -> &str {
        match key {
            AnswerKey::A => &self.a,
            AnswerKey::B => &self.b,
            AnswerKey::C => &self.c,
            AnswerKey::D => &self.d,
        }
    }
}

/// A driving-theory question
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Unique question ID
    pub id: String,
    /// Question text
    pub question_text: String,
    /// The four answer choices
    pub options: QuestionOptions,
    /// Which choice is correct
    pub correct_answer: AnswerKey,
    /// Optional illustration (base64 image string)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Registered account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID
    pub id: String,
    /// Display name, unique among accounts ignoring case
    pub name: String,
    /// Hashed password (plaintext for accounts predating the hasher)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Avatar (base64 image string)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// Account role
    pub role: Role,
    /// Registration timestamp
    pub created_at: DateTime<Utc>,
    /// Accumulated score from tests
    #[serde(default)]
    pub total_points: i64,
    /// Last liveness ping, for online status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_active: Option<DateTime<Utc>>,
}

impl User {
    /// Check if this account is an administrator
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Whether the last liveness ping falls inside the online window
    pub fn is_online(&self) -> bool {
        match self.last_active {
            Some(seen) => {
                Utc::now().signed_duration_since(seen)
                    < Duration::minutes(crate::ONLINE_WINDOW_MINUTES)
            }
            None => false,
        }
    }
}

/// Per-question outcome inside a test result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResultDetail {
    /// Question that was asked
    pub question_id: String,
    /// Letter the user picked, empty when unanswered
    pub user_answer: String,
    /// Letter that was correct
    pub correct_answer: String,
    /// Whether the user's answer matched
    pub is_correct: bool,
}

/// Outcome of one completed test
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    /// Unique result ID
    pub id: String,
    /// User who took the test
    pub user_id: String,
    /// Completion timestamp
    pub date: DateTime<Utc>,
    /// Number of questions asked
    pub total_questions: u32,
    /// Number answered correctly
    pub correct_count: u32,
    /// Score as a percentage of total questions
    pub score_percentage: f64,
    /// Time taken, in seconds
    pub time_spent_seconds: u64,
    /// Per-question breakdown
    pub details: Vec<TestResultDetail>,
}

/// One login session in the activity log
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    /// Unique log entry ID
    pub id: String,
    /// User who logged in
    pub user_id: String,
    /// Display name at login time
    pub user_name: String,
    /// When the session started
    pub login_time: DateTime<Utc>,
    /// Last time the session was observed
    pub last_seen: DateTime<Utc>,
}

/// Direct message between two accounts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Unique message ID
    pub id: String,
    /// Sending account
    pub sender_id: String,
    /// Receiving account
    pub receiver_id: String,
    /// Message body
    pub text: String,
    /// When the message was sent
    pub timestamp: DateTime<Utc>,
    /// Whether the receiver has seen it
    pub read: bool,
}

/// Leaderboard window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    /// Results from today
    Daily,
    /// Results from this calendar month
    Monthly,
    /// Results from this calendar year
    Yearly,
}

/// A user's standing on the leaderboard
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    /// The ranked user
    #[serde(flatten)]
    pub user: User,
    /// Points collected inside the selected period
    pub period_score: i64,
}

/// Headline numbers for the admin dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    /// Questions in the pool
    pub total_questions: usize,
    /// Results recorded so far
    pub total_tests_taken: usize,
    /// Registered regular accounts, admins not counted
    pub total_users: usize,
}

/// What a system reset wipes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetScope {
    /// Accounts, results, activity and chat; the admin account survives
    Users,
    /// Question pool back to the built-in set
    Questions,
    /// Both of the above
    All,
}
