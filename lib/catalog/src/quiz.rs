//! Quiz document types.

use chrono::{DateTime, Utc};
use quizpress_core::QuizId;
use serde::{Deserialize, Serialize};

/// One question/answer pair within a quiz.
///
/// Questions are ordered by their position in the quiz's list; `number` is
/// the display number, carried explicitly so re-ordering edits stay stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub number: u32,
    pub text: String,
    pub answer: String,
}

/// One published monthly quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    pub id: QuizId,
    pub title: String,
    /// Month name as displayed, e.g. "January".
    pub month: String,
    pub year: i32,
    /// Assigned by the store at creation time.
    pub created_at: DateTime<Utc>,
    pub questions: Vec<Question>,
}

/// The editable shape of a quiz, as submitted by the dashboard.
///
/// `id` and `created_at` are absent: the repository assigns the ID and the
/// store stamps the creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizDraft {
    pub title: String,
    pub month: String,
    pub year: i32,
    pub questions: Vec<Question>,
}
