use serde::Deserialize;
use time::OffsetDateTime;

use super::deserialize_offset_datetime_flexible;

/// A quiz as listed for the student, with its publication window.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Quiz {
    pub(crate) id: i64,
    pub(crate) title: String,
    #[serde(deserialize_with = "deserialize_offset_datetime_flexible")]
    pub(crate) publish_at: OffsetDateTime,
    #[serde(deserialize_with = "deserialize_offset_datetime_flexible")]
    pub(crate) visible_until: OffsetDateTime,
}

/// A multiple-choice question in canonical (stored) option order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct Question {
    pub(crate) id: i64,
    pub(crate) question_text: String,
    pub(crate) option_a: String,
    pub(crate) option_b: String,
    pub(crate) option_c: String,
    pub(crate) option_d: String,
}

impl Question {
    pub(crate) fn options(&self) -> [&str; 4] {
        [&self.option_a, &self.option_b, &self.option_c, &self.option_d]
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuizDetail {
    pub(crate) questions: Vec<Question>,
}
