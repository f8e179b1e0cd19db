//! Row types for the `courses` and `questions` tables.
//!
//! Field order matches the `RETURNING` lists so the JSON rendering lines up
//! with what clients already expect.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A course that owns questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Course {
    pub id: i32,
    pub name: String,
}

/// A question posted to a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Question {
    pub id: i32,
    pub title: String,
    pub text: String,
    pub upvotes: i32,
    pub course_id: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_serializes_in_column_order() {
        let q = Question {
            id: 1,
            title: "Why?".into(),
            text: "Explain X".into(),
            upvotes: 0,
            course_id: 1,
        };
        assert_eq!(
            serde_json::to_string(&q).unwrap(),
            r#"{"id":1,"title":"Why?","text":"Explain X","upvotes":0,"course_id":1}"#
        );
    }
}
