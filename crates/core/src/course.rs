//! Course content types, read-only to the orchestrator.
//!
//! Field renames carry the record-store adapter's column names so the
//! HTTP client can deserialize rows directly.

use serde::{Deserialize, Serialize};

/// A course's descriptive fields and content counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub course_id: i32,
    #[serde(rename = "course_name")]
    pub name: String,
    #[serde(rename = "course_description")]
    pub description: String,
    /// Number of ordered lesson steps (N).
    #[serde(rename = "course_num_steps")]
    pub num_steps: i32,
    /// Number of test questions (M).
    #[serde(rename = "course_num_questions")]
    pub num_questions: i32,
}

/// One ordered content unit of a course, indexed 1..=N within the course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonStep {
    pub course_step_id: i32,
    #[serde(rename = "course_step_inner_id")]
    pub inner_id: i32,
    #[serde(rename = "course_step_text")]
    pub text: String,
    /// Optional attachment reference (image or video URL).
    #[serde(rename = "course_step_media", default, skip_serializing_if = "Option::is_none")]
    pub media: Option<String>,
    pub course_id: i32,
}

/// The single non-scored comprehension check at the course midpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MidQuestion {
    pub mid_question_id: i32,
    #[serde(rename = "mid_question_text")]
    pub text: String,
    #[serde(rename = "mid_question_ans")]
    pub answer: String,
    pub course_id: i32,
}

/// One scored question of a course's test pool. `test_step_id` is globally
/// unique; `inner_id` orders the pool 1..=M within the course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestStep {
    pub test_step_id: i32,
    #[serde(rename = "test_step_inner_id")]
    pub inner_id: i32,
    #[serde(rename = "test_step_text")]
    pub text: String,
    #[serde(rename = "test_step_ans")]
    pub answer: String,
    pub course_id: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn course_row_deserializes_from_adapter_names() {
        let row = serde_json::json!({
            "course_id": 1,
            "course_name": "algebra",
            "course_description": "Linear equations from scratch.",
            "course_num_steps": 4,
            "course_num_questions": 2
        });
        let course: Course = serde_json::from_value(row).unwrap();
        assert_eq!(course.name, "algebra");
        assert_eq!(course.num_steps, 4);
    }

    #[test]
    fn lesson_step_media_defaults_to_none() {
        let row = serde_json::json!({
            "course_step_id": 9,
            "course_step_inner_id": 2,
            "course_step_text": "Variables stand for unknown numbers.",
            "course_id": 1
        });
        let step: LessonStep = serde_json::from_value(row).unwrap();
        assert_eq!(step.media, None);
        assert_eq!(step.inner_id, 2);
    }

    #[test]
    fn test_step_keeps_both_ids() {
        let row = serde_json::json!({
            "test_step_id": 31,
            "test_step_inner_id": 1,
            "test_step_text": "Solve x + 1 = 3.",
            "test_step_ans": "2",
            "course_id": 1
        });
        let step: TestStep = serde_json::from_value(row).unwrap();
        assert_eq!(step.test_step_id, 31);
        assert_eq!(step.inner_id, 1);
    }
}
