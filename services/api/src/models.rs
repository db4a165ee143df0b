//! API Models
//!
//! Request payloads and operation outcomes for the orchestrator surface.
//! Outcome enums serialize with a `kind` tag so front ends branch on the
//! signal without inspecting payload shapes.

use mathbot_core::course::Course;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterPayload {
    pub user_id: i64,
    #[schema(example = "Ada Lovelace")]
    pub user_name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EnrollPayload {
    pub user_id: i64,
    #[schema(example = "algebra")]
    pub course_name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MessagePayload {
    pub user_id: i64,
    pub message: String,
}

/// Course fields exposed to front ends.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CourseInfo {
    pub course_id: i32,
    pub course_name: String,
    pub course_description: String,
    pub course_num_steps: i32,
    pub course_num_questions: i32,
}

impl From<Course> for CourseInfo {
    fn from(course: Course) -> Self {
        Self {
            course_id: course.course_id,
            course_name: course.name,
            course_description: course.description,
            course_num_steps: course.num_steps,
            course_num_questions: course.num_questions,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EnrollOutcome {
    /// The user started (or switched to) the named course.
    Enrolled { course: CourseInfo },
    /// Already enrolled in this course; nothing changed.
    Unchanged,
}

/// The content a user is due to see at their current step.
#[derive(Debug, PartialEq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepContent {
    Lesson {
        step: i32,
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        media: Option<String>,
    },
    MidQuestion {
        text: String,
    },
    TestQuestion {
        step: i32,
        text: String,
    },
}

#[derive(Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AdvanceOutcome {
    /// Moved to the next step of the current phase.
    Advanced { step: i32 },
    /// The last lesson is behind; the test phase begins.
    TestStarted,
    /// The last test question is behind; progress reset to idle.
    TestFinished,
}

#[derive(Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CancelOutcome {
    /// A test in progress was dropped.
    Test,
    /// A course in progress was dropped.
    Course,
    /// There was nothing to cancel.
    Idle,
}

#[derive(Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuitOutcome {
    /// The user must confirm with a follow-up message before deletion.
    ConfirmationRequired,
    Confirmed,
}

#[derive(Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessageOutcome {
    /// Terminal signal: the user confirmed deletion and is gone. The front
    /// end stops further interaction on this.
    QuitConfirmed,
    QuitAborted,
    /// The pending answer matched the reference.
    Hit,
    Miss,
    /// No interaction was pending; the message was ignored.
    Idle,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ScoreResponse {
    pub score: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub kind: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn outcomes_serialize_with_a_kind_tag() {
        let outcome = serde_json::to_value(AdvanceOutcome::Advanced { step: 3 }).unwrap();
        assert_eq!(outcome, json!({ "kind": "advanced", "step": 3 }));

        let outcome = serde_json::to_value(AdvanceOutcome::TestStarted).unwrap();
        assert_eq!(outcome, json!({ "kind": "test_started" }));

        let outcome = serde_json::to_value(MessageOutcome::QuitConfirmed).unwrap();
        assert_eq!(outcome, json!({ "kind": "quit_confirmed" }));
    }

    #[test]
    fn lesson_content_omits_absent_media() {
        let content = serde_json::to_value(StepContent::Lesson {
            step: 1,
            text: "Numbers".into(),
            media: None,
        })
        .unwrap();
        assert_eq!(content, json!({ "kind": "lesson", "step": 1, "text": "Numbers" }));

        let content = serde_json::to_value(StepContent::Lesson {
            step: 2,
            text: "Plots".into(),
            media: Some("https://example.com/plot.png".into()),
        })
        .unwrap();
        assert_eq!(content["media"], "https://example.com/plot.png");
    }

    #[test]
    fn course_info_carries_the_adapter_field_names() {
        let info = CourseInfo::from(Course {
            course_id: 1,
            name: "algebra".into(),
            description: "desc".into(),
            num_steps: 4,
            num_questions: 2,
        });
        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value["course_name"], "algebra");
        assert_eq!(value["course_num_steps"], 4);
    }

    #[test]
    fn payloads_require_their_fields() {
        let result: Result<RegisterPayload, _> = serde_json::from_str(r#"{ "user_id": 1 }"#);
        assert!(result.is_err());

        let payload: MessagePayload =
            serde_json::from_str(r#"{ "user_id": 1, "message": "yes" }"#).unwrap();
        assert_eq!(payload.message, "yes");
    }
}
