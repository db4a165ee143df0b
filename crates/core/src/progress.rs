//! Per-user learning progress.
//!
//! The durable record lives in the external record store; the orchestrator
//! reads and mutates it over RPC and never caches it across requests. The
//! session phase is derived from the stored fields at the start of each
//! operation rather than re-checked field by field in every handler.

use serde::{Deserialize, Serialize};

/// Durable progress record for one user, as stored by the record store.
///
/// Invariants maintained by the orchestrator: `step == 0` if and only if
/// `course_id` is `None` (the enrollment-cleared state), and
/// `test_started` implies an active course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProgress {
    pub user_id: i64,
    pub user_name: String,
    /// Lesson index while learning, test-question index once the test has
    /// started. `0` means not enrolled.
    #[serde(rename = "user_step")]
    pub step: i32,
    #[serde(rename = "user_score")]
    pub score: i32,
    pub course_id: Option<i32>,
    #[serde(rename = "user_test_started")]
    pub test_started: bool,
}

/// The lesson index at which the mid-course question replaces a lesson.
pub fn mid_point(num_steps: i32) -> i32 {
    num_steps / 2 + 1
}

/// Session phase derived from a progress record and the course's lesson
/// count. This is the explicit form of the state machine; the raw record
/// only encodes it implicitly through field combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressPhase {
    /// Registered but not enrolled in any course.
    Idle,
    /// Working through lesson `step`.
    Lesson(i32),
    /// At the course midpoint; the mid-course question is due instead of
    /// a lesson.
    MidQuestion,
    /// Answering test question `step`.
    Test(i32),
}

impl UserProgress {
    /// Whether the user has an active course.
    pub fn enrolled(&self) -> bool {
        self.step > 0 && self.course_id.is_some()
    }

    /// Derives the session phase given the course's lesson count.
    pub fn phase(&self, num_lesson_steps: i32) -> ProgressPhase {
        if !self.enrolled() {
            ProgressPhase::Idle
        } else if self.test_started {
            ProgressPhase::Test(self.step)
        } else if self.step == mid_point(num_lesson_steps) {
            ProgressPhase::MidQuestion
        } else {
            ProgressPhase::Lesson(self.step)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(step: i32, course_id: Option<i32>, test_started: bool) -> UserProgress {
        UserProgress {
            user_id: 7,
            user_name: "Test User".to_string(),
            step,
            score: 0,
            course_id,
            test_started,
        }
    }

    #[test]
    fn mid_point_for_even_and_odd_lesson_counts() {
        assert_eq!(mid_point(4), 3);
        assert_eq!(mid_point(5), 3);
        assert_eq!(mid_point(6), 4);
        assert_eq!(mid_point(1), 1);
    }

    #[test]
    fn unenrolled_record_is_idle() {
        assert_eq!(record(0, None, false).phase(4), ProgressPhase::Idle);
    }

    #[test]
    fn lesson_phase_skips_the_midpoint_index() {
        let n = 5; // midpoint at 3
        assert_eq!(record(1, Some(1), false).phase(n), ProgressPhase::Lesson(1));
        assert_eq!(record(2, Some(1), false).phase(n), ProgressPhase::Lesson(2));
        assert_eq!(record(3, Some(1), false).phase(n), ProgressPhase::MidQuestion);
        assert_eq!(record(4, Some(1), false).phase(n), ProgressPhase::Lesson(4));
    }

    #[test]
    fn test_phase_ignores_the_midpoint() {
        // Test question indices are independent of the lesson midpoint.
        assert_eq!(record(3, Some(1), true).phase(4), ProgressPhase::Test(3));
    }

    #[test]
    fn wire_names_match_the_store_adapter() {
        let row = serde_json::json!({
            "user_id": 42,
            "user_name": "Ada",
            "user_step": 2,
            "user_score": 1,
            "course_id": null,
            "user_test_started": false
        });
        let user: UserProgress = serde_json::from_value(row).unwrap();
        assert_eq!(user.step, 2);
        assert_eq!(user.score, 1);
        assert_eq!(user.course_id, None);
    }
}
