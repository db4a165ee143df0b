//! Record Store client.
//!
//! The record store is an external service that owns all durable state:
//! user progress and course content. This module defines the contract the
//! orchestrator consumes, the HTTP client speaking the store adapter's
//! protocol, and an in-memory implementation used by tests and local
//! development.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Value, json};

use crate::course::{Course, LessonStep, MidQuestion, TestStep};
use crate::progress::UserProgress;

/// Failures surfaced by record-store calls.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("record already exists")]
    Conflict,
    /// The store rejected the payload (bad fields or out-of-bounds values).
    #[error("store rejected the request: {0}")]
    InvalidInput(String),
    /// A surprising status code or a malformed body.
    #[error("unexpected store response: {0}")]
    Unexpected(String),
    #[error("store transport failure")]
    Transport(#[from] reqwest::Error),
}

/// Partial update of a user's progress fields.
///
/// Absent fields are left untouched by the store; `course_id: Some(None)`
/// clears the enrollment (serialized as an explicit `null`).
#[derive(Debug, Default, Clone, Serialize)]
pub struct ProgressPatch {
    #[serde(rename = "user_step", skip_serializing_if = "Option::is_none")]
    pub step: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_id: Option<Option<i32>>,
    #[serde(rename = "user_test_started", skip_serializing_if = "Option::is_none")]
    pub test_started: Option<bool>,
}

impl ProgressPatch {
    /// Fresh enrollment: first lesson, test not started.
    pub fn enroll(course_id: i32) -> Self {
        Self {
            step: Some(1),
            course_id: Some(Some(course_id)),
            test_started: Some(false),
        }
    }

    /// Enter the test phase at its first question, course unchanged.
    pub fn start_test() -> Self {
        Self {
            step: Some(1),
            test_started: Some(true),
            ..Self::default()
        }
    }

    /// Move to the given step, everything else unchanged.
    pub fn step(step: i32) -> Self {
        Self {
            step: Some(step),
            ..Self::default()
        }
    }

    /// Back to the idle state: no course, no progress.
    pub fn reset() -> Self {
        Self {
            step: Some(0),
            course_id: Some(None),
            test_started: Some(false),
        }
    }
}

/// The record-store operations the orchestrator invokes.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get_user(&self, user_id: i64) -> Result<UserProgress, StoreError>;
    async fn create_user(&self, user_id: i64, user_name: &str) -> Result<(), StoreError>;
    async fn update_progress(&self, user_id: i64, patch: ProgressPatch) -> Result<(), StoreError>;
    async fn increment_score(&self, user_id: i64) -> Result<(), StoreError>;
    async fn delete_user(&self, user_id: i64) -> Result<(), StoreError>;

    async fn course_by_name(&self, name: &str) -> Result<Course, StoreError>;
    async fn course_by_id(&self, course_id: i32) -> Result<Course, StoreError>;
    async fn list_courses(&self) -> Result<Vec<Course>, StoreError>;

    async fn lesson_step(&self, course_id: i32, inner_id: i32) -> Result<LessonStep, StoreError>;
    async fn max_lesson_step(&self, course_id: i32) -> Result<i32, StoreError>;
    async fn mid_question(&self, course_id: i32) -> Result<MidQuestion, StoreError>;
    async fn test_step(&self, course_id: i32, inner_id: i32) -> Result<TestStep, StoreError>;
    async fn test_step_by_id(&self, test_step_id: i32) -> Result<TestStep, StoreError>;
    async fn max_test_step(&self, course_id: i32) -> Result<i32, StoreError>;
}

/// Client for the store adapter's HTTP protocol.
///
/// The adapter answers row queries with a JSON array of matching rows and
/// reports missing records as 404. Query parameters travel in a JSON body,
/// the adapter's convention even on GET routes.
pub struct HttpRecordStore {
    client: reqwest::Client,
    base: String,
}

impl HttpRecordStore {
    /// Builds a client for the adapter at `base`, with a fixed per-request
    /// timeout. Timeouts surface as `StoreError::Transport`.
    pub fn new(base: impl Into<String>, timeout: Duration) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base: base.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base.trim_end_matches('/'), path)
    }

    /// Takes the first row of a list-shaped 200 response.
    async fn first_row<T: serde::de::DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<T, StoreError> {
        match resp.status().as_u16() {
            200 => {}
            404 => return Err(StoreError::NotFound),
            code => return Err(StoreError::Unexpected(format!("status {code}"))),
        }
        let rows: Vec<T> = resp.json().await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::Unexpected("empty result set".to_string()))
    }

    /// Parses the adapter's `SELECT MAX(...)` shape: `[{"max": N}]`.
    async fn max_value(resp: reqwest::Response) -> Result<i32, StoreError> {
        let row: Value = Self::first_row(resp).await?;
        row.get("max")
            .and_then(Value::as_i64)
            .map(|v| v as i32)
            .ok_or_else(|| StoreError::Unexpected("missing max value".to_string()))
    }

    async fn expect_status(resp: reqwest::Response, ok: u16) -> Result<(), StoreError> {
        let status = resp.status().as_u16();
        if status == ok {
            return Ok(());
        }
        match status {
            404 => Err(StoreError::NotFound),
            409 => Err(StoreError::Conflict),
            400 => {
                let reason = resp.text().await.unwrap_or_default();
                Err(StoreError::InvalidInput(reason))
            }
            code => Err(StoreError::Unexpected(format!("status {code}"))),
        }
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn get_user(&self, user_id: i64) -> Result<UserProgress, StoreError> {
        let resp = self
            .client
            .get(self.url("/api/user"))
            .json(&json!({ "user_id": user_id }))
            .send()
            .await?;
        Self::first_row(resp).await
    }

    async fn create_user(&self, user_id: i64, user_name: &str) -> Result<(), StoreError> {
        let resp = self
            .client
            .post(self.url("/api/user"))
            .json(&json!({ "user_id": user_id, "user_name": user_name }))
            .send()
            .await?;
        Self::expect_status(resp, 201).await
    }

    async fn update_progress(&self, user_id: i64, patch: ProgressPatch) -> Result<(), StoreError> {
        let mut body = serde_json::to_value(&patch)
            .map_err(|e| StoreError::Unexpected(e.to_string()))?;
        body["user_id"] = user_id.into();
        let resp = self
            .client
            .put(self.url("/api/user"))
            .json(&body)
            .send()
            .await?;
        Self::expect_status(resp, 200).await
    }

    async fn increment_score(&self, user_id: i64) -> Result<(), StoreError> {
        let resp = self
            .client
            .put(self.url(&format!("/api/user/{user_id}/score")))
            .send()
            .await?;
        Self::expect_status(resp, 200).await
    }

    async fn delete_user(&self, user_id: i64) -> Result<(), StoreError> {
        let resp = self
            .client
            .delete(self.url(&format!("/api/user/{user_id}")))
            .send()
            .await?;
        Self::expect_status(resp, 200).await
    }

    async fn course_by_name(&self, name: &str) -> Result<Course, StoreError> {
        let resp = self
            .client
            .get(self.url("/api/course"))
            .json(&json!({ "course_name": name }))
            .send()
            .await?;
        Self::first_row(resp).await
    }

    async fn course_by_id(&self, course_id: i32) -> Result<Course, StoreError> {
        let resp = self
            .client
            .get(self.url("/api/course"))
            .json(&json!({ "course_id": course_id }))
            .send()
            .await?;
        Self::first_row(resp).await
    }

    async fn list_courses(&self) -> Result<Vec<Course>, StoreError> {
        let resp = self.client.get(self.url("/api/courses")).send().await?;
        match resp.status().as_u16() {
            200 => Ok(resp.json().await?),
            code => Err(StoreError::Unexpected(format!("status {code}"))),
        }
    }

    async fn lesson_step(&self, course_id: i32, inner_id: i32) -> Result<LessonStep, StoreError> {
        let resp = self
            .client
            .get(self.url("/api/course_steps"))
            .json(&json!({ "course_step_inner_id": inner_id, "course_id": course_id }))
            .send()
            .await?;
        Self::first_row(resp).await
    }

    async fn max_lesson_step(&self, course_id: i32) -> Result<i32, StoreError> {
        let resp = self
            .client
            .get(self.url(&format!("/api/course_steps/max/{course_id}")))
            .send()
            .await?;
        Self::max_value(resp).await
    }

    async fn mid_question(&self, course_id: i32) -> Result<MidQuestion, StoreError> {
        let resp = self
            .client
            .get(self.url(&format!("/api/mid_questions/{course_id}")))
            .send()
            .await?;
        Self::first_row(resp).await
    }

    async fn test_step(&self, course_id: i32, inner_id: i32) -> Result<TestStep, StoreError> {
        let resp = self
            .client
            .get(self.url("/api/test_steps"))
            .json(&json!({ "test_step_inner_id": inner_id, "course_id": course_id }))
            .send()
            .await?;
        Self::first_row(resp).await
    }

    async fn test_step_by_id(&self, test_step_id: i32) -> Result<TestStep, StoreError> {
        let resp = self
            .client
            .get(self.url(&format!("/api/test_steps/{test_step_id}")))
            .send()
            .await?;
        Self::first_row(resp).await
    }

    async fn max_test_step(&self, course_id: i32) -> Result<i32, StoreError> {
        let resp = self
            .client
            .get(self.url(&format!("/api/test_steps/max/{course_id}")))
            .send()
            .await?;
        Self::max_value(resp).await
    }
}

/// In-memory record store for tests and local development.
///
/// Course content is seeded at construction and immutable afterwards;
/// users start empty. Covers the same contract as the HTTP client,
/// including `Conflict` on duplicate ids.
#[derive(Default)]
pub struct MemoryRecordStore {
    users: Mutex<HashMap<i64, UserProgress>>,
    courses: Vec<Course>,
    lessons: Vec<LessonStep>,
    mid_questions: Vec<MidQuestion>,
    test_steps: Vec<TestStep>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds one course with its lessons, mid-course question and test pool.
    pub fn with_course(
        mut self,
        course: Course,
        lessons: Vec<LessonStep>,
        mid_question: MidQuestion,
        test_steps: Vec<TestStep>,
    ) -> Self {
        self.courses.push(course);
        self.lessons.extend(lessons);
        self.mid_questions.push(mid_question);
        self.test_steps.extend(test_steps);
        self
    }

    fn users(&self) -> std::sync::MutexGuard<'_, HashMap<i64, UserProgress>> {
        self.users.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn get_user(&self, user_id: i64) -> Result<UserProgress, StoreError> {
        self.users().get(&user_id).cloned().ok_or(StoreError::NotFound)
    }

    async fn create_user(&self, user_id: i64, user_name: &str) -> Result<(), StoreError> {
        let mut users = self.users();
        if users.contains_key(&user_id) {
            return Err(StoreError::Conflict);
        }
        users.insert(
            user_id,
            UserProgress {
                user_id,
                user_name: user_name.to_string(),
                step: 0,
                score: 0,
                course_id: None,
                test_started: false,
            },
        );
        Ok(())
    }

    async fn update_progress(&self, user_id: i64, patch: ProgressPatch) -> Result<(), StoreError> {
        let mut users = self.users();
        let user = users.get_mut(&user_id).ok_or(StoreError::NotFound)?;
        if let Some(step) = patch.step {
            user.step = step;
        }
        if let Some(course_id) = patch.course_id {
            user.course_id = course_id;
        }
        if let Some(test_started) = patch.test_started {
            user.test_started = test_started;
        }
        Ok(())
    }

    async fn increment_score(&self, user_id: i64) -> Result<(), StoreError> {
        let mut users = self.users();
        let user = users.get_mut(&user_id).ok_or(StoreError::NotFound)?;
        user.score += 1;
        Ok(())
    }

    async fn delete_user(&self, user_id: i64) -> Result<(), StoreError> {
        self.users()
            .remove(&user_id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn course_by_name(&self, name: &str) -> Result<Course, StoreError> {
        self.courses
            .iter()
            .find(|c| c.name == name)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn course_by_id(&self, course_id: i32) -> Result<Course, StoreError> {
        self.courses
            .iter()
            .find(|c| c.course_id == course_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list_courses(&self) -> Result<Vec<Course>, StoreError> {
        Ok(self.courses.clone())
    }

    async fn lesson_step(&self, course_id: i32, inner_id: i32) -> Result<LessonStep, StoreError> {
        self.lessons
            .iter()
            .find(|s| s.course_id == course_id && s.inner_id == inner_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn max_lesson_step(&self, course_id: i32) -> Result<i32, StoreError> {
        self.lessons
            .iter()
            .filter(|s| s.course_id == course_id)
            .map(|s| s.inner_id)
            .max()
            .ok_or_else(|| StoreError::Unexpected("course has no lesson steps".to_string()))
    }

    async fn mid_question(&self, course_id: i32) -> Result<MidQuestion, StoreError> {
        self.mid_questions
            .iter()
            .find(|q| q.course_id == course_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn test_step(&self, course_id: i32, inner_id: i32) -> Result<TestStep, StoreError> {
        self.test_steps
            .iter()
            .find(|s| s.course_id == course_id && s.inner_id == inner_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn test_step_by_id(&self, test_step_id: i32) -> Result<TestStep, StoreError> {
        self.test_steps
            .iter()
            .find(|s| s.test_step_id == test_step_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn max_test_step(&self, course_id: i32) -> Result<i32, StoreError> {
        self.test_steps
            .iter()
            .filter(|s| s.course_id == course_id)
            .map(|s| s.inner_id)
            .max()
            .ok_or_else(|| StoreError::Unexpected("course has no test steps".to_string()))
    }
}
