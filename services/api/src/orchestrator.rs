//! Session Orchestrator
//!
//! Drives the per-user curriculum state machine: lessons, the mid-course
//! question, the test phase and scoring. Durable progress lives in the
//! record store; the only in-process state is the transient session
//! registry. Every operation that reads and then writes a user's state
//! holds that user's session lock for its whole duration, so concurrent
//! requests for one user are serialized while different users proceed
//! independently.

use std::sync::Arc;

use tracing::{info, instrument};

use mathbot_core::{
    error::{BotError, Resource},
    judge::AnswerJudge,
    progress::ProgressPhase,
    store::{ProgressPatch, RecordStore, StoreError},
};

use crate::models::{
    AdvanceOutcome, CancelOutcome, CourseInfo, EnrollOutcome, MessageOutcome, QuitOutcome,
    StepContent,
};
use crate::sessions::{PendingAnswer, QuestionRef, SessionRegistry, UserSession};

/// Longest accepted user name, matching the store's column bound.
const MAX_USER_NAME: usize = 255;

/// A content row the user's progress points at was missing or broken: the
/// store and the orchestrator disagree about the course's shape. That is
/// an internal inconsistency, not a user-facing not-found.
fn content_failure(what: &str, err: StoreError) -> BotError {
    BotError::Internal(anyhow::Error::new(err).context(format!("content lookup failed: {what}")))
}

pub struct Orchestrator {
    store: Arc<dyn RecordStore>,
    judge: Arc<dyn AnswerJudge>,
    sessions: SessionRegistry,
}

impl Orchestrator {
    pub fn new(store: Arc<dyn RecordStore>, judge: Arc<dyn AnswerJudge>) -> Self {
        Self {
            store,
            judge,
            sessions: SessionRegistry::new(),
        }
    }

    /// Registers a new user with zeroed progress.
    #[instrument(skip(self))]
    pub async fn register(&self, user_id: i64, user_name: &str) -> Result<(), BotError> {
        let name = user_name.trim();
        if name.is_empty() || name.len() > MAX_USER_NAME {
            return Err(BotError::InvalidInput(
                "user_name must be between 1 and 255 characters".to_string(),
            ));
        }

        self.store
            .create_user(user_id, name)
            .await
            .map_err(|e| BotError::from_store(e, Resource::User))?;
        info!(user_id, "registered new user");
        Ok(())
    }

    /// Lists the available courses.
    pub async fn courses(&self) -> Result<Vec<CourseInfo>, BotError> {
        let courses = self
            .store
            .list_courses()
            .await
            .map_err(BotError::internal)?;
        Ok(courses.into_iter().map(CourseInfo::from).collect())
    }

    /// Enrolls the user into the named course, or switches their course.
    /// Re-enrolling into the current course is a no-op.
    #[instrument(skip(self))]
    pub async fn enroll(&self, user_id: i64, course_name: &str) -> Result<EnrollOutcome, BotError> {
        let session = self.sessions.acquire(user_id);
        let mut session = session.lock().await;

        let course = self
            .store
            .course_by_name(course_name)
            .await
            .map_err(|e| BotError::from_store(e, Resource::Course))?;
        let user = self
            .store
            .get_user(user_id)
            .await
            .map_err(|e| BotError::from_store(e, Resource::User))?;

        if user.course_id == Some(course.course_id) {
            return Ok(EnrollOutcome::Unchanged);
        }

        // A change of course invalidates whatever was pending.
        session.clear();

        self.store
            .update_progress(user_id, ProgressPatch::enroll(course.course_id))
            .await
            .map_err(BotError::internal)?;

        info!(user_id, course = %course.name, "user enrolled");
        Ok(EnrollOutcome::Enrolled {
            course: course.into(),
        })
    }

    /// Returns the content due at the user's current step. For the
    /// mid-course question and test questions this also records the
    /// pending answer the next free-text message will be judged against.
    #[instrument(skip(self))]
    pub async fn current_step(&self, user_id: i64) -> Result<StepContent, BotError> {
        let session = self.sessions.acquire(user_id);
        let mut session = session.lock().await;

        let user = self
            .store
            .get_user(user_id)
            .await
            .map_err(|e| BotError::from_store(e, Resource::User))?;
        let Some(course_id) = user.course_id.filter(|_| user.step > 0) else {
            return Err(BotError::NotEnrolled);
        };

        let course = self
            .store
            .course_by_id(course_id)
            .await
            .map_err(|e| content_failure("enrolled course", e))?;

        match user.phase(course.num_steps) {
            ProgressPhase::Idle => Err(BotError::NotEnrolled),
            ProgressPhase::Test(step) => {
                let question = self
                    .store
                    .test_step(course_id, step)
                    .await
                    .map_err(|e| content_failure("test step", e))?;
                session.pending_answer = Some(PendingAnswer {
                    question: QuestionRef::Test(question.test_step_id),
                    course_id,
                });
                Ok(StepContent::TestQuestion {
                    step,
                    text: question.text,
                })
            }
            ProgressPhase::MidQuestion => {
                let question = self
                    .store
                    .mid_question(course_id)
                    .await
                    .map_err(|e| content_failure("mid question", e))?;
                session.pending_answer = Some(PendingAnswer {
                    question: QuestionRef::Mid,
                    course_id,
                });
                Ok(StepContent::MidQuestion {
                    text: question.text,
                })
            }
            ProgressPhase::Lesson(step) => {
                let lesson = self
                    .store
                    .lesson_step(course_id, step)
                    .await
                    .map_err(|e| content_failure("lesson step", e))?;
                Ok(StepContent::Lesson {
                    step,
                    text: lesson.text,
                    media: lesson.media,
                })
            }
        }
    }

    /// Moves the user one step forward, flipping phases at the limits.
    /// Whatever was pending is abandoned: an unanswered question counts
    /// as skipped, never as answered.
    #[instrument(skip(self))]
    pub async fn advance(&self, user_id: i64) -> Result<AdvanceOutcome, BotError> {
        let session = self.sessions.acquire(user_id);
        let mut session = session.lock().await;
        session.clear();

        let user = self
            .store
            .get_user(user_id)
            .await
            .map_err(|e| BotError::from_store(e, Resource::User))?;
        let Some(course_id) = user.course_id.filter(|_| user.step > 0) else {
            return Err(BotError::NotEnrolled);
        };

        if user.test_started {
            let limit = self
                .store
                .max_test_step(course_id)
                .await
                .map_err(|e| content_failure("test step count", e))?;
            // The boundary question was already delivered; at or past the
            // limit, advancing ends the test rather than moving past it.
            if user.step >= limit {
                self.store
                    .update_progress(user_id, ProgressPatch::reset())
                    .await
                    .map_err(BotError::internal)?;
                info!(user_id, course_id, "test finished");
                return Ok(AdvanceOutcome::TestFinished);
            }
        } else {
            let limit = self
                .store
                .max_lesson_step(course_id)
                .await
                .map_err(|e| content_failure("lesson step count", e))?;
            if user.step >= limit {
                self.store
                    .update_progress(user_id, ProgressPatch::start_test())
                    .await
                    .map_err(BotError::internal)?;
                info!(user_id, course_id, "test started");
                return Ok(AdvanceOutcome::TestStarted);
            }
        }

        let next = user.step + 1;
        self.store
            .update_progress(user_id, ProgressPatch::step(next))
            .await
            .map_err(BotError::internal)?;
        Ok(AdvanceOutcome::Advanced { step: next })
    }

    /// Returns the user's accumulated test score.
    pub async fn score(&self, user_id: i64) -> Result<i32, BotError> {
        let user = self
            .store
            .get_user(user_id)
            .await
            .map_err(|e| BotError::from_store(e, Resource::User))?;
        Ok(user.score)
    }

    /// Drops the user's current activity and reports what was interrupted.
    #[instrument(skip(self))]
    pub async fn cancel(&self, user_id: i64) -> Result<CancelOutcome, BotError> {
        let session = self.sessions.acquire(user_id);
        let mut session = session.lock().await;
        session.clear();

        let user = self
            .store
            .get_user(user_id)
            .await
            .map_err(|e| BotError::from_store(e, Resource::User))?;

        self.store
            .update_progress(user_id, ProgressPatch::reset())
            .await
            .map_err(BotError::internal)?;

        Ok(if user.test_started {
            CancelOutcome::Test
        } else if user.course_id.is_some() {
            CancelOutcome::Course
        } else {
            CancelOutcome::Idle
        })
    }

    /// First phase of the two-phase delete: marks the user as awaiting a
    /// yes/no confirmation. A second call (or an affirmative message)
    /// completes the deletion.
    #[instrument(skip(self))]
    pub async fn quit(&self, user_id: i64) -> Result<QuitOutcome, BotError> {
        let session = self.sessions.acquire(user_id);
        let mut session = session.lock().await;

        self.store
            .get_user(user_id)
            .await
            .map_err(|e| BotError::from_store(e, Resource::User))?;

        if session.pending_quit {
            self.delete_user(user_id, &mut session).await?;
            return Ok(QuitOutcome::Confirmed);
        }

        session.pending_quit = true;
        Ok(QuitOutcome::ConfirmationRequired)
    }

    /// Routes a free-text message by strict priority: quit confirmation
    /// first, then a pending answer, otherwise a no-op.
    #[instrument(skip(self, message))]
    pub async fn submit_message(
        &self,
        user_id: i64,
        message: &str,
    ) -> Result<MessageOutcome, BotError> {
        let session = self.sessions.acquire(user_id);
        let mut session = session.lock().await;

        if session.pending_quit {
            let confirmed = message
                .chars()
                .next()
                .is_some_and(|c| c.eq_ignore_ascii_case(&'y'));
            if confirmed {
                self.delete_user(user_id, &mut session).await?;
                return Ok(MessageOutcome::QuitConfirmed);
            }
            session.pending_quit = false;
            return Ok(MessageOutcome::QuitAborted);
        }

        // A pending answer is consumed exactly once, whatever happens next.
        if let Some(pending) = session.pending_answer.take() {
            let (reference, scored) = match pending.question {
                QuestionRef::Mid => {
                    let question = self
                        .store
                        .mid_question(pending.course_id)
                        .await
                        .map_err(|e| content_failure("mid question", e))?;
                    (question.answer, false)
                }
                QuestionRef::Test(test_step_id) => {
                    let question = self
                        .store
                        .test_step_by_id(test_step_id)
                        .await
                        .map_err(|e| content_failure("test step", e))?;
                    (question.answer, true)
                }
            };

            let correct = self
                .judge
                .judge(message, &reference)
                .await
                .map_err(BotError::internal)?;
            if !correct {
                return Ok(MessageOutcome::Miss);
            }
            if scored {
                self.store
                    .increment_score(user_id)
                    .await
                    .map_err(BotError::internal)?;
                info!(user_id, "score incremented");
            }
            return Ok(MessageOutcome::Hit);
        }

        // No interaction pending; free-text handling is not defined yet.
        Ok(MessageOutcome::Idle)
    }

    /// Deletes the durable record and all transient state for the user.
    async fn delete_user(
        &self,
        user_id: i64,
        session: &mut UserSession,
    ) -> Result<(), BotError> {
        self.store.delete_user(user_id).await.map_err(|e| match e {
            StoreError::NotFound => BotError::NotFound(Resource::User),
            other => BotError::internal(other),
        })?;
        session.clear();
        self.sessions.evict(user_id);
        info!(user_id, "user deleted");
        Ok(())
    }
}
