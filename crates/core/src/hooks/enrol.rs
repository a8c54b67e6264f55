use super::Hook;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether an enrolment method or a user enrolment is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrolmentStatus {
    Active,
    Suspended,
}

/// An enrolment method attached to a course (manual, self, cohort sync, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrolInstance {
    pub id: i64,
    /// Plugin name, e.g. `manual`
    pub enrol: String,
    pub course_id: i64,
    pub status: EnrolmentStatus,
    pub name: Option<String>,
}

/// A single user's enrolment through an [`EnrolInstance`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserEnrolment {
    pub id: i64,
    pub enrol_id: i64,
    pub user_id: Uuid,
    pub status: EnrolmentStatus,
    pub time_start: Option<DateTime<Utc>>,
    pub time_end: Option<DateTime<Utc>>,
}

/// Fired after a user has been enrolled in a course through an enrolment instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AfterUserEnrolled {
    enrol_instance: EnrolInstance,
    user_enrolment: UserEnrolment,
}

impl AfterUserEnrolled {
    pub fn new(enrol_instance: EnrolInstance, user_enrolment: UserEnrolment) -> Self {
        Self {
            enrol_instance,
            user_enrolment,
        }
    }

    pub fn enrol_instance(&self) -> &EnrolInstance {
        &self.enrol_instance
    }

    pub fn user_enrolment(&self) -> &UserEnrolment {
        &self.user_enrolment
    }

    /// The enrolled user
    pub fn user_id(&self) -> Uuid {
        self.user_enrolment.user_id
    }

    /// Course the user was enrolled in
    pub fn course_id(&self) -> i64 {
        self.enrol_instance.course_id
    }
}

impl Hook for AfterUserEnrolled {
    fn label() -> &'static str {
        "Allows plugins or features to perform actions after a user is enrolled in a course."
    }

    fn tags() -> &'static [&'static str] {
        &["enrol", "user"]
    }
}
