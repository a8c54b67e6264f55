//! Hook payloads fired by platform subsystems
//!
//! A hook is a plain immutable value handed to every registered callback. It
//! carries the records describing what happened and nothing else.

mod enrol;

pub use enrol::{AfterUserEnrolled, EnrolInstance, EnrolmentStatus, UserEnrolment};

/// Descriptive metadata every hook exposes to admin tooling
pub trait Hook {
    /// One sentence describing when the hook fires
    fn label() -> &'static str;

    /// Tags used to group hooks in listings
    fn tags() -> &'static [&'static str];
}
