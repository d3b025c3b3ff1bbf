use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};

/// Where an upload is in its processing.
///
/// A job only moves forward through the states in declaration order, except
/// that any state before `Delivered` may move to `Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Received,
    Validated,
    Extracted,
    Flattened,
    Combined,
    Serialized,
    Delivered,
    Failed(String),
}

impl JobState {
    const fn rank(&self) -> u8 {
        match self {
            Self::Received => 0,
            Self::Validated => 1,
            Self::Extracted => 2,
            Self::Flattened => 3,
            Self::Combined => 4,
            Self::Serialized => 5,
            Self::Delivered => 6,
            Self::Failed(_) => 7,
        }
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Failed(_))
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Validated => "validated",
            Self::Extracted => "extracted",
            Self::Flattened => "flattened",
            Self::Combined => "combined",
            Self::Serialized => "serialized",
            Self::Delivered => "delivered",
            Self::Failed(_) => "failed",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed(reason) => write!(f, "failed: {reason}"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// One request's trip through the pipeline.
#[derive(Debug, Clone)]
pub struct UploadJob {
    pub filename: String,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub received_at: DateTime<Utc>,
    state: JobState,
}

impl UploadJob {
    pub fn new(filename: impl Into<String>, input_path: PathBuf, output_path: PathBuf) -> Self {
        Self {
            filename: filename.into(),
            input_path,
            output_path,
            received_at: Utc::now(),
            state: JobState::Received,
        }
    }

    pub fn state(&self) -> &JobState {
        &self.state
    }

    /// Moves to `next` if it lies strictly ahead of the current state.
    ///
    /// Returns `false` and leaves the job untouched otherwise.
    pub fn advance_to(&mut self, next: JobState) -> bool {
        if self.state.is_terminal() || next.rank() <= self.state.rank() {
            tracing::warn!(
                file = %self.filename,
                from = %self.state,
                to = %next,
                "rejected job state transition"
            );
            return false;
        }

        tracing::debug!(file = %self.filename, from = %self.state, to = %next, "job state");
        self.state = next;
        true
    }

    pub fn fail(&mut self, reason: impl Into<String>) -> bool {
        self.advance_to(JobState::Failed(reason.into()))
    }
}
