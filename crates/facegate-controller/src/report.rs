//! Per-cycle outcome reports.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use facegate_core::RecognitionResult;
use facegate_network::RecognitionError;
use serde::Serialize;
use uuid::Uuid;

use crate::state_machine::AccessState;

/// Why a cycle ended without unlocking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DenialReason {
    /// The service answered and did not recognize the subject.
    NotRecognized { message: Option<String> },

    /// The link was down; no request was sent.
    NotConnected,

    /// Non-200 status or a failure below HTTP.
    Transport { code: i32 },

    /// The request deadline expired.
    Timeout,

    /// The service answered 200 with an unusable body.
    MalformedResponse { detail: String },

    /// The cycle hit an internal error and was reset.
    Fault { detail: String },
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotRecognized { message: Some(m) } => write!(f, "not recognized ({m})"),
            Self::NotRecognized { message: None } => write!(f, "not recognized"),
            Self::NotConnected => write!(f, "not connected"),
            Self::Transport { code } => write!(f, "transport failure {code}"),
            Self::Timeout => write!(f, "request timed out"),
            Self::MalformedResponse { detail } => write!(f, "malformed response: {detail}"),
            Self::Fault { detail } => write!(f, "fault: {detail}"),
        }
    }
}

impl From<RecognitionError> for DenialReason {
    fn from(e: RecognitionError) -> Self {
        match e {
            RecognitionError::NotConnected => Self::NotConnected,
            e if e.is_timeout() => Self::Timeout,
            RecognitionError::TransportFailure(code) => Self::Transport { code },
            RecognitionError::ParseFailure(detail) => Self::MalformedResponse { detail },
        }
    }
}

/// Verdict of one cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AccessOutcome {
    Granted { subject: String, confidence: f32 },
    Denied(DenialReason),
}

impl AccessOutcome {
    /// Collapse a recognition exchange into a verdict. Every error denies.
    pub fn from_recognition(verdict: Result<RecognitionResult, RecognitionError>) -> Self {
        match verdict {
            Ok(result) if result.authenticated => Self::Granted {
                subject: result.subject().to_string(),
                confidence: result.confidence,
            },
            Ok(result) => Self::Denied(DenialReason::NotRecognized {
                message: result.message,
            }),
            Err(e) => Self::Denied(e.into()),
        }
    }

    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted { .. })
    }

    /// Denial reason, if denied.
    pub fn denial(&self) -> Option<&DenialReason> {
        match self {
            Self::Granted { .. } => None,
            Self::Denied(reason) => Some(reason),
        }
    }
}

impl fmt::Display for AccessOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Granted {
                subject,
                confidence,
            } => write!(f, "granted to {subject} ({:.2}%)", confidence * 100.0),
            Self::Denied(reason) => write!(f, "denied: {reason}"),
        }
    }
}

/// Summary of one completed access cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleReport {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub outcome: AccessOutcome,

    /// States visited, starting and ending at `Idle`.
    pub path: Vec<AccessState>,

    /// Size of the captured image.
    pub image_bytes: usize,

    /// Trigger confirmation to re-arm, including the release wait.
    pub elapsed: Duration,
}
