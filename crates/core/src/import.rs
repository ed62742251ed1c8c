//! Import batch lifecycle: status enums, chunking constants, and the
//! terminal-status rule.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Data rows per ingestion chunk. Each chunk commits as one transaction.
pub const CHUNK_SIZE: usize = 1000;

/// Maximum number of error strings returned by the status endpoint.
pub const MAX_STATUS_ERRORS: usize = 10;

// ---------------------------------------------------------------------------
// Batch status
// ---------------------------------------------------------------------------

/// Lifecycle status of an import batch.
///
/// `Completed` and `Failed` are terminal; the batch row is never
/// updated again once either is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl BatchStatus {
    /// Return the status name as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Parse a status string. Returns `None` for unknown values.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "processing" => Some(Self::Processing),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// All valid status values.
    pub const ALL: &'static [&'static str] = &["pending", "processing", "completed", "failed"];

    /// Whether the batch will receive no further updates.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Log entry status
// ---------------------------------------------------------------------------

/// Outcome of one processed data row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogStatus {
    Success,
    Error,
}

impl LogStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "success" => Some(Self::Success),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    pub const ALL: &'static [&'static str] = &["success", "error"];
}

impl std::fmt::Display for LogStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Terminal status rule
// ---------------------------------------------------------------------------

/// Compute the terminal status for a finished run.
///
/// No failures means `completed` (including the zero-row run); all
/// failures means `failed`; a mixed outcome still counts as
/// `completed` because the successful rows were persisted.
pub fn final_status(successful: i32, failed: i32) -> BatchStatus {
    if failed == 0 {
        BatchStatus::Completed
    } else if successful == 0 {
        BatchStatus::Failed
    } else {
        BatchStatus::Completed
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
