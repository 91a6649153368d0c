//! Result vocabulary for lifecycle transitions and fire-and-forget calls.

use std::fmt;

use crate::domain::state::LifecyclePhase;

/// Result of a lifecycle transition that did not hard-fail.
///
/// `Deferred` means a precondition is unmet (missing settings, no prior
/// install, a failed install step). The trigger is re-queued, not dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Outcome {
    Completed(LifecyclePhase),
    Deferred(String),
}

impl Outcome {
    #[must_use]
    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred(_))
    }
}

/// Result of a best-effort call whose failure is logged and swallowed.
///
/// Kept distinct from `Result` so the non-propagating contract is visible at
/// call sites and assertable in tests.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "best-effort outcomes are logged, not propagated"]
pub enum BestEffort {
    Done,
    Failed(String),
}

impl BestEffort {
    #[must_use]
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Combine two outcomes, keeping every failure reason.
    pub fn and(self, other: Self) -> Self {
        match (self, other) {
            (Self::Done, Self::Done) => Self::Done,
            (Self::Failed(a), Self::Done) | (Self::Done, Self::Failed(a)) => Self::Failed(a),
            (Self::Failed(a), Self::Failed(b)) => Self::Failed(format!("{a}; {b}")),
        }
    }
}

impl fmt::Display for BestEffort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Done => f.write_str("done"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}
