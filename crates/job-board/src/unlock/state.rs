use std::fmt;

use serde::Serialize;

/// Per-candidate position in the unlock flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum UnlockState {
    Locked,
    ConfirmPending { cost: u64, balance: u64 },
    Unlocking,
    Unlocked,
    /// Transient; the workflow moves straight back to `Locked`.
    Failed,
}

impl UnlockState {
    pub fn is_unlocked(self) -> bool {
        matches!(self, UnlockState::Unlocked)
    }

    /// Whether the confirmation prompt can be accepted.
    pub fn can_confirm(self) -> bool {
        matches!(self, UnlockState::ConfirmPending { cost, balance } if balance >= cost)
    }

    pub const fn label(self) -> &'static str {
        match self {
            UnlockState::Locked => "locked",
            UnlockState::ConfirmPending { .. } => "confirm_pending",
            UnlockState::Unlocking => "unlocking",
            UnlockState::Unlocked => "unlocked",
            UnlockState::Failed => "failed",
        }
    }
}

impl fmt::Display for UnlockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
