//! Admin/student mode toggle.
//!
//! The passcode only decides which controls the UI offers. It is compared as a
//! plain string and must not be relied on as an authorization boundary.

use clap::ValueEnum;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GateMode {
    /// Content visible to everyone; mutations need the admin unlock.
    Inline,
    /// Nothing is shown until the login form is passed.
    Portal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Focus {
    PasscodeInput,
    PrimaryInput,
}

/// What the presentation layer should do after a successful unlock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum UnlockFollowUp {
    Refresh,
    RevealSurface { focus: Focus },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    #[error("passcode required")]
    PasscodeRequired { focus: Focus },
    #[error("incorrect passcode")]
    IncorrectPasscode { focus: Focus },
}

impl GateError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::PasscodeRequired { .. } => "passcode_required",
            Self::IncorrectPasscode { .. } => "incorrect_passcode",
        }
    }

    pub fn focus(&self) -> Focus {
        match self {
            Self::PasscodeRequired { focus } | Self::IncorrectPasscode { focus } => *focus,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Gate {
    mode: GateMode,
    passcode: String,
    unlocked: bool,
}

impl Gate {
    pub fn new(mode: GateMode, passcode: impl Into<String>) -> Self {
        Self {
            mode,
            passcode: passcode.into(),
            unlocked: false,
        }
    }

    pub fn mode(&self) -> GateMode {
        self.mode
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// Whether any content may be shown at all.
    pub fn surface_visible(&self) -> bool {
        self.unlocked || self.mode == GateMode::Inline
    }

    pub fn unlock(&mut self, attempt: &str) -> Result<UnlockFollowUp, GateError> {
        let focus = Focus::PasscodeInput;
        if attempt.trim().is_empty() {
            return Err(GateError::PasscodeRequired { focus });
        }
        if attempt != self.passcode {
            return Err(GateError::IncorrectPasscode { focus });
        }
        self.unlocked = true;
        Ok(match self.mode {
            GateMode::Inline => UnlockFollowUp::Refresh,
            GateMode::Portal => UnlockFollowUp::RevealSurface {
                focus: Focus::PrimaryInput,
            },
        })
    }

    pub fn lock(&mut self) {
        self.unlocked = false;
    }
}
