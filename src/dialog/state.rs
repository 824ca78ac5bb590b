//! Registration dialog state machine — pure `(session, input) -> (session, effect)`.
//!
//! Progresses Idle → AwaitingPlate → AwaitingDriver → Idle. Cancellation
//! returns to Idle from anywhere. No I/O happens here; the caller performs
//! the store call requested by [`DialogEffect::Register`].

use serde::{Deserialize, Serialize};

use crate::fleet::model::{char_len, normalize_plate};

/// Minimum normalized plate length accepted by the dialog.
pub const MIN_PLATE_LEN: usize = 6;

/// The phases of the registration dialog, without their data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogPhase {
    #[default]
    Idle,
    AwaitingPlate,
    AwaitingDriver,
}

impl DialogPhase {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: DialogPhase) -> bool {
        use DialogPhase::*;
        matches!(
            (self, target),
            (_, AwaitingPlate)
                | (AwaitingPlate, AwaitingDriver)
                | (AwaitingPlate, Idle)
                | (AwaitingDriver, Idle)
                | (Idle, Idle)
        )
    }

    /// Whether a dialog is in progress.
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}

impl std::fmt::Display for DialogPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::AwaitingPlate => "awaiting_plate",
            Self::AwaitingDriver => "awaiting_driver",
        };
        write!(f, "{s}")
    }
}

/// Per-user dialog state, including the plate captured in step one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DialogSession {
    #[default]
    Idle,
    AwaitingPlate,
    AwaitingDriver {
        pending_plate: String,
    },
}

impl DialogSession {
    pub fn phase(&self) -> DialogPhase {
        match self {
            Self::Idle => DialogPhase::Idle,
            Self::AwaitingPlate => DialogPhase::AwaitingPlate,
            Self::AwaitingDriver { .. } => DialogPhase::AwaitingDriver,
        }
    }

    pub fn pending_plate(&self) -> Option<&str> {
        match self {
            Self::AwaitingDriver { pending_plate } => Some(pending_plate),
            _ => None,
        }
    }
}

/// Input that can drive the dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogInput {
    /// Explicit "begin registration" request.
    Start,
    /// Explicit cancel request.
    Cancel,
    /// Any other text from the user.
    Text(String),
}

/// What the caller should do after a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogEffect {
    /// Ask for the plate number.
    PromptPlate,
    /// Plate was too short; ask again.
    RejectPlate { plate: String },
    /// Plate accepted; ask for the driver.
    PromptDriver { plate: String },
    /// Both fields collected; persist them.
    Register { plate: String, driver: String },
    Cancelled,
    NothingToCancel,
    /// Plain text with no dialog in progress.
    NoActiveDialog,
}

/// Result of one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub session: DialogSession,
    pub effect: DialogEffect,
}

impl Transition {
    fn new(session: DialogSession, effect: DialogEffect) -> Self {
        Self { session, effect }
    }
}

/// Advance the dialog by one input.
///
/// `Start` always (re)starts at AwaitingPlate, dropping any pending plate.
/// `Register` leaves the session Idle whatever the store later says.
pub fn step(session: DialogSession, input: DialogInput) -> Transition {
    match (session, input) {
        (_, DialogInput::Start) => {
            Transition::new(DialogSession::AwaitingPlate, DialogEffect::PromptPlate)
        }

        (DialogSession::Idle, DialogInput::Cancel) => {
            Transition::new(DialogSession::Idle, DialogEffect::NothingToCancel)
        }
        (_, DialogInput::Cancel) => Transition::new(DialogSession::Idle, DialogEffect::Cancelled),

        (DialogSession::Idle, DialogInput::Text(_)) => {
            Transition::new(DialogSession::Idle, DialogEffect::NoActiveDialog)
        }

        (DialogSession::AwaitingPlate, DialogInput::Text(text)) => {
            let plate = normalize_plate(&text);
            if char_len(&plate) < MIN_PLATE_LEN {
                Transition::new(
                    DialogSession::AwaitingPlate,
                    DialogEffect::RejectPlate { plate },
                )
            } else {
                Transition::new(
                    DialogSession::AwaitingDriver {
                        pending_plate: plate.clone(),
                    },
                    DialogEffect::PromptDriver { plate },
                )
            }
        }

        (DialogSession::AwaitingDriver { pending_plate }, DialogInput::Text(text)) => {
            Transition::new(
                DialogSession::Idle,
                DialogEffect::Register {
                    plate: pending_plate,
                    driver: text.trim().to_string(),
                },
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> DialogInput {
        DialogInput::Text(s.to_string())
    }

    #[test]
    fn start_from_idle_prompts_for_plate() {
        let t = step(DialogSession::Idle, DialogInput::Start);
        assert_eq!(t.session, DialogSession::AwaitingPlate);
        assert_eq!(t.effect, DialogEffect::PromptPlate);
    }

    #[test]
    fn short_plate_stays_in_awaiting_plate() {
        for raw in ["AB1", "", "   ", "a b c d e", "12345"] {
            let t = step(DialogSession::AwaitingPlate, text(raw));
            assert_eq!(t.session, DialogSession::AwaitingPlate, "input {raw:?}");
            assert!(matches!(t.effect, DialogEffect::RejectPlate { .. }));
        }
    }

    #[test]
    fn plate_of_min_length_advances() {
        let t = step(DialogSession::AwaitingPlate, text("AB1234"));
        assert_eq!(
            t.session,
            DialogSession::AwaitingDriver {
                pending_plate: "AB1234".into()
            }
        );
        assert_eq!(
            t.effect,
            DialogEffect::PromptDriver {
                plate: "AB1234".into()
            }
        );
    }

    #[test]
    fn plate_is_normalized_before_length_check() {
        let t = step(DialogSession::AwaitingPlate, text("a1 a1a1"));
        assert_eq!(t.session.pending_plate(), Some("A1A1A1"));
        assert_eq!(t.session.phase(), DialogPhase::AwaitingDriver);
    }

    #[test]
    fn length_counts_characters() {
        // Six Cyrillic letters/digits, twelve-plus bytes.
        let t = step(DialogSession::AwaitingPlate, text("а001аа"));
        assert_eq!(t.session.pending_plate(), Some("А001АА"));
    }

    #[test]
    fn driver_completes_and_resets() {
        let session = DialogSession::AwaitingDriver {
            pending_plate: "A1A1A1".into(),
        };
        let t = step(session, text("  Ivanov I.I. "));
        assert_eq!(t.session, DialogSession::Idle);
        assert_eq!(
            t.effect,
            DialogEffect::Register {
                plate: "A1A1A1".into(),
                driver: "Ivanov I.I.".into()
            }
        );
    }

    #[test]
    fn cancel_from_active_states() {
        let t = step(DialogSession::AwaitingPlate, DialogInput::Cancel);
        assert_eq!(t.session, DialogSession::Idle);
        assert_eq!(t.effect, DialogEffect::Cancelled);

        let t = step(
            DialogSession::AwaitingDriver {
                pending_plate: "A1A1A1".into(),
            },
            DialogInput::Cancel,
        );
        assert_eq!(t.session, DialogSession::Idle);
        assert_eq!(t.session.pending_plate(), None);
        assert_eq!(t.effect, DialogEffect::Cancelled);
    }

    #[test]
    fn cancel_from_idle_is_a_noop() {
        let t = step(DialogSession::Idle, DialogInput::Cancel);
        assert_eq!(t.session, DialogSession::Idle);
        assert_eq!(t.effect, DialogEffect::NothingToCancel);
    }

    #[test]
    fn restart_discards_pending_plate() {
        let session = DialogSession::AwaitingDriver {
            pending_plate: "A1A1A1".into(),
        };
        let t = step(session, DialogInput::Start);
        assert_eq!(t.session, DialogSession::AwaitingPlate);
        assert_eq!(t.session.pending_plate(), None);
    }

    #[test]
    fn text_while_idle_does_nothing() {
        let t = step(DialogSession::Idle, text("hello"));
        assert_eq!(t.session, DialogSession::Idle);
        assert_eq!(t.effect, DialogEffect::NoActiveDialog);
    }

    #[test]
    fn every_step_respects_phase_transitions() {
        let sessions = [
            DialogSession::Idle,
            DialogSession::AwaitingPlate,
            DialogSession::AwaitingDriver {
                pending_plate: "A1A1A1".into(),
            },
        ];
        let inputs = [
            DialogInput::Start,
            DialogInput::Cancel,
            text("AB1"),
            text("AB1234"),
        ];
        for session in &sessions {
            for input in &inputs {
                let from = session.phase();
                let to = step(session.clone(), input.clone()).session.phase();
                assert!(
                    from.can_transition_to(to),
                    "{from} -> {to} on {input:?} is not a valid transition"
                );
            }
        }
    }

    #[test]
    fn invalid_transitions() {
        use DialogPhase::*;
        assert!(!Idle.can_transition_to(AwaitingDriver));
        assert!(!AwaitingDriver.can_transition_to(AwaitingDriver));
        assert!(Idle.can_transition_to(AwaitingPlate));
        assert!(AwaitingDriver.can_transition_to(AwaitingPlate));
    }

    #[test]
    fn display_matches_serde() {
        use DialogPhase::*;
        for phase in [Idle, AwaitingPlate, AwaitingDriver] {
            let json = serde_json::to_string(&phase).unwrap();
            assert_eq!(format!("\"{phase}\""), json);
        }
    }

    #[test]
    fn session_serializes_with_tag() {
        let session = DialogSession::AwaitingDriver {
            pending_plate: "A1A1A1".into(),
        };
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["state"], "awaiting_driver");
        assert_eq!(json["pending_plate"], "A1A1A1");
    }
}
