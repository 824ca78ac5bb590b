//! Drives the registration dialog against the session map and the store.

use std::sync::Arc;

use crate::dialog::prompts;
use crate::dialog::sessions::SessionStore;
use crate::dialog::state::{DialogEffect, DialogInput, DialogPhase, step};
use crate::error::RegistrationError;
use crate::fleet::Vehicle;
use crate::store::VehicleStore;

/// What the user should be told after one dialog step.
#[derive(Debug, Clone)]
pub struct DialogReply {
    pub text: String,
    /// Whether `text` uses Markdown formatting.
    pub markdown: bool,
    /// Phase the user's dialog is in after this step.
    pub phase: DialogPhase,
    /// Set when the step attempted a registration.
    pub outcome: Option<Result<Vehicle, RegistrationError>>,
}

impl DialogReply {
    fn plain(text: impl Into<String>, phase: DialogPhase) -> Self {
        Self {
            text: text.into(),
            markdown: false,
            phase,
            outcome: None,
        }
    }
}

/// The multi-step "add vehicle" conversation.
pub struct RegistrationDialog {
    store: Arc<dyn VehicleStore>,
    sessions: Arc<SessionStore>,
}

impl RegistrationDialog {
    pub fn new(store: Arc<dyn VehicleStore>, sessions: Arc<SessionStore>) -> Self {
        Self { store, sessions }
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Current phase for the given session key.
    pub async fn phase(&self, key: &str) -> DialogPhase {
        self.sessions.get(key).await.phase()
    }

    /// Feed one input into the dialog for `key`.
    ///
    /// Callers must not run two `handle` calls for the same key concurrently.
    pub async fn handle(&self, key: &str, input: DialogInput) -> DialogReply {
        let session = self.sessions.get(key).await;
        let from = session.phase();
        let transition = step(session, input);
        let phase = transition.session.phase();
        self.sessions.set(key, transition.session).await;

        if from != phase {
            tracing::debug!(key, %from, to = %phase, "Dialog phase changed");
        }

        match transition.effect {
            DialogEffect::PromptPlate => DialogReply::plain(prompts::ASK_PLATE, phase),
            DialogEffect::RejectPlate { plate } => {
                tracing::debug!(key, plate = %plate, "Plate rejected as too short");
                DialogReply::plain(prompts::PLATE_TOO_SHORT, phase)
            }
            DialogEffect::PromptDriver { plate } => {
                DialogReply::plain(prompts::ask_driver(&plate), phase)
            }
            DialogEffect::Cancelled => DialogReply::plain(prompts::CANCELLED, phase),
            DialogEffect::NothingToCancel => DialogReply::plain(prompts::NOTHING_TO_CANCEL, phase),
            DialogEffect::NoActiveDialog => DialogReply::plain(prompts::NO_ACTIVE_DIALOG, phase),
            DialogEffect::Register { plate, driver } => {
                let outcome = self.register(&plate, &driver).await;
                let (text, markdown) = match &outcome {
                    Ok(vehicle) => (prompts::registered(vehicle), true),
                    Err(e) => (prompts::failed(e), false),
                };
                DialogReply {
                    text,
                    markdown,
                    phase,
                    outcome: Some(outcome),
                }
            }
        }
    }

    async fn register(&self, plate: &str, driver: &str) -> Result<Vehicle, RegistrationError> {
        match self.store.add_vehicle(plate, driver).await {
            Ok(vehicle) => {
                tracing::info!(
                    id = vehicle.id,
                    plate = %vehicle.plate_number,
                    driver = %vehicle.driver_name,
                    "Vehicle registered"
                );
                Ok(vehicle)
            }
            Err(e) => {
                if e.is_unavailable() {
                    tracing::error!(plate, "Vehicle store unavailable: {e}");
                } else {
                    tracing::warn!(plate, "Vehicle registration rejected: {e}");
                }
                Err(e.into())
            }
        }
    }
}
