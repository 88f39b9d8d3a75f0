use crate::screen::Dispatcher;
use log::{error, info};

pub const FIELD_REQUIRED: &str = "The 'Plate' field is required.";
pub const ADDED: &str = "Plate added successfully!";
pub const ADD_FAILED: &str = "An error occurred while adding the plate.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// Nothing was sent; the screen shows the validation message.
    Rejected,
    /// The request is on its way; the caller should navigate back now.
    Sent,
}

/// Form for registering a new allowed plate.
#[derive(Debug, Default)]
pub struct NewPlateScreen {
    validation: Option<&'static str>,
}

impl NewPlateScreen {
    pub fn new() -> NewPlateScreen {
        NewPlateScreen::default()
    }

    pub fn validation(&self) -> Option<&'static str> {
        self.validation
    }

    /// Sends `text` as typed. The acknowledgment is posted as an app-level
    /// notice whenever the request settles, which is usually after this
    /// screen is gone.
    pub fn submit(&mut self, dispatcher: &Dispatcher, text: &str) -> Submission {
        if text.trim().is_empty() {
            self.validation = Some(FIELD_REQUIRED);
            return Submission::Rejected;
        }
        self.validation = None;
        let api = dispatcher.api().clone();
        let plate = text.to_string();
        dispatcher.notify(async move {
            match api.add_plate(&plate).await {
                Ok(()) => {
                    info!("Added plate {}", plate);
                    ADDED.to_string()
                }
                Err(e) => {
                    error!("Failed to add plate {}: {}", plate, e);
                    ADD_FAILED.to_string()
                }
            }
        });
        Submission::Sent
    }

    pub fn render(&self) -> Vec<String> {
        let mut lines = vec![
            "== New plate ==".to_string(),
            "Type the plate and press enter (or 'back').".to_string(),
        ];
        if let Some(message) = self.validation {
            lines.push(message.to_string());
        }
        lines
    }
}
