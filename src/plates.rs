use crate::list::ListState;
use crate::render::{self, Row};
use crate::screen::{Dispatcher, Generation, Lifecycle, Outcome, ScreenId};
use crate::types::Plate;
use log::{info, warn};

/// The allowed-plates tab: a refetch-on-focus list with optimistic status
/// toggles.
pub struct PlatesScreen {
    lifecycle: Lifecycle,
    list: ListState<Plate>,
}

impl PlatesScreen {
    pub fn new(max_in_flight: usize) -> PlatesScreen {
        PlatesScreen {
            lifecycle: Lifecycle::new(max_in_flight),
            list: ListState::new(),
        }
    }

    pub fn id(&self) -> ScreenId {
        self.lifecycle.id()
    }

    pub fn list(&self) -> &ListState<Plate> {
        &self.list
    }

    pub fn focus(&mut self, dispatcher: &Dispatcher) {
        let generation = self.list.begin_fetch();
        let api = dispatcher.api().clone();
        dispatcher.fetch(&mut self.lifecycle, generation, async move {
            Outcome::Plates(api.plates().await)
        });
    }

    /// Sends the new status to the backend and shows it locally right away,
    /// whatever the backend ends up saying.
    pub fn toggle(&mut self, dispatcher: &Dispatcher, id: u64, status: bool) {
        let api = dispatcher.api().clone();
        dispatcher.fire(&mut self.lifecycle, async move {
            match api.update_plate_status(id, status).await {
                Ok(()) => info!("Plate {} status set to {}", id, status),
                Err(e) => warn!("Failed to set plate {} status to {}: {}", id, status, e),
            }
        });
        apply_optimistic_status(self.list.items_mut(), id, status);
    }

    /// Flips the listed status of plate `id`. Returns false if no such plate
    /// is listed.
    pub fn toggle_listed(&mut self, dispatcher: &Dispatcher, id: u64) -> bool {
        let status = match self.list.items().iter().find(|p| p.id == id) {
            Some(plate) => !plate.status,
            None => return false,
        };
        self.toggle(dispatcher, id, status);
        true
    }

    pub fn apply(&mut self, generation: Generation, outcome: Outcome) {
        match outcome {
            Outcome::Plates(result) => {
                self.list.finish_fetch(generation, result);
            }
            other => warn!("Plates screen ignoring unexpected outcome {:?}", other),
        }
    }

    pub fn render(&self) -> Vec<String> {
        render::table(
            "Plates",
            ["ID", "Plate", "Date", "Status"],
            &self.list,
            plate_row,
        )
    }
}

fn plate_row(plate: &Plate) -> Row {
    [
        plate.id.to_string(),
        render::or_placeholder(Some(&plate.plate)),
        plate.created_at.clone(),
        if plate.status { "Active" } else { "Inactive" }.to_string(),
    ]
}

/// Optimistic status update: rewrites the record with `id` in place and
/// leaves every other record alone. Nothing is rolled back if the request
/// behind it fails. Returns whether a record matched.
pub fn apply_optimistic_status(plates: &mut [Plate], id: u64, status: bool) -> bool {
    match plates.iter_mut().find(|p| p.id == id) {
        Some(plate) => {
            plate.status = status;
            true
        }
        None => false,
    }
}
