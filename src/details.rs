use crate::images::{self, SavedImage};
use crate::render;
use crate::screen::{Dispatcher, Generation, Lifecycle, Outcome, ScreenId};
use crate::types::AccessAttempt;
use futures::future::try_join_all;
use log::warn;

/// One access attempt, reached by id. Shows nothing until the record
/// arrives; a failed fetch is only logged.
pub struct DetailsScreen {
    lifecycle: Lifecycle,
    id: u64,
    record: Option<AccessAttempt>,
    saved: Vec<SavedImage>,
    note: Option<String>,
    generation: Generation,
}

impl DetailsScreen {
    pub fn new(id: u64, max_in_flight: usize) -> DetailsScreen {
        DetailsScreen {
            lifecycle: Lifecycle::new(max_in_flight),
            id,
            record: None,
            saved: Vec::new(),
            note: None,
            generation: 0,
        }
    }

    pub fn id(&self) -> ScreenId {
        self.lifecycle.id()
    }

    pub fn record(&self) -> Option<&AccessAttempt> {
        self.record.as_ref()
    }

    pub fn mount(&mut self, dispatcher: &Dispatcher) {
        self.generation += 1;
        let api = dispatcher.api().clone();
        let id = self.id;
        dispatcher.fetch(&mut self.lifecycle, self.generation, async move {
            Outcome::AccessAttempt(api.access_attempt(id).await)
        });
    }

    /// Downloads both images into `dir`. Returns false if the record has not
    /// arrived yet or carries no image names.
    pub fn save_images(&mut self, dispatcher: &Dispatcher, dir: &std::path::Path) -> bool {
        let filenames: Vec<String> = match &self.record {
            Some(r) => [&r.original_image, &r.result_image]
                .iter()
                .filter(|f| !f.is_empty())
                .map(|f| f.to_string())
                .collect(),
            None => return false,
        };
        if filenames.is_empty() {
            return false;
        }
        self.note = None;
        let api = dispatcher.api().clone();
        let dir = dir.to_path_buf();
        dispatcher.request(&mut self.lifecycle, self.generation, async move {
            let downloads = filenames.iter().map(|f| images::download(&api, f, &dir));
            Outcome::ImagesSaved(try_join_all(downloads).await)
        });
        true
    }

    pub fn apply(&mut self, generation: Generation, outcome: Outcome) {
        if generation != self.generation {
            return;
        }
        match outcome {
            Outcome::AccessAttempt(Ok(record)) => self.record = Some(record),
            Outcome::AccessAttempt(Err(e)) => {
                warn!("Failed to load access attempt {}: {}", self.id, e)
            }
            Outcome::ImagesSaved(Ok(saved)) => self.saved = saved,
            Outcome::ImagesSaved(Err(e)) => {
                warn!("Failed to save images for access attempt {}: {}", self.id, e);
                self.note = Some(format!("Could not save images: {}", e));
            }
            other => warn!("Details screen ignoring unexpected outcome {:?}", other),
        }
    }

    pub fn render(&self, dispatcher: &Dispatcher) -> Vec<String> {
        let mut lines = vec![format!("== Access attempt {} ==", self.id)];
        let record = match &self.record {
            Some(r) => r,
            None => return lines,
        };
        lines.push(format!(
            "Plate: {}  Date: {}  Status: {}",
            render::or_placeholder(record.plate_text()),
            record.created_at,
            if record.status { "Authorized" } else { "Denied" }
        ));
        let images = [
            ("Original", &record.original_image),
            ("Result", &record.result_image),
        ];
        for (label, filename) in &images {
            let shown = if filename.is_empty() {
                "(pending)".to_string()
            } else {
                match dispatcher.api().image_url(filename) {
                    Ok(url) => url.to_string(),
                    Err(_) => filename.to_string(),
                }
            };
            lines.push(format!("{}: {}", label, shown));
        }
        for saved in &self.saved {
            lines.push(format!(
                "Saved {} ({}x{}) to {}",
                saved.filename,
                saved.width,
                saved.height,
                saved.path.display()
            ));
        }
        if let Some(note) = &self.note {
            lines.push(note.clone());
        }
        lines
    }

    pub fn teardown(&mut self) {
        self.lifecycle.teardown();
    }
}
