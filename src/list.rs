use crate::error::ClientError;
use crate::screen::Generation;
use log::{debug, warn};

/// State behind a list screen. Every fetch starts from scratch: the list is
/// cleared and only the newest fetch may fill it again.
#[derive(Debug)]
pub struct ListState<T> {
    items: Vec<T>,
    loading: bool,
    error: Option<ClientError>,
    generation: Generation,
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        ListState {
            items: Vec::new(),
            loading: false,
            error: None,
            generation: 0,
        }
    }
}

impl<T> ListState<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_fetch(&mut self) -> Generation {
        self.generation += 1;
        self.items.clear();
        self.loading = true;
        self.error = None;
        self.generation
    }

    /// Applies a fetch result. Returns false if a newer fetch has started
    /// since, in which case the result is dropped.
    pub fn finish_fetch(
        &mut self,
        generation: Generation,
        result: Result<Vec<T>, ClientError>,
    ) -> bool {
        if generation != self.generation {
            debug!(
                "Dropping stale fetch (generation {}, current {})",
                generation, self.generation
            );
            return false;
        }
        self.loading = false;
        match result {
            Ok(items) => self.items = items,
            Err(e) => {
                warn!("Failed to load list: {}", e);
                self.items.clear();
                self.error = Some(e);
            }
        }
        true
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut [T] {
        &mut self.items
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&ClientError> {
        self.error.as_ref()
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Nothing to show and nothing on the way.
    pub fn is_blank(&self) -> bool {
        self.items.is_empty() && !self.loading && self.error.is_none()
    }
}
