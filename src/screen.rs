//! Request plumbing shared by every screen.
//!
//! Screens never await network calls. They hand a future to the
//! [`Dispatcher`], which runs it on the runtime and posts the result back to
//! the front-end loop as a [`Message`]. Each screen instance owns a
//! [`Lifecycle`]: a unique id used to route completions, a liveness flag that
//! is cleared on teardown, a single slot for its latest fetch, and a
//! semaphore bounding its other in-flight requests.

use crate::api::ApiClient;
use crate::error::ClientError;
use crate::images::SavedImage;
use crate::types::{AccessAttempt, Plate};
use log::debug;
use std::fmt;
use std::future::Future;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tokio::sync::{mpsc::Sender, Semaphore};
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Fetch counter. A completion is only applied if it carries the
/// generation of the most recently started fetch.
pub type Generation = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScreenId(Uuid);

impl ScreenId {
    fn new() -> ScreenId {
        ScreenId(Uuid::new_v4())
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_simple())
    }
}

#[derive(Debug)]
pub enum Outcome {
    Plates(Result<Vec<Plate>, ClientError>),
    AccessAttempts(Result<Vec<AccessAttempt>, ClientError>),
    AccessAttempt(Result<AccessAttempt, ClientError>),
    ImagesSaved(Result<Vec<SavedImage>, ClientError>),
}

#[derive(Debug)]
pub struct Completion {
    pub screen: ScreenId,
    pub generation: Generation,
    pub outcome: Outcome,
}

#[derive(Debug)]
pub enum Message {
    Completed(Completion),
    /// App-level acknowledgment that outlives the screen that caused it.
    Notice(String),
}

pub struct Lifecycle {
    id: ScreenId,
    alive: Arc<AtomicBool>,
    permits: Arc<Semaphore>,
    fetch: Option<JoinHandle<()>>,
    tasks: Vec<JoinHandle<()>>,
}

impl Lifecycle {
    pub fn new(max_in_flight: usize) -> Lifecycle {
        Lifecycle {
            id: ScreenId::new(),
            alive: Arc::new(AtomicBool::new(true)),
            permits: Arc::new(Semaphore::new(max_in_flight.max(1))),
            fetch: None,
            tasks: Vec::new(),
        }
    }

    pub fn id(&self) -> ScreenId {
        self.id
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Number of tracked tasks that have not finished yet.
    pub fn pending(&self) -> usize {
        let fetching = self.fetch.iter().filter(|t| !t.is_finished()).count();
        fetching + self.tasks.iter().filter(|t| !t.is_finished()).count()
    }

    /// Marks the screen dead and aborts whatever it still has running.
    pub fn teardown(&mut self) {
        self.alive.store(false, Ordering::Release);
        let pending = self.pending();
        for task in self.fetch.take().into_iter().chain(self.tasks.drain(..)) {
            task.abort();
        }
        debug!(
            "Screen {} torn down with {} request(s) in flight",
            self.id, pending
        );
    }

    /// Fetches have a slot of their own so that slow mutations never hold
    /// them back. Starting one aborts the fetch it supersedes.
    fn spawn_fetch<F>(&mut self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if let Some(previous) = self.fetch.take() {
            if !previous.is_finished() {
                debug!("Screen {}: superseding unfinished fetch", self.id);
                previous.abort();
            }
        }
        let alive = self.alive.clone();
        self.fetch = Some(tokio::spawn(async move {
            if alive.load(Ordering::Acquire) {
                fut.await;
            }
        }));
    }

    fn spawn<F>(&mut self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(bounded(self.permits.clone(), self.alive.clone(), fut));
        self.tasks.retain(|t| !t.is_finished());
        self.tasks.push(handle);
    }
}

impl Drop for Lifecycle {
    fn drop(&mut self) {
        if self.is_alive() {
            self.teardown();
        }
    }
}

async fn bounded<F>(permits: Arc<Semaphore>, alive: Arc<AtomicBool>, fut: F)
where
    F: Future<Output = ()>,
{
    // Closed semaphores never happen here; treat it like teardown.
    let _permit = match permits.acquire().await {
        Ok(permit) => permit,
        Err(_) => return,
    };
    if alive.load(Ordering::Acquire) {
        fut.await;
    }
}

#[derive(Clone)]
pub struct Dispatcher {
    api: ApiClient,
    tx: Sender<Message>,
    notice_permits: Arc<Semaphore>,
}

impl Dispatcher {
    /// `max_in_flight` bounds the app-level requests started by
    /// [`Dispatcher::notify`]; screen requests are bounded by their
    /// [`Lifecycle`].
    pub fn new(api: ApiClient, tx: Sender<Message>, max_in_flight: usize) -> Dispatcher {
        Dispatcher {
            api,
            tx,
            notice_permits: Arc::new(Semaphore::new(max_in_flight.max(1))),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Loads data for the screen owning `lifecycle` and reports it back
    /// tagged with `generation`. Only the latest fetch per screen runs; an
    /// earlier one still in flight is aborted.
    pub fn fetch<F>(&self, lifecycle: &mut Lifecycle, generation: Generation, request: F)
    where
        F: Future<Output = Outcome> + Send + 'static,
    {
        let report = self.report(lifecycle, generation, request);
        lifecycle.spawn_fetch(report);
    }

    /// Runs `request` for the screen owning `lifecycle` within its in-flight
    /// bound and reports its outcome back tagged with `generation`. Outcomes
    /// for a screen that was torn down in the meantime are dropped.
    pub fn request<F>(&self, lifecycle: &mut Lifecycle, generation: Generation, request: F)
    where
        F: Future<Output = Outcome> + Send + 'static,
    {
        let report = self.report(lifecycle, generation, request);
        lifecycle.spawn(report);
    }

    /// Runs `request` for the screen owning `lifecycle` without reporting
    /// anything back. The future does its own logging.
    pub fn fire<F>(&self, lifecycle: &mut Lifecycle, request: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        lifecycle.spawn(request);
    }

    /// Runs `request` independently of any screen and posts the message it
    /// yields as an app-level notice.
    pub fn notify<F>(&self, request: F)
    where
        F: Future<Output = String> + Send + 'static,
    {
        let tx = self.tx.clone();
        let permits = self.notice_permits.clone();
        tokio::spawn(async move {
            let _permit = match permits.acquire().await {
                Ok(permit) => permit,
                Err(_) => return,
            };
            let notice = request.await;
            if tx.send(Message::Notice(notice)).await.is_err() {
                debug!("Front end gone; dropping notice");
            }
        });
    }

    fn report<F>(
        &self,
        lifecycle: &Lifecycle,
        generation: Generation,
        request: F,
    ) -> impl Future<Output = ()> + Send + 'static
    where
        F: Future<Output = Outcome> + Send + 'static,
    {
        let tx = self.tx.clone();
        let alive = lifecycle.alive.clone();
        let screen = lifecycle.id();
        async move {
            let outcome = request.await;
            if !alive.load(Ordering::Acquire) {
                debug!("Dropping outcome for torn down screen {}", screen);
                return;
            }
            let message = Message::Completed(Completion {
                screen,
                generation,
                outcome,
            });
            if tx.send(message).await.is_err() {
                debug!("Front end gone; dropping outcome for screen {}", screen);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::{mpsc, oneshot};
    use tokio::time::timeout;
    use url::Url;

    fn dispatcher() -> (Dispatcher, mpsc::Receiver<Message>) {
        let (tx, rx) = mpsc::channel(16);
        let api = ApiClient::new(Url::parse("http://127.0.0.1:9").unwrap());
        (Dispatcher::new(api, tx, 1), rx)
    }

    #[tokio::test]
    async fn completion_carries_screen_and_generation() {
        let (dispatcher, mut rx) = dispatcher();
        let mut lifecycle = Lifecycle::new(2);
        dispatcher.request(&mut lifecycle, 7, async { Outcome::Plates(Ok(vec![])) });

        match timeout(Duration::from_secs(5), rx.recv()).await.unwrap() {
            Some(Message::Completed(c)) => {
                assert_eq!(c.screen, lifecycle.id());
                assert_eq!(c.generation, 7);
                assert!(matches!(c.outcome, Outcome::Plates(Ok(ref p)) if p.is_empty()));
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[tokio::test]
    async fn torn_down_screen_gets_nothing() {
        let (dispatcher, mut rx) = dispatcher();
        let mut lifecycle = Lifecycle::new(2);
        let (release, wait) = oneshot::channel::<()>();
        dispatcher.request(&mut lifecycle, 1, async move {
            let _ = wait.await;
            Outcome::Plates(Ok(vec![]))
        });
        lifecycle.teardown();
        let _ = release.send(());

        assert!(!lifecycle.is_alive());
        assert!(timeout(Duration::from_millis(200), rx.recv()).await.is_err());
    }

    #[tokio::test]
    async fn in_flight_requests_are_bounded() {
        let (dispatcher, _rx) = dispatcher();
        let mut lifecycle = Lifecycle::new(1);
        let (release, wait) = oneshot::channel::<()>();
        let (started_tx, mut started_rx) = mpsc::channel::<u8>(4);

        let first = started_tx.clone();
        dispatcher.fire(&mut lifecycle, async move {
            let _ = first.send(1).await;
            let _ = wait.await;
        });
        let second = started_tx.clone();
        dispatcher.fire(&mut lifecycle, async move {
            let _ = second.send(2).await;
        });

        assert_eq!(started_rx.recv().await, Some(1));
        assert!(timeout(Duration::from_millis(200), started_rx.recv())
            .await
            .is_err());
        assert_eq!(lifecycle.pending(), 2);

        let _ = release.send(());
        assert_eq!(started_rx.recv().await, Some(2));
    }

    #[tokio::test]
    async fn notices_outlive_screens() {
        let (dispatcher, mut rx) = dispatcher();
        dispatcher.notify(async { "done".to_string() });
        match rx.recv().await {
            Some(Message::Notice(n)) => assert_eq!(n, "done"),
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[tokio::test]
    async fn fetch_runs_while_mutations_hold_every_permit() {
        let (dispatcher, mut rx) = dispatcher();
        let mut lifecycle = Lifecycle::new(2);
        let (release, wait) = tokio::sync::watch::channel(false);
        for _ in 0..2 {
            let mut wait = wait.clone();
            dispatcher.fire(&mut lifecycle, async move {
                while !*wait.borrow() {
                    if wait.changed().await.is_err() {
                        return;
                    }
                }
            });
        }

        dispatcher.fetch(&mut lifecycle, 3, async { Outcome::Plates(Ok(vec![])) });
        match timeout(Duration::from_secs(5), rx.recv()).await.unwrap() {
            Some(Message::Completed(c)) => assert_eq!(c.generation, 3),
            other => panic!("unexpected message: {:?}", other),
        }
        assert!(lifecycle.pending() >= 2);
        let _ = release.send(true);
    }

    #[tokio::test]
    async fn newer_fetch_aborts_the_one_it_supersedes() {
        let (dispatcher, mut rx) = dispatcher();
        let mut lifecycle = Lifecycle::new(1);
        let (_release, wait) = oneshot::channel::<()>();
        dispatcher.fetch(&mut lifecycle, 1, async move {
            let _ = wait.await;
            Outcome::Plates(Ok(vec![]))
        });
        dispatcher.fetch(&mut lifecycle, 2, async { Outcome::Plates(Ok(vec![])) });

        match timeout(Duration::from_secs(5), rx.recv()).await.unwrap() {
            Some(Message::Completed(c)) => assert_eq!(c.generation, 2),
            other => panic!("unexpected message: {:?}", other),
        }
        assert!(timeout(Duration::from_millis(200), rx.recv()).await.is_err());
    }

    #[tokio::test]
    async fn notices_are_bounded() {
        let (dispatcher, mut rx) = dispatcher();
        let (release, wait) = oneshot::channel::<()>();
        dispatcher.notify(async move {
            let _ = wait.await;
            "first".to_string()
        });
        dispatcher.notify(async { "second".to_string() });

        assert!(timeout(Duration::from_millis(200), rx.recv()).await.is_err());
        let _ = release.send(());
        let mut seen = Vec::new();
        for _ in 0..2 {
            match timeout(Duration::from_secs(5), rx.recv()).await.unwrap() {
                Some(Message::Notice(n)) => seen.push(n),
                other => panic!("unexpected message: {:?}", other),
            }
        }
        assert_eq!(seen, vec!["first", "second"]);
    }
}
