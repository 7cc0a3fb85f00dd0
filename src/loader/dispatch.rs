use super::{LoadError, TextLoader, Verse};
use crate::render::RenderTarget;
use crate::state::Position;
use crate::version::VersionCode;
use log::{debug, warn};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

/// Monotonic tag identifying one issued load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoadTicket(pub u64);

/// A chapter load tagged with the target it was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub ticket: LoadTicket,
    pub target: RenderTarget,
    pub position: Position,
    pub version: VersionCode,
}

#[derive(Debug)]
pub struct LoadCompletion {
    pub request: LoadRequest,
    pub result: Result<Vec<Verse>, LoadError>,
}

impl LoadCompletion {
    pub fn run(loader: &dyn TextLoader, request: LoadRequest) -> Self {
        let result = loader.chapter_verses(
            request.position.book,
            request.position.chapter,
            &request.version,
        );
        Self { request, result }
    }
}

/// Executes load requests. Completions may come back in any order; the caller
/// is responsible for discarding stale ones.
pub trait LoadDispatcher {
    fn dispatch(&mut self, request: LoadRequest);

    /// Takes every completion that has arrived since the last call.
    fn drain(&mut self) -> Vec<LoadCompletion>;
}

/// Runs each load immediately on the calling thread and holds the result
/// until the next drain.
pub struct InlineDispatcher {
    loader: Arc<dyn TextLoader>,
    completed: Vec<LoadCompletion>,
}

impl InlineDispatcher {
    pub fn new(loader: Arc<dyn TextLoader>) -> Self {
        Self {
            loader,
            completed: Vec::new(),
        }
    }
}

impl LoadDispatcher for InlineDispatcher {
    fn dispatch(&mut self, request: LoadRequest) {
        self.completed
            .push(LoadCompletion::run(self.loader.as_ref(), request));
    }

    fn drain(&mut self) -> Vec<LoadCompletion> {
        std::mem::take(&mut self.completed)
    }
}

/// Runs loads on a worker thread; results are polled from the UI tick.
pub struct BackgroundDispatcher {
    requests: Option<Sender<LoadRequest>>,
    completions: Receiver<LoadCompletion>,
    worker: Option<JoinHandle<()>>,
}

impl BackgroundDispatcher {
    pub fn new(loader: Arc<dyn TextLoader>) -> Self {
        let (request_tx, request_rx) = mpsc::channel::<LoadRequest>();
        let (completion_tx, completion_rx) = mpsc::channel::<LoadCompletion>();

        let worker = thread::Builder::new()
            .name("chapter-loader".to_string())
            .spawn(move || {
                for request in request_rx {
                    debug!(
                        "Loading {} ({}) for {}",
                        request.position,
                        request.version,
                        request.target.label()
                    );
                    let completion = LoadCompletion::run(loader.as_ref(), request);
                    if completion_tx.send(completion).is_err() {
                        break;
                    }
                }
            });

        let worker = match worker {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!("Failed to spawn chapter loader thread: {e}");
                None
            }
        };

        Self {
            requests: Some(request_tx),
            completions: completion_rx,
            worker,
        }
    }
}

impl LoadDispatcher for BackgroundDispatcher {
    fn dispatch(&mut self, request: LoadRequest) {
        let Some(sender) = self.requests.as_ref() else {
            return;
        };
        if let Err(e) = sender.send(request) {
            warn!("Chapter loader is gone, dropping {:?}", e.0.ticket);
        }
    }

    fn drain(&mut self) -> Vec<LoadCompletion> {
        let mut completed = Vec::new();
        loop {
            match self.completions.try_recv() {
                Ok(completion) => completed.push(completion),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    debug!("Chapter loader disconnected");
                    break;
                }
            }
        }
        completed
    }
}

impl Drop for BackgroundDispatcher {
    fn drop(&mut self) {
        // Closing the request channel ends the worker loop.
        self.requests.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::PanelId;
    use crate::test_utils::FakeLoader;
    use std::time::{Duration, Instant};

    fn request(ticket: u64, chapter: u16) -> LoadRequest {
        LoadRequest {
            ticket: LoadTicket(ticket),
            target: RenderTarget::Panel(PanelId::Left),
            position: Position::new(43, chapter),
            version: VersionCode::new("kjv"),
        }
    }

    #[test]
    fn test_inline_dispatcher_holds_results_until_drain() {
        let mut dispatcher = InlineDispatcher::new(Arc::new(FakeLoader::new()));
        dispatcher.dispatch(request(1, 3));
        dispatcher.dispatch(request(2, 4));

        let completed = dispatcher.drain();
        assert_eq!(completed.len(), 2);
        assert_eq!(completed[0].request.ticket, LoadTicket(1));
        assert!(completed[1].result.is_ok());
        assert!(dispatcher.drain().is_empty());
    }

    #[test]
    fn test_background_dispatcher_delivers_completions() {
        let mut dispatcher = BackgroundDispatcher::new(Arc::new(FakeLoader::new()));
        dispatcher.dispatch(request(7, 3));

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut completed = Vec::new();
        while completed.is_empty() && Instant::now() < deadline {
            completed = dispatcher.drain();
            thread::sleep(Duration::from_millis(5));
        }

        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].request.ticket, LoadTicket(7));
        let verses = completed[0].result.as_ref().unwrap();
        assert_eq!(verses[0].chapter, 3);
    }
}
