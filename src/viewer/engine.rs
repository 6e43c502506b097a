//! MuPDF-backed render engine - owns the worker thread and its channels

use std::sync::{Arc, Mutex};
use std::time::Duration;

use flume::{Receiver, Sender};

use super::cache::PageCache;
use super::request::{EngineRequest, EngineResponse};
use super::session::RenderBackend;
use super::worker::render_worker;

/// Render engine backed by a MuPDF worker thread.
pub struct MupdfEngine {
    request_tx: Sender<EngineRequest>,
    response_rx: Receiver<EngineResponse>,
}

impl MupdfEngine {
    /// Spawn the worker thread with a render cache of `cache_pages` entries
    #[must_use]
    pub fn new(cache_pages: usize) -> Self {
        let cache = Arc::new(Mutex::new(PageCache::new(cache_pages)));

        let (request_tx, request_rx) = flume::unbounded();
        let (response_tx, response_rx) = flume::unbounded();

        std::thread::spawn(move || {
            render_worker(&request_rx, &response_tx, &cache);
        });

        Self {
            request_tx,
            response_rx,
        }
    }

    /// Drain all responses that have arrived so far
    pub fn poll(&self) -> Vec<EngineResponse> {
        let mut responses = vec![];
        while let Ok(response) = self.response_rx.try_recv() {
            responses.push(response);
        }
        responses
    }

    /// Block up to `timeout` for the next response
    #[must_use]
    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineResponse> {
        self.response_rx.recv_timeout(timeout).ok()
    }

    /// Get the response receiver for event-loop integration
    #[must_use]
    pub fn responses(&self) -> &Receiver<EngineResponse> {
        &self.response_rx
    }

    /// Submit handle to hand to a [`super::session::RenderSession`].
    ///
    /// The engine itself stays with the host, which pumps
    /// [`Self::poll`]/[`Self::recv_timeout`] back into the session.
    #[must_use]
    pub fn handle(&self) -> EngineHandle {
        EngineHandle {
            request_tx: self.request_tx.clone(),
        }
    }

    /// Ask the worker to exit
    pub fn shutdown(&self) {
        let _ = self.request_tx.send(EngineRequest::Shutdown);
    }
}

/// Cloneable submission side of a [`MupdfEngine`]
#[derive(Clone)]
pub struct EngineHandle {
    request_tx: Sender<EngineRequest>,
}

impl RenderBackend for EngineHandle {
    fn submit(&mut self, request: EngineRequest) {
        let _ = self.request_tx.send(request);
    }
}

impl Drop for MupdfEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}
