//! Route computation for pursuers, inline or on a background worker thread.
//! This module owns request ids, coalescing and stale-response filtering.
//! It does not decide where pursuers go; see `pursuit` for that.

use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError, unbounded};
use serde::Serialize;

use crate::error::PathError;
use crate::grid::Grid;
use crate::sim::pathfinding::{ensure_in_bounds, find_path};
use crate::types::{AgentId, Cell, PathSignature, RequestId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathRequest {
    pub agent: AgentId,
    pub request: RequestId,
    pub start: Cell,
    pub goal: Cell,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathResponse {
    pub agent: AgentId,
    pub request: RequestId,
    pub path: Vec<Cell>,
}

/// What `request_path` did with a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// Path computed inline and installed immediately.
    Computed,
    /// Sent to the worker; the response will carry this id.
    Dispatched(RequestId),
    /// Identical signature already in flight for this agent; nothing sent.
    Coalesced,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseOutcome {
    Applied,
    Stale,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum PathMode {
    Synchronous,
    #[default]
    Asynchronous,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PathStats {
    pub dispatched: u64,
    pub coalesced: u64,
    pub computed_inline: u64,
    pub applied: u64,
    pub stale: u64,
}

/// Per-agent route cache plus the bookkeeping needed to correlate responses.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PathState {
    waypoints: VecDeque<Cell>,
    in_flight: Option<PathSignature>,
    latest_request: Option<RequestId>,
}

impl PathState {
    pub fn waypoints(&self) -> &VecDeque<Cell> {
        &self.waypoints
    }

    pub fn next_waypoint(&self) -> Option<Cell> {
        self.waypoints.front().copied()
    }

    pub fn pop_waypoint(&mut self) -> Option<Cell> {
        self.waypoints.pop_front()
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn in_flight(&self) -> Option<PathSignature> {
        self.in_flight
    }

    pub fn latest_request(&self) -> Option<RequestId> {
        self.latest_request
    }

    /// Drop the cached route and forget outstanding requests. Any response
    /// still in flight becomes stale.
    pub fn clear(&mut self) {
        self.waypoints.clear();
        self.in_flight = None;
        self.latest_request = None;
    }

    /// Install `response` if it answers the latest request; otherwise leave
    /// the cached route untouched.
    pub fn accept(&mut self, response: &PathResponse) -> ResponseOutcome {
        if self.latest_request != Some(response.request) {
            return ResponseOutcome::Stale;
        }
        self.waypoints = response.path.iter().copied().collect();
        self.in_flight = None;
        ResponseOutcome::Applied
    }

    fn install_inline(&mut self, request: RequestId, path: Vec<Cell>) {
        self.waypoints = path.into();
        self.in_flight = None;
        self.latest_request = Some(request);
    }

    fn mark_dispatched(&mut self, request: RequestId, signature: PathSignature) {
        self.in_flight = Some(signature);
        self.latest_request = Some(request);
    }
}

enum WorkerMsg {
    Path(PathRequest),
    Shutdown,
}

/// Background thread running [`find_path`] over a shared read-only grid.
struct PathWorker {
    requests: Sender<WorkerMsg>,
    responses: Receiver<PathResponse>,
    handle: Option<JoinHandle<()>>,
}

impl PathWorker {
    fn spawn(grid: Arc<Grid>) -> io::Result<Self> {
        let (request_tx, request_rx) = unbounded::<WorkerMsg>();
        let (response_tx, response_rx) = unbounded::<PathResponse>();
        let handle = thread::Builder::new().name("path-worker".into()).spawn(move || {
            while let Ok(WorkerMsg::Path(request)) = request_rx.recv() {
                let path = find_path(&grid, request.start, request.goal);
                let response =
                    PathResponse { agent: request.agent, request: request.request, path };
                if response_tx.send(response).is_err() {
                    break;
                }
            }
        })?;
        Ok(Self { requests: request_tx, responses: response_rx, handle: Some(handle) })
    }

    fn stop(&mut self) {
        let _ = self.requests.send(WorkerMsg::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for PathWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

pub struct PathService {
    grid: Arc<Grid>,
    worker: Option<PathWorker>,
    next_request: RequestId,
    stats: PathStats,
}

impl PathService {
    pub fn synchronous(grid: Arc<Grid>) -> Self {
        Self { grid, worker: None, next_request: 0, stats: PathStats::default() }
    }

    /// Start a background worker. Falls back to inline search if the thread
    /// cannot be spawned.
    pub fn asynchronous(grid: Arc<Grid>) -> Self {
        let worker = match PathWorker::spawn(Arc::clone(&grid)) {
            Ok(worker) => Some(worker),
            Err(err) => {
                tracing::warn!(error = %err, "path worker unavailable; using inline search");
                None
            }
        };
        Self { grid, worker, next_request: 0, stats: PathStats::default() }
    }

    pub fn new(grid: Arc<Grid>, mode: PathMode) -> Self {
        match mode {
            PathMode::Synchronous => Self::synchronous(grid),
            PathMode::Asynchronous => Self::asynchronous(grid),
        }
    }

    pub fn mode(&self) -> PathMode {
        if self.worker.is_some() { PathMode::Asynchronous } else { PathMode::Synchronous }
    }

    pub fn grid(&self) -> &Arc<Grid> {
        &self.grid
    }

    pub fn stats(&self) -> PathStats {
        self.stats
    }

    /// Ask for a route from `start` to `goal` on behalf of `agent`.
    ///
    /// Every non-coalesced request takes a fresh id, so a late response to an
    /// earlier request is always recognised as stale.
    pub fn request_path(
        &mut self,
        agent: AgentId,
        state: &mut PathState,
        start: Cell,
        goal: Cell,
    ) -> Result<Dispatch, PathError> {
        ensure_in_bounds(&self.grid, start)?;
        ensure_in_bounds(&self.grid, goal)?;
        let signature = PathSignature { start, goal };

        if let Some(worker) = &self.worker {
            if state.in_flight == Some(signature) {
                self.stats.coalesced += 1;
                tracing::debug!(agent = agent.0, ?start, ?goal, "coalesced path request");
                return Ok(Dispatch::Coalesced);
            }
            self.next_request += 1;
            let request = self.next_request;
            let message = WorkerMsg::Path(PathRequest { agent, request, start, goal });
            if worker.requests.send(message).is_ok() {
                state.mark_dispatched(request, signature);
                self.stats.dispatched += 1;
                tracing::debug!(agent = agent.0, request, ?start, ?goal, "dispatched path request");
                return Ok(Dispatch::Dispatched(request));
            }
            self.degrade("path worker stopped accepting requests");
        }

        let request = self.next_id();
        state.install_inline(request, find_path(&self.grid, start, goal));
        self.stats.computed_inline += 1;
        Ok(Dispatch::Computed)
    }

    /// Drain every response that has arrived, in arrival order, without blocking.
    pub fn poll_responses(&mut self) -> Vec<PathResponse> {
        let mut out = Vec::new();
        let Some(worker) = &self.worker else {
            return out;
        };
        loop {
            match worker.responses.try_recv() {
                Ok(response) => out.push(response),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.degrade("path worker disconnected");
                    break;
                }
            }
        }
        out
    }

    /// Block up to `timeout` for the next response. Used by headless drivers
    /// and tests that need the worker to catch up.
    pub fn wait_response(&mut self, timeout: Duration) -> Option<PathResponse> {
        let worker = self.worker.as_ref()?;
        match worker.responses.recv_timeout(timeout) {
            Ok(response) => Some(response),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                self.degrade("path worker disconnected");
                None
            }
        }
    }

    /// Route a response to its agent's state and record the outcome.
    pub fn deliver(&mut self, response: &PathResponse, state: &mut PathState) -> ResponseOutcome {
        let outcome = state.accept(response);
        match outcome {
            ResponseOutcome::Applied => self.stats.applied += 1,
            ResponseOutcome::Stale => {
                self.stats.stale += 1;
                tracing::trace!(
                    agent = response.agent.0,
                    request = response.request,
                    "stale path response"
                );
            }
        }
        outcome
    }

    /// Count a response whose agent no longer exists.
    pub fn discard(&mut self, response: &PathResponse) {
        self.stats.stale += 1;
        tracing::trace!(
            agent = response.agent.0,
            request = response.request,
            "orphaned path response"
        );
    }

    /// Switch to inline search for the rest of the session.
    pub fn degrade(&mut self, reason: &str) {
        if let Some(mut worker) = self.worker.take() {
            tracing::warn!(reason, "path worker lost; falling back to inline search");
            worker.stop();
        }
    }

    fn next_id(&mut self) -> RequestId {
        self.next_request += 1;
        self.next_request
    }
}
