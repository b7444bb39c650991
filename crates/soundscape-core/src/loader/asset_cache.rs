//! Path-keyed sound asset cache with a background decode pool
//!
//! The interaction thread asks for sounds by path; decoding happens on a small
//! fixed pool of worker threads so placing a node never stalls the tick.
//!
//! ```text
//! ┌──────────────────┐  request_load()  ┌─────────────────┐   path    ┌──────────────┐
//! │ Interaction loop │ ───────────────► │ SoundAssetCache │ ────────► │ asset-loader │ x N
//! │   (tick ~60Hz)   │ ◄─────────────── │ (Mutex<state>)  │ ◄──────── │   workers    │
//! └──────────────────┘  Some(asset)     └─────────────────┘  result   └──────────────┘
//! ```
//!
//! Workers never touch the cache state. They push `(path, result)` into a
//! channel that is merged under the state lock by the next `request_load`,
//! `status` or `poll` call.

use std::collections::{HashMap, HashSet};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};

use crate::audio_file::{AssetLoadError, DecodedSound, SoundAsset, SoundDecoder, SymphoniaDecoder};

/// Smallest worker pool the cache will run with
pub const MIN_LOADER_WORKERS: usize = 2;

type LoadResult = (String, Result<DecodedSound, AssetLoadError>);

/// What the cache currently knows about a path
#[derive(Debug, Clone)]
pub enum AssetStatus {
    /// Never requested (or evicted)
    Unknown,
    /// A worker is decoding it
    Pending,
    /// Decoded and cached
    Ready(SoundAsset),
    /// Decoding failed; the cache will not retry on its own
    Failed(AssetLoadError),
}

impl AssetStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, AssetStatus::Pending)
    }
}

/// Completion notification for a path
///
/// Each finished load produces exactly one of these, returned by [`SoundAssetCache::poll`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetResolved {
    pub path: String,
    pub success: bool,
}

#[derive(Default)]
struct CacheState {
    ready: HashMap<String, SoundAsset>,
    failed: HashMap<String, AssetLoadError>,
    in_flight: HashSet<String>,
    resolved: Vec<AssetResolved>,
}

impl CacheState {
    fn merge(&mut self, path: String, result: Result<DecodedSound, AssetLoadError>) {
        self.in_flight.remove(&path);

        match result {
            Ok(sound) => {
                if self.ready.contains_key(&path) {
                    // Already resolved by a blocking load while the job was queued
                    return;
                }
                log::info!("[ASSET_CACHE] Loaded {}", path);
                self.failed.remove(&path);
                self.ready.insert(path.clone(), Arc::new(sound));
                self.resolved.push(AssetResolved { path, success: true });
            }
            Err(e) => {
                if self.ready.contains_key(&path) {
                    return;
                }
                log::warn!("[ASSET_CACHE] Failed to load {}: {}", path, e);
                self.failed.insert(path.clone(), e);
                self.resolved.push(AssetResolved { path, success: false });
            }
        }
    }
}

/// Deduplicating, asynchronous sound loader
///
/// Shared between the interaction thread and the worker pool, so it is
/// `Send + Sync` and is normally held in an `Arc`.
pub struct SoundAssetCache {
    state: Mutex<CacheState>,
    decoder: Arc<dyn SoundDecoder>,
    job_tx: Option<Sender<String>>,
    result_rx: Receiver<LoadResult>,
    workers: Vec<JoinHandle<()>>,
    jobs_submitted: AtomicUsize,
}

impl SoundAssetCache {
    /// Create a cache decoding with symphonia on `workers` threads (at least 2)
    pub fn new(workers: usize) -> Self {
        Self::with_decoder(Arc::new(SymphoniaDecoder), workers)
    }

    /// Create a cache with a custom decoder
    pub fn with_decoder(decoder: Arc<dyn SoundDecoder>, workers: usize) -> Self {
        let worker_count = workers.max(MIN_LOADER_WORKERS);
        let (job_tx, job_rx) = channel::unbounded::<String>();
        let (result_tx, result_rx) = channel::unbounded::<LoadResult>();

        let mut handles = Vec::with_capacity(worker_count);
        for i in 0..worker_count {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            let decoder = decoder.clone();

            let spawned = thread::Builder::new()
                .name(format!("asset-loader-{}", i))
                .spawn(move || loader_worker(job_rx, result_tx, decoder));

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => log::error!("[ASSET_CACHE] Failed to spawn loader worker {}: {}", i, e),
            }
        }

        // Without workers queued jobs would never finish; fail requests instead
        let job_tx = if handles.is_empty() { None } else { Some(job_tx) };

        log::info!("[ASSET_CACHE] Started with {} loader workers", handles.len());

        Self {
            state: Mutex::new(CacheState::default()),
            decoder,
            job_tx,
            result_rx,
            workers: handles,
            jobs_submitted: AtomicUsize::new(0),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, CacheState> {
        let mut state = self.state.lock().unwrap_or_else(|p| p.into_inner());
        while let Ok((path, result)) = self.result_rx.try_recv() {
            state.merge(path, result);
        }
        state
    }

    /// Ask for a sound without blocking
    ///
    /// Returns the cached asset if the path is resolved. Otherwise returns
    /// `None`, queueing a decode job only if none is in flight and the path
    /// hasn't already failed.
    pub fn request_load(&self, path: &str) -> Option<SoundAsset> {
        let mut state = self.lock_state();

        if let Some(asset) = state.ready.get(path) {
            log::trace!("[ASSET_CACHE] Cache hit for {}", path);
            return Some(asset.clone());
        }
        if state.in_flight.contains(path) || state.failed.contains_key(path) {
            return None;
        }

        let queued = self
            .job_tx
            .as_ref()
            .map(|tx| tx.send(path.to_string()).is_ok())
            .unwrap_or(false);

        if queued {
            log::debug!("[ASSET_CACHE] Cache miss, queued decode for {}", path);
            state.in_flight.insert(path.to_string());
            self.jobs_submitted.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!("[ASSET_CACHE] No loader worker available for {}", path);
            state.merge(path.to_string(), Err(AssetLoadError::WorkerUnavailable));
        }
        None
    }

    /// Decode on the calling thread and memoize the result
    ///
    /// Meant for paths already known to be good, e.g. nodes restored from a
    /// saved map. Unlike `request_load` this retries paths that failed before.
    pub fn load_blocking(&self, path: &str) -> Result<SoundAsset, AssetLoadError> {
        if let Some(asset) = self.lock_state().ready.get(path) {
            return Ok(asset.clone());
        }

        // Decode without holding the lock so workers' results keep flowing
        let result = decode_guarded(self.decoder.as_ref(), path);

        let mut state = self.lock_state();
        let was_in_flight = state.in_flight.contains(path);
        state.merge(path.to_string(), result);
        if was_in_flight {
            // The queued job is still running; let its result be merged as a no-op
            state.in_flight.insert(path.to_string());
        }

        match state.ready.get(path) {
            Some(asset) => Ok(asset.clone()),
            None => Err(state
                .failed
                .get(path)
                .cloned()
                .unwrap_or(AssetLoadError::WorkerUnavailable)),
        }
    }

    /// Current state of a path
    pub fn status(&self, path: &str) -> AssetStatus {
        let state = self.lock_state();
        if let Some(asset) = state.ready.get(path) {
            AssetStatus::Ready(asset.clone())
        } else if let Some(err) = state.failed.get(path) {
            AssetStatus::Failed(err.clone())
        } else if state.in_flight.contains(path) {
            AssetStatus::Pending
        } else {
            AssetStatus::Unknown
        }
    }

    /// Drain completion notifications produced since the last poll
    pub fn poll(&self) -> Vec<AssetResolved> {
        std::mem::take(&mut self.lock_state().resolved)
    }

    /// Forget a path so the next request decodes it again
    ///
    /// In-flight jobs can't be cancelled; their result is still cached when it lands.
    pub fn evict(&self, path: &str) {
        let mut state = self.lock_state();
        let removed = state.ready.remove(path).is_some() | state.failed.remove(path).is_some();
        if removed {
            log::info!("[ASSET_CACHE] Evicted {}", path);
        }
    }

    /// Number of loads still running
    pub fn in_flight_count(&self) -> usize {
        self.lock_state().in_flight.len()
    }

    /// Total decode jobs handed to the worker pool
    pub fn jobs_submitted(&self) -> usize {
        self.jobs_submitted.load(Ordering::Relaxed)
    }

    /// Number of running loader workers
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Block until every in-flight load has finished or `timeout` elapses
    ///
    /// For tools and tests only; the interaction loop must keep polling instead.
    /// Returns `true` if the cache went idle.
    pub fn wait_until_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if self.lock_state().in_flight.is_empty() {
                return true;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.result_rx.recv_timeout(remaining) {
                Ok((path, result)) => {
                    let mut state = self.state.lock().unwrap_or_else(|p| p.into_inner());
                    state.merge(path, result);
                }
                Err(RecvTimeoutError::Timeout) => return false,
                Err(RecvTimeoutError::Disconnected) => return self.lock_state().in_flight.is_empty(),
            }
        }
    }
}

impl Drop for SoundAssetCache {
    fn drop(&mut self) {
        // Closing the job channel ends each worker's recv loop
        self.job_tx.take();
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                log::error!("[ASSET_CACHE] Loader worker panicked during shutdown");
            }
        }
        log::debug!("[ASSET_CACHE] Loader workers stopped");
    }
}

fn decode_guarded(decoder: &dyn SoundDecoder, path: &str) -> Result<DecodedSound, AssetLoadError> {
    match panic::catch_unwind(AssertUnwindSafe(|| decoder.decode(path))) {
        Ok(result) => result,
        Err(_) => Err(AssetLoadError::Decode {
            path: path.to_string(),
            reason: "decoder panicked".to_string(),
        }),
    }
}

fn loader_worker(job_rx: Receiver<String>, result_tx: Sender<LoadResult>, decoder: Arc<dyn SoundDecoder>) {
    while let Ok(path) = job_rx.recv() {
        let result = decode_guarded(decoder.as_ref(), &path);
        if result_tx.send((path, result)).is_err() {
            break;
        }
    }
}
