use std::{
    collections::HashMap,
    sync::{atomic::{AtomicBool, Ordering}, Arc, Mutex, PoisonError},
};

use serde::Serialize;

use crate::{Error, ErrorKind, Result};

/// Stage notifications emitted while a run progresses.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Progress {
    LoadingDay { day: u8 },
    DayArea { day: u8, area_km2: f64 },
    DaySkipped { day: u8, kind: ErrorKind, message: String },
    CriticalDay { day: u8, area_km2: f64 },
    Classified { customers: usize, located: usize },
    Aggregated { groups: usize },
}

/// Receiver of [`Progress`] events.
pub type ProgressSink<'a> = &'a dyn Fn(&Progress);

/// Sink that only logs.
pub fn log_progress(event: &Progress) {
    log::debug!("[progress] {event:?}");
}

/// Shared cancellation flag; clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[inline] pub fn cancel(&self) { self.0.store(true, Ordering::SeqCst) }

    #[inline] pub fn is_cancelled(&self) -> bool { self.0.load(Ordering::SeqCst) }

    /// `Err(Cancelled)` once cancellation was requested.
    pub(crate) fn check(&self, advisory: u32) -> Result<()> {
        if self.is_cancelled() { Err(Error::Cancelled(advisory)) } else { Ok(()) }
    }
}

/// In-flight runs keyed by advisory number; at most one run per advisory.
#[derive(Debug, Clone, Default)]
pub struct JobRegistry {
    jobs: Arc<Mutex<HashMap<u32, CancelToken>>>,
}

impl JobRegistry {
    pub fn new() -> Self { Self::default() }

    /// Register a run for `advisory`. The entry is removed when the returned
    /// guard is dropped, whatever the outcome.
    pub fn start(&self, advisory: u32) -> Result<JobGuard> {
        let mut jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        if jobs.contains_key(&advisory) {
            log::warn!("[jobs] advisory {advisory} is already running");
            return Err(Error::AlreadyRunning(advisory));
        }
        let token = CancelToken::default();
        jobs.insert(advisory, token.clone());
        log::info!("[jobs] started advisory {advisory}");
        Ok(JobGuard { registry: self.clone(), advisory, token })
    }

    /// Request cancellation; false if no such run is active.
    pub fn cancel(&self, advisory: u32) -> bool {
        let jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        match jobs.get(&advisory) {
            Some(token) => {
                token.cancel();
                log::info!("[jobs] cancellation requested for advisory {advisory}");
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self, advisory: u32) -> bool {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner).contains_key(&advisory)
    }

    /// Advisories currently running, ascending.
    pub fn running(&self) -> Vec<u32> {
        let mut ids = self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
            .keys().copied().collect::<Vec<_>>();
        ids.sort_unstable();
        ids
    }
}

/// Registration of one running advisory.
#[derive(Debug)]
pub struct JobGuard {
    registry: JobRegistry,
    advisory: u32,
    token: CancelToken,
}

impl JobGuard {
    #[inline] pub fn advisory(&self) -> u32 { self.advisory }

    #[inline] pub fn token(&self) -> &CancelToken { &self.token }
}

impl Drop for JobGuard {
    fn drop(&mut self) {
        self.registry.jobs.lock().unwrap_or_else(PoisonError::into_inner).remove(&self.advisory);
        log::debug!("[jobs] released advisory {}", self.advisory);
    }
}
