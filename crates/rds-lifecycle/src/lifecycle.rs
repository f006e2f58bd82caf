// lifecycle.rs — Scheduling, bounded retry, and health reporting.
//
// One background task fires ticks at a fixed rate starting immediately. Each
// tick runs one cycle:
//
//   acquire sink ── fetch ──ok──────────────────────────── commit ── READY
//                    │                                       │
//                    └─err── WARNING, pause, acquire, fetch ─┤
//                                                  │         └─err── FAULTY
//                                                  └─err── FAULTY (no commit)
//
// Cycles never overlap: the scheduler awaits each cycle before computing the
// next tick, and the cycle body holds the persister lock for its whole run,
// so even a restarted schedule queues behind a cycle still in flight. If a
// cycle overruns the interval, the next one starts as soon as it finishes.
//
// Every cycle runs in its own task. A panic in a collaborator kills only that
// task; the scheduler sees the JoinError, reports FAULTY, and keeps ticking.
// Persister calls that touch the filesystem run on the blocking pool with the
// lock guard moved along.

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use rds_fetcher::{EnvelopeFetcher, FetchError};
use rds_persister::{PersistError, Persister};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use crate::clock::Clock;
use crate::config::{LifecycleConfig, MAX_INTERVAL};
use crate::error::LifecycleError;
use crate::health::{HealthState, StatePushFacet};

/// Name the lifecycle registers its facet under.
pub const COMPONENT_NAME: &str = "RdsDataDownloader";

/// Fetch attempts per cycle: the first try plus exactly one retry.
pub const FETCH_ATTEMPTS: u32 = 2;

/// Why a cycle ended without publishing.
enum CycleFailure {
    /// Both fetch attempts failed; carries the last error.
    Fetch(FetchError),
    /// Staging or publishing failed; never retried.
    Persist(PersistError),
}

/// Everything one cycle needs. Shared between the scheduler task and
/// `run_once` callers.
struct CycleRunner {
    fetcher: Arc<dyn EnvelopeFetcher>,
    persister: Arc<Mutex<Persister>>,
    facet: Arc<dyn StatePushFacet>,
    clock: Arc<dyn Clock>,
    retry_pause: Duration,
}

impl CycleRunner {
    async fn run_cycle(&self) -> HealthState {
        let cycle_id = Uuid::new_v4();
        let span = tracing::info_span!("download_cycle", %cycle_id);

        async {
            tracing::info!("Starting data fetch run");
            let persister = Arc::clone(&self.persister).lock_owned().await;

            let (persister, fetched) = self.fetch_with_retry(persister).await;
            let state = match fetched {
                Ok(entries) => match with_persister(persister, Persister::commit).await.1 {
                    Ok(()) => {
                        tracing::info!(entries, "RDS data published");
                        HealthState::Ready
                    }
                    Err(e) => persistence_fault(&e),
                },
                Err(CycleFailure::Fetch(e)) => {
                    let msg = "Fetching RDS data failed two times in a row";
                    tracing::error!(kind = e.kind().as_str(), error = %e, "{}", msg);
                    HealthState::faulty(format!("{}: {}", msg, e))
                }
                Err(CycleFailure::Persist(e)) => persistence_fault(&e),
            };

            self.facet.set_state(state.clone());
            state
        }
        .instrument(span)
        .await
    }

    /// Fill a fresh sink, retrying once after the pause. Each attempt gets a
    /// newly acquired sink, which truncates whatever the previous one wrote.
    async fn fetch_with_retry(
        &self,
        mut persister: OwnedMutexGuard<Persister>,
    ) -> (OwnedMutexGuard<Persister>, Result<usize, CycleFailure>) {
        let mut attempt = 1;
        loop {
            let (guard, acquired) =
                with_persister(persister, |p| p.acquire_sink().map(|_| ())).await;
            persister = guard;
            if let Err(e) = acquired {
                return (persister, Err(CycleFailure::Persist(e)));
            }
            let Some(sink) = persister.sink_mut() else {
                return (persister, Err(CycleFailure::Persist(PersistError::NoSink)));
            };

            match self.fetcher.fetch_into(sink).await {
                Ok(entries) => return (persister, Ok(entries)),
                Err(e) if attempt < FETCH_ATTEMPTS => {
                    let msg = format!(
                        "Fetching RDS data failed. Will retry in {} seconds",
                        self.retry_pause.as_secs()
                    );
                    tracing::warn!(attempt, kind = e.kind().as_str(), error = %e, "{}", msg);
                    self.facet
                        .set_state(HealthState::warning(format!("{}: {}", msg, e)));
                    self.clock.sleep(self.retry_pause).await;
                    attempt += 1;
                }
                Err(e) => return (persister, Err(CycleFailure::Fetch(e))),
            }
        }
    }
}

/// Run `op` on the blocking pool with the locked persister and hand the lock
/// back. A panic inside `op` is resumed in the calling task.
async fn with_persister<T, F>(
    guard: OwnedMutexGuard<Persister>,
    op: F,
) -> (OwnedMutexGuard<Persister>, T)
where
    F: FnOnce(&mut Persister) -> T + Send + 'static,
    T: Send + 'static,
{
    let task = tokio::task::spawn_blocking(move || {
        let mut guard = guard;
        let out = op(&mut guard);
        (guard, out)
    });
    match task.await {
        Ok(done) => done,
        Err(e) => match e.try_into_panic() {
            Ok(payload) => std::panic::resume_unwind(payload),
            Err(e) => std::panic::resume_unwind(Box::new(e.to_string())),
        },
    }
}

/// Next tick after `tick`. Intervals are capped at [`MAX_INTERVAL`] when
/// built, so the fallbacks only guard the clock's own range.
fn advance(tick: Instant, interval: Duration) -> Instant {
    tick.checked_add(interval)
        .or_else(|| tick.checked_add(MAX_INTERVAL))
        .unwrap_or(tick)
}

fn persistence_fault(e: &PersistError) -> HealthState {
    let msg = "Downloading/Persisting data failed";
    tracing::error!(error = %e, "{}", msg);
    HealthState::faulty(format!("{}: {}", msg, e))
}

/// Run one cycle in its own task and turn a crash of that task into FAULTY.
async fn run_guarded(runner: &Arc<CycleRunner>) -> HealthState {
    let task = tokio::spawn({
        let runner = Arc::clone(runner);
        async move { runner.run_cycle().await }
    });

    match task.await {
        Ok(state) => state,
        Err(e) => {
            let msg = "Downloading/Persisting data failed";
            let detail = describe_join_error(e);
            tracing::error!(error = %detail, "{}", msg);
            let state = HealthState::faulty(format!("{}: {}", msg, detail));
            runner.facet.set_state(state.clone());
            state
        }
    }
}

fn describe_join_error(e: JoinError) -> String {
    if e.is_cancelled() {
        return "download cycle was cancelled".to_string();
    }
    let payload: Box<dyn Any + Send> = e.into_panic();
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("panic: {}", msg)
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("panic: {}", msg)
    } else {
        "panic in download cycle".to_string()
    }
}

/// Fixed-rate, non-overlapping tick loop. Exits at the first tick boundary
/// after `shutdown` is cancelled; a cycle already running is finished first.
async fn run_schedule(
    runner: Arc<CycleRunner>,
    interval: Duration,
    shutdown: CancellationToken,
) {
    let clock = Arc::clone(&runner.clock);
    let mut next_tick = clock.now();

    loop {
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                tracing::info!("RDS data download schedule stopped");
                break;
            }

            _ = clock.sleep_until(next_tick) => {
                run_guarded(&runner).await;
            }
        }

        next_tick = advance(next_tick, interval);
        let now = clock.now();
        if next_tick < now {
            tracing::warn!(
                overrun_ms = (now - next_tick).as_millis() as u64,
                "download cycle overran its interval"
            );
            next_tick = now;
        }
    }
}

struct Schedule {
    shutdown: CancellationToken,
    handle: JoinHandle<()>,
}

/// Periodic fetch-and-publish of RDS data.
///
/// The lifecycle is created stopped; [`Lifecycle::start`] begins ticking.
pub struct Lifecycle {
    runner: Arc<CycleRunner>,
    interval: Duration,
    schedule: Option<Schedule>,
}

impl Lifecycle {
    /// Build a stopped lifecycle. Fails on a zero interval.
    pub fn new(
        config: &LifecycleConfig,
        fetcher: Arc<dyn EnvelopeFetcher>,
        persister: Persister,
        facet: Arc<dyn StatePushFacet>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, LifecycleError> {
        let interval = config.interval_duration()?;
        Ok(Self {
            runner: Arc::new(CycleRunner {
                fetcher,
                persister: Arc::new(Mutex::new(persister)),
                facet,
                clock,
                retry_pause: config.retry_pause(),
            }),
            interval,
            schedule: None,
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn retry_pause(&self) -> Duration {
        self.runner.retry_pause
    }

    /// Whether a schedule is live (started and not stopped).
    pub fn is_running(&self) -> bool {
        self.schedule.is_some()
    }

    /// Run a single cycle now and return the state it reported.
    ///
    /// Waits for any cycle already in flight to finish first.
    pub async fn run_once(&self) -> HealthState {
        run_guarded(&self.runner).await
    }

    /// Start ticking. The first cycle runs immediately.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&mut self) -> Result<(), LifecycleError> {
        if self.schedule.is_some() {
            return Err(LifecycleError::AlreadyStarted);
        }

        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(run_schedule(
            Arc::clone(&self.runner),
            self.interval,
            shutdown.clone(),
        ));
        self.schedule = Some(Schedule { shutdown, handle });

        tracing::info!(
            interval_ms = self.interval.as_millis() as u64,
            retry_pause_secs = self.runner.retry_pause.as_secs(),
            "Scheduled RDS data downloads"
        );
        Ok(())
    }

    /// Stop scheduling further cycles.
    ///
    /// A cycle already in flight runs to completion; this does not wait for
    /// it. Returns whether a schedule was running.
    pub fn stop(&mut self) -> bool {
        match self.schedule.take() {
            Some(schedule) => {
                schedule.shutdown.cancel();
                true
            }
            None => false,
        }
    }

    /// Stop scheduling and wait for an in-flight cycle to finish.
    pub async fn shutdown(&mut self) {
        if let Some(schedule) = self.schedule.take() {
            schedule.shutdown.cancel();
            if let Err(e) = schedule.handle.await {
                tracing::warn!(error = %e, "download schedule ended abnormally");
            }
        }
    }
}

impl Drop for Lifecycle {
    fn drop(&mut self) {
        self.stop();
    }
}
