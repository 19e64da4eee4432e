//! Session expiry monitor
//!
//! Polls a [`StatusSource`] while the user is inside the protected part of
//! the application and publishes whether the session is about to expire.
//! Polling tightens from every 30 seconds to every 5 seconds once less than
//! ten minutes remain, and stops once the session is gone.
//!
//! One query is in flight at a time: the next poll is only scheduled after
//! the previous one has resolved, and leaving the protected context (or
//! dropping the monitor) cancels whatever is pending.

use std::sync::{
    Arc, Mutex, PoisonError,
    atomic::{AtomicU64, Ordering},
};
use std::time::Duration;

use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
    time::sleep,
};
use tracing::{debug, info, warn};

use crate::{source::StatusSource, status::SessionStatus};

/// Warning threshold: a session with this much time left or less is expiring
pub const WARNING_THRESHOLD: Duration = Duration::from_millis(600_000);
/// Cadence while far from expiry
pub const NORMAL_INTERVAL: Duration = Duration::from_millis(30_000);
/// Cadence inside the warning threshold
pub const URGENT_INTERVAL: Duration = Duration::from_millis(5_000);

/// Monitor timing configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    pub normal_interval: Duration,
    pub urgent_interval: Duration,
    pub warning_threshold: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            normal_interval: NORMAL_INTERVAL,
            urgent_interval: URGENT_INTERVAL,
            warning_threshold: WARNING_THRESHOLD,
        }
    }
}

impl MonitorConfig {
    /// Create a new MonitorConfig from environment variables
    ///
    /// # Environment Variables
    /// - `SESSION_POLL_NORMAL_MS`: cadence far from expiry (default: 30000)
    /// - `SESSION_POLL_URGENT_MS`: cadence near expiry (default: 5000)
    /// - `SESSION_WARNING_THRESHOLD_MS`: warning threshold (default: 600000)
    ///
    /// Zero or unparseable values fall back to the default.
    pub fn from_env() -> Self {
        Self {
            normal_interval: env_millis("SESSION_POLL_NORMAL_MS", NORMAL_INTERVAL),
            urgent_interval: env_millis("SESSION_POLL_URGENT_MS", URGENT_INTERVAL),
            warning_threshold: env_millis("SESSION_WARNING_THRESHOLD_MS", WARNING_THRESHOLD),
        }
    }

    fn threshold_ms(&self) -> i64 {
        i64::try_from(self.warning_threshold.as_millis()).unwrap_or(i64::MAX)
    }
}

fn env_millis(name: &str, default: Duration) -> Duration {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
        .unwrap_or(default)
}

/// Where the monitor is in its polling cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonitorPhase {
    /// Not polling
    #[default]
    Idle,
    PollingNormal,
    PollingUrgent,
}

/// What the expiration notifier consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExpiryUpdate {
    pub is_expiring: bool,
    pub time_left_ms: i64,
}

impl ExpiryUpdate {
    /// Published when the session is gone or its state is unknown
    pub const CLEAR: ExpiryUpdate = ExpiryUpdate {
        is_expiring: false,
        time_left_ms: 0,
    };
}

/// Latest state published by the monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MonitorReport {
    pub phase: MonitorPhase,
    pub update: ExpiryUpdate,
    /// Number of completed status queries
    pub polls: u64,
}

/// Decision taken after one status query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub phase: MonitorPhase,
    pub update: ExpiryUpdate,
    /// Delay before the next query, `None` to stop polling
    pub next_poll: Option<Duration>,
}

impl Evaluation {
    /// A failed query: nothing to show, try again at the normal cadence
    pub fn failed(config: &MonitorConfig) -> Self {
        Evaluation {
            phase: MonitorPhase::PollingNormal,
            update: ExpiryUpdate::CLEAR,
            next_poll: Some(config.normal_interval),
        }
    }
}

/// Decide phase, published update and next poll for one status answer.
pub fn evaluate(status: &SessionStatus, config: &MonitorConfig) -> Evaluation {
    if !status.authenticated || status.time_left_ms <= 0 {
        return Evaluation {
            phase: MonitorPhase::Idle,
            update: ExpiryUpdate::CLEAR,
            next_poll: None,
        };
    }

    if status.time_left_ms <= config.threshold_ms() {
        Evaluation {
            phase: MonitorPhase::PollingUrgent,
            update: ExpiryUpdate {
                is_expiring: true,
                time_left_ms: status.time_left_ms,
            },
            next_poll: Some(config.urgent_interval),
        }
    } else {
        Evaluation {
            phase: MonitorPhase::PollingNormal,
            update: ExpiryUpdate {
                is_expiring: false,
                time_left_ms: status.time_left_ms,
            },
            next_poll: Some(config.normal_interval),
        }
    }
}

/// Latest report plus ordered per-subscriber streams
struct Reports {
    latest: watch::Sender<MonitorReport>,
    streams: Mutex<Vec<mpsc::UnboundedSender<MonitorReport>>>,
}

impl Reports {
    fn new() -> Self {
        let (latest, _) = watch::channel(MonitorReport::default());
        Self {
            latest,
            streams: Mutex::new(Vec::new()),
        }
    }

    fn stream(&self) -> mpsc::UnboundedReceiver<MonitorReport> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.streams
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    /// Apply `modify` and, when it returns true, publish the result to
    /// every subscriber. Streams see reports in publication order.
    fn publish_if(&self, modify: impl FnOnce(&mut MonitorReport) -> bool) -> bool {
        let mut streams = self.streams.lock().unwrap_or_else(PoisonError::into_inner);
        self.latest.send_if_modified(|report| {
            if !modify(report) {
                return false;
            }
            streams.retain(|tx| tx.send(*report).is_ok());
            true
        })
    }
}

/// Polls a status source and publishes [`MonitorReport`]s
pub struct SessionMonitor<S: StatusSource> {
    source: Arc<S>,
    config: MonitorConfig,
    reports: Arc<Reports>,
    /// Bumped on every start and stop; a loop from an older generation
    /// may no longer publish
    generation: Arc<AtomicU64>,
    task: Option<JoinHandle<()>>,
}

impl<S: StatusSource> SessionMonitor<S> {
    pub fn new(source: S, config: MonitorConfig) -> Self {
        Self {
            source: Arc::new(source),
            config,
            reports: Arc::new(Reports::new()),
            generation: Arc::new(AtomicU64::new(0)),
            task: None,
        }
    }

    /// Watch the latest report; reports published between reads collapse
    pub fn subscribe(&self) -> watch::Receiver<MonitorReport> {
        self.reports.latest.subscribe()
    }

    /// Receive every report published from now on, in order
    pub fn report_stream(&self) -> mpsc::UnboundedReceiver<MonitorReport> {
        self.reports.stream()
    }

    pub fn report(&self) -> MonitorReport {
        *self.reports.latest.borrow()
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Whether a polling task is currently scheduled or running
    pub fn is_polling(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Start polling: one query right away, then on the phase's cadence.
    ///
    /// Re-entering cancels the previous polling task first, so at most one
    /// loop ever runs. Must be called from within a Tokio runtime.
    pub fn enter_protected(&mut self) {
        self.cancel();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        self.reports.publish_if(|report| {
            report.phase = MonitorPhase::PollingNormal;
            true
        });

        let poller = Poller {
            source: Arc::clone(&self.source),
            config: self.config.clone(),
            reports: Arc::clone(&self.reports),
            current: Arc::clone(&self.generation),
            generation,
        };
        self.task = Some(tokio::spawn(poller.run()));
        debug!("Session monitor started");
    }

    /// Stop polling and publish a cleared report
    pub fn leave_protected(&mut self) {
        self.cancel();
        self.reports.publish_if(|report| {
            report.phase = MonitorPhase::Idle;
            report.update = ExpiryUpdate::CLEAR;
            true
        });
        debug!("Session monitor stopped");
    }

    fn cancel(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl<S: StatusSource> Drop for SessionMonitor<S> {
    fn drop(&mut self) {
        self.cancel();
    }
}

struct Poller<S: StatusSource> {
    source: Arc<S>,
    config: MonitorConfig,
    reports: Arc<Reports>,
    current: Arc<AtomicU64>,
    generation: u64,
}

impl<S: StatusSource> Poller<S> {
    async fn run(self) {
        loop {
            let evaluation = match self.source.fetch().await {
                Ok(status) => evaluate(&status, &self.config),
                Err(e) => {
                    warn!("Session status query failed: {}", e);
                    Evaluation::failed(&self.config)
                }
            };

            // An aborted loop can still be mid-poll on another worker
            let published = self.reports.publish_if(|report| {
                if self.current.load(Ordering::SeqCst) != self.generation {
                    return false;
                }
                report.phase = evaluation.phase;
                report.update = evaluation.update;
                report.polls += 1;
                true
            });
            if !published {
                break;
            }

            match evaluation.next_poll {
                Some(delay) => {
                    debug!("Next session status query in {:?} ({:?})", delay, evaluation.phase);
                    sleep(delay).await;
                }
                None => {
                    info!("Session is no longer active, monitor idle");
                    break;
                }
            }
        }
    }
}
