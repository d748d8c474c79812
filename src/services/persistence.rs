//! Ordered, retrying hand-off of durability work to the stats store.
//!
//! Game mutations submit operations here after releasing the game lock. A
//! single worker task applies them strictly in submission order; a failing
//! operation is retried with capped exponential backoff until it succeeds and
//! nothing behind it runs meanwhile.

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use futures::future::BoxFuture;
use tokio::{
    sync::mpsc,
    time::{sleep, timeout},
};
use tracing::{debug, info, warn};

use crate::dao::{models::GoalEventEntity, stats_store::StatsStore, storage::StorageResult};

/// Unit of durability work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceOp {
    /// Make sure these players exist in the stats store.
    EnsurePlayers(Vec<String>),
    /// Store a goal event and update the involved players' counters.
    RecordGoal(GoalEventEntity),
}

impl PersistenceOp {
    fn kind(&self) -> &'static str {
        match self {
            PersistenceOp::EnsurePlayers(_) => "ensure_players",
            PersistenceOp::RecordGoal(_) => "record_goal",
        }
    }
}

/// Timing knobs for the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay before the first retry.
    pub initial_backoff: Duration,
    /// Cap on the doubling delay.
    pub max_backoff: Duration,
    /// Bound on a single stats-store call; an expired attempt counts as failed.
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(60),
            attempt_timeout: Duration::from_secs(10),
        }
    }
}

/// Exponential backoff state: each [`Backoff::next_delay`] returns the
/// current delay and doubles it for next time, never exceeding the cap.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    /// Start at `initial`; a `max` below `initial` is raised to it.
    pub fn new(initial: Duration, max: Duration) -> Self {
        let max = max.max(initial);
        Self {
            initial,
            max,
            current: initial,
        }
    }

    /// Delay to wait now; doubles the following one.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.max);
        delay
    }

    /// Go back to the initial delay.
    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}

/// Handle used to submit durability work; cheap to clone.
///
/// A disabled queue accepts submissions and drops them, so the in-memory game
/// engine behaves the same with or without a stats store.
#[derive(Clone)]
pub struct PersistenceQueue {
    sender: Option<mpsc::UnboundedSender<PersistenceOp>>,
    pending: Arc<AtomicUsize>,
}

impl PersistenceQueue {
    /// Queue that discards every submission.
    pub fn disabled() -> Self {
        Self {
            sender: None,
            pending: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Spawn the worker on the current tokio runtime.
    pub fn spawn(store: Arc<dyn StatsStore>, policy: RetryPolicy) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let pending = Arc::new(AtomicUsize::new(0));
        tokio::spawn(run_worker(store, receiver, policy, pending.clone()));
        Self {
            sender: Some(sender),
            pending,
        }
    }

    /// Enqueue `op` without waiting for the store.
    pub fn submit(&self, op: PersistenceOp) {
        let Some(sender) = &self.sender else {
            return;
        };

        self.pending.fetch_add(1, Ordering::SeqCst);
        if let Err(err) = sender.send(op) {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            warn!(op = err.0.kind(), "persistence worker stopped; dropping operation");
        }
    }

    /// Whether a worker is attached.
    pub fn is_enabled(&self) -> bool {
        self.sender.is_some()
    }

    /// Operations submitted but not yet written.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }
}

async fn run_worker(
    store: Arc<dyn StatsStore>,
    mut receiver: mpsc::UnboundedReceiver<PersistenceOp>,
    policy: RetryPolicy,
    pending: Arc<AtomicUsize>,
) {
    info!("persistence worker started");
    while let Some(op) = receiver.recv().await {
        deliver(store.as_ref(), &op, policy).await;
        pending.fetch_sub(1, Ordering::SeqCst);
    }
    info!("persistence worker stopped");
}

/// Attempt `op` until it succeeds: attempt, wait, reconnect, attempt again.
async fn deliver(store: &dyn StatsStore, op: &PersistenceOp, policy: RetryPolicy) {
    let mut backoff = Backoff::new(policy.initial_backoff, policy.max_backoff);
    let mut attempt: u32 = 1;

    loop {
        let outcome = timeout(policy.attempt_timeout, execute(store, op)).await;
        let error = match outcome {
            Ok(Ok(())) => {
                if attempt > 1 {
                    info!(op = op.kind(), attempt, "persistence operation succeeded after retry");
                } else {
                    debug!(op = op.kind(), "persistence operation stored");
                }
                return;
            }
            Ok(Err(err)) => err.to_string(),
            Err(_) => format!("attempt timed out after {:?}", policy.attempt_timeout),
        };

        let delay = backoff.next_delay();
        warn!(
            op = op.kind(),
            attempt,
            error = %error,
            delay_ms = delay.as_millis() as u64,
            "persistence operation failed; retrying"
        );
        sleep(delay).await;

        match timeout(policy.attempt_timeout, store.try_reconnect()).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => warn!(error = %err, "stats store reconnect failed"),
            Err(_) => warn!("stats store reconnect timed out"),
        }
        attempt += 1;
    }
}

fn execute(store: &dyn StatsStore, op: &PersistenceOp) -> BoxFuture<'static, StorageResult<()>> {
    match op {
        PersistenceOp::EnsurePlayers(names) => store.ensure_players(names.clone()),
        PersistenceOp::RecordGoal(event) => store.record_goal(event.clone()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::dao::{models::PlayerEntity, storage::StorageError};

    /// Store that fails the first `failures` writes (or hangs on them when
    /// `hang` is set) and records every successful write.
    #[derive(Default)]
    struct ScriptedStore {
        failures: Mutex<usize>,
        hang: bool,
        writes: Mutex<Vec<String>>,
        attempts: AtomicUsize,
    }

    impl ScriptedStore {
        fn failing(failures: usize) -> Arc<Self> {
            Arc::new(Self {
                failures: Mutex::new(failures),
                ..Self::default()
            })
        }

        fn hanging(failures: usize) -> Arc<Self> {
            Arc::new(Self {
                failures: Mutex::new(failures),
                hang: true,
                ..Self::default()
            })
        }

        fn write(&self, label: String) -> BoxFuture<'static, StorageResult<()>> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            let mut failures = self.failures.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                if self.hang {
                    return Box::pin(futures::future::pending());
                }
                return Box::pin(async { Err(StorageError::Rejected("scripted failure".into())) });
            }
            self.writes.lock().unwrap().push(label);
            Box::pin(async { Ok(()) })
        }

        fn writes(&self) -> Vec<String> {
            self.writes.lock().unwrap().clone()
        }
    }

    impl StatsStore for ScriptedStore {
        fn ensure_players(&self, names: Vec<String>) -> BoxFuture<'static, StorageResult<()>> {
            self.write(format!("players:{}", names.join(",")))
        }

        fn record_goal(&self, event: GoalEventEntity) -> BoxFuture<'static, StorageResult<()>> {
            self.write(format!("goal:{}", event.game_id))
        }

        fn search_players(
            &self,
            _query: String,
            _limit: usize,
        ) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
            Box::pin(async { Ok(Vec::new()) })
        }

        fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Ok(()) })
        }

        fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Ok(()) })
        }
    }

    fn policy() -> RetryPolicy {
        RetryPolicy {
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(400),
            attempt_timeout: Duration::from_secs(1),
        }
    }

    async fn drain(queue: &PersistenceQueue) {
        for _ in 0..10_000 {
            if queue.pending() == 0 {
                return;
            }
            sleep(Duration::from_millis(50)).await;
        }
        panic!("persistence queue did not drain");
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let mut backoff = Backoff::new(Duration::from_secs(1), Duration::from_secs(5));
        let delays = (0..5).map(|_| backoff.next_delay()).collect::<Vec<_>>();
        assert_eq!(
            delays,
            [1, 2, 4, 5, 5].map(Duration::from_secs).to_vec()
        );
        backoff.reset();
        assert_eq!(backoff.next_delay(), Duration::from_secs(1));
    }

    #[test]
    fn backoff_cap_never_below_initial() {
        let mut backoff = Backoff::new(Duration::from_secs(3), Duration::from_secs(1));
        assert_eq!(backoff.next_delay(), Duration::from_secs(3));
        assert_eq!(backoff.next_delay(), Duration::from_secs(3));
    }

    #[tokio::test]
    async fn disabled_queue_drops_submissions() {
        let queue = PersistenceQueue::disabled();
        queue.submit(PersistenceOp::EnsurePlayers(vec!["alice".into()]));
        assert!(!queue.is_enabled());
        assert_eq!(queue.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn operations_are_written_in_submission_order() {
        let store = ScriptedStore::failing(0);
        let queue = PersistenceQueue::spawn(store.clone(), policy());

        for n in 0..5 {
            queue.submit(PersistenceOp::EnsurePlayers(vec![format!("p{n}")]));
        }
        drain(&queue).await;

        assert_eq!(
            store.writes(),
            (0..5).map(|n| format!("players:p{n}")).collect::<Vec<_>>()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn failing_operation_blocks_the_queue_until_it_succeeds() {
        let store = ScriptedStore::failing(4);
        let queue = PersistenceQueue::spawn(store.clone(), policy());

        queue.submit(PersistenceOp::EnsurePlayers(vec!["first".into()]));
        queue.submit(PersistenceOp::EnsurePlayers(vec!["second".into()]));
        drain(&queue).await;

        assert_eq!(store.writes(), vec!["players:first", "players:second"]);
        assert_eq!(store.attempts.load(Ordering::SeqCst), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn timed_out_attempt_is_retried() {
        let store = ScriptedStore::hanging(2);
        let queue = PersistenceQueue::spawn(store.clone(), policy());

        queue.submit(PersistenceOp::EnsurePlayers(vec!["slow".into()]));
        drain(&queue).await;

        assert_eq!(store.writes(), vec!["players:slow"]);
        assert_eq!(store.attempts.load(Ordering::SeqCst), 3);
    }
}
