//! The vitals clock — owns the engine's periodic tasks as named,
//! individually cancelable slots.
//!
//! One clock instance owns every timer of the simulation; tying their
//! lifecycle to a single object is what makes "switching the active pet
//! stops everything first" enforceable.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

/// The four periodic concerns of the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Hunger creeps up while a pet is active.
    HungerGrowth,
    /// Happiness drains while a pet is active.
    HappinessDecay,
    /// Happiness boost while the user is engaged (e.g. sustained hover).
    InteractionBoost,
    /// Periodic fetch-all that re-anchors local state to the server.
    Resync,
}

impl TimerKind {
    pub fn name(self) -> &'static str {
        match self {
            TimerKind::HungerGrowth => "hunger_growth",
            TimerKind::HappinessDecay => "happiness_decay",
            TimerKind::InteractionBoost => "interaction_boost",
            TimerKind::Resync => "resync",
        }
    }
}

/// Owns up to one running task per `TimerKind`.
///
/// Aborting a slot guarantees no further tick of that timer runs: a tick
/// body executes between poll points, so once `stop` returns the task can
/// only be dropped, never re-entered.
pub struct VitalsClock {
    tasks: Mutex<HashMap<TimerKind, JoinHandle<()>>>,
}

impl VitalsClock {
    pub fn new() -> Self {
        Self {
            tasks: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<TimerKind, JoinHandle<()>>> {
        self.tasks.lock().expect("clock mutex poisoned")
    }

    /// Arm the named timer. An already-running timer of the same kind is
    /// stopped first, so at most one task per kind ever exists.
    ///
    /// The first tick fires one full period after arming; the anchor is
    /// taken here, not at the task's first poll.
    pub fn start<F, Fut>(&self, kind: TimerKind, period: Duration, mut tick: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        self.stop(kind);
        debug!(timer = kind.name(), ?period, "arming timer");
        let first_tick = Instant::now() + period;
        let handle = tokio::spawn(async move {
            let mut interval = interval_at(first_tick, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                tick().await;
            }
        });
        self.lock().insert(kind, handle);
    }

    /// Stop the named timer if it is running. No stale tick fires after
    /// this returns.
    pub fn stop(&self, kind: TimerKind) {
        if let Some(handle) = self.lock().remove(&kind) {
            handle.abort();
            debug!(timer = kind.name(), "timer stopped");
        }
    }

    /// Cancel every outstanding timer. Idempotent.
    pub fn stop_all(&self) {
        let mut tasks = self.lock();
        if tasks.is_empty() {
            return;
        }
        for (kind, handle) in tasks.drain() {
            handle.abort();
            debug!(timer = kind.name(), "timer stopped");
        }
    }

    /// Whether the named timer is currently armed.
    pub fn running(&self, kind: TimerKind) -> bool {
        self.lock().get(&kind).is_some_and(|h| !h.is_finished())
    }

    /// Whether any timer is armed. The zero-timer invariant: with no
    /// active pet this must be false.
    pub fn any_running(&self) -> bool {
        self.lock().values().any(|h| !h.is_finished())
    }
}

impl Default for VitalsClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for VitalsClock {
    fn drop(&mut self) {
        if let Ok(mut tasks) = self.tasks.lock() {
            for handle in tasks.values() {
                handle.abort();
            }
            tasks.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tokio::time::advance;

    fn counting_tick(counter: &Arc<AtomicU32>) -> impl FnMut() -> std::future::Ready<()> + Send {
        let counter = Arc::clone(counter);
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::future::ready(())
        }
    }

    /// Advance paused time in small steps so every interval deadline is
    /// crossed one at a time, yielding between steps so timer tasks run.
    async fn run_for(total: Duration, step: Duration) {
        tokio::task::yield_now().await;
        let mut elapsed = Duration::ZERO;
        while elapsed < total {
            advance(step).await;
            tokio::task::yield_now().await;
            elapsed += step;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_after_one_period() {
        let clock = VitalsClock::new();
        let ticks = Arc::new(AtomicU32::new(0));
        clock.start(
            TimerKind::HungerGrowth,
            Duration::from_secs(5),
            counting_tick(&ticks),
        );

        run_for(Duration::from_secs(4), Duration::from_secs(1)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 0);
        run_for(Duration::from_secs(1), Duration::from_secs(1)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 1);
        run_for(Duration::from_secs(10), Duration::from_secs(1)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_all_leaves_no_stray_ticks() {
        let clock = VitalsClock::new();
        let ticks = Arc::new(AtomicU32::new(0));
        clock.start(
            TimerKind::HappinessDecay,
            Duration::from_secs(2),
            counting_tick(&ticks),
        );
        run_for(Duration::from_secs(4), Duration::from_secs(1)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 2);

        clock.stop_all();
        clock.stop_all(); // idempotent
        run_for(Duration::from_secs(60), Duration::from_secs(1)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 2);
        assert!(!clock.any_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearming_replaces_the_previous_task() {
        let clock = VitalsClock::new();
        let first = Arc::new(AtomicU32::new(0));
        let second = Arc::new(AtomicU32::new(0));

        clock.start(
            TimerKind::Resync,
            Duration::from_secs(1),
            counting_tick(&first),
        );
        clock.start(
            TimerKind::Resync,
            Duration::from_secs(1),
            counting_tick(&second),
        );

        run_for(Duration::from_secs(3), Duration::from_secs(1)).await;
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_is_per_timer() {
        let clock = VitalsClock::new();
        let boost = Arc::new(AtomicU32::new(0));
        let decay = Arc::new(AtomicU32::new(0));
        clock.start(
            TimerKind::InteractionBoost,
            Duration::from_millis(500),
            counting_tick(&boost),
        );
        clock.start(
            TimerKind::HappinessDecay,
            Duration::from_secs(2),
            counting_tick(&decay),
        );

        clock.stop(TimerKind::InteractionBoost);
        run_for(Duration::from_secs(4), Duration::from_millis(500)).await;

        assert_eq!(boost.load(Ordering::SeqCst), 0);
        assert_eq!(decay.load(Ordering::SeqCst), 2);
        assert!(!clock.running(TimerKind::InteractionBoost));
        assert!(clock.running(TimerKind::HappinessDecay));
    }
}
