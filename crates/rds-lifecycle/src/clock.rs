// clock.rs — Injected time source.
//
// The scheduler never touches tokio::time directly; it asks its Clock. The
// production clock delegates to tokio's timer, which tests can pause and
// advance (`#[tokio::test(start_paused = true)]`) to simulate hours of
// schedule without waiting.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio::time::Instant;

/// Time source for schedule ticks and retry pauses.
pub trait Clock: Send + Sync + 'static {
    /// Current instant.
    fn now(&self) -> Instant;

    /// Sleeps for the specified duration.
    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send>>;

    /// Sleeps until the given instant (returns immediately if it has passed).
    fn sleep_until(&self, deadline: Instant) -> Pin<Box<dyn Future<Output = ()> + Send>>;
}

/// Clock backed by the Tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send>> {
        Box::pin(tokio::time::sleep(duration))
    }

    fn sleep_until(&self, deadline: Instant) -> Pin<Box<dyn Future<Output = ()> + Send>> {
        Box::pin(tokio::time::sleep_until(deadline))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn paused_clock_advances_without_waiting() {
        let clock = TokioClock;
        let start = clock.now();
        clock.sleep(Duration::from_secs(3 * 60)).await;
        assert_eq!(clock.now() - start, Duration::from_secs(180));
    }

    #[tokio::test(start_paused = true)]
    async fn sleep_until_past_deadline_returns() {
        let clock = TokioClock;
        let past = clock.now();
        clock.sleep(Duration::from_secs(1)).await;
        clock.sleep_until(past).await;
        assert!(clock.now() > past);
    }
}
