use crate::scrapers::types::DelayRange;
use async_trait::async_trait;
use std::time::Duration;

/// Politeness pauses between requests
#[async_trait]
pub trait Pacer: Send + Sync {
    /// Pause for a duration drawn from `range`; returns how long it waited
    async fn pause(&self, range: DelayRange) -> Duration;
}

/// Real wall-clock pauses with uniform jitter
pub struct JitterPacer;

#[async_trait]
impl Pacer for JitterPacer {
    async fn pause(&self, range: DelayRange) -> Duration {
        let delay = range.sample(&mut rand::thread_rng());
        tokio::time::sleep(delay).await;
        delay
    }
}

/// No pauses at all
pub struct NoPause;

#[async_trait]
impl Pacer for NoPause {
    async fn pause(&self, _range: DelayRange) -> Duration {
        Duration::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn jitter_sleeps_for_the_sampled_time() {
        let range = DelayRange::new(1.0, 2.5);
        let before = tokio::time::Instant::now();

        let waited = JitterPacer.pause(range).await;

        assert!((1.0..2.5).contains(&waited.as_secs_f64()));
        assert!(before.elapsed() >= waited);
    }

    #[tokio::test]
    async fn no_pause_returns_immediately() {
        let waited = NoPause.pause(DelayRange::new(3.0, 8.0)).await;
        assert_eq!(waited, Duration::ZERO);
    }
}
