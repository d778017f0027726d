use std::time::Duration;

use async_trait::async_trait;
use replay_core::ports::Pacer;

/// Sleeps a fixed delay between sends
pub struct FixedDelayPacer {
    delay: Duration,
}

impl FixedDelayPacer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl Pacer for FixedDelayPacer {
    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_zero_delay_returns_immediately() {
        let pacer = FixedDelayPacer::new(Duration::ZERO);
        let started = Instant::now();
        pacer.pause().await;
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_waits_for_delay() {
        let pacer = FixedDelayPacer::new(Duration::from_millis(20));
        let started = Instant::now();
        pacer.pause().await;
        assert!(started.elapsed() >= Duration::from_millis(20));
    }
}
