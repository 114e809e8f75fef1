use async_trait::async_trait;
use std::time::Duration;

/// Paces outgoing requests. Called once before every request is issued.
#[async_trait]
pub trait Throttle: Send + Sync {
    async fn wait(&self);
}

/// Sleeps a fixed interval before each request
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay {
    delay: Duration,
}

impl FixedDelay {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[async_trait]
impl Throttle for FixedDelay {
    async fn wait(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

/// No pacing at all (tests, local mocks)
#[derive(Debug, Clone, Copy, Default)]
pub struct Unthrottled;

#[async_trait]
impl Throttle for Unthrottled {
    async fn wait(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_fixed_delay_sleeps() {
        let throttle = FixedDelay::from_millis(200);
        let start = Instant::now();
        throttle.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test]
    async fn test_unthrottled_returns_immediately() {
        let start = std::time::Instant::now();
        Unthrottled.wait().await;
        assert!(start.elapsed() < Duration::from_millis(50));
    }
}
