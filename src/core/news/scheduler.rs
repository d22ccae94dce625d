// Timer side of the news feature. The loop only knows about `Ticker`, so tests
// can drive cycles by hand instead of waiting on the wall clock.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Timelike, Utc};
use tokio::time::{Instant, Interval, MissedTickBehavior};

/// Something that yields once per scheduled run. Returning `false` stops the loop.
#[async_trait]
pub trait Ticker: Send {
    async fn tick(&mut self) -> bool;
}

#[async_trait]
impl Ticker for Interval {
    async fn tick(&mut self) -> bool {
        Interval::tick(self).await;
        true
    }
}

/// Time left until the next multiple of `period` since midnight UTC, so a
/// 15 minute period fires at :00, :15, :30 and :45.
pub fn delay_until_next_boundary(now: DateTime<Utc>, period: Duration) -> Duration {
    let period_ms = period.as_millis().max(1) as i64;
    let since_midnight_ms =
        now.num_seconds_from_midnight() as i64 * 1000 + now.timestamp_subsec_millis() as i64;
    let into_period = since_midnight_ms.rem_euclid(period_ms);
    if into_period == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis((period_ms - into_period) as u64)
}

/// Interval aligned to wall-clock boundaries. Late ticks are skipped rather
/// than replayed, so a slow cycle never causes the next ones to pile up.
pub fn aligned_interval(now: DateTime<Utc>, period: Duration) -> Interval {
    let start = Instant::now() + delay_until_next_boundary(now, period);
    let mut interval = tokio::time::interval_at(start, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;

    /// Fires `remaining` times, then stops.
    pub(crate) struct CountingTicker {
        pub remaining: usize,
    }

    #[async_trait]
    impl Ticker for CountingTicker {
        async fn tick(&mut self) -> bool {
            if self.remaining == 0 {
                return false;
            }
            self.remaining -= 1;
            true
        }
    }

    #[test]
    fn test_delay_to_next_quarter_hour() {
        let period = Duration::from_secs(15 * 60);

        let now = Utc.with_ymd_and_hms(2024, 1, 1, 10, 7, 30).unwrap();
        assert_eq!(
            delay_until_next_boundary(now, period),
            Duration::from_secs(7 * 60 + 30)
        );

        let now = Utc.with_ymd_and_hms(2024, 1, 1, 10, 59, 59).unwrap();
        assert_eq!(delay_until_next_boundary(now, period), Duration::from_secs(1));
    }

    #[test]
    fn test_on_boundary_fires_immediately() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 10, 30, 0).unwrap();
        assert_eq!(
            delay_until_next_boundary(now, Duration::from_secs(30 * 60)),
            Duration::ZERO
        );
    }

    #[test]
    fn test_half_hour_period() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 23, 45, 0).unwrap();
        assert_eq!(
            delay_until_next_boundary(now, Duration::from_secs(30 * 60)),
            Duration::from_secs(15 * 60)
        );
    }

    #[tokio::test]
    async fn test_counting_ticker_stops() {
        let mut ticker = CountingTicker { remaining: 2 };
        assert!(ticker.tick().await);
        assert!(ticker.tick().await);
        assert!(!ticker.tick().await);
    }
}
