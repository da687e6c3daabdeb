// Clock used for descriptor timestamps

/// Source of "now" for launch, item and log timestamps (unix millis).
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        #[cfg(miri)]
        {
            0
        }
        #[cfg(not(miri))]
        {
            chrono::Utc::now().timestamp_millis()
        }
    }
}

/// Clock pinned to a single instant. Used by tests and by replays that want
/// reproducible output.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.0
    }
}
