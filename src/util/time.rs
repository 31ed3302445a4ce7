//! Time utilities for the tick loop

use std::time::Duration;

use tokio::time::Instant;

/// Process start time for uptime reporting
static PROCESS_START: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

/// Initialize process start time (call once at startup)
pub fn init_process_time() {
    PROCESS_START.get_or_init(Instant::now);
}

/// Get process uptime in seconds
pub fn uptime_secs() -> u64 {
    PROCESS_START
        .get()
        .map(|start| start.elapsed().as_secs())
        .unwrap_or(0)
}

/// Time left in a tick that started at `tick_start`, if any
///
/// `None` once the tick has used up its whole timestep; the next tick then
/// starts straight away.
pub fn time_remaining(tick_start: Instant, timestep: Duration) -> Option<Duration> {
    timestep
        .checked_sub(tick_start.elapsed())
        .filter(|remaining| !remaining.is_zero())
}
