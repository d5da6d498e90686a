use std::time::{Duration, Instant};

pub(crate) const LOG_THROTTLE: Duration = Duration::from_secs(2);

// Rate-limits hot-path warnings to one per LOG_THROTTLE.
pub(crate) fn should_log(last: &mut Instant) -> bool {
    if last.elapsed() >= LOG_THROTTLE {
        *last = Instant::now();
        true
    } else {
        false
    }
}

// A timestamp that lets the first call through.
pub(crate) fn log_ready() -> Instant {
    Instant::now()
        .checked_sub(LOG_THROTTLE)
        .unwrap_or_else(Instant::now)
}
