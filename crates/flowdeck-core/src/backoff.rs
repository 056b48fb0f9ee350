use std::time::Duration;

/// Pure backoff policy used by the refresh shell.
///
/// Delays double from 100ms with no jitter, so this is not appropriate for
/// very parallel callers.
pub const BACKOFF_MAX_RETRIES: u32 = 4;

pub fn backoff_delays() -> impl Iterator<Item = Duration> {
    std::iter::successors(Some(Duration::from_millis(100)), |d| d.checked_mul(2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_double_from_100ms() {
        let delays: Vec<u64> = backoff_delays().take(4).map(|d| d.as_millis() as u64).collect();
        assert_eq!(delays, vec![100, 200, 400, 800]);
    }
}
