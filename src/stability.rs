use crate::gaps::is_missing;

/// Find the first index where `window` consecutive samples are all present
/// and their max-min spread is at most `max_spread` bpm.
///
/// Returns `None` when the signal never settles, including signals shorter
/// than one window.
pub fn find_stable_start(signal: &[f64], window: usize, max_spread: f64) -> Option<usize> {
    if window == 0 {
        return None;
    }

    signal.windows(window).position(|w| {
        if w.iter().copied().any(is_missing) {
            return false;
        }
        let (min, max) = w
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        max - min <= max_spread
    })
}
