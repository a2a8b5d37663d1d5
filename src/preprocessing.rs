use crate::error::SanitizeError;
use crate::gaps::is_missing;
use log::debug;
use std::borrow::Cow;

/// Piecewise-linear interpolation over the sample index, anchored at the
/// positions where `anchors` is true.
///
/// Anchored samples keep their value. Positions before the first anchor take
/// the first anchor's value, positions after the last take the last one's.
/// Returns `None` when there is no anchor to interpolate from.
pub fn interpolate_from_anchors(signal: &[f64], anchors: &[bool]) -> Option<Vec<f64>> {
    debug_assert_eq!(signal.len(), anchors.len());

    let points: Vec<usize> = anchors
        .iter()
        .enumerate()
        .filter(|(_, &anchor)| anchor)
        .map(|(i, _)| i)
        .collect();
    let (&first, &last) = (points.first()?, points.last()?);

    let mut result = signal.to_vec();
    result[..first].fill(signal[first]);
    result[last + 1..].fill(signal[last]);

    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if b - a < 2 {
            continue;
        }
        let (va, vb) = (signal[a], signal[b]);
        let span = (b - a) as f64;
        for (offset, slot) in result[a + 1..b].iter_mut().enumerate() {
            *slot = va + (vb - va) * (offset + 1) as f64 / span;
        }
    }

    Some(result)
}

/// True where `min_bpm < value < max_bpm`.
pub fn in_range_mask(signal: &[f64], min_bpm: f64, max_bpm: f64) -> Vec<bool> {
    signal
        .iter()
        .map(|&v| v > min_bpm && v < max_bpm)
        .collect()
}

/// True where a sample is present (non-zero).
pub fn presence_mask(signal: &[f64]) -> Vec<bool> {
    signal.iter().map(|&v| !is_missing(v)).collect()
}

/// Mark implausible samples as missing by zeroing them; repair is left to
/// [`fill_gaps`].
pub fn zero_extreme_values(signal: &[f64], min_bpm: f64, max_bpm: f64) -> Cow<'_, [f64]> {
    let implausible = |v: f64| !is_missing(v) && !(v > min_bpm && v < max_bpm);

    if !signal.iter().copied().any(implausible) {
        return Cow::Borrowed(signal);
    }

    let zeroed: Vec<f64> = signal
        .iter()
        .map(|&v| if implausible(v) { 0.0 } else { v })
        .collect();
    debug!(
        "Zeroed {} samples outside ({}, {}) bpm",
        signal.iter().copied().filter(|&v| implausible(v)).count(),
        min_bpm,
        max_bpm
    );
    Cow::Owned(zeroed)
}

/// Replace implausible samples by interpolating between in-range neighbours.
///
/// Returns the corrected signal together with the in-range mask. Missing
/// samples count as out of range. Fails when nothing is in range.
pub fn interpolate_extreme_values(
    signal: &[f64],
    min_bpm: f64,
    max_bpm: f64,
) -> Result<(Cow<'_, [f64]>, Vec<bool>), SanitizeError> {
    let mask = in_range_mask(signal, min_bpm, max_bpm);

    if mask.iter().all(|&valid| valid) {
        return Ok((Cow::Borrowed(signal), mask));
    }

    let repaired =
        interpolate_from_anchors(signal, &mask).ok_or(SanitizeError::NoValidSamples)?;
    Ok((Cow::Owned(repaired), mask))
}

/// Fill the samples where `mask` is false by interpolating between the
/// samples where it is true.
///
/// Returns the input unchanged when every sample is valid or none is. The
/// mask itself is never touched.
pub fn fill_gaps<'a>(signal: &'a [f64], mask: &[bool]) -> Cow<'a, [f64]> {
    if mask.iter().all(|&valid| valid) {
        return Cow::Borrowed(signal);
    }
    match interpolate_from_anchors(signal, mask) {
        Some(filled) => Cow::Owned(filled),
        None => Cow::Borrowed(signal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn interpolates_interior_and_extends_edges() {
        let signal = [0.0, 100.0, 0.0, 0.0, 130.0, 0.0];
        let anchors = presence_mask(&signal);
        let result = interpolate_from_anchors(&signal, &anchors).unwrap();
        assert_eq!(result[0], 100.0);
        assert_eq!(result[1], 100.0);
        assert_approx_eq!(result[2], 110.0);
        assert_approx_eq!(result[3], 120.0);
        assert_eq!(result[4], 130.0);
        assert_eq!(result[5], 130.0);
    }

    #[test]
    fn no_anchors_yields_none() {
        assert!(interpolate_from_anchors(&[1.0, 2.0], &[false, false]).is_none());
    }

    #[test]
    fn zero_policy_bounds_are_exclusive() {
        let signal = [50.0, 50.5, 120.0, 199.9, 200.0, 250.0, 0.0, 30.0];
        let zeroed = zero_extreme_values(&signal, 50.0, 200.0);
        assert_eq!(
            &zeroed[..],
            &[0.0, 50.5, 120.0, 199.9, 0.0, 0.0, 0.0, 0.0]
        );
    }

    #[test]
    fn zero_policy_without_extremes_is_identity() {
        let signal = [120.0, 0.0, 130.0];
        assert!(matches!(
            zero_extreme_values(&signal, 50.0, 200.0),
            Cow::Borrowed(_)
        ));
    }

    #[test]
    fn interpolate_policy_repairs_and_reports_mask() {
        let signal = [120.0, 260.0, 140.0, 20.0];
        let (repaired, mask) = interpolate_extreme_values(&signal, 50.0, 200.0).unwrap();
        assert_eq!(mask, vec![true, false, true, false]);
        assert_approx_eq!(repaired[1], 130.0);
        assert_eq!(repaired[3], 140.0);
    }

    #[test]
    fn interpolate_policy_surfaces_empty_anchor_set() {
        assert_eq!(
            interpolate_extreme_values(&[0.0, 300.0, 10.0], 50.0, 200.0),
            Err(SanitizeError::NoValidSamples)
        );
    }

    #[test]
    fn interpolate_policy_all_valid_is_identity() {
        let signal = [120.0, 121.0];
        let (repaired, mask) = interpolate_extreme_values(&signal, 50.0, 200.0).unwrap();
        assert!(matches!(repaired, Cow::Borrowed(_)));
        assert_eq!(mask, vec![true, true]);
    }

    #[test]
    fn fill_gaps_identity_cases() {
        let signal = [120.0, 0.0, 125.0];
        assert!(matches!(
            fill_gaps(&signal, &[true, true, true]),
            Cow::Borrowed(_)
        ));
        let untouched = fill_gaps(&signal, &[false, false, false]);
        assert!(matches!(untouched, Cow::Borrowed(_)));
        assert_eq!(&untouched[..], &signal);
    }

    #[test]
    fn fill_gaps_interpolates_missing() {
        let signal = [120.0, 0.0, 0.0, 0.0, 124.0];
        let mask = presence_mask(&signal);
        let filled = fill_gaps(&signal, &mask);
        assert_eq!(&filled[..], &[120.0, 121.0, 122.0, 123.0, 124.0]);
        assert_eq!(mask, vec![true, false, false, false, true]);
    }
}
