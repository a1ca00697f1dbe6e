use std::ops::RangeInclusive;

/// Absorbs float rounding when `step - dt + 1` lands on an integer.
const BOUNDARY_EPSILON: f64 = 1e-8;

/// The trailing window of `dt` source steps ending at `step` (both 1-based, inclusive).
///
/// `dt <= 1` is identity sampling: the window is just `step`. Longer windows
/// are clamped at the start of the table.
pub fn rolling_window(step: usize, dt: f64) -> RangeInclusive<usize> {
    if dt <= 1.0 {
        return step..=step;
    }
    let start = (step as f64 - dt + 1.0 + BOUNDARY_EPSILON).floor().max(1.0) as usize;
    start..=step
}
