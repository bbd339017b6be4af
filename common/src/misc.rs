use std::time::Duration;

/// Magnitudes below this are treated as zero by the intersection routines.
pub const ZERO_EPSILON: f32 = 1e-6;

pub fn zero_within_epsilon(val: f32) -> bool {
    val.abs() < ZERO_EPSILON
}

pub fn in_range_inclusive<T: PartialOrd>(val: T, low: T, high: T) -> bool {
    low <= val && val <= high
}

/// Maps `val` from the `domain` range onto the `range` range. The result is
/// not clamped.
pub fn linear_map(
    val: f32,
    (domain_min, domain_max): (f32, f32),
    (range_min, range_max): (f32, f32),
) -> f32 {
    let ratio = (val - domain_min) / (domain_max - domain_min);
    ratio * (range_max - range_min) + range_min
}

pub fn human_duration(duration: Duration) -> String {
    let ms = duration.as_millis() as f32;
    if ms < 1000.0 {
        format!("{ms}ms")
    } else if ms < 60_000.0 {
        format!("{:.2}s", ms / 1000.0)
    } else if ms < 3_600_000.0 {
        let minutes = ms / 60_000.0;
        let seconds = (minutes - minutes.floor()) * 60.0;
        format!("{:.0}m {:.2}s", minutes.floor(), seconds)
    } else {
        let hours = ms / 3_600_000.0;
        let minutes = (hours - hours.floor()) * 60.0;
        let seconds = (minutes - minutes.floor()) * 60.0;
        format!(
            "{:.0}h {:.0}m {:.2}s",
            hours.floor(),
            minutes.floor(),
            seconds
        )
    }
}
