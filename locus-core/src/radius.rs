//! Radius clamping and unit conversion policy.
//!
//! Every dataset declares its own maximum radius; the engine treats that
//! ceiling as configuration and never hardcodes one.

/// Meters per statute mile.
///
/// The exact constant matters: it is the factor used uniformly by every
/// call site, so downstream parameters stay bit-for-bit compatible with any
/// previously cached results.
pub const METERS_PER_MILE: f64 = 1609.34;

/// Clamp a requested radius to the dataset's ceiling.
///
/// An absent or non-positive request returns `0.0`, the signal that no
/// proximity pass should run. Otherwise the result is
/// `min(requested, dataset_max)`.
#[must_use]
pub fn clamp_radius(requested: Option<f64>, dataset_max: f64) -> f64 {
    match requested {
        Some(radius) if radius > 0.0 => radius.min(dataset_max),
        _ => 0.0,
    }
}

/// Convert miles to meters using [`METERS_PER_MILE`].
#[must_use]
pub fn miles_to_meters(miles: f64) -> f64 {
    miles * METERS_PER_MILE
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, 50.0, 0.0)]
    #[case(Some(0.0), 50.0, 0.0)]
    #[case(Some(-3.0), 50.0, 0.0)]
    #[case(Some(10.0), 50.0, 10.0)]
    #[case(Some(1000.0), 50.0, 50.0)]
    #[case(Some(1.0), 1.0, 1.0)]
    fn clamps_to_dataset_ceiling(
        #[case] requested: Option<f64>,
        #[case] dataset_max: f64,
        #[case] expected: f64,
    ) {
        assert_eq!(clamp_radius(requested, dataset_max), expected);
    }

    #[rstest]
    fn converts_miles_to_meters_exactly() {
        assert_eq!(miles_to_meters(50.0), 50.0 * 1609.34);
        assert_eq!(miles_to_meters(1.0), 1609.34);
    }
}
