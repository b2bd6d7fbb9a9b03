//! Presentation rounding.
//!
//! Core value objects keep full precision. Rounding happens only when a
//! result is about to be serialized for display.

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.23456, 2), 1.23);
        assert_eq!(round_to(1.23556, 3), 1.236);
        assert_eq!(round_to(-0.00004, 4), -0.0);
        assert_eq!(round_to(10.0, 4), 10.0);
    }
}
