//! # Output shaper
//!
//! Maps an unbounded correction into the actuator range [-1, 1]. The
//! correction is squashed with `tanh` and divided by `tanh(1)`, giving close
//! to unit gain near the origin, an exact mapping of ±1 to ±1, and a smooth
//! saturation for larger inputs. The result is then clamped to the range.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use util::maths::clamp;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Minimum shaped output
pub const OUTPUT_MIN: f64 = -1.0;

/// Maximum shaped output
pub const OUTPUT_MAX: f64 = 1.0;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Shape a raw correction into [-1, 1].
///
/// Non-finite inputs are not guarded here: NaN passes through as NaN, so
/// callers must check their inputs.
pub fn shape(raw: f64) -> f64 {
    clamp(&(raw.tanh() / 1f64.tanh()), &OUTPUT_MIN, &OUTPUT_MAX)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_unit_boundary() {
        assert_eq!(shape(1.0), 1.0);
        assert_eq!(shape(-1.0), -1.0);
        assert_eq!(shape(0.0), 0.0);
    }

    #[test]
    fn test_odd_symmetry() {
        for &x in &[0.001f64, 0.1, 0.5, 0.9, 1.0, 2.0, 37.0, 1e10] {
            assert_eq!(shape(-x), -shape(x));
        }
    }

    #[test]
    fn test_monotonic() {
        let mut prev = shape(-5.0);
        let mut x = -5.0;
        while x < 5.0 {
            x += 0.01;
            let y = shape(x);
            assert!(y >= prev, "shape not monotonic at {}", x);

            // Strictly increasing inside the linear region
            if x.abs() < 0.99 {
                assert!(y > prev, "shape not strictly increasing at {}", x);
            }
            prev = y;
        }
    }

    #[test]
    fn test_saturation() {
        for &x in &[1.5f64, 10.0, 1e6, f64::MAX] {
            assert_eq!(shape(x), 1.0);
            assert_eq!(shape(-x), -1.0);
        }

        assert_eq!(shape(f64::INFINITY), 1.0);
        assert!(shape(f64::NAN).is_nan());
    }

    #[test]
    fn test_near_unit_gain_at_origin() {
        let x = 1e-4;
        let gain = shape(x) / x;
        assert!((gain - 1.0 / 1f64.tanh()).abs() < 1e-6);
    }
}
