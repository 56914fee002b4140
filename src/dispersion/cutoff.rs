//! Smooth real-space cutoff.

use super::error::Error;

/// Multiplicative switching envelope between an onset and a cutoff radius.
///
/// The envelope is 1 below the onset, 0 at and beyond the cutoff, and
/// follows a polynomial in r² in between so that both the value and the
/// first derivative are continuous at either end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Switching {
    onset: f64,
    cutoff: f64,
}

impl Switching {
    /// # Errors
    ///
    /// Returns [`Error::InvalidCutoff`] unless `0 < onset < cutoff`, both finite.
    pub fn new(onset: f64, cutoff: f64) -> Result<Self, Error> {
        if !(onset.is_finite() && cutoff.is_finite() && onset > 0.0 && onset < cutoff) {
            return Err(Error::InvalidCutoff { onset, cutoff });
        }
        Ok(Self { onset, cutoff })
    }

    pub fn onset(&self) -> f64 {
        self.onset
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    #[inline]
    pub fn value(&self, r: f64) -> f64 {
        if r < self.onset {
            return 1.0;
        }
        if r >= self.cutoff {
            return 0.0;
        }
        let r2 = r * r;
        let on2 = self.onset * self.onset;
        let off2 = self.cutoff * self.cutoff;
        let gap = off2 - on2;
        (off2 - r2) * (off2 - r2) * (off2 + 2.0 * r2 - 3.0 * on2) / (gap * gap * gap)
    }

    /// Wraps a pair function `f(r, args)` so its result is scaled by the envelope.
    ///
    /// `f` is not called at or beyond the cutoff.
    pub fn multiplicative<A, F>(self, f: F) -> impl Fn(f64, A) -> f64 + Send + Sync
    where
        F: Fn(f64, A) -> f64 + Send + Sync,
    {
        move |r, args| {
            let s = self.value(r);
            if s == 0.0 { 0.0 } else { s * f(r, args) }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn envelope_is_piecewise() {
        let sw = Switching::new(20.0, 25.0).unwrap();
        assert_eq!(sw.value(1.0), 1.0);
        assert_eq!(sw.value(19.999), 1.0);
        assert_eq!(sw.value(25.0), 0.0);
        assert_eq!(sw.value(100.0), 0.0);
        let mid = sw.value(22.5);
        assert!(mid > 0.0 && mid < 1.0);
    }

    #[test]
    fn envelope_is_continuous_at_both_ends() {
        let sw = Switching::new(55.0, 60.0).unwrap();
        let h = 1e-7;
        assert_relative_eq!(sw.value(55.0), 1.0, epsilon = 1e-12);
        assert_relative_eq!(sw.value(55.0 + h), 1.0, epsilon = 1e-9);
        assert_relative_eq!(sw.value(60.0 - h), 0.0, epsilon = 1e-9);

        // one-sided slopes vanish at the seams
        let slope_on = (sw.value(55.0 + h) - sw.value(55.0)) / h;
        let slope_off = (sw.value(60.0) - sw.value(60.0 - h)) / h;
        assert!(slope_on.abs() < 1e-5, "slope at onset {}", slope_on);
        assert!(slope_off.abs() < 1e-5, "slope at cutoff {}", slope_off);
    }

    #[test]
    fn envelope_decreases_monotonically() {
        let sw = Switching::new(20.0, 25.0).unwrap();
        let values: Vec<f64> = (0..=50).map(|k| sw.value(20.0 + 0.1 * k as f64)).collect();
        assert!(values.windows(2).all(|w| w[1] <= w[0]));
    }

    #[test]
    fn multiplicative_scales_wrapped_function() {
        let sw = Switching::new(2.0, 4.0).unwrap();
        let f = sw.multiplicative(|r: f64, scale: f64| scale / r);
        assert_relative_eq!(f(1.0, 3.0), 3.0);
        assert_relative_eq!(f(3.0, 3.0), sw.value(3.0));
        assert_eq!(f(5.0, 3.0), 0.0);
    }

    #[test]
    fn rejects_inverted_radii() {
        assert!(matches!(Switching::new(25.0, 20.0), Err(Error::InvalidCutoff { .. })));
        assert!(Switching::new(0.0, 20.0).is_err());
        assert!(Switching::new(20.0, 20.0).is_err());
        assert!(Switching::new(20.0, f64::INFINITY).is_err());
    }
}
