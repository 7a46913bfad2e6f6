use alloc::vec::Vec;

use super::{DelayLine, Filter};
use crate::coefficients::CoefficientSet;
use crate::sample::{Sample, Saturation};

/// Direct Form II
///
/// A single delay line `w` of length `N` shared by both halves of the filter:
///
/// ```text
/// w[n] = x[n] - sum(a[i] * w[n-i]),  i = 1..=N
/// y[n] = sum(b[i] * w[n-i]),         i = 0..=N
/// ```
///
/// Coefficients are normalized by `a[0]`.  The history is a ring buffer, so the state is
/// `N` samples no matter how long the input is.
#[derive(Debug, Clone)]
pub struct Df2<T> {
    b: Vec<T>,
    a: Vec<T>,
    w: DelayLine<T>,
    saturation: Saturation,
}

impl<T: Sample> Df2<T> {
    pub fn new(coefficients: &CoefficientSet) -> Self {
        let (b, a) = coefficients.quantized::<T>();
        Self {
            b,
            a,
            w: DelayLine::new(coefficients.order()),
            saturation: Saturation::default(),
        }
    }

    pub fn order(&self) -> usize {
        self.b.len() - 1
    }
}

impl<T: Sample> Filter<T> for Df2<T> {
    fn update(&mut self, x: T) -> T {
        let order = self.order();
        let sat = &mut self.saturation;
        let mut w = x;
        for i in 1..=order {
            w = w.mul_sub(self.a[i], self.w.get(i), sat);
        }
        let mut y = T::ZERO.mul_add(self.b[0], w, sat);
        for i in 1..=order {
            y = y.mul_add(self.b[i], self.w.get(i), sat);
        }
        self.w.push(w);
        y
    }

    fn reset(&mut self) {
        self.w.clear();
        self.saturation.clear();
    }

    fn saturation(&self) -> Saturation {
        self.saturation
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::fixed_point::{Q12, Q24};
    use crate::iir::Df1;
    use approx::assert_abs_diff_eq;

    #[test]
    fn identity_passes_impulse() {
        let set = CoefficientSet::new([1.0], [1.0]).unwrap();
        let mut impulse = vec![0.0; 32];
        impulse[0] = 1.0;
        let y = Df2::<f64>::new(&set).run(&impulse);
        assert_eq!(y, impulse);
    }

    #[test]
    fn matches_direct_form_one() {
        let set = CoefficientSet::new([0.1, 0.3, 0.3, 0.1], [1.0, -0.6, 0.3, -0.05]).unwrap();
        let input: Vec<f64> = (0..200).map(|n| ((n * 7) % 13) as f64 / 13.0 - 0.5).collect();
        let df1 = Df1::<f64>::new(&set).run(&input);
        let df2 = Df2::<f64>::new(&set).run(&input);
        for (a, b) in df1.iter().zip(&df2) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-12);
        }
    }

    #[test]
    fn fixed_point_saturates_on_unstable_feedback() {
        // pole outside the unit circle, the float version diverges
        let set = CoefficientSet::new([1.0, 0.0], [1.0, -2.0]).unwrap();
        let input = [Q12::from_real(1.0); 200];
        let mut filter = Df2::<Q12>::new(&set);
        let y = filter.run(&input);
        assert_eq!(*y.last().unwrap(), Q12::MAX);
        assert!(y.iter().all(|v| v.to_real() > 0.0));
        assert!(filter.saturation().overflow > 0);
    }

    #[test]
    fn counts_clamps_in_the_state_register() {
        // w[n] = x[n] + w[n-1] runs into the Q24 rail while every output
        // y[n] = w[n] - w[n-1] stays inside the range
        let set = CoefficientSet::new([1.0, -1.0], [1.0, -1.0]).unwrap();
        let mut filter = Df2::<Q24>::new(&set);
        let y = filter.run(&[Q24::from_real(100.0); 4]);
        assert!(y.iter().all(|v| !v.is_saturated()));
        assert_eq!(y[0].to_real(), 100.0);
        assert!(filter.saturation().overflow >= 2);
    }
}
