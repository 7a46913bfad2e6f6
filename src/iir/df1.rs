use alloc::vec::Vec;

use super::{DelayLine, Filter};
use crate::coefficients::CoefficientSet;
use crate::sample::{Sample, Saturation};

/// Direct Form I
///
/// `y[n] = sum(b[i] * x[n-i]) - sum(a[i] * y[n-i])` with coefficients normalized by
/// `a[0]`.  Keeps the last `N` inputs and the last `N` outputs.  Every product and every
/// partial sum is rounded in `T`, feed-forward terms first, then feedback terms.
///
/// # Examples
///
/// ```
/// use iir_forms::{CoefficientSet, Df1, Filter};
///
/// // y[n] = x[n] + 0.5 y[n-1]
/// let set = CoefficientSet::new([1.0, 0.0], [1.0, -0.5]).unwrap();
/// let mut filter = Df1::<f64>::new(&set);
/// assert_eq!(filter.run(&[1.0, 0.0, 0.0]), vec![1.0, 0.5, 0.25]);
/// ```
#[derive(Debug, Clone)]
pub struct Df1<T> {
    b: Vec<T>,
    a: Vec<T>,
    x: DelayLine<T>,
    y: DelayLine<T>,
    saturation: Saturation,
}

impl<T: Sample> Df1<T> {
    pub fn new(coefficients: &CoefficientSet) -> Self {
        let (b, a) = coefficients.quantized::<T>();
        let order = coefficients.order();
        Self {
            b,
            a,
            x: DelayLine::new(order),
            y: DelayLine::new(order),
            saturation: Saturation::default(),
        }
    }

    pub fn order(&self) -> usize {
        self.b.len() - 1
    }
}

impl<T: Sample> Filter<T> for Df1<T> {
    fn update(&mut self, x: T) -> T {
        let order = self.order();
        let sat = &mut self.saturation;
        let mut acc = T::ZERO.mul_add(self.b[0], x, sat);
        for i in 1..=order {
            acc = acc.mul_add(self.b[i], self.x.get(i), sat);
        }
        for i in 1..=order {
            acc = acc.mul_sub(self.a[i], self.y.get(i), sat);
        }

        // update the FIFOs
        self.x.push(x);
        self.y.push(acc);
        acc
    }

    fn reset(&mut self) {
        self.x.clear();
        self.y.clear();
        self.saturation.clear();
    }

    fn saturation(&self) -> Saturation {
        self.saturation
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::fixed_point::Q24;
    use approx::assert_abs_diff_eq;

    #[test]
    fn normalizes_by_a0() {
        // same filter as y[n] = 0.5 x[n] + 0.5 y[n-1], scaled by 2
        let set = CoefficientSet::new([1.0, 0.0], [2.0, -1.0]).unwrap();
        let mut filter = Df1::<f64>::new(&set);
        let y = filter.run(&[1.0, 0.0, 0.0, 0.0]);
        assert_eq!(y, vec![0.5, 0.25, 0.125, 0.0625]);
    }

    #[test]
    fn fir_only_is_a_moving_sum() {
        let set = CoefficientSet::new([1.0, 1.0, 1.0], [1.0, 0.0, 0.0]).unwrap();
        let mut filter = Df1::<f64>::new(&set);
        let y = filter.run(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(y, vec![1.0, 3.0, 6.0, 9.0]);
    }

    #[test]
    fn fixed_point_tracks_float() {
        let set = CoefficientSet::new([0.25, 0.5, 0.25], [1.0, -0.5, 0.125]).unwrap();
        let input: Vec<f64> = (0..64).map(|n| if n % 8 < 4 { 0.5 } else { -0.5 }).collect();
        let reference = Df1::<f64>::new(&set).run(&input);
        let quantized: Vec<Q24> = input.iter().map(|&x| Q24::from_real(x)).collect();
        let fixed = Df1::<Q24>::new(&set).run(&quantized);
        for (r, q) in reference.iter().zip(fixed) {
            assert_abs_diff_eq!(*r, q.to_real(), epsilon = 1e-6);
        }
    }

    #[test]
    fn counts_partial_sums_that_recover() {
        // y[n] = 100 x[n] - 50 x[n-1]: once x reaches 1.5 the first product clamps and
        // the second term pulls the sum back in range
        let set = CoefficientSet::new([100.0, -50.0], [1.0, 0.0]).unwrap();
        let mut filter = Df1::<Q24>::new(&set);
        let input = [0.5, 1.5, 1.5, 1.5].map(Q24::from_real);
        let y = filter.run(&input);
        assert_eq!(y[0].to_real(), 50.0);
        assert!(y.iter().all(|v| !v.is_saturated()));
        assert_eq!(filter.saturation().overflow, 3);
        assert_eq!(filter.saturation().underflow, 0);

        filter.reset();
        assert_eq!(filter.saturation(), Saturation::default());
    }

    #[test]
    fn run_starts_from_rest() {
        let set = CoefficientSet::new([1.0, 0.0], [1.0, -0.9]).unwrap();
        let mut filter = Df1::<f32>::new(&set);
        let first = filter.run(&[1.0; 16]);
        let second = filter.run(&[1.0; 16]);
        assert_eq!(first, second);
    }
}
