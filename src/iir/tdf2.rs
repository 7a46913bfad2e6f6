use alloc::vec;
use alloc::vec::Vec;

use super::Filter;
use crate::coefficients::CoefficientSet;
use crate::sample::{Sample, Saturation};

/// Transposed Direct Form II
///
/// The canonical minimal-state transposed form, with `N` state registers:
///
/// ```text
/// y[n]   = b[0] x[n] + w[0]
/// w[i]   = w[i+1] + b[i+1] x[n] - a[i+1] y[n]     i = 0..N-2
/// w[N-1] = b[N] x[n] - a[N] y[n]
/// ```
///
/// The output is computed first and the new `y[n]` is what feeds the state update.  This
/// is the structure with the lowest roundoff sensitivity in fixed point.
///
/// # Examples
///
/// ```
/// use iir_forms::{CoefficientSet, Filter, Tdf2, Q24};
///
/// let set = CoefficientSet::new([0.5, 0.5], [1.0, 0.0]).unwrap();
/// let mut filter = Tdf2::<Q24>::new(&set);
/// let y = filter.run(&[Q24::from_real(1.0), Q24::from_real(1.0)]);
/// assert_eq!(y[0].to_real(), 0.5);
/// assert_eq!(y[1].to_real(), 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct Tdf2<T> {
    b: Vec<T>,
    a: Vec<T>,
    w: Vec<T>,
    saturation: Saturation,
}

impl<T: Sample> Tdf2<T> {
    pub fn new(coefficients: &CoefficientSet) -> Self {
        let (b, a) = coefficients.quantized::<T>();
        Self {
            b,
            a,
            w: vec![T::ZERO; coefficients.order()],
            saturation: Saturation::default(),
        }
    }

    pub fn order(&self) -> usize {
        self.w.len()
    }

    /// Current contents of the state registers
    pub fn state(&self) -> &[T] {
        &self.w
    }
}

impl<T: Sample> Filter<T> for Tdf2<T> {
    fn update(&mut self, x: T) -> T {
        let order = self.order();
        let sat = &mut self.saturation;
        if order == 0 {
            return T::ZERO.mul_add(self.b[0], x, sat);
        }

        let y = self.w[0].mul_add(self.b[0], x, sat);
        for i in 0..order - 1 {
            self.w[i] = self.w[i + 1]
                .mul_add(self.b[i + 1], x, sat)
                .mul_sub(self.a[i + 1], y, sat);
        }
        self.w[order - 1] = T::ZERO
            .mul_add(self.b[order], x, sat)
            .mul_sub(self.a[order], y, sat);
        y
    }

    fn reset(&mut self) {
        self.w.fill(T::ZERO);
        self.saturation.clear();
    }

    fn saturation(&self) -> Saturation {
        self.saturation
    }
}
