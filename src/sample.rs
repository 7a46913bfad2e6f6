use core::fmt::Debug;

use crate::fixed_point::{Clamp, Q};
use crate::half::F16;

/// Saturation events counted while a filter runs
///
/// Every clamped add, subtract or multiply is one event, whether or not the clamped
/// value later makes it to the output.  Overflow counts clamps to the top rail and
/// underflow clamps to the bottom rail.  The counts live in the filter's own state and
/// are cleared with it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Saturation {
    pub overflow: usize,
    pub underflow: usize,
}

impl Saturation {
    pub fn total(&self) -> usize {
        self.overflow + self.underflow
    }

    pub fn record(&mut self, clamp: Clamp) {
        match clamp {
            Clamp::None => {}
            Clamp::Overflow => self.overflow += 1,
            Clamp::Underflow => self.underflow += 1,
        }
    }

    /// Clear both counts
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl core::ops::Add for Saturation {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            overflow: self.overflow + rhs.overflow,
            underflow: self.underflow + rhs.underflow,
        }
    }
}

impl core::iter::Sum for Saturation {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, s| acc + s)
    }
}

/// The arithmetic primitive a filter structure runs on
///
/// Every structure is written once against this trait.  Swapping the sample type changes
/// how each multiply and add is rounded, and nothing else.  Fixed-point samples round and
/// saturate after every single operation, so accumulation error builds up term by term
/// the way it does on a fixed-point DSP.  Each clamp is recorded in `sat`; floating point
/// never clamps and leaves it alone.
pub trait Sample: Copy + Debug + PartialEq {
    const ZERO: Self;

    /// Quantize a real value into this representation
    fn from_f64(x: f64) -> Self;

    /// Widen back to a real value for comparison
    fn to_f64(self) -> f64;

    fn add(self, rhs: Self, sat: &mut Saturation) -> Self;

    fn sub(self, rhs: Self, sat: &mut Saturation) -> Self;

    fn mul(self, rhs: Self, sat: &mut Saturation) -> Self;

    /// `self + a * b`, rounded after the product and again after the sum
    fn mul_add(self, a: Self, b: Self, sat: &mut Saturation) -> Self {
        self.add(a.mul(b, sat), sat)
    }

    /// `self - a * b`, rounded after the product and again after the difference
    fn mul_sub(self, a: Self, b: Self, sat: &mut Saturation) -> Self {
        self.sub(a.mul(b, sat), sat)
    }

    /// True when the value is pinned at a saturation rail
    ///
    /// Floating point never saturates, it overflows to infinity instead.
    fn is_saturated(self) -> bool {
        false
    }
}

impl Sample for f64 {
    const ZERO: Self = 0.0;

    fn from_f64(x: f64) -> Self {
        x
    }

    fn to_f64(self) -> f64 {
        self
    }

    fn add(self, rhs: Self, _: &mut Saturation) -> Self {
        self + rhs
    }

    fn sub(self, rhs: Self, _: &mut Saturation) -> Self {
        self - rhs
    }

    fn mul(self, rhs: Self, _: &mut Saturation) -> Self {
        self * rhs
    }
}

impl Sample for f32 {
    const ZERO: Self = 0.0;

    fn from_f64(x: f64) -> Self {
        x as f32
    }

    fn to_f64(self) -> f64 {
        f64::from(self)
    }

    fn add(self, rhs: Self, _: &mut Saturation) -> Self {
        self + rhs
    }

    fn sub(self, rhs: Self, _: &mut Saturation) -> Self {
        self - rhs
    }

    fn mul(self, rhs: Self, _: &mut Saturation) -> Self {
        self * rhs
    }
}

impl Sample for F16 {
    const ZERO: Self = F16::ZERO;

    fn from_f64(x: f64) -> Self {
        F16::from_f64(x)
    }

    fn to_f64(self) -> f64 {
        F16::to_f64(self)
    }

    fn add(self, rhs: Self, _: &mut Saturation) -> Self {
        F16::add(self, rhs)
    }

    fn sub(self, rhs: Self, _: &mut Saturation) -> Self {
        F16::sub(self, rhs)
    }

    fn mul(self, rhs: Self, _: &mut Saturation) -> Self {
        F16::mul(self, rhs)
    }
}

impl<const F: i32> Sample for Q<F> {
    const ZERO: Self = Q::<F>::ZERO;

    fn from_f64(x: f64) -> Self {
        Q::from_real(x)
    }

    fn to_f64(self) -> f64 {
        self.to_real()
    }

    fn add(self, rhs: Self, sat: &mut Saturation) -> Self {
        let (sum, clamp) = self.clamped_add(rhs);
        sat.record(clamp);
        sum
    }

    fn sub(self, rhs: Self, sat: &mut Saturation) -> Self {
        let (difference, clamp) = self.clamped_sub(rhs);
        sat.record(clamp);
        difference
    }

    fn mul(self, rhs: Self, sat: &mut Saturation) -> Self {
        let (product, clamp) = self.clamped_mul(rhs);
        sat.record(clamp);
        product
    }

    fn is_saturated(self) -> bool {
        Q::is_saturated(self)
    }
}

/// Quantize a slice of real values
pub fn quantize<T: Sample>(values: &[f64]) -> alloc::vec::Vec<T> {
    values.iter().map(|&x| T::from_f64(x)).collect()
}
