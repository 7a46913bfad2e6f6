use core::fmt;

use fixed::FixedI32;

/// A saturating fixed-point number with `F` fractional bits in a 32-bit container
///
/// This is the arithmetic a small fixed-point DSP core performs: every product is
/// computed at double width, shifted back down by `F` with rounding, and clamped to the
/// 32-bit range.  Sums are clamped the same way.  Nothing ever wraps, so an overflow
/// shows up as a bounded error instead of a sign flip.
///
/// Rounding is round-half-away-from-zero everywhere: on conversion from `f64` and on
/// the shift that follows a multiplication.
///
/// `Q<12>` ([`Q12`]) and `Q<24>` ([`Q24`]) are the two formats used by the precision
/// experiments.  Both share the 32-bit container, so `Q12` has integer headroom far
/// beyond its nominal `Q4.12` name.
///
/// # Examples
///
/// ```
/// use iir_forms::Q12;
///
/// let a = Q12::from_real(0.5);
/// let b = Q12::from_real(-0.25);
/// assert_eq!(a.saturating_mul(b).to_real(), -0.125);
///
/// // out of range values clamp to the rails instead of wrapping
/// assert_eq!(Q12::from_real(1e12), Q12::MAX);
/// assert_eq!(Q12::from_real(-1e12), Q12::MIN);
/// ```
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Q<const F: i32>(FixedI32<F>);

/// Which rail, if any, a saturating operation clamped to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Clamp {
    None,
    /// Clamped to `MAX`
    Overflow,
    /// Clamped to `MIN`
    Underflow,
}

/// `Q4.12` in a 32-bit container
pub type Q12 = Q<12>;

/// `Q8.24` in a 32-bit container
pub type Q24 = Q<24>;

impl<const F: i32> Q<F> {
    pub const ZERO: Self = Self(FixedI32::from_bits(0));
    pub const MAX: Self = Self(FixedI32::from_bits(i32::MAX));
    pub const MIN: Self = Self(FixedI32::from_bits(i32::MIN));

    /// Number of fractional bits
    pub const FRAC_BITS: i32 = F;

    /// Weight of the least significant bit, `2^-F`
    pub fn step() -> f64 {
        1.0 / Self::scale()
    }

    fn scale() -> f64 {
        (1i64 << F) as f64
    }

    pub const fn from_bits(bits: i32) -> Self {
        Self(FixedI32::from_bits(bits))
    }

    pub const fn to_bits(self) -> i32 {
        self.0.to_bits()
    }

    /// Quantize a real value: scale by `2^F`, round half away from zero, saturate
    ///
    /// `NaN` maps to zero and the infinities map to the rails.
    pub fn from_real(x: f64) -> Self {
        if x.is_nan() {
            return Self::ZERO;
        }
        Self::saturate_wide(libm::round(x * Self::scale()))
    }

    pub fn to_real(self) -> f64 {
        self.0.to_num::<f64>()
    }

    /// Clamp a wide intermediate into the container
    pub fn saturate(wide: i64) -> Self {
        Self::clamp_wide(wide).0
    }

    /// Like [`saturate`](Self::saturate), also reporting which rail was hit
    pub fn clamp_wide(wide: i64) -> (Self, Clamp) {
        if wide > i64::from(i32::MAX) {
            (Self::MAX, Clamp::Overflow)
        } else if wide < i64::from(i32::MIN) {
            (Self::MIN, Clamp::Underflow)
        } else {
            (Self::from_bits(wide as i32), Clamp::None)
        }
    }

    fn saturate_wide(scaled: f64) -> Self {
        if scaled >= i32::MAX as f64 {
            Self::MAX
        } else if scaled <= i32::MIN as f64 {
            Self::MIN
        } else {
            Self::from_bits(scaled as i32)
        }
    }

    pub fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    pub fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    /// Multiply with a 64-bit product, round the `F`-bit shift, then saturate
    pub fn saturating_mul(self, rhs: Self) -> Self {
        self.clamped_mul(rhs).0
    }

    /// Saturating add that also reports the rail it clamped to
    pub fn clamped_add(self, rhs: Self) -> (Self, Clamp) {
        match self.0.checked_add(rhs.0) {
            Some(sum) => (Self(sum), Clamp::None),
            None if rhs.0.is_negative() => (Self::MIN, Clamp::Underflow),
            None => (Self::MAX, Clamp::Overflow),
        }
    }

    /// Saturating subtract that also reports the rail it clamped to
    pub fn clamped_sub(self, rhs: Self) -> (Self, Clamp) {
        match self.0.checked_sub(rhs.0) {
            Some(difference) => (Self(difference), Clamp::None),
            None if rhs.0.is_negative() => (Self::MAX, Clamp::Overflow),
            None => (Self::MIN, Clamp::Underflow),
        }
    }

    /// Saturating multiply that also reports the rail it clamped to
    pub fn clamped_mul(self, rhs: Self) -> (Self, Clamp) {
        let product = i64::from(self.to_bits()) * i64::from(rhs.to_bits());
        Self::clamp_wide(round_shift(product, F))
    }

    /// True when the value sits on either rail of the container
    pub fn is_saturated(self) -> bool {
        self == Self::MAX || self == Self::MIN
    }
}

/// Arithmetic right shift rounding half away from zero
fn round_shift(value: i64, shift: i32) -> i64 {
    if shift <= 0 {
        return value << -shift;
    }
    let half = 1i64 << (shift - 1);
    if value >= 0 {
        (value + half) >> shift
    } else {
        -((-value + half) >> shift)
    }
}

impl<const F: i32> fmt::Debug for Q<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}({})", F, self.to_real())
    }
}

impl<const F: i32> fmt::Display for Q<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_real(), f)
    }
}
