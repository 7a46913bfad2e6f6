use core::fmt;

/// Largest finite binary16 value
const MAX_FINITE: f32 = 65504.0;

/// Magnitudes at or above this round to infinity in binary16
const OVERFLOW: f64 = 65520.0;

/// Smallest normal binary16 value, `2^-14`
const MIN_NORMAL: f64 = 6.103_515_625e-5;

/// Subnormal quantum, `2^24` as a scale
const SUBNORMAL_SCALE: f64 = 16_777_216.0;

/// Mask of the f64 mantissa bits binary16 does not keep
const DROPPED_BITS: u64 = (1 << 42) - 1;

/// A 16-bit IEEE floating point sample emulated in an `f32`
///
/// Every value held is exactly representable as binary16 and every arithmetic result is
/// rounded to the nearest binary16 value (ties to even).  Magnitudes past the binary16
/// range become infinite and subnormals are kept.  Sums, differences and products of two
/// binary16 values are exact in `f64` and rounded once from there, as is conversion from
/// `f64`, so every result matches native half precision bit for bit.
///
/// # Examples
///
/// ```
/// use iir_forms::F16;
///
/// assert_eq!(F16::from_f32(1.0).to_f32(), 1.0);
/// // 1 + 2^-11 is a tie between 1 and 1 + 2^-10 and rounds to even
/// assert_eq!(F16::from_f32(1.0 + 1.0 / 2048.0).to_f32(), 1.0);
/// assert!(F16::from_f32(70000.0).to_f32().is_infinite());
/// ```
#[derive(Clone, Copy, Default, PartialEq, PartialOrd)]
pub struct F16(f32);

impl F16 {
    pub const ZERO: Self = Self(0.0);
    pub const MAX: Self = Self(MAX_FINITE);

    pub fn from_f32(x: f32) -> Self {
        Self(quantize(f64::from(x)))
    }

    /// Round an `f64` straight to binary16, never through `f32`
    pub fn from_f64(x: f64) -> Self {
        Self(quantize(x))
    }

    pub fn to_f32(self) -> f32 {
        self.0
    }

    pub fn to_f64(self) -> f64 {
        f64::from(self.0)
    }

    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    pub fn add(self, rhs: Self) -> Self {
        Self::from_f64(self.to_f64() + rhs.to_f64())
    }

    pub fn sub(self, rhs: Self) -> Self {
        Self::from_f64(self.to_f64() - rhs.to_f64())
    }

    pub fn mul(self, rhs: Self) -> Self {
        Self::from_f64(self.to_f64() * rhs.to_f64())
    }
}

/// Round an `f64` to the nearest binary16 value, held in an `f32`
fn quantize(x: f64) -> f32 {
    if !x.is_finite() {
        return x as f32;
    }
    let magnitude = libm::fabs(x);
    if magnitude >= OVERFLOW {
        return if x < 0.0 {
            f32::NEG_INFINITY
        } else {
            f32::INFINITY
        };
    }
    if magnitude < MIN_NORMAL {
        return (libm::rint(x * SUBNORMAL_SCALE) / SUBNORMAL_SCALE) as f32;
    }
    // round to nearest even on the 10 kept mantissa bits
    let bits = x.to_bits();
    let lsb = (bits >> 42) & 1;
    let rounded = (bits + (DROPPED_BITS >> 1) + lsb) & !DROPPED_BITS;
    f64::from_bits(rounded) as f32
}

impl fmt::Debug for F16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "F16({})", self.0)
    }
}

impl fmt::Display for F16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn exact_values_survive() {
        for x in [0.0, 1.0, -1.0, 0.5, 1024.0, MAX_FINITE, -MAX_FINITE, MIN_NORMAL as f32] {
            assert_eq!(F16::from_f32(x).to_f32(), x);
        }
    }

    #[test]
    fn rounds_to_ten_mantissa_bits() {
        // spacing above 1.0 is 2^-10
        let ulp = 1.0 / 1024.0;
        assert_eq!(F16::from_f32(1.0 + 0.4 * ulp).to_f32(), 1.0);
        assert_eq!(F16::from_f32(1.0 + 0.6 * ulp).to_f32(), 1.0 + ulp);
        // tie on an odd mantissa rounds up to even
        assert_eq!(F16::from_f32(1.0 + 1.5 * ulp).to_f32(), 1.0 + 2.0 * ulp);
        assert_eq!(F16::from_f32(0.1).to_f32(), 0.099_975_586);
    }

    #[test]
    fn overflow_becomes_infinite() {
        assert_eq!(F16::from_f32(65519.0).to_f32(), MAX_FINITE);
        assert_eq!(F16::from_f32(65520.0).to_f32(), f32::INFINITY);
        assert_eq!(F16::from_f32(-1e6).to_f32(), f32::NEG_INFINITY);
        assert!(!F16::MAX.mul(F16::from_f32(2.0)).is_finite());
    }

    #[test]
    fn subnormals_are_kept() {
        let smallest = (1.0 / SUBNORMAL_SCALE) as f32;
        assert_eq!(F16::from_f32(smallest).to_f32(), smallest);
        assert_eq!(F16::from_f32(0.4 * smallest).to_f32(), 0.0);
        assert_eq!(F16::from_f32(3.0 * smallest).to_f32(), 3.0 * smallest);
    }

    #[test]
    fn narrows_from_f64_in_one_rounding() {
        // just above the tie between 1 and 1 + 2^-10; going through f32 first would
        // land exactly on the tie and round down to 1
        let x = 1.0 + 2f64.powi(-11) + 2f64.powi(-40);
        assert_eq!(x as f32, 1.0 + 1.0 / 2048.0);
        assert_eq!(F16::from_f64(x).to_f32(), 1.0 + 1.0 / 1024.0);
        assert_eq!(F16::from_f64(1.0 + 2f64.powi(-11)).to_f32(), 1.0);
        assert_eq!(F16::from_f64(-65519.0).to_f32(), -MAX_FINITE);
        assert!(F16::from_f64(f64::NAN).to_f32().is_nan());
    }

    #[test]
    fn arithmetic_is_rounded() {
        let a = F16::from_f32(2048.0);
        let b = F16::from_f32(1.0);
        // 2049 is not representable, spacing at 2048 is 2
        assert_eq!(a.add(b).to_f32(), 2048.0);
        assert_eq!(a.sub(b).to_f32(), 2047.0);
        assert_eq!(F16::from_f32(3.0).mul(F16::from_f32(0.5)).to_f32(), 1.5);
    }
}
