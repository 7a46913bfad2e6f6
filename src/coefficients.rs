use alloc::borrow::Cow;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use crate::error::{Error, Result};
use crate::iir::Structure;
use crate::sample::Sample;

/// Numerator and denominator of an order-`N` transfer function
///
/// Both polynomials hold `N + 1` coefficients.  `a[0]` does not have to be one; the
/// structures always work on the set normalized by `a[0]`.
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientSet {
    b: Vec<f64>,
    a: Vec<f64>,
}

impl CoefficientSet {
    /// Validate and wrap a `(B, A)` pair
    ///
    /// Fails on empty or mismatched polynomials, a zero `a[0]` or a non-finite
    /// coefficient, before any sample is processed.
    pub fn new(b: impl Into<Vec<f64>>, a: impl Into<Vec<f64>>) -> Result<Self> {
        let b = b.into();
        let a = a.into();
        if b.is_empty() || a.is_empty() {
            return Err(Error::EmptyCoefficients);
        }
        if b.len() != a.len() {
            return Err(Error::LengthMismatch {
                b: b.len(),
                a: a.len(),
            });
        }
        if let Some(index) = b.iter().chain(a.iter()).position(|c| !c.is_finite()) {
            return Err(Error::NonFiniteCoefficient { index });
        }
        if a[0] == 0.0 {
            return Err(Error::ZeroLeadingDenominator);
        }
        Ok(Self { b, a })
    }

    /// Filter order `N`
    pub fn order(&self) -> usize {
        self.b.len() - 1
    }

    pub fn b(&self) -> &[f64] {
        &self.b
    }

    pub fn a(&self) -> &[f64] {
        &self.a
    }

    /// Coefficients divided by `a[0]`, so the returned `a[0]` is exactly one
    pub fn normalized(&self) -> (Vec<f64>, Vec<f64>) {
        let x = 1.0 / self.a[0];
        (
            self.b.iter().map(|c| c * x).collect(),
            self.a.iter().map(|c| c * x).collect(),
        )
    }

    /// Normalize in `f64`, then quantize into the sample representation
    pub fn quantized<T: Sample>(&self) -> (Vec<T>, Vec<T>) {
        let (b, a) = self.normalized();
        let (b, a) = (cast::<T>(&b), cast::<T>(&a));
        let clipped = b.iter().chain(a.iter()).filter(|c| c.is_saturated()).count();
        if clipped > 0 {
            log::warn!("{} coefficients saturated during quantization", clipped);
        }
        (b, a)
    }
}

fn cast<T: Sample>(values: &[f64]) -> Vec<T> {
    crate::sample::quantize(values)
}

/// One biquad stage `[b0, b1, b2, a0, a1, a2]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SosSection {
    b: [f64; 3],
    a: [f64; 3],
}

impl SosSection {
    /// Build a section from one row of an SOS matrix
    pub fn new(row: [f64; 6]) -> Result<Self> {
        if let Some(index) = row.iter().position(|c| !c.is_finite()) {
            return Err(Error::NonFiniteCoefficient { index });
        }
        if row[3] == 0.0 {
            return Err(Error::ZeroLeadingDenominator);
        }
        Ok(Self {
            b: [row[0], row[1], row[2]],
            a: [row[3], row[4], row[5]],
        })
    }

    pub fn b(&self) -> [f64; 3] {
        self.b
    }

    pub fn a(&self) -> [f64; 3] {
        self.a
    }

    /// `(b0, b1, b2, a1, a2)` divided by `a0`
    pub fn normalized(&self) -> (f64, f64, f64, f64, f64) {
        let x = 1.0 / self.a[0];
        (
            self.b[0] * x,
            self.b[1] * x,
            self.b[2] * x,
            self.a[1] * x,
            self.a[2] * x,
        )
    }
}

/// An ordered chain of second-order sections
///
/// Stage `i` feeds stage `i + 1`; the order is fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct SosFilter {
    sections: Vec<SosSection>,
}

impl SosFilter {
    pub fn new(sections: impl Into<Vec<SosSection>>) -> Result<Self> {
        let sections = sections.into();
        if sections.is_empty() {
            return Err(Error::EmptyCascade);
        }
        Ok(Self { sections })
    }

    /// Build a chain from SOS matrix rows, reporting which row is malformed
    pub fn from_rows(rows: &[[f64; 6]]) -> Result<Self> {
        let sections = rows
            .iter()
            .enumerate()
            .map(|(section, row)| {
                SosSection::new(*row).map_err(|e| match e {
                    Error::ZeroLeadingDenominator => Error::ZeroSectionDenominator { section },
                    Error::NonFiniteCoefficient { index } => Error::NonFiniteCoefficient {
                        index: section * 6 + index,
                    },
                    other => other,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(sections)
    }

    pub fn sections(&self) -> &[SosSection] {
        &self.sections
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Multiply the sections out into a single `(B, A)` pair
    ///
    /// The result has order `2 * len()`; sections whose trailing coefficients are zero
    /// leave trailing zeros in place rather than lowering the order.
    pub fn to_coefficients(&self) -> Result<CoefficientSet> {
        let mut b = vec![1.0];
        let mut a = vec![1.0];
        for section in &self.sections {
            b = convolve(&b, &section.b);
            a = convolve(&a, &section.a);
        }
        CoefficientSet::new(b, a)
    }
}

fn convolve(p: &[f64], q: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; p.len() + q.len() - 1];
    for (i, &x) in p.iter().enumerate() {
        for (j, &y) in q.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

/// What an external filter designer hands over for one filter
///
/// A design carries a BA pair, an SOS chain, or both.  DF1, DF2 and TDF2 run from the BA
/// pair, falling back to expanding the SOS chain.  The cascade needs the SOS chain; it is
/// never derived from a BA pair.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterDesign {
    name: Option<String>,
    ba: Option<CoefficientSet>,
    sos: Option<SosFilter>,
}

impl FilterDesign {
    pub fn new(ba: CoefficientSet, sos: SosFilter) -> Self {
        Self {
            name: None,
            ba: Some(ba),
            sos: Some(sos),
        }
    }

    pub fn from_ba(ba: CoefficientSet) -> Self {
        Self {
            name: None,
            ba: Some(ba),
            sos: None,
        }
    }

    pub fn from_sos(sos: SosFilter) -> Self {
        Self {
            name: None,
            ba: None,
            sos: Some(sos),
        }
    }

    /// Consume design and return it labelled, e.g. `butter_order4_cut1000`
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The BA pair, expanded from the SOS chain when none was supplied
    pub fn ba(&self) -> Result<Cow<'_, CoefficientSet>> {
        match (&self.ba, &self.sos) {
            (Some(ba), _) => Ok(Cow::Borrowed(ba)),
            (None, Some(sos)) => sos.to_coefficients().map(Cow::Owned),
            (None, None) => Err(Error::EmptyCoefficients),
        }
    }

    pub fn sos(&self) -> Result<&SosFilter> {
        self.sos.as_ref().ok_or(Error::Unsupported {
            structure: Structure::Cascade,
            reason: "design has no second-order sections",
        })
    }
}
