use alloc::vec::Vec;

use crate::coefficients::FilterDesign;
use crate::error::Result;
use crate::iir::Structure;
use crate::runner::{FilterRunner, Representation};
use crate::sample::Saturation;

/// One entry of an error vector
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ErrorSample {
    /// `reference - candidate`
    Finite(f64),
    /// Either side was infinite or NaN at this sample
    NonFinite,
}

impl ErrorSample {
    pub fn new(reference: f64, candidate: f64) -> Self {
        let error = reference - candidate;
        if reference.is_finite() && candidate.is_finite() && error.is_finite() {
            ErrorSample::Finite(error)
        } else {
            ErrorSample::NonFinite
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            ErrorSample::Finite(e) => Some(e),
            ErrorSample::NonFinite => None,
        }
    }
}

/// Summary statistics over the finite entries of an error vector
///
/// Non-finite entries are counted but never enter the moments.  With no finite entries
/// at all the moments are zero and `finite` is zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ErrorStats {
    pub finite: usize,
    pub non_finite: usize,
    /// Signed mean error
    pub mean: f64,
    /// Mean absolute error
    pub mean_abs: f64,
    /// Root mean square error
    pub rms: f64,
    pub max_abs: f64,
}

impl ErrorStats {
    /// Summarize any slice of an error vector
    pub fn from_errors(errors: &[ErrorSample]) -> Self {
        let mut stats = ErrorStats::default();
        let (mut sum, mut sum_abs, mut sum_sq) = (0.0, 0.0, 0.0);
        for e in errors {
            match e.value() {
                Some(e) => {
                    stats.finite += 1;
                    sum += e;
                    sum_abs += libm::fabs(e);
                    sum_sq += e * e;
                    stats.max_abs = libm::fmax(stats.max_abs, libm::fabs(e));
                }
                None => stats.non_finite += 1,
            }
        }
        if stats.finite > 0 {
            let n = stats.finite as f64;
            stats.mean = sum / n;
            stats.mean_abs = sum_abs / n;
            stats.rms = libm::sqrt(sum_sq / n);
        }
        stats
    }

    pub fn total(&self) -> usize {
        self.finite + self.non_finite
    }
}

/// Result of one reference/candidate comparison
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Comparison {
    pub reference: Vec<f64>,
    pub candidate: Vec<f64>,
    pub errors: Vec<ErrorSample>,
    pub stats: ErrorStats,
    /// Candidate output samples pinned at a fixed-point rail
    pub saturated: usize,
    /// Clamps inside the candidate structure, wherever they happened
    pub saturation: Saturation,
}

impl Comparison {
    /// Statistics over the first `len` samples only
    pub fn stats_over(&self, len: usize) -> ErrorStats {
        ErrorStats::from_errors(&self.errors[..len.min(self.errors.len())])
    }
}

/// Diffs a reduced-precision run against an `f64` reference run
///
/// By default the reference is the same structure as the candidate, so the error isolates
/// the effect of the representation.  [`with_reference`](Self::with_reference) compares
/// against a different structure instead.
///
/// # Examples
///
/// ```
/// use iir_forms::{
///     signal, CoefficientSet, FilterDesign, PrecisionComparator, Representation, Structure,
/// };
///
/// let set = CoefficientSet::new([0.2, 0.4, 0.2], [1.0, -0.6, 0.2]).unwrap();
/// let design = FilterDesign::from_ba(set);
/// let comparator = PrecisionComparator::new(Structure::Tdf2, Representation::Q24);
/// let comparison = comparator.compare(&design, &signal::impulse(256)).unwrap();
/// assert_eq!(comparison.errors.len(), 256);
/// assert!(comparison.stats.rms < 1e-5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrecisionComparator {
    candidate: FilterRunner,
    reference: FilterRunner,
}

impl PrecisionComparator {
    pub fn new(structure: Structure, representation: Representation) -> Self {
        Self {
            candidate: FilterRunner::new(structure, representation),
            reference: FilterRunner::new(structure, Representation::F64),
        }
    }

    /// Consume comparator and return one whose reference runs `structure` at `f64`
    pub fn with_reference(mut self, structure: Structure) -> Self {
        self.reference = FilterRunner::new(structure, Representation::F64);
        self
    }

    pub fn candidate(&self) -> FilterRunner {
        self.candidate
    }

    pub fn reference(&self) -> FilterRunner {
        self.reference
    }

    /// Run both passes over `input` and diff them sample by sample
    pub fn compare(&self, design: &FilterDesign, input: &[f64]) -> Result<Comparison> {
        let reference = self.reference.run(design, input)?;
        let candidate = self.candidate.run_counted(design, input)?;
        let errors: Vec<ErrorSample> = reference
            .iter()
            .zip(&candidate.samples)
            .map(|(&r, &c)| ErrorSample::new(r, c))
            .collect();
        let stats = ErrorStats::from_errors(&errors);

        if candidate.saturation.total() > 0 {
            log::warn!(
                "{} in {}: {} overflows and {} underflows saturated",
                self.candidate.structure(),
                self.candidate.representation(),
                candidate.saturation.overflow,
                candidate.saturation.underflow
            );
        }
        if stats.non_finite > 0 {
            log::warn!(
                "{} in {}: {} of {} samples are not finite",
                self.candidate.structure(),
                self.candidate.representation(),
                stats.non_finite,
                stats.total()
            );
        }
        log::debug!(
            "{} in {} vs {}: mae {:e}, rms {:e}",
            self.candidate.structure(),
            self.candidate.representation(),
            self.reference.structure(),
            stats.mean_abs,
            stats.rms
        );

        Ok(Comparison {
            reference,
            candidate: candidate.samples,
            errors,
            stats,
            saturated: candidate.saturated,
            saturation: candidate.saturation,
        })
    }
}
