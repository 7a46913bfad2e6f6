use alloc::string::ToString;
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

use crate::coefficients::FilterDesign;
use crate::error::{Error, Result};
use crate::fixed_point::{Q12, Q24};
use crate::half::F16;
use crate::iir::{AnyFilter, Filter, Structure};
use crate::sample::{self, Sample, Saturation};

/// The numeric representation a filter runs in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Representation {
    F64,
    F32,
    F16,
    Q12,
    Q24,
}

impl Representation {
    pub const ALL: [Representation; 5] = [
        Representation::F64,
        Representation::F32,
        Representation::F16,
        Representation::Q12,
        Representation::Q24,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Representation::F64 => "float64",
            Representation::F32 => "float32",
            Representation::F16 => "float16",
            Representation::Q12 => "q12",
            Representation::Q24 => "q24",
        }
    }

    pub fn is_fixed_point(self) -> bool {
        matches!(self, Representation::Q12 | Representation::Q24)
    }
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Representation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Representation::ALL
            .into_iter()
            .find(|r| r.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownRepresentation(s.to_string()))
    }
}

/// Output of one run, widened back to `f64`
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutput {
    pub samples: Vec<f64>,
    /// Output samples pinned at a fixed-point rail
    pub saturated: usize,
    /// Every clamp inside the structure during the run, including ones that never
    /// reached the output
    pub saturation: Saturation,
}

/// Runs one structure in one representation over one input sequence
///
/// The runner holds only its configuration.  Every call builds a fresh filter with zero
/// state, so successive runs, or runs on other threads, never share history.
///
/// # Examples
///
/// ```
/// use iir_forms::{CoefficientSet, FilterDesign, FilterRunner, Representation, Structure};
///
/// let design = FilterDesign::from_ba(CoefficientSet::new([0.5, 0.5], [1.0, 0.0]).unwrap());
/// let runner = FilterRunner::new(Structure::Df2, Representation::Q12);
/// let y = runner.run(&design, &[1.0, 0.0, 0.0]).unwrap();
/// assert_eq!(y, vec![0.5, 0.5, 0.0]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterRunner {
    structure: Structure,
    representation: Representation,
}

impl FilterRunner {
    pub fn new(structure: Structure, representation: Representation) -> Self {
        Self {
            structure,
            representation,
        }
    }

    pub fn structure(&self) -> Structure {
        self.structure
    }

    pub fn representation(&self) -> Representation {
        self.representation
    }

    /// Quantize the input, filter it in the configured representation, and widen the output
    pub fn run(&self, design: &FilterDesign, input: &[f64]) -> Result<Vec<f64>> {
        self.run_counted(design, input).map(|output| output.samples)
    }

    /// Like [`run`](Self::run), also reporting saturation
    pub fn run_counted(&self, design: &FilterDesign, input: &[f64]) -> Result<RunOutput> {
        log::debug!(
            "running {} in {} over {} samples{}",
            self.structure,
            self.representation,
            input.len(),
            design.name().map(|n| alloc::format!(" ({})", n)).unwrap_or_default()
        );
        let output = match self.representation {
            Representation::F64 => self.widen::<f64>(design, input),
            Representation::F32 => self.widen::<f32>(design, input),
            Representation::F16 => self.widen::<F16>(design, input),
            Representation::Q12 => self.widen::<Q12>(design, input),
            Representation::Q24 => self.widen::<Q24>(design, input),
        }?;
        if output.saturation.total() > 0 {
            log::trace!(
                "{} in {}: {} overflows, {} underflows, {} saturated output samples",
                self.structure,
                self.representation,
                output.saturation.overflow,
                output.saturation.underflow,
                output.saturated
            );
        }
        Ok(output)
    }

    fn widen<T: Sample>(&self, design: &FilterDesign, input: &[f64]) -> Result<RunOutput> {
        let mut filter = AnyFilter::<T>::new(self.structure, design)?;
        let y = filter.run(&sample::quantize::<T>(input));
        Ok(RunOutput {
            saturated: y.iter().filter(|v| v.is_saturated()).count(),
            saturation: filter.saturation(),
            samples: y.into_iter().map(Sample::to_f64).collect(),
        })
    }
}
