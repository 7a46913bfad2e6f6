//! Streaming IIR filter structures
//!
//! Direct Form I, Direct Form II and Transposed Direct Form II realize the same transfer
//! function with different internal state, and so accumulate rounding error differently.
//! The second-order-section cascade lives in [`crate::biquad`].

mod df1;
mod df2;
mod tdf2;

pub use df1::Df1;
pub use df2::Df2;
pub use tdf2::Tdf2;

use alloc::string::ToString;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

use crate::biquad::Cascade;
use crate::coefficients::FilterDesign;
use crate::error::{Error, Result};
use crate::sample::{Sample, Saturation};

/// A structure that streams one sample at a time through its internal state
pub trait Filter<T: Sample> {
    /// Add a new input sample and get the resulting output
    fn update(&mut self, x: T) -> T;

    /// Zero all internal state, saturation counts included
    fn reset(&mut self);

    /// Saturation events since the last reset
    fn saturation(&self) -> Saturation;

    /// Filter a whole sequence from zero initial state
    ///
    /// The state is cleared before the first sample, so repeated runs over the same
    /// filter never see each other's history.
    fn run(&mut self, input: &[T]) -> Vec<T> {
        self.reset();
        input.iter().map(|&x| self.update(x)).collect()
    }
}

/// The closed set of filter structures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Structure {
    Df1,
    Df2,
    Tdf2,
    Cascade,
}

impl Structure {
    pub const ALL: [Structure; 4] = [
        Structure::Df1,
        Structure::Df2,
        Structure::Tdf2,
        Structure::Cascade,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Structure::Df1 => "DF1",
            Structure::Df2 => "DF2",
            Structure::Tdf2 => "TDF2",
            Structure::Cascade => "CASCADE",
        }
    }
}

impl fmt::Display for Structure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Structure {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Structure::ALL
            .into_iter()
            .find(|structure| structure.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownStructure(s.to_string()))
    }
}

/// Any of the four structures, chosen at run time
#[derive(Debug, Clone)]
pub enum AnyFilter<T: Sample> {
    Df1(Df1<T>),
    Df2(Df2<T>),
    Tdf2(Tdf2<T>),
    Cascade(Cascade<T>),
}

impl<T: Sample> AnyFilter<T> {
    /// Build the requested structure from a design, quantizing its coefficients to `T`
    pub fn new(structure: Structure, design: &FilterDesign) -> Result<Self> {
        Ok(match structure {
            Structure::Df1 => AnyFilter::Df1(Df1::new(&*design.ba()?)),
            Structure::Df2 => AnyFilter::Df2(Df2::new(&*design.ba()?)),
            Structure::Tdf2 => AnyFilter::Tdf2(Tdf2::new(&*design.ba()?)),
            Structure::Cascade => AnyFilter::Cascade(Cascade::new(design.sos()?)),
        })
    }

    pub fn structure(&self) -> Structure {
        match self {
            AnyFilter::Df1(_) => Structure::Df1,
            AnyFilter::Df2(_) => Structure::Df2,
            AnyFilter::Tdf2(_) => Structure::Tdf2,
            AnyFilter::Cascade(_) => Structure::Cascade,
        }
    }
}

impl<T: Sample> Filter<T> for AnyFilter<T> {
    fn update(&mut self, x: T) -> T {
        match self {
            AnyFilter::Df1(f) => f.update(x),
            AnyFilter::Df2(f) => f.update(x),
            AnyFilter::Tdf2(f) => f.update(x),
            AnyFilter::Cascade(f) => f.update(x),
        }
    }

    fn reset(&mut self) {
        match self {
            AnyFilter::Df1(f) => f.reset(),
            AnyFilter::Df2(f) => f.reset(),
            AnyFilter::Tdf2(f) => f.reset(),
            AnyFilter::Cascade(f) => f.reset(),
        }
    }

    fn saturation(&self) -> Saturation {
        match self {
            AnyFilter::Df1(f) => f.saturation(),
            AnyFilter::Df2(f) => f.saturation(),
            AnyFilter::Tdf2(f) => f.saturation(),
            AnyFilter::Cascade(f) => f.saturation(),
        }
    }
}

/// Fixed-length history of past samples held in a ring buffer
///
/// `get(1)` is the most recent sample pushed, `get(len)` the oldest.  Slots that have
/// not been written yet read as zero, which gives every structure its zero initial
/// conditions.
#[derive(Debug, Clone)]
pub(crate) struct DelayLine<T> {
    buf: Vec<T>,
    head: usize,
}

impl<T: Sample> DelayLine<T> {
    pub(crate) fn new(len: usize) -> Self {
        Self {
            buf: vec![T::ZERO; len],
            head: 0,
        }
    }

    /// Sample `k` steps back, `1 <= k <= len`
    pub(crate) fn get(&self, k: usize) -> T {
        let len = self.buf.len();
        self.buf[(self.head + len - k) % len]
    }

    pub(crate) fn push(&mut self, x: T) {
        if self.buf.is_empty() {
            return;
        }
        self.buf[self.head] = x;
        self.head = (self.head + 1) % self.buf.len();
    }

    pub(crate) fn clear(&mut self) {
        self.buf.fill(T::ZERO);
        self.head = 0;
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::coefficients::{CoefficientSet, SosFilter};

    #[test]
    fn delay_line_reads_back_in_order() {
        let mut line = DelayLine::<f64>::new(3);
        assert_eq!(line.get(1), 0.0);
        for x in [1.0, 2.0, 3.0, 4.0] {
            line.push(x);
        }
        assert_eq!(line.get(1), 4.0);
        assert_eq!(line.get(2), 3.0);
        assert_eq!(line.get(3), 2.0);
        line.clear();
        assert_eq!(line.get(1), 0.0);

        // zero length lines swallow pushes
        let mut empty = DelayLine::<f64>::new(0);
        empty.push(1.0);
    }

    #[test]
    fn parses_structure_names() {
        assert_eq!("tdf2".parse::<Structure>(), Ok(Structure::Tdf2));
        assert_eq!("CASCADE".parse::<Structure>(), Ok(Structure::Cascade));
        assert!(matches!(
            "DF3".parse::<Structure>(),
            Err(Error::UnknownStructure(_))
        ));
        for structure in Structure::ALL {
            assert_eq!(structure.to_string().parse::<Structure>(), Ok(structure));
        }
    }

    #[test]
    fn every_structure_silent_on_silence() {
        let design = FilterDesign::new(
            CoefficientSet::new([0.2, 0.4, 0.2], [1.0, -0.6, 0.2]).unwrap(),
            SosFilter::from_rows(&[[0.2, 0.4, 0.2, 1.0, -0.6, 0.2]]).unwrap(),
        );
        for structure in Structure::ALL {
            let mut filter = AnyFilter::<crate::Q12>::new(structure, &design).unwrap();
            assert_eq!(filter.structure(), structure);
            let y = filter.run(&[crate::Q12::ZERO; 257]);
            assert!(y.iter().all(|&v| v == crate::Q12::ZERO));
        }
    }

    #[test]
    fn builds_every_structure_from_either_form() {
        let row = [0.2, 0.4, 0.2, 1.0, -0.6, 0.2];
        let sos_only = FilterDesign::from_sos(SosFilter::from_rows(&[row]).unwrap());
        let input = [1.0, 0.5, -0.25, 0.0];
        let reference = AnyFilter::<f64>::new(Structure::Cascade, &sos_only)
            .unwrap()
            .run(&input);
        for structure in Structure::ALL {
            let mut filter = AnyFilter::<f64>::new(structure, &sos_only).unwrap();
            assert_eq!(filter.structure(), structure);
            for (a, b) in filter.run(&input).iter().zip(&reference) {
                assert!((a - b).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn cascade_needs_sections() {
        let design = FilterDesign::from_ba(CoefficientSet::new([1.0], [1.0]).unwrap());
        assert!(AnyFilter::<f64>::new(Structure::Cascade, &design).is_err());
        assert!(AnyFilter::<f64>::new(Structure::Tdf2, &design).is_ok());
    }
}
