// Copyright 2023 Enphase Energy, Inc.
//
//    Licensed under the Apache License, Version 2.0 (the "License");
//    you may not use this file except in compliance with the License.
//    You may obtain a copy of the License at
//
//        http://www.apache.org/licenses/LICENSE-2.0
//
//    Unless required by applicable law or agreed to in writing, software
//    distributed under the License is distributed on an "AS IS" BASIS,
//    WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//    See the License for the specific language governing permissions and
//    limitations under the License.

/*!
# `iir-forms`

IIR filter structures over floating and fixed-point samples.

`iir-forms` is a `#![no_std]` library (it needs `alloc`) implementing the four classic
realizations of an [IIR filter](https://en.wikipedia.org/wiki/Infinite_impulse_response):
Direct Form I, Direct Form II, Transposed Direct Form II, and a cascade of second-order
sections.  Every structure is generic over the sample arithmetic, so the same filter can be
run in `f64`, `f32`, emulated half precision, or saturating fixed point built on the
[fixed](https://crates.io/crates/fixed) crate, and the outputs compared.

**Alpha:** Like the [fixed](https://crates.io/crates/fixed) release it depends on, this crate
uses `2.0.0` alpha const-generic fixed-point types.

# How to use

Filters are built from coefficients supplied by a filter designer.  A [`CoefficientSet`]
holds the numerator `B` and denominator `A` of the transfer function; `A[0]` does not need to
be one.  Construction quantizes the normalized coefficients into the sample type.

```rust
use iir_forms::{CoefficientSet, Filter, Tdf2, Q12};

// second order lowpass
let set = CoefficientSet::new(
    [0.003916, 0.007832, 0.003916],
    [1.0, -1.815341, 0.831005],
).unwrap();

let mut filter = Tdf2::<Q12>::new(&set);
let mut y = Q12::ZERO;
for s in [1.0, 1.0, 1.0, 1.0] {
    y = filter.update(Q12::from_real(s));
}
assert!(y.to_real() > 0.0);
```

A [`SosFilter`] describes the same kind of filter as a chain of biquads and drives the
[`Cascade`] structure.  A [`FilterDesign`] bundles the two forms and lets a
[`FilterRunner`] pick the structure and representation at run time:

```rust
use iir_forms::{
    signal, CoefficientSet, FilterDesign, FilterRunner, Representation, SosFilter, Structure,
};

let design = FilterDesign::new(
    CoefficientSet::new([0.25, 0.5, 0.25], [1.0, -0.5, 0.25]).unwrap(),
    SosFilter::from_rows(&[[0.25, 0.5, 0.25, 1.0, -0.5, 0.25]]).unwrap(),
);
let runner = FilterRunner::new(Structure::Cascade, Representation::F32);
let y = runner.run(&design, &signal::impulse(64)).unwrap();
assert_eq!(y.len(), 64);
```

# Precision comparison

A [`PrecisionComparator`] runs a design twice over the same input, once in `f64` and once in
the representation under test, and returns the per-sample error vector with its mean, mean
absolute, RMS and peak error.  Samples where either side overflowed to infinity or NaN are
flagged as [`ErrorSample::NonFinite`] and kept out of the statistics.

```rust
use iir_forms::{
    signal, CoefficientSet, FilterDesign, PrecisionComparator, Representation, Structure,
};

let design = FilterDesign::from_ba(
    CoefficientSet::new([0.25, 0.5, 0.25], [1.0, -0.5, 0.25]).unwrap(),
);
let comparator = PrecisionComparator::new(Structure::Df1, Representation::Q12);
let comparison = comparator.compare(&design, &signal::uniform_noise(4096, 12345)).unwrap();
assert_eq!(comparison.stats.non_finite, 0);
assert!(comparison.stats.rms < 1e-2);
```

# Fixed point

[`Q12`] and [`Q24`] hold 12 and 24 fractional bits in a 32-bit container.  Conversion rounds
half away from zero, products are formed at 64 bits and rounded back, and every result is
saturated.  Overflow therefore never wraps: it clamps to the rail and shows up as bounded
error.  Every clamp is counted as an overflow or underflow in the filter's [`Saturation`],
including clamps in an inner register or an early cascade stage that never reach the
output:

```rust
use iir_forms::{FilterRunner, Representation, SosFilter, FilterDesign, Structure};

// the first stage clamps 150 to the Q24 rail, the second halves it back into range
let design = FilterDesign::from_sos(SosFilter::from_rows(&[
    [100.0, 0.0, 0.0, 1.0, 0.0, 0.0],
    [0.5, 0.0, 0.0, 1.0, 0.0, 0.0],
]).unwrap());
let runner = FilterRunner::new(Structure::Cascade, Representation::Q24);
let output = runner.run_counted(&design, &[1.5, 1.5]).unwrap();
assert_eq!(output.saturated, 0);
assert_eq!(output.saturation.overflow, 2);
```
*/
#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod biquad;
pub mod coefficients;
pub mod comparator;
pub mod error;
pub mod fixed_point;
pub mod half;
pub mod iir;
pub mod runner;
pub mod sample;
pub mod signal;

pub use biquad::{Biquad, Cascade};
pub use coefficients::{CoefficientSet, FilterDesign, SosFilter, SosSection};
pub use comparator::{Comparison, ErrorSample, ErrorStats, PrecisionComparator};
pub use error::{Error, Result};
pub use fixed_point::{Clamp, Q, Q12, Q24};
pub use half::F16;
pub use iir::{AnyFilter, Df1, Df2, Filter, Structure, Tdf2};
pub use runner::{FilterRunner, Representation, RunOutput};
pub use sample::{Sample, Saturation};
