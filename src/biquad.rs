use alloc::vec::Vec;

use crate::coefficients::{SosFilter, SosSection};
use crate::iir::Filter;
use crate::sample::{Sample, Saturation};

/// One second-order section of a cascade
///
/// The recurrence is the two-register form used by SOS implementations:
///
/// ```text
/// w    = x - a1 w[0] - a2 w[1]
/// y    = b0 w + b1 w[0] + b2 w[1]
/// w[1] = w[0];  w[0] = w
/// ```
///
/// with every coefficient normalized by the section's own `a0`.
///
/// # Examples
///
/// ```
/// use iir_forms::{Biquad, SosSection};
///
/// // single pole lowpass y[n] = 0.5 x[n] + 0.5 y[n-1]
/// let section = SosSection::new([0.5, 0.0, 0.0, 1.0, -0.5, 0.0]).unwrap();
/// let mut biquad = Biquad::<f64>::new(&section);
/// assert_eq!(biquad.update(1.0), 0.5);
/// assert_eq!(biquad.update(1.0), 0.75);
/// ```
#[derive(Debug, Clone)]
pub struct Biquad<T> {
    // coefficients
    b0: T,
    b1: T,
    b2: T,
    a1: T,
    a2: T,

    // history
    w: [T; 2],

    saturation: Saturation,
}

impl<T: Sample> Biquad<T> {
    /// Create a section, normalizing by `a0` before quantizing into `T`
    pub fn new(section: &SosSection) -> Self {
        let (b0, b1, b2, a1, a2) = section.normalized();
        Self {
            b0: T::from_f64(b0),
            b1: T::from_f64(b1),
            b2: T::from_f64(b2),
            a1: T::from_f64(a1),
            a2: T::from_f64(a2),
            w: [T::ZERO; 2],
            saturation: Saturation::default(),
        }
    }

    /// Add a new input sample and get the resulting output
    pub fn update(&mut self, x: T) -> T {
        let sat = &mut self.saturation;
        let w = x
            .mul_sub(self.a1, self.w[0], sat)
            .mul_sub(self.a2, self.w[1], sat);
        let y = T::ZERO
            .mul_add(self.b0, w, sat)
            .mul_add(self.b1, self.w[0], sat)
            .mul_add(self.b2, self.w[1], sat);

        // update the FIFO
        self.w[1] = self.w[0];
        self.w[0] = w;
        y
    }

    /// Reset the section
    ///
    /// This only clears this section's registers and saturation counts.
    pub fn reset(&mut self) {
        self.w = [T::ZERO; 2];
        self.saturation.clear();
    }

    /// Saturation events inside this section since its last reset
    pub fn saturation(&self) -> Saturation {
        self.saturation
    }

    /// The two delay registers, most recent first
    pub fn state(&self) -> [T; 2] {
        self.w
    }
}

/// A chain of biquads, the output of each feeding the input of the next
///
/// Each section owns its state.  Streaming a sample through every section in turn
/// produces the same output as filtering the whole sequence stage by stage.
///
/// # Examples
///
/// ```
/// use iir_forms::{Cascade, Filter, SosFilter};
///
/// let sos = SosFilter::from_rows(&[
///     [0.5, 0.0, 0.0, 1.0, -0.5, 0.0],
///     [2.0, 0.0, 0.0, 1.0, 0.0, 0.0],
/// ])
/// .unwrap();
/// let mut cascade = Cascade::<f32>::new(&sos);
/// assert_eq!(cascade.run(&[1.0, 1.0]), vec![1.0, 1.5]);
/// ```
#[derive(Debug, Clone)]
pub struct Cascade<T> {
    sections: Vec<Biquad<T>>,
}

impl<T: Sample> Cascade<T> {
    pub fn new(sos: &SosFilter) -> Self {
        Self {
            sections: sos.sections().iter().map(Biquad::new).collect(),
        }
    }

    /// Overall order, two per section
    pub fn order(&self) -> usize {
        2 * self.sections.len()
    }

    pub fn sections(&self) -> &[Biquad<T>] {
        &self.sections
    }

    pub fn section(&self, index: usize) -> Option<&Biquad<T>> {
        self.sections.get(index)
    }

    pub fn section_mut(&mut self, index: usize) -> Option<&mut Biquad<T>> {
        self.sections.get_mut(index)
    }

    /// Clear one section's state and leave the others untouched
    ///
    /// Returns `false` if there is no such section.
    pub fn reset_section(&mut self, index: usize) -> bool {
        match self.sections.get_mut(index) {
            Some(section) => {
                section.reset();
                true
            }
            None => false,
        }
    }
}

impl<T: Sample> Filter<T> for Cascade<T> {
    fn update(&mut self, x: T) -> T {
        self.sections
            .iter_mut()
            .fold(x, |input, section| section.update(input))
    }

    fn reset(&mut self) {
        for section in &mut self.sections {
            section.reset();
        }
    }

    fn saturation(&self) -> Saturation {
        self.sections.iter().map(Biquad::saturation).sum()
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::fixed_point::Q24;
    use crate::iir::Tdf2;
    use approx::assert_abs_diff_eq;

    fn two_stage() -> SosFilter {
        SosFilter::from_rows(&[
            [0.0675, 0.135, 0.0675, 1.0, -1.143, 0.4128],
            [1.0, 2.0, 1.0, 1.0, -1.4, 0.6],
        ])
        .unwrap()
    }

    #[test]
    fn stage_by_stage_equals_streaming() {
        let sos = two_stage();
        let input: Vec<f64> = (0..300).map(|n| ((n * 5) % 11) as f64 / 11.0 - 0.5).collect();

        let mut staged = input.clone();
        for section in sos.sections() {
            let mut biquad = Biquad::<f64>::new(section);
            for v in staged.iter_mut() {
                *v = biquad.update(*v);
            }
        }

        let streamed = Cascade::<f64>::new(&sos).run(&input);
        assert_eq!(staged, streamed);
    }

    #[test]
    fn matches_expanded_transfer_function() {
        let sos = two_stage();
        let ba = sos.to_coefficients().unwrap();
        let mut impulse = vec![0.0; 1024];
        impulse[0] = 1.0;
        let cascade = Cascade::<f64>::new(&sos).run(&impulse);
        let tdf2 = Tdf2::<f64>::new(&ba).run(&impulse);
        for (a, b) in cascade.iter().zip(&tdf2) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-9);
        }
    }

    #[test]
    fn sections_keep_separate_state() {
        let mut cascade = Cascade::<Q24>::new(&two_stage());
        for _ in 0..10 {
            cascade.update(Q24::from_real(0.5));
        }
        let second = cascade.section(1).unwrap().state();
        assert_ne!(second, [Q24::ZERO; 2]);

        assert!(cascade.reset_section(0));
        assert_eq!(cascade.section(0).unwrap().state(), [Q24::ZERO; 2]);
        assert_eq!(cascade.section(1).unwrap().state(), second);
        assert!(!cascade.reset_section(2));
    }

    #[test]
    fn counts_saturation_inside_an_early_stage() {
        // stage 0 clamps 150 to the rail, stage 1 halves it back into range
        let sos = SosFilter::from_rows(&[
            [100.0, 0.0, 0.0, 1.0, 0.0, 0.0],
            [0.5, 0.0, 0.0, 1.0, 0.0, 0.0],
        ])
        .unwrap();
        let mut cascade = Cascade::<Q24>::new(&sos);
        let y = cascade.run(&[Q24::from_real(1.5); 4]);
        assert!(y.iter().all(|v| !v.is_saturated()));
        assert_abs_diff_eq!(y[0].to_real(), 64.0, epsilon = 1e-6);

        assert_eq!(cascade.section(0).unwrap().saturation().overflow, 4);
        assert_eq!(cascade.section(1).unwrap().saturation().total(), 0);
        assert_eq!(
            cascade.saturation(),
            Saturation {
                overflow: 4,
                underflow: 0
            }
        );

        cascade.reset();
        assert_eq!(cascade.saturation().total(), 0);
    }

    #[test]
    fn normalizes_each_section() {
        let scaled = SosFilter::from_rows(&[[1.0, 0.0, 0.0, 2.0, -1.0, 0.0]]).unwrap();
        let unit = SosFilter::from_rows(&[[0.5, 0.0, 0.0, 1.0, -0.5, 0.0]]).unwrap();
        let input = [1.0, 0.0, 0.0, 1.0];
        assert_eq!(
            Cascade::<f64>::new(&scaled).run(&input),
            Cascade::<f64>::new(&unit).run(&input)
        );
        assert_eq!(Cascade::<f64>::new(&unit).order(), 2);
    }
}
