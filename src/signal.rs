//! Test excitations for precision runs

use alloc::vec;
use alloc::vec::Vec;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Unit impulse: `1.0` at `n = 0`, zero elsewhere
pub fn impulse(len: usize) -> Vec<f64> {
    let mut x = vec![0.0; len];
    if let Some(first) = x.first_mut() {
        *first = 1.0;
    }
    x
}

/// Uniform noise in `[-1, 1]`, reproducible for a given seed
pub fn uniform_noise(len: usize, seed: u64) -> Vec<f64> {
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..len).map(|_| rng.gen_range(-1.0..=1.0)).collect()
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn impulse_shape() {
        let x = impulse(4);
        assert_eq!(x, vec![1.0, 0.0, 0.0, 0.0]);
        assert!(impulse(0).is_empty());
    }

    #[test]
    fn noise_is_bounded_and_seeded() {
        let a = uniform_noise(1000, 42);
        assert!(a.iter().all(|v| (-1.0..=1.0).contains(v)));
        assert_eq!(a, uniform_noise(1000, 42));
        assert_ne!(a, uniform_noise(1000, 43));
    }
}
