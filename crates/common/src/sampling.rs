//! Random sampling helpers shared by the interpreter, batcher and scheduler.
//!
//! Every helper uses inclusive ranges so zero-width ranges (a variance of
//! `0.0`, for instance) are valid and return the single value. Ranges that
//! cannot be sampled (non-finite ends or span) yield their lower end.

use glam::Vec3;
use rand::Rng;
use rand::distr::Uniform;

/// `base` plus a uniform offset in `[-variance, variance]`.
pub fn jitter(rng: &mut impl Rng, base: f32, variance: f32) -> f32 {
    let variance = variance.abs();
    match Uniform::new_inclusive(-variance, variance) {
        Ok(offset) => base + rng.sample(offset),
        Err(_) => base,
    }
}

/// Uniform sample from an `(min, max)` pair. The pair is reordered if needed.
pub fn in_range(rng: &mut impl Rng, (min, max): (f32, f32)) -> f32 {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    match Uniform::new_inclusive(lo, hi) {
        Ok(dist) => rng.sample(dist),
        Err(_) => lo,
    }
}

/// Uniform integer sample from an inclusive `(min, max)` pair.
pub fn in_range_u32(rng: &mut impl Rng, (min, max): (u32, u32)) -> u32 {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    rng.random_range(lo..=hi)
}

/// Uniform point inside the unit ball (rejection sampling).
pub fn in_unit_sphere(rng: &mut impl Rng) -> Vec3 {
    loop {
        let p = Vec3::new(
            rng.random_range(-1.0..=1.0),
            rng.random_range(-1.0..=1.0),
            rng.random_range(-1.0..=1.0),
        );
        if p.length_squared() <= 1.0 {
            return p;
        }
    }
}

/// Uniform direction on the unit sphere.
pub fn unit_vector(rng: &mut impl Rng) -> Vec3 {
    loop {
        if let Some(dir) = in_unit_sphere(rng).try_normalize() {
            return dir;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn jitter_stays_within_variance() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..1000 {
            let v = jitter(&mut rng, 2.0, 0.5);
            assert!((1.5..=2.5).contains(&v));
        }
    }

    #[test]
    fn zero_variance_returns_base() {
        let mut rng = StdRng::seed_from_u64(2);
        assert_eq!(jitter(&mut rng, 25.0, 0.0), 25.0);
        assert_eq!(in_range(&mut rng, (0.3, 0.3)), 0.3);
        assert_eq!(in_range_u32(&mut rng, (4, 4)), 4);
    }

    #[test]
    fn in_range_accepts_reversed_pairs() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let v = in_range(&mut rng, (1.0, 0.5));
            assert!((0.5..=1.0).contains(&v));
        }
    }

    #[test]
    fn unsampleable_ranges_do_not_panic() {
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(jitter(&mut rng, 2.0, f32::MAX), 2.0);
        assert_eq!(jitter(&mut rng, 2.0, f32::INFINITY), 2.0);
        assert_eq!(in_range(&mut rng, (-f32::MAX, f32::MAX)), -f32::MAX);
    }

    #[test]
    fn unit_vectors_are_normalized() {
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..200 {
            assert!((unit_vector(&mut rng).length() - 1.0).abs() < 1e-4);
            assert!(in_unit_sphere(&mut rng).length() <= 1.0 + 1e-6);
        }
    }
}
