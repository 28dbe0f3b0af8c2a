//! Random container construction.
//!
//! Every storage slot is sampled, including the single slot of a degenerate
//! tensor.

use rand::Rng;
use rand::distr::StandardUniform;
use rand_distr::StandardNormal;

use crate::container::{ContainerKind, NdContainer};
use crate::element::{Element, c64};
use crate::error::Result;

/// Element types that can be sampled from a uniform distribution.
pub trait RandomUniform: Element {
    /// Sample a value from [0, 1).
    fn sample_uniform<R: Rng>(rng: &mut R) -> Self;
}

impl RandomUniform for f32 {
    fn sample_uniform<R: Rng>(rng: &mut R) -> Self {
        rng.sample(StandardUniform)
    }
}

impl RandomUniform for f64 {
    fn sample_uniform<R: Rng>(rng: &mut R) -> Self {
        rng.sample(StandardUniform)
    }
}

impl RandomUniform for c64 {
    fn sample_uniform<R: Rng>(rng: &mut R) -> Self {
        c64::new(rng.sample(StandardUniform), rng.sample(StandardUniform))
    }
}

/// Element types that can be sampled from a standard normal distribution.
pub trait RandomNormal: Element {
    /// Sample a value from N(0, 1).
    fn sample_normal<R: Rng>(rng: &mut R) -> Self;
}

impl RandomNormal for f32 {
    fn sample_normal<R: Rng>(rng: &mut R) -> Self {
        rng.sample(StandardNormal)
    }
}

impl RandomNormal for f64 {
    fn sample_normal<R: Rng>(rng: &mut R) -> Self {
        rng.sample(StandardNormal)
    }
}

impl RandomNormal for c64 {
    fn sample_normal<R: Rng>(rng: &mut R) -> Self {
        // real and imaginary parts are N(0, 1/2) so |z|^2 has mean 1
        let scale = std::f64::consts::FRAC_1_SQRT_2;
        c64::new(
            rng.sample::<f64, _>(StandardNormal) * scale,
            rng.sample::<f64, _>(StandardNormal) * scale,
        )
    }
}

impl<T: RandomUniform, K: ContainerKind> NdContainer<T, K> {
    /// In-memory container with uniform random values in [0, 1).
    ///
    /// # Examples
    ///
    /// ```
    /// use ndstore::TensorMember;
    ///
    /// let t: TensorMember<f64> = TensorMember::random(&[2, 3]).unwrap();
    /// assert_eq!(t.dims(), &[2, 3]);
    /// for v in t.to_vec().unwrap() {
    ///     assert!((0.0..1.0).contains(&v));
    /// }
    /// ```
    pub fn random(dims: &[u64]) -> Result<Self> {
        Self::random_with_rng(dims, &mut rand::rng())
    }

    /// Uniform random container drawn from `rng`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ndstore::MatrixMember;
    /// use rand::SeedableRng;
    /// use rand::rngs::StdRng;
    ///
    /// let mut rng = StdRng::seed_from_u64(42);
    /// let a: MatrixMember<f64> = MatrixMember::random_with_rng(&[3, 2], &mut rng).unwrap();
    /// let mut rng = StdRng::seed_from_u64(42);
    /// let b: MatrixMember<f64> = MatrixMember::random_with_rng(&[3, 2], &mut rng).unwrap();
    /// assert_eq!(a.to_vec().unwrap(), b.to_vec().unwrap());
    /// ```
    pub fn random_with_rng<R: Rng>(dims: &[u64], rng: &mut R) -> Result<Self> {
        Self::sampled(dims, || T::sample_uniform(rng))
    }
}

impl<T: RandomNormal, K: ContainerKind> NdContainer<T, K> {
    /// In-memory container with standard normal random values.
    pub fn randn(dims: &[u64]) -> Result<Self> {
        Self::randn_with_rng(dims, &mut rand::rng())
    }

    /// Standard normal random container drawn from `rng`.
    pub fn randn_with_rng<R: Rng>(dims: &[u64], rng: &mut R) -> Result<Self> {
        Self::sampled(dims, || T::sample_normal(rng))
    }
}

impl<T: Element, K: ContainerKind> NdContainer<T, K> {
    fn sampled(dims: &[u64], mut sample: impl FnMut() -> T) -> Result<Self> {
        let mut container = Self::with_dims(dims)?;
        for offset in 0..container.storage_size() {
            container.set_linear(offset, &sample())?;
        }
        Ok(container)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{MatrixMember, TensorMember, VectorMember};
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_random_f64_in_unit_interval() {
        let t: TensorMember<f64> = TensorMember::random(&[4, 5]).unwrap();
        assert_eq!(t.storage_size(), 20);
        for v in t.to_vec().unwrap() {
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn test_random_c64_parts_in_unit_interval() {
        let v: VectorMember<c64> = VectorMember::random(&[10]).unwrap();
        for z in v.to_vec().unwrap() {
            assert!((0.0..1.0).contains(&z.re));
            assert!((0.0..1.0).contains(&z.im));
        }
    }

    #[test]
    fn test_seeded_reproducible() {
        let mut rng = StdRng::seed_from_u64(7);
        let a: MatrixMember<f32> = MatrixMember::randn_with_rng(&[4, 4], &mut rng).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let b: MatrixMember<f32> = MatrixMember::randn_with_rng(&[4, 4], &mut rng).unwrap();
        assert_eq!(a.to_vec().unwrap(), b.to_vec().unwrap());
    }

    #[test]
    fn test_randn_moments() {
        let mut rng = StdRng::seed_from_u64(1234);
        let v: VectorMember<f64> = VectorMember::randn_with_rng(&[20_000], &mut rng).unwrap();
        let values = v.to_vec().unwrap();
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let var = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        assert_relative_eq!(mean, 0.0, epsilon = 0.05);
        assert_relative_eq!(var, 1.0, epsilon = 0.05);
    }

    #[test]
    fn test_randn_c64_unit_mean_modulus() {
        let mut rng = StdRng::seed_from_u64(99);
        let v: VectorMember<c64> = VectorMember::randn_with_rng(&[20_000], &mut rng).unwrap();
        let values = v.to_vec().unwrap();
        let total: f64 = values.iter().map(|z| z.re * z.re + z.im * z.im).sum();
        let mean_sq = total / values.len() as f64;
        assert_relative_eq!(mean_sq, 1.0, epsilon = 0.05);
    }

    #[test]
    fn test_degenerate_tensor_samples_its_slot() {
        let mut rng = StdRng::seed_from_u64(3);
        let t: TensorMember<f64> = TensorMember::random_with_rng(&[0, 3], &mut rng).unwrap();
        assert_eq!(t.storage_size(), 1);
        assert!((0.0..1.0).contains(&t.get_linear(0).unwrap()));
    }

    #[test]
    fn test_wrong_rank_rejected() {
        assert!(VectorMember::<f64>::random(&[2, 2]).is_err());
    }
}
