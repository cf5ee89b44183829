use ndarray::Array2;
use num_traits::{AsPrimitive, Num};

use crate::data::pcvrp::Cost;

pub trait Metric {
  fn compute<T: Num + AsPrimitive<f64>>(p1: (T, T), p2: (T, T)) -> f64;
}


pub struct Euclidean();

impl Metric for Euclidean {
  fn compute<T: Num + AsPrimitive<f64>>(p1: (T, T), p2: (T, T)) -> f64 {
    let a = p1.0.as_() - p2.0.as_();
    let b = p1.1.as_() - p2.1.as_();
    (a*a + b*b).sqrt()
  }
}

/// Compute the distance-matrix for the given coordinates
#[inline]
#[allow(dead_code)]
pub fn dist_matrix<M, T>(_metric: M, coords: &[(T, T)]) -> Array2<f64>
  where
    M: Metric,
    T: Num + AsPrimitive<f64>
{
  dist_matrix_pp(_metric, coords, |x| x)
}

/// Like [`dist_matrix`], but allows a post-processing function to be supplied.
pub fn dist_matrix_pp<M, T, S>(_metric: M, coords: &[(T, T)], func: impl Fn(f64) -> S) -> Array2<S>
  where
    M: Metric,
    T: Num + AsPrimitive<f64>,
    S: Copy
{
  let n = coords.len();
  Array2::from_shape_fn((n, n), |(i, j)| func(M::compute(coords[i], coords[j])))
}

/// Integer travel costs: Euclidean distances rounded to the nearest integer,
/// with halves rounded away from zero.
pub fn rounded_dist_matrix<T>(coords: &[(T, T)]) -> Array2<Cost>
  where
    T: Num + AsPrimitive<f64>
{
  dist_matrix_pp(Euclidean(), coords, |d| d.round() as Cost)
}

#[cfg(test)]
mod tests {
  use super::*;
  use proptest::prelude::*;

  #[test]
  fn euclidean_rounding() {
    let m = rounded_dist_matrix(&[(0i64, 0), (10, 0), (0, 20), (3, 4)]);
    assert_eq!(m[[0, 1]], 10);
    assert_eq!(m[[0, 2]], 20);
    assert_eq!(m[[0, 3]], 5);
    assert_eq!(m[[1, 2]], 22); // sqrt(500) = 22.36...
    assert_eq!(m[[1, 3]], 8);  // sqrt(65) = 8.06...
    assert_eq!(m[[2, 3]], 16); // sqrt(265) = 16.27...
  }

  #[test]
  fn negative_coordinates() {
    let m = rounded_dist_matrix(&[(-3i64, -4), (0, 0)]);
    assert_eq!(m[[0, 1]], 5);
    assert_eq!(m[[1, 0]], 5);
  }

  #[test]
  fn deterministic() {
    let coords: Vec<(i64, i64)> = vec![(0, 0), (3, 7), (-2, 9), (14, -5), (6, 6)];
    assert_eq!(rounded_dist_matrix(&coords), rounded_dist_matrix(&coords));
  }

  proptest! {
    #[test]
    fn symmetric_with_zero_diagonal(coords in prop::collection::vec((-1000i64..1000, -1000i64..1000), 1..30)) {
      let m = rounded_dist_matrix(&coords);
      for i in 0..coords.len() {
        prop_assert_eq!(m[[i, i]], 0);
        for j in 0..coords.len() {
          prop_assert_eq!(m[[i, j]], m[[j, i]]);
          prop_assert!(m[[i, j]] >= 0);
        }
      }
    }
  }
}
