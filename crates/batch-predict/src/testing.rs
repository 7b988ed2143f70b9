//! Test utilities: reference predictors and random matrices.
//!
//! Used by the crate's unit tests, integration tests and benches.

use std::sync::atomic::{AtomicUsize, Ordering};

use rand::prelude::*;

use crate::data::{DenseMatrix, Element, RowMajor, RowMatrix};
use crate::predict::{Predictor, PredictorFactory};

// =============================================================================
// Predictors
// =============================================================================

/// Copies the first `output.len()` input values verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityPredictor;

impl<T: Element> Predictor<T> for IdentityPredictor {
    fn predict(&mut self, input: &[T], output: &mut [T]) {
        let n = output.len();
        output.copy_from_slice(&input[..n]);
    }
}

/// Writes a per-instance call counter (1, 2, 3, ...) into every output column.
///
/// Each instance counts independently, which makes predictor sharing between
/// partitions visible in the output.
#[derive(Debug, Clone, Default)]
pub struct CountingPredictor {
    count: u32,
}

impl Predictor for CountingPredictor {
    fn predict(&mut self, _input: &[f64], output: &mut [f64]) {
        self.count += 1;
        output.fill(f64::from(self.count));
    }
}

/// Dense linear map: `output[j] = bias[j] + Σ_i weights[j][i] * input[i]`.
///
/// Depends only on its own input row; keeps a scratch buffer to look like a
/// real stateful predictor.
#[derive(Debug, Clone)]
pub struct LinearPredictor {
    /// Row-major `[output_dim, input_dim]`.
    weights: Vec<f64>,
    bias: Vec<f64>,
    scratch: Vec<f64>,
}

impl LinearPredictor {
    /// # Panics
    ///
    /// Panics if `weights.len() != bias.len() * input_dim`.
    pub fn new(weights: Vec<f64>, bias: Vec<f64>, input_dim: usize) -> Self {
        assert_eq!(
            weights.len(),
            bias.len() * input_dim,
            "weights shape mismatch"
        );
        Self {
            scratch: vec![0.0; bias.len()],
            weights,
            bias,
        }
    }

    /// Random weights in `[-1, 1]`, zero bias.
    pub fn random(input_dim: usize, output_dim: usize, seed: u64) -> Self {
        let weights = random_dense(output_dim, input_dim, seed, -1.0, 1.0);
        Self::new(weights, vec![0.0; output_dim], input_dim)
    }

    /// Input dimension.
    pub fn input_dim(&self) -> usize {
        self.weights.len().checked_div(self.bias.len()).unwrap_or(0)
    }

    /// Output dimension.
    pub fn output_dim(&self) -> usize {
        self.bias.len()
    }
}

impl Predictor for LinearPredictor {
    fn predict(&mut self, input: &[f64], output: &mut [f64]) {
        let input_dim = input.len();
        self.scratch.copy_from_slice(&self.bias);
        for (j, acc) in self.scratch.iter_mut().enumerate() {
            let row = &self.weights[j * input_dim..(j + 1) * input_dim];
            *acc += row.iter().zip(input).map(|(w, x)| w * x).sum::<f64>();
        }
        output.copy_from_slice(&self.scratch);
    }
}

// =============================================================================
// Factories
// =============================================================================

/// Wraps a factory and counts how many predictors it has produced.
#[derive(Debug, Default)]
pub struct CountingFactory<F> {
    inner: F,
    calls: AtomicUsize,
}

impl<F> CountingFactory<F> {
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of predictors created so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<T: Element, F: PredictorFactory<T>> PredictorFactory<T> for CountingFactory<F> {
    type Predictor = F::Predictor;

    fn new_predictor(&self) -> F::Predictor {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.new_predictor()
    }
}

// =============================================================================
// Random data
// =============================================================================

/// Generate random dense values in row-major order.
///
/// Values are uniform in `[min, max]`.
pub fn random_dense(rows: usize, cols: usize, seed: u64, min: f64, max: f64) -> Vec<f64> {
    assert!(max >= min);
    let mut rng = StdRng::seed_from_u64(seed);
    let width = max - min;
    (0..rows * cols)
        .map(|_| min + rng.gen::<f64>() * width)
        .collect()
}

/// Create a [`RowMatrix`] of random values.
pub fn random_row_matrix(rows: usize, cols: usize, seed: u64, min: f64, max: f64) -> RowMatrix {
    let data = random_dense(rows, cols, seed, min, max);
    DenseMatrix::<f64, RowMajor>::from_vec(data, rows, cols)
}
