//! Batch prediction driver.
//!
//! Validates matrix shapes, splits the rows into partitions and runs one
//! predictor per partition, sequentially or on rayon workers.
//!
//! # Row Access
//!
//! For every row the driver picks, independently for input and output:
//! - the matrix's row view when it has one (zero-copy), or
//! - a per-partition scratch buffer filled and drained elementwise.
//!
//! The output scratch buffer is loaded with the row's current contents before
//! the predictor runs, so predictors see the same destination values on both
//! paths.
//!
//! # Failure Policy
//!
//! Shape errors are returned before any predictor exists. On the fallible path
//! ([`try_batch_predict`]) the first predictor error stops the batch: partitions
//! that have not started are skipped, rows already written keep their values,
//! and whatever the predictor wrote into the failing row is kept as well.

use crate::data::{Element, Matrix, MatrixMut, RowBlockMut, ZerosMatrix};
use crate::utils::{run_with_threads, Parallelism};

use super::config::BatchPredictConfig;
use super::error::{BatchPredictError, MatrixSide};
use super::predictor::{
    FalliblePredictor, FalliblePredictorFactory, NeverFailsFactory, PredictorFactory,
};

type FactoryError<F, T> =
    <<F as FalliblePredictorFactory<T>>::Predictor as FalliblePredictor<T>>::Error;

// =============================================================================
// Free functions
// =============================================================================

/// Predict every row of `inputs`, returning the filled output matrix.
///
/// When `outputs` is `None`, a zero-filled `n_samples × output_dim` matrix is
/// allocated. `partition_size` is the target rows per partition (`0` = one
/// partition per worker); it never changes the result. Runs on the ambient
/// rayon pool.
///
/// # Errors
///
/// - [`BatchPredictError::DimensionMismatch`] if `inputs` does not have
///   `input_dim` columns, or `outputs` does not have `output_dim` columns.
/// - [`BatchPredictError::RowCountMismatch`] if `outputs` has a different
///   number of rows than `inputs`.
///
/// # Example
///
/// ```
/// use batch_predict::{batch_predict, RowMatrix};
///
/// let inputs = RowMatrix::from_rows(&[[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]);
/// let identity = || |input: &[f64], output: &mut [f64]| output.copy_from_slice(input);
///
/// let outputs: RowMatrix = batch_predict(&identity, &inputs, None, 2, 2, 1).unwrap();
/// assert_eq!(outputs.as_slice(), inputs.as_slice());
/// ```
pub fn batch_predict<T, F, I, O>(
    factory: &F,
    inputs: &I,
    outputs: Option<O>,
    input_dim: usize,
    output_dim: usize,
    partition_size: usize,
) -> Result<O, BatchPredictError>
where
    T: Element,
    F: PredictorFactory<T> + Sync,
    I: Matrix<Element = T> + Sync,
    O: ZerosMatrix<Element = T> + Send,
{
    let config = BatchPredictConfig::with_partition_size(partition_size);
    execute_owned(
        &NeverFailsFactory(factory),
        inputs,
        outputs,
        input_dim,
        output_dim,
        &config,
    )
}

/// Predict every row of `inputs` into a caller-owned output matrix.
///
/// Same contract as [`batch_predict`], but `outputs` is borrowed, so it can be
/// a view (e.g. `ArrayViewMut2`) and stays with the caller on error.
pub fn batch_predict_into<T, F, I, O>(
    factory: &F,
    inputs: &I,
    outputs: &mut O,
    input_dim: usize,
    output_dim: usize,
    partition_size: usize,
) -> Result<(), BatchPredictError>
where
    T: Element,
    F: PredictorFactory<T> + Sync,
    I: Matrix<Element = T> + Sync,
    O: MatrixMut<Element = T> + Send,
{
    let config = BatchPredictConfig::with_partition_size(partition_size);
    execute(
        &NeverFailsFactory(factory),
        inputs,
        outputs,
        input_dim,
        output_dim,
        &config,
    )
}

/// Fallible variant of [`batch_predict`].
///
/// # Errors
///
/// Shape errors as for [`batch_predict`], plus
/// [`BatchPredictError::Predictor`] carrying the first failing row.
pub fn try_batch_predict<T, F, I, O>(
    factory: &F,
    inputs: &I,
    outputs: Option<O>,
    input_dim: usize,
    output_dim: usize,
    partition_size: usize,
) -> Result<O, BatchPredictError<FactoryError<F, T>>>
where
    T: Element,
    F: FalliblePredictorFactory<T> + Sync,
    FactoryError<F, T>: Send,
    I: Matrix<Element = T> + Sync,
    O: ZerosMatrix<Element = T> + Send,
{
    let config = BatchPredictConfig::with_partition_size(partition_size);
    execute_owned(factory, inputs, outputs, input_dim, output_dim, &config)
}

/// Fallible variant of [`batch_predict_into`].
pub fn try_batch_predict_into<T, F, I, O>(
    factory: &F,
    inputs: &I,
    outputs: &mut O,
    input_dim: usize,
    output_dim: usize,
    partition_size: usize,
) -> Result<(), BatchPredictError<FactoryError<F, T>>>
where
    T: Element,
    F: FalliblePredictorFactory<T> + Sync,
    FactoryError<F, T>: Send,
    I: Matrix<Element = T> + Sync,
    O: MatrixMut<Element = T> + Send,
{
    let config = BatchPredictConfig::with_partition_size(partition_size);
    execute(factory, inputs, outputs, input_dim, output_dim, &config)
}

// =============================================================================
// BatchPredictor
// =============================================================================

/// Reusable batch driver: a predictor factory plus a [`BatchPredictConfig`].
///
/// `F` is usually a closure returning a predictor, or a [`CloneFactory`](super::CloneFactory).
///
/// # Example
///
/// ```
/// use std::num::NonZeroUsize;
/// use batch_predict::{BatchPredictConfig, BatchPredictor, ColMatrix};
///
/// let config = BatchPredictConfig::builder()
///     .partition_size(2)
///     .n_threads(NonZeroUsize::new(2).unwrap())
///     .build();
/// let predictor = BatchPredictor::with_config(
///     || |input: &[f64], output: &mut [f64]| output[0] = input[0] * input[1],
///     config,
/// );
///
/// let inputs = ColMatrix::from_rows(&[[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]);
/// let outputs: ColMatrix = predictor.predict(&inputs, None, 2, 1).unwrap();
/// assert_eq!(outputs.as_slice(), &[2.0, 12.0, 30.0]);
/// ```
#[derive(Debug, Clone)]
pub struct BatchPredictor<F> {
    factory: F,
    config: BatchPredictConfig,
}

impl<F> BatchPredictor<F> {
    /// Driver with the default configuration.
    pub fn new(factory: F) -> Self {
        Self::with_config(factory, BatchPredictConfig::default())
    }

    /// Driver with an explicit configuration.
    pub fn with_config(factory: F, config: BatchPredictConfig) -> Self {
        Self { factory, config }
    }

    /// The predictor factory.
    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// The driver configuration.
    pub fn config(&self) -> &BatchPredictConfig {
        &self.config
    }

    /// Predict every row of `inputs`, allocating the outputs if `None`.
    ///
    /// See [`batch_predict`] for the contract.
    pub fn predict<T, I, O>(
        &self,
        inputs: &I,
        outputs: Option<O>,
        input_dim: usize,
        output_dim: usize,
    ) -> Result<O, BatchPredictError>
    where
        T: Element,
        F: PredictorFactory<T> + Sync,
        I: Matrix<Element = T> + Sync,
        O: ZerosMatrix<Element = T> + Send,
    {
        let adapter = NeverFailsFactory(&self.factory);
        execute_owned(
            &adapter,
            inputs,
            outputs,
            input_dim,
            output_dim,
            &self.config,
        )
    }

    /// Predict every row of `inputs` into `outputs`.
    ///
    /// See [`batch_predict_into`] for the contract.
    pub fn predict_into<T, I, O>(
        &self,
        inputs: &I,
        outputs: &mut O,
        input_dim: usize,
        output_dim: usize,
    ) -> Result<(), BatchPredictError>
    where
        T: Element,
        F: PredictorFactory<T> + Sync,
        I: Matrix<Element = T> + Sync,
        O: MatrixMut<Element = T> + Send,
    {
        let adapter = NeverFailsFactory(&self.factory);
        execute(
            &adapter,
            inputs,
            outputs,
            input_dim,
            output_dim,
            &self.config,
        )
    }

    /// Fallible variant of [`predict`](Self::predict).
    pub fn try_predict<T, I, O>(
        &self,
        inputs: &I,
        outputs: Option<O>,
        input_dim: usize,
        output_dim: usize,
    ) -> Result<O, BatchPredictError<FactoryError<F, T>>>
    where
        T: Element,
        F: FalliblePredictorFactory<T> + Sync,
        FactoryError<F, T>: Send,
        I: Matrix<Element = T> + Sync,
        O: ZerosMatrix<Element = T> + Send,
    {
        execute_owned(
            &self.factory,
            inputs,
            outputs,
            input_dim,
            output_dim,
            &self.config,
        )
    }

    /// Fallible variant of [`predict_into`](Self::predict_into).
    pub fn try_predict_into<T, I, O>(
        &self,
        inputs: &I,
        outputs: &mut O,
        input_dim: usize,
        output_dim: usize,
    ) -> Result<(), BatchPredictError<FactoryError<F, T>>>
    where
        T: Element,
        F: FalliblePredictorFactory<T> + Sync,
        FactoryError<F, T>: Send,
        I: Matrix<Element = T> + Sync,
        O: MatrixMut<Element = T> + Send,
    {
        execute(
            &self.factory,
            inputs,
            outputs,
            input_dim,
            output_dim,
            &self.config,
        )
    }
}

// =============================================================================
// Driver internals
// =============================================================================

/// Validate, allocate when `outputs` is `None`, then fill.
fn execute_owned<T, F, I, O>(
    factory: &F,
    inputs: &I,
    outputs: Option<O>,
    input_dim: usize,
    output_dim: usize,
    config: &BatchPredictConfig,
) -> Result<O, BatchPredictError<FactoryError<F, T>>>
where
    T: Element,
    F: FalliblePredictorFactory<T> + Sync,
    FactoryError<F, T>: Send,
    I: Matrix<Element = T> + Sync,
    O: ZerosMatrix<Element = T> + Send,
{
    check_inputs(inputs, input_dim)?;
    let mut outputs = match outputs {
        Some(outputs) => {
            check_outputs(inputs, &outputs, output_dim)?;
            outputs
        }
        None => O::zeros(inputs.n_rows(), output_dim),
    };
    fill(factory, inputs, &mut outputs, input_dim, output_dim, config)?;
    Ok(outputs)
}

/// Validate, then fill `outputs` in place.
fn execute<T, F, I, O>(
    factory: &F,
    inputs: &I,
    outputs: &mut O,
    input_dim: usize,
    output_dim: usize,
    config: &BatchPredictConfig,
) -> Result<(), BatchPredictError<FactoryError<F, T>>>
where
    T: Element,
    F: FalliblePredictorFactory<T> + Sync,
    FactoryError<F, T>: Send,
    I: Matrix<Element = T> + Sync,
    O: MatrixMut<Element = T> + Send,
{
    check_inputs(inputs, input_dim)?;
    check_outputs(inputs, outputs, output_dim)?;
    fill(factory, inputs, outputs, input_dim, output_dim, config)
}

/// Fill already validated `outputs` on the configured pool.
fn fill<T, F, I, O>(
    factory: &F,
    inputs: &I,
    outputs: &mut O,
    input_dim: usize,
    output_dim: usize,
    config: &BatchPredictConfig,
) -> Result<(), BatchPredictError<FactoryError<F, T>>>
where
    T: Element,
    F: FalliblePredictorFactory<T> + Sync,
    FactoryError<F, T>: Send,
    I: Matrix<Element = T> + Sync,
    O: MatrixMut<Element = T> + Send,
{
    if inputs.n_rows() == 0 {
        return Ok(());
    }

    match config.n_threads {
        None => {
            let parallelism = Parallelism::from_threads(0);
            dispatch(
                factory,
                inputs,
                outputs,
                input_dim,
                output_dim,
                config,
                parallelism,
            )
        }
        Some(n_threads) => run_with_threads(n_threads.get(), |parallelism| {
            dispatch(
                factory,
                inputs,
                outputs,
                input_dim,
                output_dim,
                config,
                parallelism,
            )
        })?,
    }
}

fn check_inputs<I: Matrix, E>(inputs: &I, input_dim: usize) -> Result<(), BatchPredictError<E>> {
    if inputs.n_cols() != input_dim {
        tracing::warn!(
            expected = input_dim,
            actual = inputs.n_cols(),
            "input dimension mismatch"
        );
        return Err(BatchPredictError::DimensionMismatch {
            side: MatrixSide::Inputs,
            expected: input_dim,
            actual: inputs.n_cols(),
        });
    }
    Ok(())
}

fn check_outputs<I: Matrix, O: Matrix, E>(
    inputs: &I,
    outputs: &O,
    output_dim: usize,
) -> Result<(), BatchPredictError<E>> {
    if outputs.n_cols() != output_dim {
        tracing::warn!(
            expected = output_dim,
            actual = outputs.n_cols(),
            "output dimension mismatch"
        );
        return Err(BatchPredictError::DimensionMismatch {
            side: MatrixSide::Outputs,
            expected: output_dim,
            actual: outputs.n_cols(),
        });
    }
    if outputs.n_rows() != inputs.n_rows() {
        tracing::warn!(
            inputs = inputs.n_rows(),
            outputs = outputs.n_rows(),
            "rows mismatch"
        );
        return Err(BatchPredictError::RowCountMismatch {
            inputs: inputs.n_rows(),
            outputs: outputs.n_rows(),
        });
    }
    Ok(())
}

/// Partition the outputs and run one predictor per partition.
fn dispatch<T, F, I, O>(
    factory: &F,
    inputs: &I,
    outputs: &mut O,
    input_dim: usize,
    output_dim: usize,
    config: &BatchPredictConfig,
    parallelism: Parallelism,
) -> Result<(), BatchPredictError<FactoryError<F, T>>>
where
    T: Element,
    F: FalliblePredictorFactory<T> + Sync,
    FactoryError<F, T>: Send,
    I: Matrix<Element = T> + Sync,
    O: MatrixMut<Element = T> + Send,
{
    let partitions = config.partitions(inputs.n_rows(), parallelism);
    tracing::debug!(
        n_rows = inputs.n_rows(),
        input_dim,
        output_dim,
        n_partitions = partitions.len(),
        parallel = parallelism.is_parallel(),
        "dispatching batch prediction"
    );

    let blocks = outputs.partition_rows_mut(&partitions);
    parallelism.maybe_par_try_for_each(blocks, |mut block| {
        let mut predictor = FalliblePredictorFactory::new_predictor(factory);
        predict_block(&mut predictor, inputs, &mut block, input_dim, output_dim)
    })
}

/// Run `predictor` over every row of `block`, in increasing row order.
fn predict_block<T, P, I, B>(
    predictor: &mut P,
    inputs: &I,
    block: &mut B,
    input_dim: usize,
    output_dim: usize,
) -> Result<(), BatchPredictError<P::Error>>
where
    T: Element,
    P: FalliblePredictor<T>,
    I: Matrix<Element = T>,
    B: RowBlockMut<Element = T>,
{
    // Scratch buffers are only filled for matrices without row views.
    let mut input_buf: Vec<T> = Vec::new();
    let mut output_buf: Vec<T> = Vec::new();

    for local in 0..block.n_rows() {
        let row = block.first_row() + local;

        let input: &[T] = match inputs.row_slice(row) {
            Some(slice) => slice,
            None => {
                input_buf.resize(input_dim, T::default());
                inputs.copy_row(row, &mut input_buf);
                &input_buf
            }
        };

        let result = if let Some(output) = block.row_slice_mut(local) {
            predictor.try_predict(input, output)
        } else {
            output_buf.resize(output_dim, T::default());
            block.read_row(local, &mut output_buf);
            let result = predictor.try_predict(input, &mut output_buf);
            block.write_row(local, &output_buf);
            result
        };

        if let Err(source) = result {
            tracing::warn!(row, "predictor failed, cancelling remaining partitions");
            return Err(BatchPredictError::Predictor { row, source });
        }
    }

    Ok(())
}
