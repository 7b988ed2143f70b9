//! Predictor capabilities consumed by the batch driver.
//!
//! A [`Predictor`] maps one input row to one output row. It may keep mutable
//! scratch state between calls, so the driver never shares an instance between
//! threads: it asks a [`PredictorFactory`] for a fresh instance per partition.
//!
//! Closures work for both roles: any `FnMut(&[T], &mut [T])` is a predictor and
//! any `Fn() -> P` returning a predictor is a factory.

use std::convert::Infallible;

use crate::data::Element;

/// Maps one fixed-length input row to one fixed-length output row.
///
/// `output` holds the current contents of the destination row on entry and has
/// exactly `output_dim` elements; `input` has exactly `input_dim` elements.
pub trait Predictor<T: Element = f64> {
    /// Predict for a single row, writing the result into `output`.
    fn predict(&mut self, input: &[T], output: &mut [T]);
}

impl<T: Element, F: FnMut(&[T], &mut [T])> Predictor<T> for F {
    #[inline]
    fn predict(&mut self, input: &[T], output: &mut [T]) {
        self(input, output)
    }
}

/// A predictor that can fail on individual rows.
///
/// Used with [`try_batch_predict`](super::try_batch_predict). The first failure
/// aborts the batch.
pub trait FalliblePredictor<T: Element = f64> {
    /// Error reported for a failed row.
    type Error;

    /// Predict for a single row, writing the result into `output`.
    fn try_predict(&mut self, input: &[T], output: &mut [T]) -> Result<(), Self::Error>;
}

impl<T: Element, E, F: FnMut(&[T], &mut [T]) -> Result<(), E>> FalliblePredictor<T> for F {
    type Error = E;

    #[inline]
    fn try_predict(&mut self, input: &[T], output: &mut [T]) -> Result<(), E> {
        self(input, output)
    }
}

/// Produces independent [`Predictor`] instances.
///
/// Called once per partition, possibly from several threads at once.
pub trait PredictorFactory<T: Element = f64> {
    type Predictor: Predictor<T>;

    /// Create a fresh predictor with its own scratch state.
    fn new_predictor(&self) -> Self::Predictor;
}

impl<T: Element, P: Predictor<T>, F: Fn() -> P> PredictorFactory<T> for F {
    type Predictor = P;

    #[inline]
    fn new_predictor(&self) -> P {
        self()
    }
}

/// Produces independent [`FalliblePredictor`] instances.
pub trait FalliblePredictorFactory<T: Element = f64> {
    type Predictor: FalliblePredictor<T>;

    /// Create a fresh predictor with its own scratch state.
    fn new_predictor(&self) -> Self::Predictor;
}

impl<T: Element, P: FalliblePredictor<T>, F: Fn() -> P> FalliblePredictorFactory<T> for F {
    type Predictor = P;

    #[inline]
    fn new_predictor(&self) -> P {
        self()
    }
}

/// Factory that hands out clones of a prototype predictor.
///
/// Convenient when a predictor is cheap to clone and carries its own scratch
/// buffers.
#[derive(Debug, Clone)]
pub struct CloneFactory<P>(pub P);

impl<T: Element, P: Predictor<T> + Clone> PredictorFactory<T> for CloneFactory<P> {
    type Predictor = P;

    #[inline]
    fn new_predictor(&self) -> P {
        self.0.clone()
    }
}

// =============================================================================
// Infallible adapters
// =============================================================================

/// Runs an infallible predictor through the fallible driver path.
#[derive(Debug)]
pub(crate) struct NeverFails<P>(P);

impl<T: Element, P: Predictor<T>> FalliblePredictor<T> for NeverFails<P> {
    type Error = Infallible;

    #[inline]
    fn try_predict(&mut self, input: &[T], output: &mut [T]) -> Result<(), Infallible> {
        self.0.predict(input, output);
        Ok(())
    }
}

/// Borrows a [`PredictorFactory`] as a [`FalliblePredictorFactory`].
#[derive(Debug)]
pub(crate) struct NeverFailsFactory<'f, F>(pub(crate) &'f F);

impl<T: Element, F: PredictorFactory<T>> FalliblePredictorFactory<T> for NeverFailsFactory<'_, F> {
    type Predictor = NeverFails<F::Predictor>;

    #[inline]
    fn new_predictor(&self) -> Self::Predictor {
        NeverFails(PredictorFactory::new_predictor(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Default)]
    struct Doubler {
        calls: usize,
    }

    impl Predictor for Doubler {
        fn predict(&mut self, input: &[f64], output: &mut [f64]) {
            self.calls += 1;
            for (o, i) in output.iter_mut().zip(input) {
                *o = 2.0 * i;
            }
        }
    }

    #[test]
    fn closure_predictor() {
        let mut offset = 0.0;
        let mut p = |input: &[f32], output: &mut [f32]| {
            offset += 1.0;
            output[0] = input[0] + offset;
        };
        let mut out = [0.0f32];
        Predictor::<f32>::predict(&mut p, &[1.0], &mut out);
        Predictor::<f32>::predict(&mut p, &[1.0], &mut out);
        assert_eq!(out, [3.0]);
    }

    #[test]
    fn clone_factory_gives_independent_instances() {
        let factory = CloneFactory(Doubler::default());
        let mut a = PredictorFactory::<f64>::new_predictor(&factory);
        let b = PredictorFactory::<f64>::new_predictor(&factory);

        let mut out = [0.0; 2];
        a.predict(&[1.0, 2.0], &mut out);
        assert_eq!(out, [2.0, 4.0]);
        assert_eq!(a.calls, 1);
        assert_eq!(b.calls, 0);
        assert_eq!(factory.0.calls, 0);
    }

    #[test]
    fn fallible_closure_factory() {
        let factory = || {
            |input: &[f64], output: &mut [f64]| {
                if input[0] < 0.0 {
                    return Err("negative input");
                }
                output[0] = input[0].sqrt();
                Ok(())
            }
        };
        let mut p = FalliblePredictorFactory::<f64>::new_predictor(&factory);
        let mut out = [0.0];
        let result = FalliblePredictor::<f64>::try_predict(&mut p, &[4.0], &mut out);
        assert_eq!(result, Ok(()));
        assert_eq!(out, [2.0]);
        assert_eq!(
            FalliblePredictor::<f64>::try_predict(&mut p, &[-1.0], &mut out),
            Err("negative input")
        );
    }

    #[test]
    fn never_fails_adapter() {
        let factory = CloneFactory(Doubler::default());
        let adapter = NeverFailsFactory(&factory);
        let mut p = FalliblePredictorFactory::<f64>::new_predictor(&adapter);
        let mut out = [0.0];
        assert_eq!(p.try_predict(&[3.0], &mut out), Ok(()));
        assert_eq!(out, [6.0]);
    }
}
