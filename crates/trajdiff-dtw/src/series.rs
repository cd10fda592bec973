//! Checked sample sequences.

use crate::error::DtwError;

/// Sample values of one signal: non-empty, all finite.
///
/// The payload of a [`Signal`](crate::Signal). Alignment and the
/// discrepancy metrics borrow it through [`TimeSeriesView`].
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries(Vec<f64>);

impl TimeSeries {
    /// Check and take ownership of `values`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::EmptySeries`] | No samples |
    /// | [`DtwError::NonFiniteValue`] | A sample is NaN or infinite |
    pub fn new(values: Vec<f64>) -> Result<Self, DtwError> {
        check(&values)?;
        Ok(Self(values))
    }

    /// View for the aligner.
    #[must_use]
    pub fn as_view(&self) -> TimeSeriesView<'_> {
        TimeSeriesView(&self.0)
    }

    /// Sample count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Never true once constructed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Give back the samples.
    #[must_use]
    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

impl AsRef<[f64]> for TimeSeries {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

/// Checked borrow of sample values, accepted by
/// [`Aligner::align`](crate::Aligner::align).
#[derive(Debug, Clone, Copy)]
pub struct TimeSeriesView<'a>(&'a [f64]);

impl<'a> TimeSeriesView<'a> {
    /// Check and borrow `samples`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`TimeSeries::new`].
    pub fn new(samples: &'a [f64]) -> Result<Self, DtwError> {
        check(samples)?;
        Ok(Self(samples))
    }

    /// The borrowed samples.
    #[must_use]
    pub fn as_slice(&self) -> &'a [f64] {
        self.0
    }

    /// Sample count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Never true once constructed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn check(values: &[f64]) -> Result<(), DtwError> {
    if values.is_empty() {
        return Err(DtwError::EmptySeries);
    }
    if let Some(index) = values.iter().position(|v| !v.is_finite()) {
        return Err(DtwError::NonFiniteValue { index });
    }
    Ok(())
}
