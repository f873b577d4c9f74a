//! # Surrogate Results
//!
//! Fixed-shape `count x L` table of generated surrogates plus per-surrogate
//! diagnostics. Rows are stored in generation-index order regardless of the
//! order in which surrogates finished refining.

use crate::errors::{SurrogateError, SurrogateResult};

/// How one surrogate's refinement went.
#[derive(Debug, Clone, PartialEq)]
pub struct SurrogateDiagnostics {
    /// Zero-based generation index (row number)
    pub index: usize,
    /// Iteration at which the convergence test passed
    pub iterations: usize,
    /// Successive-iterate ratio at the stopping iteration
    pub final_ratio: f64,
    /// Relative RMS difference between the surrogate's and the target amplitude spectrum
    pub spectral_error: f64,
}

/// Caller-facing shape of a batch: a flat series for one surrogate, a table otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum SurrogateOutput {
    /// `count == 1`
    Single(Vec<f64>),
    /// `count > 1`, one row per surrogate
    Table(Vec<Vec<f64>>),
}

impl SurrogateOutput {
    /// Number of surrogates held.
    pub fn count(&self) -> usize {
        match self {
            SurrogateOutput::Single(_) => 1,
            SurrogateOutput::Table(rows) => rows.len(),
        }
    }
}

/// Generated surrogates, row-major `count x len`.
#[derive(Debug, Clone, PartialEq)]
pub struct SurrogateSet {
    data: Vec<f64>,
    count: usize,
    len: usize,
    diagnostics: Vec<SurrogateDiagnostics>,
    trend: Option<Vec<f64>>,
}

impl SurrogateSet {
    /// Allocate a zeroed table for `count` surrogates of length `len`.
    ///
    /// Fails instead of aborting when the table cannot be sized or allocated.
    pub(crate) fn with_shape(
        count: usize,
        len: usize,
        trend: Option<Vec<f64>>,
    ) -> SurrogateResult<Self> {
        let too_large = || SurrogateError::InvalidParameter {
            parameter: "count".to_string(),
            value: count as f64,
            constraint: format!("a {} x {} table that fits in memory", count, len),
        };

        let cells = count.checked_mul(len).ok_or_else(too_large)?;
        let mut data = Vec::new();
        data.try_reserve_exact(cells).map_err(|_| too_large())?;
        data.resize(cells, 0.0);

        let mut diagnostics = Vec::new();
        diagnostics
            .try_reserve_exact(count)
            .map_err(|_| too_large())?;

        Ok(Self {
            data,
            count,
            len,
            diagnostics,
            trend,
        })
    }

    /// Store a finished surrogate at its generation index.
    ///
    /// Diagnostics are kept in arrival order until [`SurrogateSet::finish`].
    pub(crate) fn store(
        &mut self,
        values: &[f64],
        diagnostics: SurrogateDiagnostics,
    ) -> SurrogateResult<()> {
        let index = diagnostics.index;
        if index >= self.count || values.len() != self.len {
            return Err(SurrogateError::NumericalError {
                reason: format!(
                    "surrogate {} of length {} does not fit a {}x{} table",
                    index,
                    values.len(),
                    self.count,
                    self.len
                ),
                operation: Some("store_surrogate".to_string()),
            });
        }

        self.data[index * self.len..(index + 1) * self.len].copy_from_slice(values);
        self.diagnostics.push(diagnostics);
        Ok(())
    }

    /// Order diagnostics by index once every surrogate has been stored.
    pub(crate) fn finish(mut self) -> SurrogateResult<Self> {
        if self.diagnostics.len() != self.count {
            return Err(SurrogateError::NumericalError {
                reason: format!(
                    "{} of {} surrogates stored",
                    self.diagnostics.len(),
                    self.count
                ),
                operation: Some("finish_surrogates".to_string()),
            });
        }
        self.diagnostics.sort_unstable_by_key(|d| d.index);
        Ok(self)
    }

    /// `(count, len)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.count, self.len)
    }

    /// Number of surrogates.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Length of every surrogate.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when the set holds no values.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Surrogate `index`, if present.
    pub fn row(&self, index: usize) -> Option<&[f64]> {
        if index < self.count {
            Some(&self.data[index * self.len..(index + 1) * self.len])
        } else {
            None
        }
    }

    /// Surrogates in generation order.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.data.chunks_exact(self.len.max(1))
    }

    /// Row-major backing storage.
    pub fn as_flat(&self) -> &[f64] {
        &self.data
    }

    /// Per-surrogate diagnostics, ordered by index.
    pub fn diagnostics(&self) -> &[SurrogateDiagnostics] {
        &self.diagnostics
    }

    /// Line removed before analysis, if detrending was requested.
    pub fn trend(&self) -> Option<&[f64]> {
        self.trend.as_deref()
    }

    /// Surrogate `index` with the removed trend added back.
    ///
    /// Without detrending this is the row itself.
    pub fn retrended_row(&self, index: usize) -> Option<Vec<f64>> {
        let row = self.row(index)?;
        Some(match &self.trend {
            Some(trend) => row.iter().zip(trend).map(|(&x, &t)| x + t).collect(),
            None => row.to_vec(),
        })
    }

    /// Flat series for a single surrogate, nested rows otherwise.
    pub fn into_output(self) -> SurrogateOutput {
        if self.count == 1 {
            SurrogateOutput::Single(self.data)
        } else {
            SurrogateOutput::Table(self.rows().map(<[f64]>::to_vec).collect())
        }
    }
}
