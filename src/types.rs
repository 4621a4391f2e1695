use crate::error::AlignmentError;

/// A batch of equal-length emission-probability sequences, stored row-major
/// as (batch, position).
#[derive(Debug, Clone, PartialEq)]
pub struct EmissionBatch {
    pub batch_size: usize,
    pub seq_len: usize,
    pub values: Vec<f64>,
}

impl EmissionBatch {
    pub fn single(values: Vec<f64>) -> Self {
        Self {
            batch_size: 1,
            seq_len: values.len(),
            values,
        }
    }

    /// Builds a batch from rows that must all share one length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, AlignmentError> {
        let seq_len = rows.first().map_or(0, Vec::len);
        if let Some((idx, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != seq_len) {
            return Err(AlignmentError::shape_mismatch(format!(
                "batch entry {idx} has length {}, expected {seq_len}; pad with zeros first",
                row.len()
            )));
        }
        let batch_size = rows.len();
        Ok(Self {
            batch_size,
            seq_len,
            values: rows.into_iter().flatten().collect(),
        })
    }

    /// Builds a batch from ragged rows, padding each to the longest row with
    /// emission probability 0. A padded position is never kept, so it cannot
    /// be the target of any alignment.
    pub fn from_rows_zero_padded(rows: Vec<Vec<f64>>) -> Self {
        let seq_len = rows.iter().map(Vec::len).max().unwrap_or(0);
        let batch_size = rows.len();
        let mut values = Vec::with_capacity(batch_size * seq_len);
        for row in rows {
            let pad = seq_len - row.len();
            values.extend(row);
            values.extend(std::iter::repeat(0.0).take(pad));
        }
        Self {
            batch_size,
            seq_len,
            values,
        }
    }

    pub fn row(&self, b: usize) -> &[f64] {
        let start = b * self.seq_len;
        &self.values[start..start + self.seq_len]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        (0..self.batch_size).map(move |b| self.row(b))
    }

    pub fn is_empty(&self) -> bool {
        self.batch_size == 0
    }

    /// Rejects NaN and anything outside [0, 1].
    pub fn validate(&self) -> Result<(), AlignmentError> {
        for (b, row) in self.rows().enumerate() {
            validate_emission_probabilities(row, b)?;
        }
        Ok(())
    }
}

pub(crate) fn validate_emission_probabilities(
    values: &[f64],
    batch: usize,
) -> Result<(), AlignmentError> {
    match values
        .iter()
        .enumerate()
        .find(|(_, &p)| !(0.0..=1.0).contains(&p))
    {
        Some((position, &value)) => Err(AlignmentError::invalid_probability(
            batch, position, value,
        )),
        None => Ok(()),
    }
}

/// Square matrix `A[m][n] = p(y_m = s_n)`, stored row-major.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct AlignmentMatrix {
    pub size: usize,
    pub values: Vec<f64>,
}

impl AlignmentMatrix {
    pub fn zeros(size: usize) -> Self {
        Self {
            size,
            values: vec![0.0; size * size],
        }
    }

    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, AlignmentError> {
        let size = rows.len();
        if let Some((idx, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != size) {
            return Err(AlignmentError::shape_mismatch(format!(
                "alignment row {idx} has {} columns, expected {size}",
                row.len()
            )));
        }
        Ok(Self {
            size,
            values: rows.into_iter().flatten().collect(),
        })
    }

    #[inline]
    pub fn get(&self, m: usize, n: usize) -> f64 {
        self.values[m * self.size + n]
    }

    #[inline]
    pub(crate) fn set(&mut self, m: usize, n: usize, value: f64) {
        self.values[m * self.size + n] = value;
    }

    pub fn row(&self, m: usize) -> &[f64] {
        &self.values[m * self.size..(m + 1) * self.size]
    }

    /// Probability mass that an m-th output exists at all.
    pub fn row_mass(&self, m: usize) -> f64 {
        self.row(m).iter().sum()
    }

    /// Expected number of kept elements.
    pub fn total_mass(&self) -> f64 {
        self.values.iter().sum()
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..self.size).map(|m| self.row(m).to_vec()).collect()
    }

    /// Largest element-wise absolute difference, or `None` when sizes differ.
    pub fn max_abs_diff(&self, other: &Self) -> Option<f64> {
        if self.size != other.size {
            return None;
        }
        Some(
            self.values
                .iter()
                .zip(&other.values)
                .map(|(a, b)| (a - b).abs())
                .fold(0.0, f64::max),
        )
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct AlignmentBatch {
    pub matrices: Vec<AlignmentMatrix>,
}

impl AlignmentBatch {
    pub fn len(&self) -> usize {
        self.matrices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matrices.is_empty()
    }

    pub fn get(&self, b: usize) -> Option<&AlignmentMatrix> {
        self.matrices.get(b)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AlignmentMatrix> {
        self.matrices.iter()
    }

    pub fn max_abs_diff(&self, other: &Self) -> Option<f64> {
        if self.len() != other.len() {
            return None;
        }
        self.matrices
            .iter()
            .zip(&other.matrices)
            .try_fold(0.0f64, |acc, (a, b)| a.max_abs_diff(b).map(|d| acc.max(d)))
    }
}
