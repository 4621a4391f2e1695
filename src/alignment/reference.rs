//! Scalar reference strategy.
//!
//! Direct evaluation of the alignment recurrence with plain products, O(T^3)
//! per sequence. It defines the expected values every other strategy is
//! checked against and is not meant to scale.

use crate::error::AlignmentError;
use crate::types::{validate_emission_probabilities, AlignmentBatch, AlignmentMatrix, EmissionBatch};

/// Alignment matrix for one emission sequence.
///
/// `A[m][n]` is the probability that the m-th kept element is source element
/// `n`. Entries with `n < m` are exactly zero.
pub fn compute_alignment_matrix(emissions: &[f64]) -> Result<AlignmentMatrix, AlignmentError> {
    validate_emission_probabilities(emissions, 0)?;
    Ok(alignment_matrix_unchecked(emissions))
}

/// Applies [`compute_alignment_matrix`] to every entry of `batch`.
pub fn compute_alignment_batch(batch: &EmissionBatch) -> Result<AlignmentBatch, AlignmentError> {
    batch.validate()?;
    Ok(AlignmentBatch {
        matrices: batch.rows().map(alignment_matrix_unchecked).collect(),
    })
}

fn alignment_matrix_unchecked(e: &[f64]) -> AlignmentMatrix {
    let t_len = e.len();
    let mut a = AlignmentMatrix::zeros(t_len);

    // Rank 0: n is kept and nothing before it was.
    let mut none_kept = 1.0;
    for (n, &p) in e.iter().enumerate() {
        a.set(0, n, p * none_kept);
        none_kept *= 1.0 - p;
    }

    for m in 1..t_len {
        for n in m..t_len {
            // Walk j down from n - 1 so the gap survival prod_{i=j+1}^{n-1} (1 - e[i])
            // grows by one factor per step.
            let mut total = 0.0;
            let mut gap = 1.0;
            for j in (m - 1..n).rev() {
                if j + 1 < n {
                    gap *= 1.0 - e[j + 1];
                }
                total += a.get(m - 1, j) * gap;
            }
            a.set(m, n, e[n] * total);
        }
    }
    a
}
