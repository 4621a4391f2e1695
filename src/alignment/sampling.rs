//! Simulation of the subsampling process and random test inputs.

use rand::Rng;

use crate::types::{AlignmentMatrix, EmissionBatch};

/// One run of the process: scan left to right and keep position `t` with
/// probability `emissions[t]`. Returns the kept source positions in order.
pub fn subsample<R: Rng + ?Sized>(emissions: &[f64], rng: &mut R) -> Vec<usize> {
    emissions
        .iter()
        .enumerate()
        .filter(|(_, &p)| rng.gen::<f64>() < p)
        .map(|(t, _)| t)
        .collect()
}

/// Monte-Carlo estimate of the alignment matrix: the fraction of `trials`
/// runs in which the m-th kept element was source position n.
pub fn empirical_alignment_matrix<R: Rng + ?Sized>(
    emissions: &[f64],
    trials: usize,
    rng: &mut R,
) -> AlignmentMatrix {
    let mut counts = AlignmentMatrix::zeros(emissions.len());
    if trials == 0 {
        return counts;
    }
    for _ in 0..trials {
        for (m, n) in subsample(emissions, rng).into_iter().enumerate() {
            counts.set(m, n, counts.get(m, n) + 1.0);
        }
    }
    let scale = 1.0 / trials as f64;
    counts.values.iter_mut().for_each(|v| *v *= scale);
    counts
}

/// `batch_size` sequences of `seq_len` uniform(0, 1) emission probabilities.
pub fn uniform_emission_batch<R: Rng + ?Sized>(
    batch_size: usize,
    seq_len: usize,
    rng: &mut R,
) -> EmissionBatch {
    EmissionBatch {
        batch_size,
        seq_len,
        values: (0..batch_size * seq_len).map(|_| rng.gen::<f64>()).collect(),
    }
}
