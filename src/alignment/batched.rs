//! Vectorized strategy.
//!
//! The recurrence over output rank `m` stays sequential, but the sum over the
//! previous source position `j` becomes one batched matmul per step, and the
//! batch axis is carried through every tensor op.

use candle_core::Tensor;

use crate::alignment::cumprod::safe_cumprod_tensor;

/// Alignment matrices for a `(B, T)` tensor of emission probabilities.
///
/// Returns a `(B, T, T)` tensor indexed `(batch, m, n)`. Inputs are assumed
/// to be valid probabilities; validation happens at the engine boundary.
pub fn compute_alignment_matrix_batched(
    emissions: &Tensor,
    floor: f64,
) -> candle_core::Result<Tensor> {
    let (b, t_len) = emissions.dims2()?;
    if b == 0 || t_len == 0 {
        return Tensor::zeros((b, t_len, t_len), emissions.dtype(), emissions.device());
    }

    let survival = emissions.affine(-1.0, 1.0)?;
    let suffix = suffix_survival(&survival, floor)?;

    // Rank 0: kept at n, nothing kept before n.
    let mut prev = emissions.mul(&safe_cumprod_tensor(&survival, 1, true, floor)?)?;
    let mut rows = Vec::with_capacity(t_len);
    rows.push(prev.clone());

    for _m in 1..t_len {
        let carried = prev.unsqueeze(1)?.contiguous()?.matmul(&suffix)?.squeeze(1)?;
        let next = emissions.mul(&carried)?;
        rows.push(next.clone());
        prev = next;
    }

    Tensor::stack(&rows, 1)
}

/// `S[b][j][n] = prod_{i=j+1}^{n-1} (1 - e[b][i])` for `n > j`, exactly zero
/// for `n <= j`. Shape `(B, T, T)`.
pub(crate) fn suffix_survival(survival: &Tensor, floor: f64) -> candle_core::Result<Tensor> {
    let (b, t_len) = survival.dims2()?;
    let mut slices = Vec::with_capacity(t_len);
    for j in 0..t_len {
        let tail = t_len - j - 1;
        let slice = if tail == 0 {
            Tensor::zeros((b, t_len), survival.dtype(), survival.device())?
        } else {
            let suffix = survival.narrow(1, j + 1, tail)?;
            safe_cumprod_tensor(&suffix, 1, true, floor)?.pad_with_zeros(1, j + 1, 0)?
        };
        slices.push(slice);
    }
    Tensor::stack(&slices, 1)?.contiguous()
}
