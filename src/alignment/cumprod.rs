//! Log-space cumulative products of survival terms.
//!
//! Each value is clamped into `[floor, 1]` before the logarithm, so a literal
//! zero (an element that is certainly kept) does not collapse every later
//! product to exactly zero, and a stray negative value cannot produce NaN.
//! The price is a bias of at most `floor` per clamped term.

use candle_core::Tensor;

/// Cumulative product of `values`, computed as `exp(cumsum(ln(clamp(x))))`.
///
/// With `exclusive = true` element `k` is the product of `values[..k]`, so the
/// first element is exactly 1.
pub fn safe_cumprod(values: &[f64], exclusive: bool, floor: f64) -> Vec<f64> {
    let mut log_sum = 0.0f64;
    values
        .iter()
        .map(|&x| {
            let log_x = x.clamp(floor, 1.0).ln();
            if exclusive {
                let out = log_sum.exp();
                log_sum += log_x;
                out
            } else {
                log_sum += log_x;
                log_sum.exp()
            }
        })
        .collect()
}

/// Tensor counterpart of [`safe_cumprod`] along `dim`.
pub fn safe_cumprod_tensor(
    x: &Tensor,
    dim: usize,
    exclusive: bool,
    floor: f64,
) -> candle_core::Result<Tensor> {
    let len = x.dim(dim)?;
    if len == 0 {
        return Ok(x.clone());
    }
    let log_x = x.clamp(floor, 1.0)?.log()?;
    let log_x = if exclusive {
        log_x.pad_with_zeros(dim, 1, 0)?.narrow(dim, 0, len)?
    } else {
        log_x
    };
    log_x.contiguous()?.cumsum(dim)?.exp()
}
