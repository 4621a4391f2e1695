//! Alignment probabilities under stochastic subsampling.
//!
//! A source sequence is scanned left to right and each element `t` is kept
//! independently with emission probability `e[t]`. For every output rank `m`
//! and source position `n` we compute `A[m][n] = p(y_m = s_n)`.
//!
//! Two strategies compute the same matrix:
//! - [`reference`]: direct O(T^3) recurrence, the ground truth.
//! - [`batched`]: the recurrence as batched tensor ops over a `(B, T)` input.
//!
//! [`oracles`] and [`sampling`] provide independent checks of both.

pub mod batched;
pub mod cumprod;
pub mod oracles;
pub mod reference;
pub mod sampling;
