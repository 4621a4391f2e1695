use candle_core::{DType, Device, Tensor};

use crate::alignment::batched::compute_alignment_matrix_batched;
use crate::config::ComputeDType;
use crate::error::AlignmentError;
use crate::types::{validate_emission_probabilities, AlignmentBatch, AlignmentMatrix, EmissionBatch};

/// Runs the batched strategy on a configured device and precision.
pub struct AlignmentEngine {
    device: Device,
    dtype: ComputeDType,
    stability_floor: f64,
    validate_inputs: bool,
}

pub(crate) struct AlignmentEngineParts {
    pub device: Device,
    pub dtype: ComputeDType,
    pub stability_floor: f64,
    pub validate_inputs: bool,
}

impl AlignmentEngine {
    pub(crate) fn from_parts(parts: AlignmentEngineParts) -> Self {
        Self {
            device: parts.device,
            dtype: parts.dtype,
            stability_floor: parts.stability_floor,
            validate_inputs: parts.validate_inputs,
        }
    }

    pub fn compute(&self, batch: &EmissionBatch) -> Result<AlignmentBatch, AlignmentError> {
        if batch.values.len() != batch.batch_size * batch.seq_len {
            return Err(AlignmentError::shape_mismatch(format!(
                "batch holds {} values, expected {} x {}",
                batch.values.len(),
                batch.batch_size,
                batch.seq_len
            )));
        }
        if self.validate_inputs {
            batch.validate()?;
        }
        if batch.is_empty() || batch.seq_len == 0 {
            return Ok(AlignmentBatch {
                matrices: vec![AlignmentMatrix::zeros(0); batch.batch_size],
            });
        }

        let emissions = Tensor::from_vec(
            batch.values.clone(),
            (batch.batch_size, batch.seq_len),
            &self.device,
        )
        .and_then(|t| t.to_dtype(self.dtype.as_candle()))
        .map_err(|e| AlignmentError::runtime("tensor creation", e))?;

        let alignment = self.run(&emissions)?;
        let rows = alignment
            .to_dtype(DType::F64)
            .and_then(|t| t.to_vec3::<f64>())
            .map_err(|e| AlignmentError::runtime("to_vec3", e))?;

        rows.into_iter()
            .map(AlignmentMatrix::from_rows)
            .collect::<Result<Vec<_>, _>>()
            .map(|matrices| AlignmentBatch { matrices })
    }

    /// Tensor-in, tensor-out variant for callers that already hold a `(B, T)`
    /// emission tensor. The result keeps the input's device; its dtype is the
    /// engine's compute dtype.
    pub fn compute_tensor(&self, emissions: &Tensor) -> Result<Tensor, AlignmentError> {
        emissions.dims2().map_err(|_| {
            AlignmentError::shape_mismatch(format!(
                "emission tensor must have shape (batch, seq_len), got {:?}",
                emissions.dims()
            ))
        })?;
        if self.validate_inputs {
            let rows = emissions
                .to_dtype(DType::F64)
                .and_then(|t| t.to_vec2::<f64>())
                .map_err(|e| AlignmentError::runtime("read emissions", e))?;
            for (b, row) in rows.iter().enumerate() {
                validate_emission_probabilities(row, b)?;
            }
        }
        let emissions = emissions
            .to_dtype(self.dtype.as_candle())
            .map_err(|e| AlignmentError::runtime("dtype conversion", e))?;
        self.run(&emissions)
    }

    fn run(&self, emissions: &Tensor) -> Result<Tensor, AlignmentError> {
        let (batch_size, seq_len) = emissions
            .dims2()
            .map_err(|e| AlignmentError::runtime("emission dims2", e))?;
        tracing::debug!(
            batch_size,
            seq_len,
            dtype = self.dtype.as_str(),
            "computing batched alignment matrices"
        );
        compute_alignment_matrix_batched(emissions, self.stability_floor)
            .map_err(|e| AlignmentError::runtime("batched alignment", e))
    }

    pub fn stability_floor(&self) -> f64 {
        self.stability_floor
    }

    pub fn dtype(&self) -> ComputeDType {
        self.dtype
    }

    pub fn device_label(&self) -> String {
        if self.device.is_cuda() {
            "cuda".to_string()
        } else if self.device.is_metal() {
            "metal".to_string()
        } else {
            "cpu".to_string()
        }
    }
}
