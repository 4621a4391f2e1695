use std::path::Path;

use candle_core::DType;

use crate::error::AlignmentError;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_device")]
    pub device: String,
    #[serde(default = "default_dtype")]
    pub dtype: String,
    /// Lower clamp applied to survival terms before taking logarithms.
    #[serde(default = "default_stability_floor")]
    pub stability_floor: f64,
    #[serde(default = "default_validate_inputs")]
    pub validate_inputs: bool,
}

impl EngineConfig {
    pub const DEFAULT_STABILITY_FLOOR: f64 = 1e-10;

    pub fn load(path: &Path) -> Result<Self, AlignmentError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| AlignmentError::io("read engine config", e))?;
        let config: Self = serde_json::from_str(&data)
            .map_err(|e| AlignmentError::json("parse engine config", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AlignmentError> {
        if !(self.stability_floor > 0.0 && self.stability_floor < 1.0) {
            return Err(AlignmentError::invalid_config(format!(
                "stability_floor must lie in (0, 1), got {}",
                self.stability_floor
            )));
        }
        self.compute_dtype()?;
        if !matches!(self.device.to_ascii_lowercase().as_str(), "cpu" | "cuda" | "metal") {
            return Err(AlignmentError::invalid_config(format!(
                "unsupported device '{}', expected 'cpu', 'cuda' or 'metal'",
                self.device
            )));
        }
        Ok(())
    }

    pub fn compute_dtype(&self) -> Result<ComputeDType, AlignmentError> {
        ComputeDType::parse(&self.dtype)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            device: default_device(),
            dtype: default_dtype(),
            stability_floor: Self::DEFAULT_STABILITY_FLOOR,
            validate_inputs: true,
        }
    }
}

fn default_device() -> String {
    "cpu".to_string()
}
fn default_dtype() -> String {
    "f32".to_string()
}
fn default_stability_floor() -> f64 {
    EngineConfig::DEFAULT_STABILITY_FLOOR
}
fn default_validate_inputs() -> bool {
    true
}

/// Floating-point precision the batched strategy runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputeDType {
    F32,
    F64,
}

impl ComputeDType {
    pub fn parse(value: &str) -> Result<Self, AlignmentError> {
        if value.eq_ignore_ascii_case("f32") {
            Ok(Self::F32)
        } else if value.eq_ignore_ascii_case("f64") {
            Ok(Self::F64)
        } else {
            Err(AlignmentError::invalid_config(format!(
                "unsupported dtype '{value}', expected 'f32' or 'f64'"
            )))
        }
    }

    pub fn as_candle(self) -> DType {
        match self {
            Self::F32 => DType::F32,
            Self::F64 => DType::F64,
        }
    }

    /// Default cross-check tolerance for results computed at this precision.
    pub fn default_tolerance(self) -> f64 {
        match self {
            Self::F32 => 1e-5,
            Self::F64 => 1e-10,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::F32 => "f32",
            Self::F64 => "f64",
        }
    }
}
