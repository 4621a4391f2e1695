use candle_core::Device;

use crate::config::EngineConfig;
use crate::error::AlignmentError;
use crate::pipeline::runtime::{AlignmentEngine, AlignmentEngineParts};

pub struct AlignmentEngineBuilder {
    config: EngineConfig,
    device: Option<Device>,
}

impl AlignmentEngineBuilder {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            device: None,
        }
    }

    /// Uses an already-initialised device instead of the one named in config.
    pub fn with_device(mut self, device: Device) -> Self {
        self.device = Some(device);
        self
    }

    pub fn with_stability_floor(mut self, stability_floor: f64) -> Self {
        self.config.stability_floor = stability_floor;
        self
    }

    pub fn with_input_validation(mut self, validate_inputs: bool) -> Self {
        self.config.validate_inputs = validate_inputs;
        self
    }

    pub fn build(self) -> Result<AlignmentEngine, AlignmentError> {
        self.config.validate()?;
        let dtype = self.config.compute_dtype()?;
        let device = match self.device {
            Some(device) => device,
            None => resolve_device(&self.config.device)?,
        };

        tracing::info!(
            device = ?device,
            dtype = dtype.as_str(),
            stability_floor = self.config.stability_floor,
            validate_inputs = self.config.validate_inputs,
            "alignment engine ready"
        );

        Ok(AlignmentEngine::from_parts(AlignmentEngineParts {
            device,
            dtype,
            stability_floor: self.config.stability_floor,
            validate_inputs: self.config.validate_inputs,
        }))
    }
}

fn resolve_device(name: &str) -> Result<Device, AlignmentError> {
    if name.eq_ignore_ascii_case("cuda") {
        Device::new_cuda(0).map_err(|e| AlignmentError::runtime("CUDA init", e))
    } else if name.eq_ignore_ascii_case("metal") {
        Device::new_metal(0).map_err(|e| AlignmentError::runtime("Metal init", e))
    } else if name.eq_ignore_ascii_case("cpu") {
        Ok(Device::Cpu)
    } else {
        Err(AlignmentError::invalid_config(format!(
            "unsupported device '{name}', expected 'cpu', 'cuda' or 'metal'"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ComputeDType;
    use crate::types::EmissionBatch;

    #[test]
    fn builder_defaults_to_cpu_f32() {
        let engine = AlignmentEngineBuilder::new(EngineConfig::default())
            .build()
            .expect("default config should build");
        assert_eq!(engine.device_label(), "cpu");
        assert_eq!(engine.dtype(), ComputeDType::F32);
        assert_eq!(engine.stability_floor(), EngineConfig::DEFAULT_STABILITY_FLOOR);
    }

    #[test]
    fn builder_floor_can_be_overridden() {
        let engine = AlignmentEngineBuilder::new(EngineConfig::default())
            .with_stability_floor(1e-6)
            .build()
            .unwrap();
        assert_eq!(engine.stability_floor(), 1e-6);
    }

    #[test]
    fn builder_rejects_invalid_floor() {
        let result = AlignmentEngineBuilder::new(EngineConfig::default())
            .with_stability_floor(-1.0)
            .build();
        assert!(matches!(result, Err(AlignmentError::InvalidConfig { .. })));
    }

    #[test]
    fn builder_explicit_device_wins() {
        let config = EngineConfig {
            dtype: "f64".to_string(),
            ..EngineConfig::default()
        };
        let engine = AlignmentEngineBuilder::new(config)
            .with_device(Device::Cpu)
            .build()
            .unwrap();
        assert_eq!(engine.device_label(), "cpu");
        assert_eq!(engine.dtype(), ComputeDType::F64);
    }

    #[cfg(not(feature = "metal"))]
    #[test]
    fn metal_is_a_known_device_that_needs_the_feature() {
        let config = EngineConfig {
            device: "metal".to_string(),
            ..EngineConfig::default()
        };
        let result = AlignmentEngineBuilder::new(config).build();
        assert!(matches!(
            result,
            Err(AlignmentError::Runtime {
                context: "Metal init",
                ..
            })
        ));
    }

    #[test]
    fn unknown_device_is_config_error() {
        let config = EngineConfig {
            device: "tpu".to_string(),
            ..EngineConfig::default()
        };
        let result = AlignmentEngineBuilder::new(config).build();
        assert!(matches!(result, Err(AlignmentError::InvalidConfig { .. })));
    }

    #[test]
    fn disabled_validation_skips_domain_check() {
        let engine = AlignmentEngineBuilder::new(EngineConfig::default())
            .with_input_validation(false)
            .build()
            .unwrap();
        let out = engine.compute(&EmissionBatch::single(vec![0.5, 1.5]));
        assert!(out.is_ok());
    }
}
