use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::GestureError;
use crate::types::GESTURE_ACCEL_START_THRESH;

/// Parámetros ajustables en tiempo de ejecución.
/// Los tamaños (ventana, clases, arena) son constantes de compilación.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Umbral de |ax|+|ay|+|az| (g) para iniciar una captura (default: 2.3)
    pub trigger_threshold: f32,
    /// Confianza mínima para dar por buena una clase (default: 0.70)
    pub min_confidence: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            trigger_threshold: GESTURE_ACCEL_START_THRESH,
            min_confidence: 0.70,
        }
    }
}

impl PipelineConfig {
    /// Carga desde JSON; los campos ausentes toman el valor por defecto
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, GestureError> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), GestureError> {
        if !self.trigger_threshold.is_finite() || self.trigger_threshold <= 0.0 {
            return Err(GestureError::InvalidConfig(format!(
                "trigger_threshold must be a positive number, got {}",
                self.trigger_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(GestureError::InvalidConfig(format!(
                "min_confidence must be within [0, 1], got {}",
                self.min_confidence
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_constants() {
        let config = PipelineConfig::default();
        assert_eq!(config.trigger_threshold, 2.3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "trigger_threshold": 3.5 }}"#).unwrap();

        let config = PipelineConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.trigger_threshold, 3.5);
        assert_eq!(config.min_confidence, 0.70);
    }

    #[test]
    fn test_rejects_non_positive_threshold() {
        let config = PipelineConfig {
            trigger_threshold: 0.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(GestureError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_confidence_out_of_range() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "min_confidence": 1.5 }}"#).unwrap();
        assert!(PipelineConfig::from_json_file(file.path()).is_err());
    }

    #[test]
    fn test_malformed_json_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            PipelineConfig::from_json_file(file.path()),
            Err(GestureError::JsonError(_))
        ));
    }
}
