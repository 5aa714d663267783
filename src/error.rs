use thiserror::Error;

/// Fallos del driver del IMU
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SensorError {
    #[error("IMU read failed: {0}")]
    Read(String),

    #[error("Sensor source exhausted")]
    Exhausted,
}

/// Fallos reportados por el motor de inferencia
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("Model could not be loaded: {0}")]
    Load(String),

    #[error("Work area too small: need {required} bytes, arena has {available}")]
    ArenaTooSmall { required: usize, available: usize },

    #[error("Inference runtime error: {0}")]
    Runtime(String),
}

#[derive(Error, Debug)]
pub enum GestureError {
    #[error("Model schema version mismatch: expected {expected}, got {found}")]
    ModelVersionMismatch { expected: u32, found: u32 },

    #[error("Tensor allocation failed: {0}")]
    ArenaAllocationFailure(#[source] BackendError),

    #[error("Sensor read failed at sample {index}: {source}")]
    SensorReadFailure {
        index: usize,
        #[source]
        source: SensorError,
    },

    #[error("Invoke failed: {0}")]
    InferenceInvokeFailure(#[source] BackendError),

    #[error("Invalid {kind} tensor size: expected {expected}, got {actual}")]
    TensorShapeMismatch {
        kind: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("The {kind} tensor buffer does not match its declared element type")]
    TensorTypeMismatch { kind: &'static str },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid labels: expected {expected} classes, got {actual}")]
    InvalidLabels { expected: usize, actual: usize },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl GestureError {
    /// Los fallos de un ciclo se pueden reintentar en el siguiente disparo;
    /// el resto son de inicialización y son terminales
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            GestureError::SensorReadFailure { .. }
                | GestureError::InferenceInvokeFailure(_)
        )
    }
}
