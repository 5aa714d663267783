//! Clasificación de gestos disparada por IMU.
//!
//! Un disparo barato (una sola lectura del acelerómetro) decide si se captura
//! una ventana de `WINDOW_LEN` muestras de 6 ejes. La ventana se normaliza,
//! se cuantiza al tipo nativo del motor de inferencia, se infiere y la salida
//! se decodifica en puntuaciones por clase más la clase ganadora.

pub mod backend;
pub mod config;
pub mod csv_loader;
pub mod error;
pub mod gesture_buffer;
pub mod gesture_classifier;
pub mod quantization;
pub mod sensor;
pub mod trigger;
pub mod types;

#[cfg(feature = "onnx")]
pub mod onnx_backend;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::{Arena, InferenceBackend, TensorKind, TensorSpec};
pub use config::PipelineConfig;
pub use error::{BackendError, GestureError, SensorError};
pub use gesture_classifier::{GesturePipeline, PipelineState, SharedPipeline};
pub use sensor::SensorSource;
pub use types::{Classification, Sample};
