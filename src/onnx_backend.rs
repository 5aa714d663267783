use log::info;
use ort::session::Session;
use ort::tensor::TensorElementType;
use ort::value::{TensorRef, ValueType};

use crate::backend::{InferenceBackend, TensorData, TensorDataMut, TensorKind, TensorSpec};
use crate::error::BackendError;
use crate::types::{NUM_CHANNELS, NUM_CLASSES, WINDOW_FEATURES, WINDOW_LEN};

fn runtime(e: ort::Error) -> BackendError {
    BackendError::Runtime(e.to_string())
}

fn load_error(e: ort::Error) -> BackendError {
    BackendError::Load(e.to_string())
}

fn is_f32_tensor(value_type: &ValueType) -> bool {
    matches!(
        value_type,
        ValueType::Tensor {
            ty: TensorElementType::Float32,
            ..
        }
    )
}

/// Tensor de entrada [1, WINDOW_LEN, NUM_CHANNELS] prestado del buffer de
/// intercambio, sin copiarlo
fn input_view(staging: &[f32]) -> ort::Result<TensorRef<'_, f32>> {
    TensorRef::from_array_view(([1_usize, WINDOW_LEN, NUM_CHANNELS], staging))
}

/// Motor sobre ONNX Runtime para el host (reproducción de sesiones grabadas).
///
/// ONNX Runtime gestiona su propia memoria; el arena acota los buffers de
/// intercambio de entrada/salida, que se reservan una sola vez.
pub struct OnnxBackend {
    session: Session,
    input_name: String,
    output_name: String,
    schema_version: u32,
    input: Vec<f32>,
    output: Vec<f32>,
}

impl OnnxBackend {
    /// Carga el modelo serializado. La versión de esquema sale del campo
    /// `model_version` de los metadatos del modelo.
    pub fn load(model: &[u8]) -> Result<Self, BackendError> {
        let session = Session::builder()
            .map_err(load_error)?
            .commit_from_memory(model)
            .map_err(load_error)?;

        let input_name = session
            .inputs
            .first()
            .filter(|input| is_f32_tensor(&input.input_type))
            .map(|input| input.name.clone())
            .ok_or_else(|| BackendError::Load("missing float32 input tensor".to_string()))?;

        let output_name = session
            .outputs
            .iter()
            .find(|output| is_f32_tensor(&output.output_type))
            .map(|output| output.name.clone())
            .ok_or_else(|| BackendError::Load("missing float32 output tensor".to_string()))?;

        let version = session
            .metadata()
            .map_err(load_error)?
            .version()
            .map_err(load_error)?;
        let schema_version = u32::try_from(version)
            .map_err(|_| BackendError::Load(format!("invalid model version {}", version)))?;

        info!("[ONNX] Modelo cargado (versión {})", schema_version);
        info!("[ONNX] Input: {}", input_name);
        info!("[ONNX] Output: {}", output_name);

        Ok(Self {
            session,
            input_name,
            output_name,
            schema_version,
            input: Vec::new(),
            output: Vec::new(),
        })
    }

    fn staging_bytes() -> usize {
        (WINDOW_FEATURES + NUM_CLASSES) * std::mem::size_of::<f32>()
    }
}

impl<'a> InferenceBackend<'a> for OnnxBackend {
    fn schema_version(&self) -> u32 {
        self.schema_version
    }

    fn allocate_work_area(&mut self, arena: &'a mut [u8]) -> Result<(), BackendError> {
        let required = Self::staging_bytes();
        if arena.len() < required {
            return Err(BackendError::ArenaTooSmall {
                required,
                available: arena.len(),
            });
        }
        self.input = vec![0.0; WINDOW_FEATURES];
        self.output = vec![0.0; NUM_CLASSES];
        Ok(())
    }

    fn input_spec(&self) -> TensorSpec {
        TensorSpec {
            len: self.input.len(),
            kind: TensorKind::Float32,
        }
    }

    fn output_spec(&self) -> TensorSpec {
        TensorSpec {
            len: self.output.len(),
            kind: TensorKind::Float32,
        }
    }

    fn input_tensor(&mut self) -> TensorDataMut<'_> {
        TensorDataMut::Float32(&mut self.input)
    }

    fn output_tensor(&self) -> TensorData<'_> {
        TensorData::Float32(&self.output)
    }

    fn invoke(&mut self) -> Result<(), BackendError> {
        let input_value = input_view(&self.input).map_err(runtime)?;

        let outputs = self
            .session
            .run(ort::inputs![self.input_name.as_str() => input_value])
            .map_err(runtime)?;

        let (_, data) = outputs[self.output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(runtime)?;

        if data.len() < self.output.len() {
            return Err(BackendError::Runtime(format!(
                "output has {} values, expected {}",
                data.len(),
                self.output.len()
            )));
        }
        let n = self.output.len();
        self.output.copy_from_slice(&data[..n]);
        Ok(())
    }
}
