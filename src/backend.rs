//! Contrato con el motor de inferencia (externo).
//!
//! El motor es opaco: carga un modelo serializado, reparte sus tensores dentro
//! de un arena de tamaño fijo y expone un buffer de entrada y uno de salida.
//! El tipo de elemento de cada tensor se fija una sola vez, al inicializar.

use crate::error::BackendError;
use crate::quantization::QuantParams;

/// Tipo de elemento de un tensor, con sus parámetros afines si es int8
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TensorKind {
    Float32,
    Int8(QuantParams),
}

impl TensorKind {
    pub fn name(&self) -> &'static str {
        match self {
            TensorKind::Float32 => "float32",
            TensorKind::Int8(_) => "int8",
        }
    }

    pub fn quant_params(&self) -> Option<QuantParams> {
        match self {
            TensorKind::Float32 => None,
            TensorKind::Int8(params) => Some(*params),
        }
    }
}

/// Metadatos de un tensor: número de elementos y tipo
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TensorSpec {
    pub len: usize,
    pub kind: TensorKind,
}

/// Vista de solo lectura sobre el buffer de un tensor
#[derive(Debug)]
pub enum TensorData<'t> {
    Float32(&'t [f32]),
    Int8(&'t [i8]),
}

impl TensorData<'_> {
    pub fn len(&self) -> usize {
        match self {
            TensorData::Float32(data) => data.len(),
            TensorData::Int8(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Vista mutable sobre el buffer de un tensor
#[derive(Debug)]
pub enum TensorDataMut<'t> {
    Float32(&'t mut [f32]),
    Int8(&'t mut [i8]),
}

impl TensorDataMut<'_> {
    pub fn len(&self) -> usize {
        match self {
            TensorDataMut::Float32(data) => data.len(),
            TensorDataMut::Int8(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Motor de inferencia con el modelo ya cargado.
///
/// `'a` es la vida del arena: el motor lo toma prestado en
/// `allocate_work_area` y lo usa para todas las inferencias posteriores.
pub trait InferenceBackend<'a> {
    /// Versión de esquema declarada por el modelo cargado
    fn schema_version(&self) -> u32;

    /// Reparte los tensores dentro del arena. Se llama una sola vez.
    fn allocate_work_area(&mut self, arena: &'a mut [u8]) -> Result<(), BackendError>;

    /// Solo válido después de `allocate_work_area`
    fn input_spec(&self) -> TensorSpec;

    /// Solo válido después de `allocate_work_area`
    fn output_spec(&self) -> TensorSpec;

    fn input_tensor(&mut self) -> TensorDataMut<'_>;

    fn output_tensor(&self) -> TensorData<'_>;

    /// Pasada hacia delante sobre el buffer de entrada actual
    fn invoke(&mut self) -> Result<(), BackendError>;
}

/// Arena de trabajo de tamaño fijo, alineado a 16 bytes.
/// Se crea una vez y se presta al motor durante toda su vida.
#[repr(C, align(16))]
pub struct Arena<const N: usize> {
    bytes: [u8; N],
}

impl<const N: usize> Arena<N> {
    pub const fn new() -> Self {
        Self { bytes: [0; N] }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.bytes
    }
}

impl<const N: usize> Default for Arena<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arena_is_aligned_and_sized() {
        let mut arena = Arena::<1024>::new();
        assert_eq!(arena.capacity(), 1024);
        let slice = arena.as_mut_slice();
        assert_eq!(slice.len(), 1024);
        assert_eq!(slice.as_ptr() as usize % 16, 0);
    }

    #[test]
    fn test_tensor_kind_exposes_quant_params_only_for_int8() {
        let params = QuantParams::new(0.5, 3);
        assert_eq!(TensorKind::Int8(params).quant_params(), Some(params));
        assert_eq!(TensorKind::Float32.quant_params(), None);
        assert_eq!(TensorKind::Int8(params).name(), "int8");
    }

    #[test]
    fn test_tensor_views_report_length() {
        let mut floats = [0.0f32; 4];
        let codes = [0i8; 2];
        assert_eq!(TensorDataMut::Float32(&mut floats).len(), 4);
        assert_eq!(TensorData::Int8(&codes).len(), 2);
        assert!(TensorData::Float32(&[]).is_empty());
    }
}
