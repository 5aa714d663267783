//! Dobles de prueba: sensor con guion y motor de inferencia simulado.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::backend::{InferenceBackend, TensorData, TensorDataMut, TensorKind, TensorSpec};
use crate::error::{BackendError, SensorError};
use crate::quantization::QuantParams;
use crate::sensor::SensorSource;
use crate::types::{AccelReading, Sample, MODEL_SCHEMA_VERSION, NUM_CLASSES, WINDOW_FEATURES};

/// Sensor que devuelve lecturas preparadas y cuenta las llamadas
#[derive(Debug, Default)]
pub struct ScriptedSensor {
    accel: VecDeque<AccelReading>,
    samples: VecDeque<Sample>,
    fail_accel: bool,
    fail_full_at: Option<usize>,
    pub accel_reads: usize,
    pub full_reads: usize,
}

impl ScriptedSensor {
    pub fn with_accel(accel: Vec<AccelReading>) -> Self {
        Self {
            accel: accel.into(),
            ..Default::default()
        }
    }

    pub fn with_samples(samples: Vec<Sample>) -> Self {
        Self {
            samples: samples.into(),
            ..Default::default()
        }
    }

    /// Una lectura de disparo seguida de una ventana de muestras
    pub fn triggered(trigger: AccelReading, samples: Vec<Sample>) -> Self {
        Self {
            accel: VecDeque::from(vec![trigger]),
            samples: samples.into(),
            ..Default::default()
        }
    }

    pub fn failing_accel() -> Self {
        Self {
            fail_accel: true,
            ..Default::default()
        }
    }

    /// La llamada número `index` a read_all falla
    pub fn failing_full_read_at(mut self, index: usize) -> Self {
        self.fail_full_at = Some(index);
        self
    }
}

impl SensorSource for ScriptedSensor {
    fn read_acceleration(&mut self) -> Result<AccelReading, SensorError> {
        self.accel_reads += 1;
        if self.fail_accel {
            return Err(SensorError::Read("i2c timeout".to_string()));
        }
        self.accel.pop_front().ok_or(SensorError::Exhausted)
    }

    fn read_all(&mut self) -> Result<Sample, SensorError> {
        let call = self.full_reads;
        self.full_reads += 1;
        if self.fail_full_at == Some(call) {
            return Err(SensorError::Read("i2c nack".to_string()));
        }
        self.samples.pop_front().ok_or(SensorError::Exhausted)
    }
}

/// Contadores compartidos: siguen vivos aunque el motor se destruya
#[derive(Debug, Default)]
pub struct BackendCalls {
    pub allocations: AtomicUsize,
    pub invokes: AtomicUsize,
}

impl BackendCalls {
    pub fn allocations(&self) -> usize {
        self.allocations.load(Ordering::SeqCst)
    }

    pub fn invokes(&self) -> usize {
        self.invokes.load(Ordering::SeqCst)
    }
}

/// Motor simulado: salida fija, guarda la última entrada recibida
pub struct MockBackend<'a> {
    pub version: u32,
    pub required_arena: usize,
    pub input: TensorSpec,
    pub output: TensorSpec,
    pub output_f32: Vec<f32>,
    pub output_i8: Vec<i8>,
    pub fail_invoke: bool,
    /// Devuelve un buffer de entrada del tipo contrario al declarado
    pub swap_input_type: bool,
    pub calls: Arc<BackendCalls>,
    pub last_input_f32: Vec<f32>,
    pub last_input_i8: Vec<i8>,
    input_f32: Vec<f32>,
    input_i8: Vec<i8>,
    arena: Option<&'a mut [u8]>,
}

impl<'a> MockBackend<'a> {
    pub fn float(scores: [f32; NUM_CLASSES]) -> Self {
        Self {
            version: MODEL_SCHEMA_VERSION,
            required_arena: 1024,
            input: TensorSpec {
                len: WINDOW_FEATURES,
                kind: TensorKind::Float32,
            },
            output: TensorSpec {
                len: NUM_CLASSES,
                kind: TensorKind::Float32,
            },
            output_f32: scores.to_vec(),
            output_i8: Vec::new(),
            fail_invoke: false,
            swap_input_type: false,
            calls: Arc::new(BackendCalls::default()),
            last_input_f32: Vec::new(),
            last_input_i8: Vec::new(),
            input_f32: vec![0.0; WINDOW_FEATURES],
            input_i8: vec![0; WINDOW_FEATURES],
            arena: None,
        }
    }

    pub fn int8(input: QuantParams, output: QuantParams, codes: [i8; NUM_CLASSES]) -> Self {
        Self {
            input: TensorSpec {
                len: WINDOW_FEATURES,
                kind: TensorKind::Int8(input),
            },
            output: TensorSpec {
                len: NUM_CLASSES,
                kind: TensorKind::Int8(output),
            },
            output_i8: codes.to_vec(),
            ..Self::float([0.0; NUM_CLASSES])
        }
    }

    pub fn arena_len(&self) -> Option<usize> {
        self.arena.as_ref().map(|arena| arena.len())
    }
}

impl<'a> InferenceBackend<'a> for MockBackend<'a> {
    fn schema_version(&self) -> u32 {
        self.version
    }

    fn allocate_work_area(&mut self, arena: &'a mut [u8]) -> Result<(), BackendError> {
        self.calls.allocations.fetch_add(1, Ordering::SeqCst);
        if arena.len() < self.required_arena {
            return Err(BackendError::ArenaTooSmall {
                required: self.required_arena,
                available: arena.len(),
            });
        }
        self.arena = Some(arena);
        Ok(())
    }

    fn input_spec(&self) -> TensorSpec {
        self.input
    }

    fn output_spec(&self) -> TensorSpec {
        self.output
    }

    fn input_tensor(&mut self) -> TensorDataMut<'_> {
        let is_float = matches!(self.input.kind, TensorKind::Float32) != self.swap_input_type;
        if is_float {
            TensorDataMut::Float32(&mut self.input_f32)
        } else {
            TensorDataMut::Int8(&mut self.input_i8)
        }
    }

    fn output_tensor(&self) -> TensorData<'_> {
        match self.output.kind {
            TensorKind::Float32 => TensorData::Float32(&self.output_f32),
            TensorKind::Int8(_) => TensorData::Int8(&self.output_i8),
        }
    }

    fn invoke(&mut self) -> Result<(), BackendError> {
        self.calls.invokes.fetch_add(1, Ordering::SeqCst);
        if self.fail_invoke {
            return Err(BackendError::Runtime("kTfLiteError".to_string()));
        }
        self.last_input_f32.clone_from(&self.input_f32);
        self.last_input_i8.clone_from(&self.input_i8);
        Ok(())
    }
}
