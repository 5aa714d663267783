use std::collections::HashMap;
use std::fs;
use std::marker::PhantomData;
use std::path::Path;
use std::sync::Mutex;

use log::{debug, info, warn};
use serde::Deserialize;

use crate::backend::{InferenceBackend, TensorData, TensorDataMut, TensorKind, TensorSpec};
use crate::config::PipelineConfig;
use crate::error::GestureError;
use crate::gesture_buffer::CaptureWindow;
use crate::quantization::dequantize_i8;
use crate::sensor::SensorSource;
use crate::trigger::TriggerGate;
use crate::types::{Classification, MODEL_SCHEMA_VERSION, NUM_CLASSES, WINDOW_FEATURES};

/// Estados de un ciclo. No hay nada persistente entre ciclos: cualquier
/// llamada termina de vuelta en `Idle`, haya ido bien o mal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Triggered,
    Capturing,
    Inferring,
    Decoded,
}

#[derive(Debug, Deserialize)]
struct ClassesJson {
    index_to_class: HashMap<String, String>,
}

/// Carga las etiquetas de `classes.json` ordenadas por índice
pub fn load_classes(path: impl AsRef<Path>) -> Result<Vec<String>, GestureError> {
    let content = fs::read_to_string(path)?;
    let data: ClassesJson = serde_json::from_str(&content)?;

    // Convertir HashMap a Vec ordenado por índice
    let mut pairs: Vec<(usize, String)> = data
        .index_to_class
        .into_iter()
        .filter_map(|(k, v)| k.parse::<usize>().ok().map(|idx| (idx, v)))
        .collect();

    pairs.sort_by_key(|(idx, _)| *idx);

    if pairs.len() != NUM_CLASSES {
        return Err(GestureError::InvalidLabels {
            expected: NUM_CLASSES,
            actual: pairs.len(),
        });
    }
    Ok(pairs.into_iter().map(|(_, name)| name).collect())
}

/// Índice de la puntuación máxima. Comparación estricta: en empate gana el
/// primero. Los NaN nunca ganan.
pub fn argmax(scores: &[f32]) -> usize {
    let mut best_i = 0;
    let mut best_p = f32::NEG_INFINITY;
    for (i, &p) in scores.iter().enumerate() {
        if p > best_p {
            best_p = p;
            best_i = i;
        }
    }
    best_i
}

/// Pipeline disparo -> captura -> cuantización -> inferencia -> decodificación.
///
/// Es dueño exclusivo del motor durante toda su vida; el arena queda
/// prestado al motor desde `begin`.
pub struct GesturePipeline<'a, B: InferenceBackend<'a>> {
    backend: B,
    gate: TriggerGate,
    window: CaptureWindow,
    input_kind: TensorKind,
    output_kind: TensorKind,
    state: PipelineState,
    last_reached: PipelineState,
    _arena: PhantomData<&'a mut [u8]>,
}

impl<'a, B: InferenceBackend<'a>> GesturePipeline<'a, B> {
    /// Valida el modelo, reserva los tensores en el arena y guarda los
    /// parámetros de cuantización. Cualquier error aquí es terminal.
    pub fn begin(
        mut backend: B,
        arena: &'a mut [u8],
        config: PipelineConfig,
    ) -> Result<Self, GestureError> {
        config.validate()?;

        let found = backend.schema_version();
        if found != MODEL_SCHEMA_VERSION {
            warn!("[Gesto] Versión de esquema incompatible: {}", found);
            return Err(GestureError::ModelVersionMismatch {
                expected: MODEL_SCHEMA_VERSION,
                found,
            });
        }

        let arena_len = arena.len();
        backend
            .allocate_work_area(arena)
            .map_err(GestureError::ArenaAllocationFailure)?;

        let input = backend.input_spec();
        let output = backend.output_spec();
        check_spec("input", input, WINDOW_FEATURES)?;
        check_spec("output", output, NUM_CLASSES)?;

        info!(
            "[Gesto] Listo: arena {} bytes, entrada {} x{}, salida {} x{}",
            arena_len,
            input.kind.name(),
            input.len,
            output.kind.name(),
            output.len
        );

        Ok(Self {
            backend,
            gate: TriggerGate::new(config.trigger_threshold),
            window: CaptureWindow::new(),
            input_kind: input.kind,
            output_kind: output.kind,
            state: PipelineState::Idle,
            last_reached: PipelineState::Idle,
            _arena: PhantomData,
        })
    }

    /// Lectura rápida de una sola muestra, sin captura ni inferencia
    pub fn check_trigger<S: SensorSource + ?Sized>(&self, sensor: &mut S) -> bool {
        self.gate.check(sensor)
    }

    /// `Ok(None)` si no hubo disparo; si lo hubo, ciclo completo
    pub fn run_if_triggered<S: SensorSource + ?Sized>(
        &mut self,
        sensor: &mut S,
    ) -> Result<Option<Classification>, GestureError> {
        if !self.gate.check(sensor) {
            return Ok(None);
        }

        self.transition(PipelineState::Triggered);
        self.capture_and_infer(sensor).map(Some)
    }

    /// Captura una ventana, la infiere y decodifica la salida
    pub fn capture_and_infer<S: SensorSource + ?Sized>(
        &mut self,
        sensor: &mut S,
    ) -> Result<Classification, GestureError> {
        let result = self.run_cycle(sensor);
        self.return_to_idle();

        if let Err(ref e) = result {
            warn!("[Gesto] Ciclo abortado en {:?}: {}", self.last_reached, e);
        }
        result
    }

    fn run_cycle<S: SensorSource + ?Sized>(
        &mut self,
        sensor: &mut S,
    ) -> Result<Classification, GestureError> {
        self.transition(PipelineState::Capturing);
        info!("[Gesto] Capturando ventana");
        self.window.capture(sensor)?;
        self.load_input()?;

        self.transition(PipelineState::Inferring);
        info!("[Gesto] Ejecutando inferencia");
        self.backend
            .invoke()
            .map_err(GestureError::InferenceInvokeFailure)?;

        let result = self.decode_output()?;
        self.transition(PipelineState::Decoded);

        info!(
            "[Gesto] Clase ganadora: {}  score: {:.4}",
            result.best_index,
            result.best_score()
        );
        Ok(result)
    }

    /// Copia la ventana completa al tensor de entrada en su tipo nativo
    fn load_input(&mut self) -> Result<(), GestureError> {
        match (self.input_kind, self.backend.input_tensor()) {
            (TensorKind::Float32, TensorDataMut::Float32(buf)) => self.window.write_normalized(buf),
            (TensorKind::Int8(params), TensorDataMut::Int8(buf)) => {
                self.window.write_quantized(buf, params)
            }
            _ => Err(GestureError::TensorTypeMismatch { kind: "input" }),
        }
    }

    fn decode_output(&self) -> Result<Classification, GestureError> {
        let output = self.backend.output_tensor();
        if output.len() != NUM_CLASSES {
            return Err(GestureError::TensorShapeMismatch {
                kind: "output",
                expected: NUM_CLASSES,
                actual: output.len(),
            });
        }

        let mut scores = [0.0f32; NUM_CLASSES];
        match (self.output_kind, output) {
            (TensorKind::Float32, TensorData::Float32(data)) => {
                scores.copy_from_slice(data);
            }
            (TensorKind::Int8(params), TensorData::Int8(data)) => {
                for (score, &code) in scores.iter_mut().zip(data) {
                    *score = dequantize_i8(code, params);
                }
            }
            _ => return Err(GestureError::TensorTypeMismatch { kind: "output" }),
        }

        Ok(Classification {
            best_index: argmax(&scores),
            scores,
        })
    }

    fn transition(&mut self, next: PipelineState) {
        debug!("[Gesto] {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Cierra el ciclo: guarda hasta dónde llegó y vuelve a `Idle`
    fn return_to_idle(&mut self) {
        self.last_reached = self.state;
        self.state = PipelineState::Idle;
    }

    /// Un pánico a mitad de ciclo deja el estado colgado
    fn recover_after_panic(&mut self) {
        if self.state != PipelineState::Idle {
            warn!("[Gesto] Ciclo interrumpido en {:?}, volviendo a Idle", self.state);
            self.return_to_idle();
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Último estado alcanzado por el ciclo anterior (útil si abortó)
    pub fn last_state_reached(&self) -> PipelineState {
        self.last_reached
    }

    pub fn input_kind(&self) -> TensorKind {
        self.input_kind
    }

    pub fn output_kind(&self) -> TensorKind {
        self.output_kind
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

fn check_spec(kind: &'static str, spec: TensorSpec, expected: usize) -> Result<(), GestureError> {
    if spec.len != expected {
        return Err(GestureError::TensorShapeMismatch {
            kind,
            expected,
            actual: spec.len,
        });
    }
    if let Some(params) = spec.kind.quant_params() {
        if !params.is_valid() {
            return Err(GestureError::InvalidConfig(format!(
                "{} tensor has invalid scale {}",
                kind, params.scale
            )));
        }
    }
    Ok(())
}

/// Pipeline compartido entre hilos: el candado se mantiene durante todo el
/// ciclo, de la captura a la decodificación
pub struct SharedPipeline<'a, B: InferenceBackend<'a>> {
    inner: Mutex<GesturePipeline<'a, B>>,
}

impl<'a, B: InferenceBackend<'a>> SharedPipeline<'a, B> {
    pub fn new(pipeline: GesturePipeline<'a, B>) -> Self {
        Self {
            inner: Mutex::new(pipeline),
        }
    }

    pub fn run_if_triggered<S: SensorSource + ?Sized>(
        &self,
        sensor: &mut S,
    ) -> Result<Option<Classification>, GestureError> {
        let mut pipeline = self.inner.lock().unwrap_or_else(|poisoned| {
            let mut pipeline = poisoned.into_inner();
            pipeline.recover_after_panic();
            pipeline
        });
        pipeline.run_if_triggered(sensor)
    }

    pub fn into_inner(self) -> GesturePipeline<'a, B> {
        self.inner.into_inner().unwrap_or_else(|poisoned| {
            let mut pipeline = poisoned.into_inner();
            pipeline.recover_after_panic();
            pipeline
        })
    }
}
