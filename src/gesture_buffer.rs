use log::warn;

use crate::error::GestureError;
use crate::quantization::{normalize_sample, quantize_i8, QuantParams};
use crate::sensor::SensorSource;
use crate::types::{Sample, NUM_CHANNELS, WINDOW_FEATURES, WINDOW_LEN};

/// Ventana fija de WINDOW_LEN muestras, reescrita en cada disparo.
///
/// Solo se considera válida cuando la captura llegó hasta el final: si el
/// sensor falla a mitad, la ventana queda incompleta y no se puede volcar al
/// tensor de entrada.
pub struct CaptureWindow {
    samples: [Sample; WINDOW_LEN],
    filled: usize,
}

impl CaptureWindow {
    pub fn new() -> Self {
        Self {
            samples: [Sample::default(); WINDOW_LEN],
            filled: 0,
        }
    }

    /// Llena la ventana leyendo WINDOW_LEN muestras seguidas.
    /// Aborta en el primer fallo de lectura.
    pub fn capture<S: SensorSource + ?Sized>(&mut self, sensor: &mut S) -> Result<(), GestureError> {
        self.filled = 0;

        for index in 0..WINDOW_LEN {
            match sensor.read_all() {
                Ok(sample) => {
                    self.samples[index] = sample;
                    self.filled = index + 1;
                }
                Err(source) => {
                    warn!(
                        "[Gesto] Captura abortada en la muestra {}/{}: {}",
                        index, WINDOW_LEN, source
                    );
                    return Err(GestureError::SensorReadFailure { index, source });
                }
            }
        }

        Ok(())
    }

    /// Añade una muestra suelta (para llenar la ventana desde otra fuente)
    pub fn push(&mut self, sample: Sample) -> bool {
        if self.is_complete() {
            return false;
        }
        self.samples[self.filled] = sample;
        self.filled += 1;
        true
    }

    pub fn is_complete(&self) -> bool {
        self.filled == WINDOW_LEN
    }

    pub fn len(&self) -> usize {
        self.filled
    }

    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }

    /// Muestras capturadas hasta ahora
    pub fn samples(&self) -> &[Sample] {
        &self.samples[..self.filled]
    }

    /// Vuelca la ventana normalizada en un tensor float32 de WINDOW_FEATURES
    pub fn write_normalized(&self, output: &mut [f32]) -> Result<(), GestureError> {
        self.check_target(output.len())?;

        for (sample, slot) in self.samples.iter().zip(output.chunks_exact_mut(NUM_CHANNELS)) {
            slot.copy_from_slice(&normalize_sample(sample));
        }
        Ok(())
    }

    /// Vuelca la ventana normalizada y cuantizada en un tensor int8
    pub fn write_quantized(&self, output: &mut [i8], params: QuantParams) -> Result<(), GestureError> {
        self.check_target(output.len())?;

        for (sample, slot) in self.samples.iter().zip(output.chunks_exact_mut(NUM_CHANNELS)) {
            for (code, value) in slot.iter_mut().zip(normalize_sample(sample)) {
                *code = quantize_i8(value, params);
            }
        }
        Ok(())
    }

    fn check_target(&self, target_len: usize) -> Result<(), GestureError> {
        if !self.is_complete() {
            return Err(GestureError::TensorShapeMismatch {
                kind: "window",
                expected: WINDOW_LEN,
                actual: self.filled,
            });
        }
        if target_len != WINDOW_FEATURES {
            return Err(GestureError::TensorShapeMismatch {
                kind: "input",
                expected: WINDOW_FEATURES,
                actual: target_len,
            });
        }
        Ok(())
    }

    /// Exporta las muestras capturadas en el mismo formato que lee csv_loader
    /// Retorna String con formato: sample,ax,ay,az,gx,gy,gz
    pub fn to_csv(&self) -> String {
        let mut csv = String::from("sample,ax,ay,az,gx,gy,gz\n");

        for (sample_idx, s) in self.samples().iter().enumerate() {
            csv.push_str(&format!(
                "{},{},{},{},{},{},{}\n",
                sample_idx, s.ax, s.ay, s.az, s.gx, s.gy, s.gz
            ));
        }

        csv
    }
}

impl Default for CaptureWindow {
    fn default() -> Self {
        Self::new()
    }
}
