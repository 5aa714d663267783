use std::collections::{BTreeMap, VecDeque};
use std::path::Path;

use anyhow::{anyhow, bail, ensure, Context, Result};
use csv::ReaderBuilder;

use crate::error::SensorError;
use crate::sensor::SensorSource;
use crate::types::{AccelReading, Sample, WINDOW_LEN};

/// Hueco máximo entre dos muestras grabadas que se rellena repitiendo la
/// anterior. Más que una ventana entera es una sesión corrupta.
pub const MAX_SAMPLE_GAP: usize = WINDOW_LEN;

/// Carga una secuencia de muestras desde un CSV en el formato
/// sample,ax,ay,az,gx,gy,gz ordenado por sample.
pub fn load_samples_from_csv(path: impl AsRef<Path>) -> Result<Vec<Sample>> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("No se pudo abrir el CSV {:?}", path))?;

    let mut samples: BTreeMap<usize, Sample> = BTreeMap::new();

    for (row_idx, result) in reader.records().enumerate() {
        let record =
            result.with_context(|| format!("Fila {} inválida en {:?}", row_idx + 1, path))?;
        if record.len() < 7 {
            bail!("La fila {} no tiene 7 columnas", row_idx + 1);
        }

        let sample: usize = record[0]
            .trim()
            .parse()
            .with_context(|| format!("sample inválido en fila {}", row_idx + 1))?;

        let mut values = [0.0f32; 6];
        for (col, value) in values.iter_mut().enumerate() {
            *value = record[col + 1]
                .trim()
                .parse()
                .with_context(|| format!("columna {} inválida en fila {}", col + 1, row_idx + 1))?;
        }

        let [ax, ay, az, gx, gy, gz] = values;
        samples.insert(sample, Sample::new(ax, ay, az, gx, gy, gz));
    }

    let (&min_sample, _) = samples
        .iter()
        .next()
        .ok_or_else(|| anyhow!("El CSV {:?} no contiene datos", path))?;
    ensure!(
        min_sample == 0,
        "El CSV debe iniciar en sample=0 (encontrado sample={})",
        min_sample
    );

    // El índice viene del fichero: acotar antes de reservar memoria
    let mut prev_sample = min_sample;
    for &sample_idx in samples.keys() {
        let gap = sample_idx - prev_sample;
        ensure!(
            gap <= MAX_SAMPLE_GAP,
            "Hueco de {} muestras entre sample={} y sample={} (máximo {})",
            gap,
            prev_sample,
            sample_idx,
            MAX_SAMPLE_GAP
        );
        prev_sample = sample_idx;
    }
    let max_sample = prev_sample;
    let total = max_sample
        .checked_add(1)
        .ok_or_else(|| anyhow!("sample={} fuera de rango", max_sample))?;

    let mut frames = Vec::with_capacity(total);
    let mut last_sample = Sample::default();
    for sample_idx in 0..=max_sample {
        if let Some(sample) = samples.get(&sample_idx) {
            last_sample = *sample;
        }
        // Los huecos repiten la última muestra válida
        frames.push(last_sample);
    }

    Ok(frames)
}

/// Sensor que reproduce una sesión grabada, muestra a muestra.
/// Cada lectura (rápida o completa) consume una muestra.
pub struct ReplaySensor {
    samples: VecDeque<Sample>,
}

impl ReplaySensor {
    pub fn new(samples: Vec<Sample>) -> Self {
        Self {
            samples: samples.into(),
        }
    }

    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(load_samples_from_csv(path)?))
    }

    pub fn remaining(&self) -> usize {
        self.samples.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.samples.is_empty()
    }
}

impl SensorSource for ReplaySensor {
    fn read_acceleration(&mut self) -> Result<AccelReading, SensorError> {
        self.read_all().map(|sample| sample.accel())
    }

    fn read_all(&mut self) -> Result<Sample, SensorError> {
        self.samples.pop_front().ok_or(SensorError::Exhausted)
    }
}
