/*
Reconocimiento de gestos disparado por IMU - reproducción de sesiones grabadas

Lee una sesión grabada (CSV sample,ax,ay,az,gx,gy,gz), la trata como si fuera
el IMU en vivo y ejecuta el pipeline completo: disparo -> captura ->
cuantización -> inferencia ONNX -> clase ganadora.

Antes de todo, asegurarse de tener onnxruntime instalado.
wget https://github.com/microsoft/onnxruntime/releases/download/v1.22.0/onnxruntime-linux-x64-1.22.0.tgz
tar -xzf onnxruntime-linux-x64-1.22.0.tgz

Para compilar y ejecutar:
set -x LD_LIBRARY_PATH (pwd)/onnxruntime-linux-x64-1.22.0/lib $LD_LIBRARY_PATH
    cargo run --release --features onnx -- model.onnx sesion.csv classes.json
*/

use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use log::{error, info, warn};

use gesture_ai::backend::Arena;
use gesture_ai::csv_loader::ReplaySensor;
use gesture_ai::gesture_classifier::{load_classes, GesturePipeline};
use gesture_ai::onnx_backend::OnnxBackend;
use gesture_ai::types::ARENA_SIZE;
use gesture_ai::PipelineConfig;

const USAGE: &str = "Uso: gesture-ai <modelo.onnx> <sesion.csv> [classes.json] [config.json]";

struct ReplayArgs {
    model_path: PathBuf,
    csv_path: PathBuf,
    classes_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
}

fn parse_args() -> Result<ReplayArgs> {
    let mut positional: Vec<PathBuf> = env::args().skip(1).map(PathBuf::from).collect();
    if positional.len() < 2 || positional.len() > 4 {
        bail!(USAGE);
    }

    let config_path = if positional.len() == 4 { positional.pop() } else { None };
    let classes_path = if positional.len() == 3 { positional.pop() } else { None };
    let csv_path = positional.pop().ok_or_else(|| anyhow!(USAGE))?;
    let model_path = positional.pop().ok_or_else(|| anyhow!(USAGE))?;

    Ok(ReplayArgs {
        model_path,
        csv_path,
        classes_path,
        config_path,
    })
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args()?;

    let config = match &args.config_path {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("Config inválida en {:?}", path))?,
        None => PipelineConfig::default(),
    };

    let labels = match &args.classes_path {
        Some(path) => load_classes(path).with_context(|| format!("Clases inválidas en {:?}", path))?,
        None => Vec::new(),
    };

    let model = fs::read(&args.model_path)
        .with_context(|| format!("No se pudo leer el modelo {:?}", args.model_path))?;
    let backend = OnnxBackend::load(&model)?;

    let mut arena = Arena::<ARENA_SIZE>::new();
    let min_confidence = config.min_confidence;
    let mut pipeline = GesturePipeline::begin(backend, arena.as_mut_slice(), config)?;

    let mut sensor = ReplaySensor::from_csv(&args.csv_path)?;
    info!(
        "Reproduciendo {} muestras desde {:?}",
        sensor.remaining(),
        args.csv_path
    );

    let mut detected = 0usize;
    while !sensor.is_exhausted() {
        match pipeline.run_if_triggered(&mut sensor) {
            Ok(Some(result)) => {
                detected += 1;
                let label = result.label(&labels).unwrap_or("?");
                let confident = result.is_confident(min_confidence);
                info!(
                    "Gesto #{}: clase {} ({}) score {:.4}{}",
                    detected,
                    result.best_index,
                    label,
                    result.best_score(),
                    if confident { "" } else { " [baja confianza]" }
                );
                for (idx, score) in result.scores.iter().enumerate() {
                    info!(
                        "  {:>2}. {:<25} {:>8.4}",
                        idx,
                        labels.get(idx).map(String::as_str).unwrap_or("-"),
                        score
                    );
                }
            }
            Ok(None) => {}
            Err(e) if e.is_recoverable() => {
                // Sesión agotada a mitad de ventana, o fallo puntual
                warn!("Ciclo descartado: {}", e);
            }
            Err(e) => {
                error!("Fallo no recuperable: {}", e);
                return Err(e.into());
            }
        }
    }

    info!("Fin de la sesión: {} gestos detectados", detected);
    Ok(())
}
