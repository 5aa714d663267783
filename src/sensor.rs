use crate::error::SensorError;
use crate::types::{AccelReading, Sample};

/// Fuente de muestras calibradas (g y dps).
///
/// El ritmo de muestreo es responsabilidad de quien implementa el trait:
/// el pipeline solo pide muestras una tras otra.
pub trait SensorSource {
    /// Lectura instantánea del acelerómetro, barata
    fn read_acceleration(&mut self) -> Result<AccelReading, SensorError>;

    /// Lectura completa de 6 ejes
    fn read_all(&mut self) -> Result<Sample, SensorError>;
}

