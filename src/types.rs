/// Una lectura rápida del acelerómetro en g: usada solo por el disparador
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AccelReading {
    pub ax: f32,
    pub ay: f32,
    pub az: f32,
}

impl AccelReading {
    pub fn new(ax: f32, ay: f32, az: f32) -> Self {
        Self { ax, ay, az }
    }

    /// Suma |ax| + |ay| + |az|
    pub fn abs_sum(&self) -> f32 {
        self.ax.abs() + self.ay.abs() + self.az.abs()
    }
}

/// Una muestra completa del IMU: aceleración (g) y velocidad angular (dps)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Sample {
    pub ax: f32,
    pub ay: f32,
    pub az: f32,

    pub gx: f32,
    pub gy: f32,
    pub gz: f32,
}

impl Sample {
    pub fn new(ax: f32, ay: f32, az: f32, gx: f32, gy: f32, gz: f32) -> Self {
        Self {
            ax,
            ay,
            az,
            gx,
            gy,
            gz,
        }
    }

    /// Solo la parte de aceleración
    pub fn accel(&self) -> AccelReading {
        AccelReading::new(self.ax, self.ay, self.az)
    }

    /// Canales en el orden que espera el modelo: [ax, ay, az, gx, gy, gz]
    pub fn channels(&self) -> [f32; NUM_CHANNELS] {
        [self.ax, self.ay, self.az, self.gx, self.gy, self.gz]
    }
}

/// Resultado de una inferencia: puntuaciones por clase + índice ganador
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub scores: [f32; NUM_CLASSES],
    pub best_index: usize,
}

impl Classification {
    pub fn best_score(&self) -> f32 {
        self.scores[self.best_index]
    }

    /// Etiqueta de la clase ganadora, si hay etiquetas cargadas
    pub fn label<'l>(&self, labels: &'l [String]) -> Option<&'l str> {
        labels.get(self.best_index).map(String::as_str)
    }

    pub fn is_confident(&self, min_confidence: f32) -> bool {
        self.best_score() >= min_confidence
    }
}

/// Constantes del sistema
pub const NUM_CLASSES: usize = 3; // tamaño de la salida del modelo
pub const WINDOW_LEN: usize = 180; // muestras por ventana de captura
pub const NUM_CHANNELS: usize = 6; // ax, ay, az, gx, gy, gz
pub const WINDOW_FEATURES: usize = WINDOW_LEN * NUM_CHANNELS; // 1080

/// Tamaño del arena de trabajo del backend (bytes). Subirlo si la reserva falla.
pub const ARENA_SIZE: usize = 6 * 1024;

/// Umbral de |ax|+|ay|+|az| (g) para lanzar una captura
pub const GESTURE_ACCEL_START_THRESH: f32 = 2.3;

/// Versión de esquema que debe declarar el modelo cargado
pub const MODEL_SCHEMA_VERSION: u32 = 3;

/// Rangos de entrenamiento: ±4 g y ±2000 dps se mapean a [0, 1]
pub const ACCEL_RANGE_G: f32 = 4.0;
pub const GYRO_RANGE_DPS: f32 = 2000.0;
