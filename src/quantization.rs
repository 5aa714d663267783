//! Normalización de unidades físicas a [0, 1] y cuantización afín int8.
//!
//! `real = (q - zero_point) * scale`

use crate::types::{Sample, ACCEL_RANGE_G, GYRO_RANGE_DPS, NUM_CHANNELS};

/// Parámetros afines de un tensor (uno por tensor, no por canal)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantParams {
    pub scale: f32,
    pub zero_point: i32,
}

impl QuantParams {
    pub const fn new(scale: f32, zero_point: i32) -> Self {
        Self { scale, zero_point }
    }

    /// La escala debe ser finita y positiva
    pub fn is_valid(&self) -> bool {
        self.scale.is_finite() && self.scale > 0.0
    }
}

/// [-4 g, +4 g] -> [0, 1]
#[inline]
pub fn normalize_accel(value: f32) -> f32 {
    (value + ACCEL_RANGE_G) / (2.0 * ACCEL_RANGE_G)
}

/// [-2000 dps, +2000 dps] -> [0, 1]
#[inline]
pub fn normalize_gyro(value: f32) -> f32 {
    (value + GYRO_RANGE_DPS) / (2.0 * GYRO_RANGE_DPS)
}

/// Normaliza los 6 canales de una muestra en orden [ax, ay, az, gx, gy, gz]
pub fn normalize_sample(sample: &Sample) -> [f32; NUM_CHANNELS] {
    [
        normalize_accel(sample.ax),
        normalize_accel(sample.ay),
        normalize_accel(sample.az),
        normalize_gyro(sample.gx),
        normalize_gyro(sample.gy),
        normalize_gyro(sample.gz),
    ]
}

/// Cuantiza con redondeo "half away from zero" y saturación a [-128, 127]
#[inline]
pub fn quantize_i8(value: f32, params: QuantParams) -> i8 {
    let q = (value / params.scale + params.zero_point as f32).round();
    q.clamp(i8::MIN as f32, i8::MAX as f32) as i8
}

#[inline]
pub fn dequantize_i8(code: i8, params: QuantParams) -> f32 {
    (code as i32 - params.zero_point) as f32 * params.scale
}
