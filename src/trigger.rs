use log::debug;

use crate::sensor::SensorSource;
use crate::types::{AccelReading, GESTURE_ACCEL_START_THRESH};

/// Disparador sin estado: una sola lectura de aceleración decide si merece
/// la pena capturar una ventana completa
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerGate {
    /// Umbral de |ax|+|ay|+|az| en g
    pub threshold: f32,
}

impl TriggerGate {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    /// Lee una muestra de aceleración y compara contra el umbral.
    /// Un fallo de lectura cuenta como "no disparado".
    pub fn check<S: SensorSource + ?Sized>(&self, sensor: &mut S) -> bool {
        match sensor.read_acceleration() {
            Ok(reading) => self.is_triggered_by(&reading),
            Err(e) => {
                debug!("[Gesto] Lectura de disparo fallida: {}", e);
                false
            }
        }
    }

    /// Estrictamente mayor que el umbral
    pub fn is_triggered_by(&self, reading: &AccelReading) -> bool {
        reading.abs_sum() > self.threshold
    }
}

impl Default for TriggerGate {
    fn default() -> Self {
        Self::new(GESTURE_ACCEL_START_THRESH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedSensor;

    #[test]
    fn test_strong_reading_triggers() {
        let gate = TriggerGate::new(2.3);
        let mut sensor = ScriptedSensor::with_accel(vec![AccelReading::new(1.0, 1.0, 1.0)]);
        assert!(gate.check(&mut sensor));
        assert_eq!(sensor.accel_reads, 1);
        assert_eq!(sensor.full_reads, 0);
    }

    #[test]
    fn test_weak_reading_does_not_trigger() {
        let gate = TriggerGate::new(2.3);
        let mut sensor = ScriptedSensor::with_accel(vec![AccelReading::new(0.1, 0.1, 0.1)]);
        assert!(!gate.check(&mut sensor));
        assert_eq!(sensor.full_reads, 0);
    }

    #[test]
    fn test_negative_axes_count_by_magnitude() {
        let gate = TriggerGate::new(2.3);
        assert!(gate.is_triggered_by(&AccelReading::new(-1.0, -1.0, -1.0)));
    }

    #[test]
    fn test_sum_equal_to_threshold_does_not_trigger() {
        let gate = TriggerGate::new(3.0);
        assert!(!gate.is_triggered_by(&AccelReading::new(1.0, 1.0, 1.0)));
    }

    #[test]
    fn test_read_failure_is_not_triggered() {
        let gate = TriggerGate::default();
        let mut sensor = ScriptedSensor::failing_accel();
        assert!(!gate.check(&mut sensor));
    }
}
