use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Outbound joint-state payload.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointState {
    /// First joint angle (radians), sampled from the device.
    pub joint1_angle: f64,
    /// Second joint angle (radians). No upstream source; always 0.0.
    pub joint2_angle: f64,
}

impl JointState {
    /// Build a state from a sampled angle in degrees.
    pub fn from_degrees(angle_deg: f64) -> Self {
        Self {
            joint1_angle: crate::sampler::degrees_to_radians(angle_deg),
            joint2_angle: 0.0,
        }
    }
}

/// Configuration for the sampling/publish loop.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Path to the character device emitting angle records.
    pub device_path: PathBuf,
    /// Topic name for outbound joint states.
    pub topic: String,
    /// Target publish rate in Hz. The actual rate is at most this.
    pub rate_hz: f64,
    /// Upper bound for a single device read, in bytes.
    pub chunk_bytes: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            device_path: PathBuf::from("/dev/servo"),
            topic: "arm_state".to_string(),
            rate_hz: 60.0,
            chunk_bytes: 1024,
        }
    }
}

impl StreamConfig {
    /// Pacing interval between ticks. Falls back to 60 Hz if the
    /// configured rate is not positive.
    pub fn tick_interval(&self) -> Duration {
        if self.rate_hz > 0.0 {
            Duration::from_secs_f64(1.0 / self.rate_hz)
        } else {
            Duration::from_secs_f64(1.0 / 60.0)
        }
    }
}
