use super::cache::ModelOptions;
use crate::error::{PipelineError, Result};
use candle_core::Device;
use std::fmt;
use std::str::FromStr;

/// Where inference should run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeviceRequest {
    /// CPU inference (default).
    #[default]
    Cpu,
    /// CUDA GPU by ordinal. Needs the `cuda` feature.
    Cuda(usize),
    /// Metal GPU by ordinal. Needs the `metal` feature.
    Metal(usize),
}

impl DeviceRequest {
    /// Turns the request into a live candle [`Device`].
    pub fn resolve(self) -> Result<Device> {
        match self {
            DeviceRequest::Cpu => Ok(Device::Cpu),
            DeviceRequest::Cuda(i) => Device::new_cuda(i).map_err(|e| {
                PipelineError::Device(format!(
                    "Failed to init CUDA device {i}: {e}. Try CPU as fallback."
                ))
            }),
            DeviceRequest::Metal(i) => Device::new_metal(i).map_err(|e| {
                PipelineError::Device(format!(
                    "Failed to init Metal device {i}: {e}. Try CPU as fallback."
                ))
            }),
        }
    }
}

impl fmt::Display for DeviceRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceRequest::Cpu => write!(f, "cpu"),
            DeviceRequest::Cuda(i) => write!(f, "cuda:{i}"),
            DeviceRequest::Metal(i) => write!(f, "metal:{i}"),
        }
    }
}

impl FromStr for DeviceRequest {
    type Err = PipelineError;

    /// Accepts `cpu`, `cuda`, `cuda:N`, `metal`, `metal:N` (case-insensitive).
    fn from_str(s: &str) -> Result<Self> {
        let lowered = s.trim().to_ascii_lowercase();
        let (kind, ordinal) = match lowered.split_once(':') {
            Some((kind, ordinal)) => {
                let ordinal = ordinal.parse::<usize>().map_err(|_| {
                    PipelineError::Device(format!("Invalid device ordinal in '{s}'"))
                })?;
                (kind, Some(ordinal))
            }
            None => (lowered.as_str(), None),
        };

        match (kind, ordinal) {
            ("cpu", None) => Ok(DeviceRequest::Cpu),
            ("cuda", ordinal) => Ok(DeviceRequest::Cuda(ordinal.unwrap_or(0))),
            ("metal", ordinal) => Ok(DeviceRequest::Metal(ordinal.unwrap_or(0))),
            _ => Err(PipelineError::Device(format!(
                "Unknown device '{s}'. Expected cpu, cuda[:N] or metal[:N]."
            ))),
        }
    }
}

pub fn build_cache_key<O: ModelOptions>(options: &O, device: &Device) -> String {
    format!("{}-{:?}", options.cache_key(), device.location())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_device_strings() {
        assert_eq!("cpu".parse::<DeviceRequest>().unwrap(), DeviceRequest::Cpu);
        assert_eq!("CUDA".parse::<DeviceRequest>().unwrap(), DeviceRequest::Cuda(0));
        assert_eq!("cuda:2".parse::<DeviceRequest>().unwrap(), DeviceRequest::Cuda(2));
        assert_eq!("metal:1".parse::<DeviceRequest>().unwrap(), DeviceRequest::Metal(1));
    }

    #[test]
    fn rejects_unknown_devices() {
        assert!("tpu".parse::<DeviceRequest>().is_err());
        assert!("cuda:x".parse::<DeviceRequest>().is_err());
        assert!("cpu:1".parse::<DeviceRequest>().is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        let request = DeviceRequest::Cuda(3);
        assert_eq!(request.to_string().parse::<DeviceRequest>().unwrap(), request);
    }

    #[test]
    fn cpu_always_resolves() {
        assert!(DeviceRequest::Cpu.resolve().unwrap().is_cpu());
    }
}
