/// Device layer: the spectrometer capability and its two implementations.
///
/// ```text
///   open_device(config)
///        │
///        ├── list_devices() ──► SeaBreezeSpectrometer   (hardware found)
///        │
///        └── fallback ────────► DummySpectrometer       (nothing connected)
/// ```
pub mod dummy;
pub mod seabreeze;

use thiserror::Error;

use crate::config::AppConfig;

pub use dummy::DummySpectrometer;
pub use seabreeze::{DeviceDescriptor, SeaBreezeSpectrometer};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("could not load spectrometer library {path}: {reason}")]
    LibraryLoad { path: String, reason: String },
    #[error("spectrometer library is missing symbol {0}")]
    MissingSymbol(&'static str),
    #[error("{call} failed (SeaBreeze code {code}: {message})")]
    Vendor {
        call: &'static str,
        code: i32,
        message: String,
    },
    #[error("no spectrometer connected")]
    NotFound,
    #[error("device returned an empty spectrum")]
    EmptyRead,
    #[error("read length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("failed to read wavelength file: {0}")]
    Wavelengths(String),
}

// ---------------------------------------------------------------------------
// Capability
// ---------------------------------------------------------------------------

/// Anything that can report a wavelength axis, produce intensity reads and
/// accept an integration time.
pub trait Spectrometer {
    /// Human readable name shown in the UI and written to export headers.
    fn name(&self) -> &str;

    /// Wavelength axis in nm. Fixed for the lifetime of the device.
    fn wavelengths(&mut self) -> Result<Vec<f64>, DeviceError>;

    /// One fresh intensity read.
    fn intensities(&mut self) -> Result<Vec<f64>, DeviceError>;

    /// Exposure per read, in microseconds.
    fn set_integration_time_micros(&mut self, micros: u64) -> Result<(), DeviceError>;
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Open the first connected spectrometer, or the synthetic one if there is
/// none (or hardware was disabled in the config).
pub fn open_device(config: &AppConfig) -> Box<dyn Spectrometer> {
    if !config.force_dummy {
        match open_first_hardware(config) {
            Ok(dev) => {
                log::info!("Using spectrometer {}", dev.name());
                return Box::new(dev);
            }
            Err(e) => log::warn!("No hardware spectrometer available ({e}), using dummy"),
        }
    }
    Box::new(DummySpectrometer::from_config(config))
}

fn open_first_hardware(config: &AppConfig) -> Result<SeaBreezeSpectrometer, DeviceError> {
    let lib_path = config.seabreeze_library.as_deref();
    let devices = seabreeze::list_devices(lib_path)?;
    let first = devices.first().ok_or(DeviceError::NotFound)?;
    log::info!("Found {} spectrometer(s), opening {first}", devices.len());
    SeaBreezeSpectrometer::open(lib_path, first)
}

#[cfg(test)]
pub mod testing {
    use std::collections::VecDeque;

    use super::{DeviceError, Spectrometer};

    /// In-memory spectrometer returning queued reads, then repeating the
    /// last one.
    pub struct ScriptedSpectrometer {
        pub wavelengths: Vec<f64>,
        reads: VecDeque<Result<Vec<f64>, DeviceError>>,
        last: Vec<f64>,
        pub integration_pushes: Vec<u64>,
        pub read_count: usize,
    }

    impl ScriptedSpectrometer {
        pub fn constant(len: usize, value: f64) -> Self {
            Self {
                wavelengths: (0..len).map(|i| 400.0 + i as f64).collect(),
                reads: VecDeque::new(),
                last: vec![value; len],
                integration_pushes: Vec::new(),
                read_count: 0,
            }
        }

        pub fn push_read(&mut self, read: Vec<f64>) {
            self.reads.push_back(Ok(read));
        }

        pub fn push_failure(&mut self) {
            self.reads.push_back(Err(DeviceError::EmptyRead));
        }

        pub fn set_constant(&mut self, value: f64) {
            self.reads.clear();
            self.last = vec![value; self.wavelengths.len()];
        }
    }

    impl Spectrometer for ScriptedSpectrometer {
        fn name(&self) -> &str {
            "Scripted"
        }

        fn wavelengths(&mut self) -> Result<Vec<f64>, DeviceError> {
            Ok(self.wavelengths.clone())
        }

        fn intensities(&mut self) -> Result<Vec<f64>, DeviceError> {
            self.read_count += 1;
            match self.reads.pop_front() {
                Some(Ok(read)) => {
                    self.last = read.clone();
                    Ok(read)
                }
                Some(Err(e)) => Err(e),
                None => Ok(self.last.clone()),
            }
        }

        fn set_integration_time_micros(&mut self, micros: u64) -> Result<(), DeviceError> {
            self.integration_pushes.push(micros);
            Ok(())
        }
    }
}
