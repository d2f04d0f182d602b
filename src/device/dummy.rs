use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{DeviceError, Spectrometer};
use crate::config::AppConfig;
use crate::data::loader;

pub const DUMMY_NAME: &str = "Dummy Spectrometer";
pub const DUMMY_PIXELS: usize = 2068;

const PEAK_CENTER: f64 = 1000.0;
const PEAK_SIGMA: f64 = 50.0;
const PEAK_AMPLITUDE: f64 = 5e4;
const NOISE_AMPLITUDE: f64 = 1e4;

/// Default axis when no wavelength file is configured.
const AXIS_START_NM: f64 = 339.0;
const AXIS_END_NM: f64 = 1019.0;

fn gaussian(x: f64, mu: f64, sigma: f64) -> f64 {
    (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// Stand-in device producing a noisy Gaussian peak on every read, so the
/// viewer can run without hardware attached.
pub struct DummySpectrometer {
    rng: StdRng,
    wavelengths: Vec<f64>,
    integration_time_us: u64,
}

impl DummySpectrometer {
    pub fn new(rng: StdRng) -> Self {
        Self::with_wavelengths(rng, linear_axis(DUMMY_PIXELS))
    }

    pub fn with_wavelengths(rng: StdRng, wavelengths: Vec<f64>) -> Self {
        Self {
            rng,
            wavelengths,
            integration_time_us: 0,
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Build from config: optional seed and optional wavelength file. A bad
    /// wavelength file is logged and replaced by the linear axis.
    pub fn from_config(config: &AppConfig) -> Self {
        let rng = match config.dummy_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let wavelengths = match &config.dummy_wavelengths {
            Some(path) => match load_axis(path) {
                Ok(axis) => axis,
                Err(e) => {
                    log::warn!("{e}; using linear wavelength axis");
                    linear_axis(DUMMY_PIXELS)
                }
            },
            None => linear_axis(DUMMY_PIXELS),
        };
        Self::with_wavelengths(rng, wavelengths)
    }

    /// Last integration time pushed by the acquisition loop.
    pub fn integration_time_us(&self) -> u64 {
        self.integration_time_us
    }
}

impl Spectrometer for DummySpectrometer {
    fn name(&self) -> &str {
        DUMMY_NAME
    }

    fn wavelengths(&mut self) -> Result<Vec<f64>, DeviceError> {
        Ok(self.wavelengths.clone())
    }

    fn intensities(&mut self) -> Result<Vec<f64>, DeviceError> {
        let rng = &mut self.rng;
        Ok((0..self.wavelengths.len())
            .map(|i| {
                let peak = gaussian(i as f64, PEAK_CENTER, PEAK_SIGMA);
                rng.gen::<f64>() * PEAK_AMPLITUDE * peak + rng.gen::<f64>() * NOISE_AMPLITUDE
            })
            .collect())
    }

    fn set_integration_time_micros(&mut self, micros: u64) -> Result<(), DeviceError> {
        self.integration_time_us = micros;
        Ok(())
    }
}

fn linear_axis(n: usize) -> Vec<f64> {
    if n < 2 {
        return vec![AXIS_START_NM; n];
    }
    let step = (AXIS_END_NM - AXIS_START_NM) / (n - 1) as f64;
    (0..n).map(|i| AXIS_START_NM + i as f64 * step).collect()
}

/// Read a wavelength axis: one value per line, or the first column of a
/// multi-column file.
fn load_axis(path: &Path) -> Result<Vec<f64>, DeviceError> {
    let axis = loader::load_first_column(path)
        .map_err(|e| DeviceError::Wavelengths(format!("{}: {e:#}", path.display())))?;
    if axis.is_empty() {
        return Err(DeviceError::Wavelengths(format!(
            "{}: no values",
            path.display()
        )));
    }
    Ok(axis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_have_axis_length_and_stay_in_range() {
        let mut dev = DummySpectrometer::seeded(1);
        let wl = dev.wavelengths().unwrap();
        let y = dev.intensities().unwrap();
        assert_eq!(wl.len(), DUMMY_PIXELS);
        assert_eq!(y.len(), DUMMY_PIXELS);
        assert!((wl[0] - AXIS_START_NM).abs() < 1e-9);
        assert!((wl[DUMMY_PIXELS - 1] - AXIS_END_NM).abs() < 1e-9);
        assert!(y.iter().all(|&v| (0.0..PEAK_AMPLITUDE + NOISE_AMPLITUDE).contains(&v)));
    }

    #[test]
    fn peak_sits_at_pixel_1000() {
        let mut dev = DummySpectrometer::seeded(3);
        let n = 50;
        let mut sum = vec![0.0; DUMMY_PIXELS];
        for _ in 0..n {
            for (s, v) in sum.iter_mut().zip(dev.intensities().unwrap()) {
                *s += v;
            }
        }
        // Peak mean ~ 2.5e4 + 5e3, far wings ~ 5e3.
        assert!(sum[1000] / (n as f64) > 2.0e4);
        assert!(sum[0] / (n as f64) < 1.0e4);
    }

    #[test]
    fn reads_are_independent() {
        let mut dev = DummySpectrometer::seeded(5);
        assert_ne!(dev.intensities().unwrap(), dev.intensities().unwrap());
    }

    #[test]
    fn records_integration_time() {
        let mut dev = DummySpectrometer::seeded(0);
        dev.set_integration_time_micros(25_000).unwrap();
        assert_eq!(dev.integration_time_us(), 25_000);
    }

    #[test]
    fn wavelength_file_overrides_axis() {
        let path = std::env::temp_dir().join("rusty_spectro_dummy_axis.txt");
        std::fs::write(&path, "500.0\n500.5\n501.0\n").unwrap();
        let config = AppConfig {
            dummy_wavelengths: Some(path.clone()),
            dummy_seed: Some(2),
            ..AppConfig::default()
        };
        let mut dev = DummySpectrometer::from_config(&config);
        assert_eq!(dev.wavelengths().unwrap(), vec![500.0, 500.5, 501.0]);
        assert_eq!(dev.intensities().unwrap().len(), 3);
        let _ = std::fs::remove_file(&path);
    }
}
