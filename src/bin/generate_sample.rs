//! Write a few synthetic spectra in the export format, for trying out the
//! overlay import without a spectrometer.
//!
//! Usage: `generate_sample [OUTPUT_DIR]` (defaults to the working directory).

use std::path::PathBuf;

use anyhow::{Context, Result};
use rusty_spectro::data::acquisition::{acquire, AcquisitionSettings};
use rusty_spectro::data::export::{write_spectrum, ExportHeader};
use rusty_spectro::data::model::{Background, Spectrum};
use rusty_spectro::device::{DummySpectrometer, Spectrometer};

const SEED: u64 = 42;

fn main() -> Result<()> {
    env_logger::init();

    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut device = DummySpectrometer::seeded(SEED);
    let wavelengths = device.wavelengths()?;
    let background = Background::zeros(wavelengths.len());

    let runs = [(10.0, 1), (10.0, 8), (50.0, 32)];
    for (i, &(integration_time_ms, averaging)) in runs.iter().enumerate() {
        let settings = AcquisitionSettings {
            integration_time_ms,
            averaging,
        };
        device.set_integration_time_micros(settings.integration_time_micros())?;
        let intensities = acquire(&mut device, &settings, &background)?;
        let spectrum = Spectrum::new(wavelengths.clone(), intensities)?;

        let header = ExportHeader {
            spectrometer: device.name().to_string(),
            date: chrono::Local::now(),
            integration_time_ms,
            averaging,
            comment: format!("Synthetic sample {} generated with seed {SEED}", i + 1),
        };
        let path = out_dir.join(format!("sample_{}.txt", i + 1));
        write_spectrum(&path, &header, &spectrum)?;
        println!(
            "Wrote {} rows (averaging {averaging}) to {}",
            spectrum.len(),
            path.display()
        );
    }
    Ok(())
}
