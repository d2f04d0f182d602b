use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::data::acquisition::{AcquisitionCycle, AcquisitionSettings};
use crate::data::export::{self, ExportHeader};
use crate::data::loader;
use crate::data::model::{Background, Spectrum};
use crate::data::overlay::OverlaySet;
use crate::device::{DeviceError, Spectrometer};

// ---------------------------------------------------------------------------
// Status line
// ---------------------------------------------------------------------------

/// Message shown in the top bar.
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Info(String),
    /// Last tick failed to read the device; cleared by the next good tick.
    DeviceError(String),
    Error(String),
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    device: Box<dyn Spectrometer>,

    /// Integration time and averaging as set in the controls.
    pub settings: AcquisitionSettings,

    /// Free-text comment written into saved files.
    pub comment: String,

    /// Whether the plot follows the data bounds.
    pub auto_range: bool,

    cycle: AcquisitionCycle,
    background: Background,
    live: Spectrum,
    overlays: OverlaySet,
    status: Option<Status>,
}

impl AppState {
    /// Read the wavelength axis once and start with a zero background.
    pub fn new(mut device: Box<dyn Spectrometer>, config: &AppConfig) -> Self {
        let mut status = None;
        let wavelengths = match device.wavelengths() {
            Ok(wl) => wl,
            Err(e) => {
                log::error!("Reading wavelengths from {}: {e}", device.name());
                status = Some(Status::DeviceError(format!("Wavelength read failed: {e}")));
                Vec::new()
            }
        };
        let background = Background::zeros(wavelengths.len());
        Self {
            device,
            settings: AcquisitionSettings {
                integration_time_ms: config.integration_time_ms,
                averaging: config.averaging.max(1),
            },
            comment: String::new(),
            auto_range: true,
            cycle: AcquisitionCycle::new(),
            background,
            live: Spectrum::zeros(wavelengths),
            overlays: OverlaySet::new(),
            status,
        }
    }

    pub fn device_name(&self) -> &str {
        self.device.name()
    }

    pub fn live(&self) -> &Spectrum {
        &self.live
    }

    pub fn background(&self) -> &Background {
        &self.background
    }

    pub fn overlays(&self) -> &OverlaySet {
        &self.overlays
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    // -- acquisition --

    /// One acquisition tick. A failed read keeps the previous live trace
    /// and sets the device status.
    pub fn tick(&mut self) {
        let result = self.cycle.tick(
            self.device.as_mut(),
            &self.settings,
            &self.background,
            &mut self.live,
        );
        match result {
            Ok(()) => {
                if matches!(self.status, Some(Status::DeviceError(_))) {
                    self.status = None;
                }
            }
            Err(e) => {
                log::warn!("Acquisition tick skipped: {e}");
                self.status = Some(Status::DeviceError(format!("Read failed: {e}")));
            }
        }
    }

    // -- background --

    /// Store one raw, unaveraged read as the new background.
    pub fn capture_background(&mut self) {
        match self.device.intensities() {
            Ok(read) if read.len() == self.live.len() => {
                self.background.capture(read);
                log::info!("Background captured");
                self.status = Some(Status::Info("Background captured".into()));
            }
            Ok(read) => {
                let e = DeviceError::LengthMismatch {
                    expected: self.live.len(),
                    actual: read.len(),
                };
                log::error!("Background capture failed: {e}");
                self.status = Some(Status::Error(format!("Background capture failed: {e}")));
            }
            Err(e) => {
                log::error!("Background capture failed: {e}");
                self.status = Some(Status::Error(format!("Background capture failed: {e}")));
            }
        }
    }

    pub fn clear_background(&mut self) {
        self.background.clear();
        self.status = Some(Status::Info("Background reset".into()));
    }

    // -- overlays --

    /// Freeze the displayed live trace as an overlay.
    pub fn keep_live(&mut self) {
        let label = self.overlays.keep(&self.live).label.clone();
        log::info!("Kept live spectrum as '{label}'");
    }

    pub fn clear_overlays(&mut self) {
        self.overlays.clear();
    }

    /// Load a two-column file as an overlay. Errors are reported in the
    /// status line.
    pub fn open_overlay(&mut self, path: &Path) {
        match loader::load_two_column(path) {
            Ok(spectrum) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                log::info!("Loaded {} points from {}", spectrum.len(), path.display());
                self.overlays.add_file(&name, spectrum);
                self.status = None;
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status = Some(Status::Error(format!("Error: {e:#}")));
            }
        }
    }

    // -- export --

    /// Header describing the current settings.
    pub fn export_header(&self) -> ExportHeader {
        ExportHeader {
            spectrometer: self.device.name().to_string(),
            date: chrono::Local::now(),
            integration_time_ms: self.settings.integration_time_ms,
            averaging: self.settings.averaging_count() as u32,
            comment: self.comment.clone(),
        }
    }

    /// Save the live trace. Returns the path actually written.
    pub fn save_live(&mut self, path: &Path) -> Option<PathBuf> {
        let path = export::with_default_extension(path);
        match export::write_spectrum(&path, &self.export_header(), &self.live) {
            Ok(()) => {
                log::info!("Saved {} rows to {}", self.live.len(), path.display());
                self.status = Some(Status::Info(format!("Saved {}", path.display())));
                Some(path)
            }
            Err(e) => {
                log::error!("Failed to save spectrum: {e:#}");
                self.status = Some(Status::Error(format!("Error: {e:#}")));
                None
            }
        }
    }
}
