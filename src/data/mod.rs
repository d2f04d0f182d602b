/// Data layer: spectra, the acquisition loop, overlays and text files.
///
/// Architecture:
/// ```text
///   Spectrometer ──► acquisition  average N reads, subtract Background
///                        │
///                        ▼
///                  live Spectrum ──► export   header + two-column rows
///                        │
///                        ▼
///   loader ──────►  OverlaySet      kept / opened traces, cyclic colours
/// ```

pub mod acquisition;
pub mod export;
pub mod loader;
pub mod model;
pub mod overlay;
