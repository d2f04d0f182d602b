use eframe::egui::Color32;

use super::model::Spectrum;
use crate::color::overlay_color;

/// Where an overlay trace came from.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlaySource {
    /// Frozen copy of the live trace.
    Kept,
    /// Loaded from a file.
    File(String),
}

/// A static trace drawn behind the live spectrum.
#[derive(Debug, Clone)]
pub struct Overlay {
    pub label: String,
    pub source: OverlaySource,
    pub color: Color32,
    pub spectrum: Spectrum,
}

/// Accumulated overlays. Colours are assigned from the palette by position,
/// so clearing starts the palette over.
#[derive(Debug, Default)]
pub struct OverlaySet {
    traces: Vec<Overlay>,
}

impl OverlaySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of overlays added since the last clear.
    pub fn count(&self) -> usize {
        self.traces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Overlay> {
        self.traces.iter()
    }

    /// Colour the next overlay will get.
    pub fn next_color(&self) -> Color32 {
        overlay_color(self.count())
    }

    /// Freeze a copy of `spectrum`.
    pub fn keep(&mut self, spectrum: &Spectrum) -> &Overlay {
        let label = format!("kept {}", self.count() + 1);
        self.push(label, OverlaySource::Kept, spectrum.clone())
    }

    /// Add a spectrum loaded from `name`.
    pub fn add_file(&mut self, name: &str, spectrum: Spectrum) -> &Overlay {
        self.push(name.to_string(), OverlaySource::File(name.to_string()), spectrum)
    }

    /// Drop every overlay and restart the palette.
    pub fn clear(&mut self) {
        self.traces.clear();
    }

    fn push(&mut self, label: String, source: OverlaySource, spectrum: Spectrum) -> &Overlay {
        let color = self.next_color();
        self.traces.push(Overlay {
            label,
            source,
            color,
            spectrum,
        });
        &self.traces[self.traces.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(v: f64) -> Spectrum {
        Spectrum::new(vec![1.0, 2.0], vec![v, v]).unwrap()
    }

    #[test]
    fn keep_three_then_clear() {
        let mut set = OverlaySet::new();
        for i in 0..3 {
            let color = set.keep(&flat(i as f64)).color;
            assert_eq!(color, overlay_color(i));
        }
        assert_eq!(set.count(), 3);
        let labels: Vec<_> = set.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["kept 1", "kept 2", "kept 3"]);

        set.clear();
        assert!(set.is_empty());
        assert_eq!(set.count(), 0);
        assert_eq!(set.keep(&flat(9.0)).color, overlay_color(0));
    }

    #[test]
    fn kept_overlay_is_a_snapshot() {
        let mut set = OverlaySet::new();
        let mut live = flat(1.0);
        set.keep(&live);
        live.set_intensities(vec![5.0, 5.0]).unwrap();
        let kept = set.iter().next().unwrap();
        assert_eq!(kept.spectrum.intensities(), &[1.0, 1.0]);
        assert_eq!(kept.source, OverlaySource::Kept);
    }

    #[test]
    fn file_overlays_share_the_palette() {
        let mut set = OverlaySet::new();
        set.keep(&flat(0.0));
        let o = set.add_file("ref.txt", flat(2.0));
        assert_eq!(o.color, overlay_color(1));
        assert_eq!(o.source, OverlaySource::File("ref.txt".into()));
    }
}
