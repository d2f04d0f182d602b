use eframe::egui::Color32;
use palette::{Hsv, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Trace colours
// ---------------------------------------------------------------------------

/// The live trace is always drawn in pure red.
pub const LIVE_TRACE_COLOR: Color32 = Color32::from_rgb(255, 0, 0);

/// Number of distinct hues before overlay colours repeat.
pub const OVERLAY_HUES: usize = 9;

/// Brightness of overlay colours, slightly darker than full value.
const OVERLAY_VALUE: f32 = 200.0 / 255.0;

/// Colour of the `index`-th overlay. Hues step around the wheel and wrap
/// after [`OVERLAY_HUES`] entries.
pub fn overlay_color(index: usize) -> Color32 {
    let hue = (index % OVERLAY_HUES) as f32 * 360.0 / OVERLAY_HUES as f32;
    let hsv = Hsv::new(hue, 1.0, OVERLAY_VALUE);
    let rgb: Srgb = hsv.into_color();
    Color32::from_rgb(
        (rgb.red * 255.0).round() as u8,
        (rgb.green * 255.0).round() as u8,
        (rgb.blue * 255.0).round() as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_overlay_is_dark_red() {
        assert_eq!(overlay_color(0), Color32::from_rgb(200, 0, 0));
    }

    #[test]
    fn palette_cycles() {
        for i in 0..OVERLAY_HUES {
            assert_eq!(overlay_color(i), overlay_color(i + OVERLAY_HUES));
        }
        let distinct: std::collections::HashSet<_> =
            (0..OVERLAY_HUES).map(overlay_color).collect();
        assert_eq!(distinct.len(), OVERLAY_HUES);
    }

    #[test]
    fn overlays_differ_from_live_trace() {
        assert!((0..OVERLAY_HUES).all(|i| overlay_color(i) != LIVE_TRACE_COLOR));
    }
}
