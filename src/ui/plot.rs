use eframe::egui::{Id, Ui};
use egui_plot::{Line, Plot, PlotPoints};

use crate::color::LIVE_TRACE_COLOR;
use crate::state::AppState;

const PLOT_ID: &str = "spectral_plot";

// ---------------------------------------------------------------------------
// Spectral plot (central panel)
// ---------------------------------------------------------------------------

/// Render overlays behind the live trace.
pub fn spectral_plot(ui: &mut Ui, state: &mut AppState) {
    if state.live().is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No spectrum available from the device");
        });
        return;
    }

    let auto_range = state.auto_range;

    let response = Plot::new(PLOT_ID)
        .id(Id::new(PLOT_ID))
        .legend(egui_plot::Legend::default())
        .x_axis_label("Wavelength (nm)")
        .y_axis_label("Intensity (counts)")
        .show_grid(true)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            // Off keeps whatever bounds the last frame showed.
            plot_ui.set_auto_bounds(auto_range);

            // Drawn first, so they sit behind the live trace.
            for overlay in state.overlays().iter() {
                let points: PlotPoints = overlay.spectrum.points().collect();
                plot_ui.line(
                    Line::new(points)
                        .name(&overlay.label)
                        .color(overlay.color)
                        .width(1.0),
                );
            }

            let live: PlotPoints = state.live().points().collect();
            plot_ui.line(
                Line::new(live)
                    .name("live")
                    .color(LIVE_TRACE_COLOR)
                    .width(1.5),
            );
        });

    // Panning or zooming by hand turns auto range off, as in the toolbar.
    let r = &response.response;
    if auto_range && (r.dragged() || (r.hovered() && ui.input(|i| i.smooth_scroll_delta.y != 0.0))) {
        state.auto_range = false;
    }
}
