use std::time::{Duration, Instant};

use eframe::egui;

use crate::config::AppConfig;
use crate::data::acquisition::Ticker;
use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct RustySpectroApp {
    pub state: AppState,
    ticker: Ticker,
}

impl RustySpectroApp {
    pub fn new(state: AppState, config: &AppConfig) -> Self {
        Self {
            state,
            ticker: Ticker::new(Duration::from_millis(config.tick_interval_ms.max(1))),
        }
    }
}

impl eframe::App for RustySpectroApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Acquisition tick ----
        let now = Instant::now();
        if self.ticker.due(now) {
            self.state.tick();
        }

        // ---- Top panel: status bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: acquisition controls ----
        egui::SidePanel::left("control_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::spectral_plot(ui, &mut self.state);
        });

        ctx.request_repaint_after(self.ticker.remaining(Instant::now()));
    }
}
