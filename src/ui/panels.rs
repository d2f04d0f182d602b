use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::{AppState, Status};

const TXT_FILTER: (&str, &[&str]) = ("Text Files", &["txt"]);

// ---------------------------------------------------------------------------
// Left side panel – acquisition controls
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Spectrometer");
    ui.label(RichText::new(state.device_name()).strong());
    ui.separator();

    // ---- Acquisition settings ----
    egui::Grid::new("acquisition_grid")
        .num_columns(2)
        .spacing([8.0, 6.0])
        .show(ui, |ui: &mut Ui| {
            ui.label("Integration time");
            ui.add(
                egui::DragValue::new(&mut state.settings.integration_time_ms)
                    .range(1.0..=60_000.0)
                    .speed(1.0)
                    .max_decimals(1)
                    .suffix(" ms"),
            );
            ui.end_row();

            ui.label("Averaging");
            ui.add(
                egui::DragValue::new(&mut state.settings.averaging)
                    .range(1..=1000)
                    .speed(0.2),
            );
            ui.end_row();
        });

    let auto_label = if state.auto_range {
        "Auto range: on"
    } else {
        "Auto range: off"
    };
    if ui.button(auto_label).clicked() {
        state.auto_range = !state.auto_range;
    }
    ui.separator();

    // ---- Background ----
    ui.strong("Background");
    ui.horizontal(|ui: &mut Ui| {
        if ui.button("Capture").clicked() {
            state.capture_background();
        }
        if ui
            .add_enabled(!state.background().is_zero(), egui::Button::new("Reset"))
            .clicked()
        {
            state.clear_background();
        }
    });
    ui.separator();

    // ---- Overlays ----
    ui.strong("Spectra");
    ui.horizontal(|ui: &mut Ui| {
        if ui.button("Keep").clicked() {
            state.keep_live();
        }
        if ui.button("Clear").clicked() {
            state.clear_overlays();
        }
        if ui.button("Open…").clicked() {
            open_file_dialog(state);
        }
    });
    overlay_table(ui, state);
    ui.separator();

    // ---- Saving ----
    ui.strong("Comment");
    ui.add(
        egui::TextEdit::multiline(&mut state.comment)
            .desired_rows(4)
            .desired_width(f32::INFINITY),
    );
    if ui.button("Save…").clicked() {
        save_file_dialog(state);
    }
}

fn overlay_table(ui: &mut Ui, state: &AppState) {
    let overlays = state.overlays();
    if overlays.is_empty() {
        ui.label("No kept spectra.");
        return;
    }
    TableBuilder::new(ui)
        .striped(true)
        .column(Column::exact(16.0))
        .column(Column::remainder())
        .column(Column::auto())
        .body(|mut body| {
            for overlay in overlays.iter() {
                body.row(18.0, |mut row| {
                    row.col(|ui: &mut Ui| {
                        ui.colored_label(overlay.color, "■");
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(&overlay.label);
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(format!("{} pts", overlay.spectrum.len()));
                    });
                });
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / status bar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open spectrum…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Save spectrum…").clicked() {
                save_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "{} points, {} kept",
            state.live().len(),
            state.overlays().count()
        ));

        ui.separator();

        match state.status() {
            Some(Status::Info(msg)) => {
                ui.label(msg);
            }
            Some(Status::DeviceError(msg)) | Some(Status::Error(msg)) => {
                ui.label(RichText::new(msg).color(Color32::RED));
            }
            None => {}
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open Spectrum")
        .add_filter(TXT_FILTER.0, TXT_FILTER.1)
        .add_filter("CSV", &["csv"])
        .add_filter("All Files", &["*"])
        .pick_file();

    if let Some(path) = file {
        state.open_overlay(&path);
    }
}

pub fn save_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Save Spectrum")
        .add_filter(TXT_FILTER.0, TXT_FILTER.1)
        .add_filter("All Files", &["*"])
        .save_file();

    if let Some(path) = file {
        state.save_live(&path);
    }
}
