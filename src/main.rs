use eframe::egui;
use rusty_spectro::app::RustySpectroApp;
use rusty_spectro::config::AppConfig;
use rusty_spectro::device;
use rusty_spectro::state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    let config = AppConfig::load();
    let spectrometer = device::open_device(&config);
    let state = AppState::new(spectrometer, &config);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty Spectro – Live Spectrometer",
        options,
        Box::new(move |_cc| Ok(Box::new(RustySpectroApp::new(state, &config)))),
    )
}
