use apm_overlay::app;
use apm_overlay::logging;
use apm_overlay::platform::{DefaultInputSource, DefaultOverlay, DefaultPump};
use apm_overlay::settings::{Settings, SETTINGS_FILE};
use std::process::ExitCode;

fn main() -> ExitCode {
    let loaded = Settings::load(SETTINGS_FILE);
    let settings = loaded.as_ref().cloned().unwrap_or_default();
    logging::init(settings.debug_logging, settings.log_file.clone());
    if let Err(err) = &loaded {
        tracing::warn!(?err, "failed to read {SETTINGS_FILE}; using defaults");
    }

    let mut input = DefaultInputSource::new(settings.ignore_injected);
    let mut overlay = DefaultOverlay::new();
    match app::run(&settings, &mut input, &mut overlay, DefaultPump::new) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => ExitCode::from(err.exit_code()),
    }
}
