use apm_overlay::aggregator::CountPolicy;
use apm_overlay::display::DisplayMode;
use apm_overlay::settings::Settings;
use std::fs;
use tempfile::tempdir;

#[test]
fn missing_file_yields_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    let settings = Settings::load(path.to_str().unwrap()).unwrap();
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.tick_interval_ms, 1000);
    assert_eq!(settings.count_policy, CountPolicy::Cumulative);
    assert_eq!(settings.display_mode, DisplayMode::Count);
}

#[test]
fn empty_file_yields_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, "  \n").unwrap();
    let settings = Settings::load(path.to_str().unwrap()).unwrap();
    assert_eq!(settings, Settings::default());
}

#[test]
fn partial_file_fills_in_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(
        &path,
        r#"{ "count_policy": "per_tick", "display_mode": "per_minute", "label": "APM " }"#,
    )
    .unwrap();

    let settings = Settings::load(path.to_str().unwrap()).unwrap();
    assert_eq!(settings.count_policy, CountPolicy::PerTick);
    assert_eq!(settings.display_mode, DisplayMode::PerMinute);
    assert_eq!(settings.label, "APM ");
    assert_eq!(settings.window_width, 130);
    assert_eq!(settings.window_height, 35);
    assert_eq!(settings.opacity, 220);
    assert!(!settings.debug_logging);
}

#[test]
fn malformed_file_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, r#"{ "count_policy": "sometimes" }"#).unwrap();
    assert!(Settings::load(path.to_str().unwrap()).is_err());
}

#[test]
fn save_then_load_preserves_values() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    let path = path.to_str().unwrap();

    let mut settings = Settings::default();
    settings.base_count = 1000;
    settings.window_offset_y = Some(12);
    settings.log_file = Some("apm.log".into());
    settings.save(path).unwrap();

    let loaded = Settings::load(path).unwrap();
    assert_eq!(loaded, settings);
    assert_eq!(loaded.geometry().top, 12);
}
