//! Loading configuration from YAML files.

use std::fs;
use std::path::PathBuf;

use nf_app::{ConfigError, RegulatorConfig};

fn temp_config(name: &str, content: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("nvfan-{}-{}.yaml", name, std::process::id()));
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn file_values_override_defaults() {
    let path = temp_config(
        "override",
        "target_temp: 60\nregulation_interval: 5\nmin_speed: 30\nmax_speed: 90\ngpu: \"gpu:1\"\nfan: \"fan:2\"\nverbose: 2\n",
    );

    let config = RegulatorConfig::load(&path).unwrap();
    let _ = fs::remove_file(&path);
    let settings = config.validate().unwrap();

    assert_eq!(settings.regulator.target(), 60.0);
    assert_eq!(settings.interval.as_secs(), 5);
    assert_eq!(settings.regulator.bounds().min().get(), 30);
    assert_eq!(settings.regulator.bounds().max().get(), 90);
    assert_eq!(settings.gateway.targets.gpu.as_str(), "gpu:1");
    assert_eq!(settings.gateway.targets.fan.as_str(), "fan:2");
    assert_eq!(settings.verbosity, 2);
    // untouched fields keep their defaults
    assert_eq!(settings.regulator.commanded().get(), 50);
    assert_eq!(settings.regulator.policy().deadzone(), 3.0);
}

#[test]
fn malformed_file_is_a_parse_error() {
    let path = temp_config("malformed", "target_temp: [hot]\n");
    let err = RegulatorConfig::load(&path).unwrap_err();
    let _ = fs::remove_file(&path);
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn file_can_hold_an_invalid_combination() {
    // Loading only parses; validation catches the range error.
    let path = temp_config("invalid", "min_speed: 70\nmax_speed: 60\n");
    let config = RegulatorConfig::load(&path).unwrap();
    let _ = fs::remove_file(&path);
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidValue { .. })
    ));
}
