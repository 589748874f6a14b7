mod common;

use common::FixedSampler;
use evade_scan::{ConfigError, ScanConfig, Scanner, ScoreWeights};

#[test]
fn defaults_are_valid() {
    let config = ScanConfig::default();
    assert_eq!(config.validate(), Ok(()));
    assert_eq!(config.scan_radius, 10.0);
    assert_eq!(config.min_spacing, 1.5);
    assert_eq!(config.scan_interval, 0.5);
    assert_eq!(config.repath_cooldown, 0.75);
    assert_eq!(config.weights.cover_bonus, 1000.0);
}

#[test]
fn invalid_values_name_the_field() {
    let cases = [
        (
            ScanConfig {
                scan_radius: 0.0,
                ..ScanConfig::default()
            },
            ConfigError::NonPositiveRadius(0.0),
        ),
        (
            ScanConfig {
                min_spacing: 12.0,
                ..ScanConfig::default()
            },
            ConfigError::SpacingOutOfRange {
                spacing: 12.0,
                radius: 10.0,
            },
        ),
        (
            ScanConfig {
                repath_cooldown: -1.0,
                ..ScanConfig::default()
            },
            ConfigError::Negative {
                field: "repath_cooldown",
                value: -1.0,
            },
        ),
        (
            ScanConfig {
                stand_off: 11.0,
                ..ScanConfig::default()
            },
            ConfigError::StandOffTooLarge {
                stand_off: 11.0,
                radius: 10.0,
            },
        ),
    ];

    for (config, expected) in cases {
        assert_eq!(config.validate(), Err(expected));
    }
}

#[test]
fn non_finite_values_are_rejected() {
    let config = ScanConfig {
        eye_height: f32::NAN,
        ..ScanConfig::default()
    };
    match config.validate() {
        Err(ConfigError::NotFinite { field, .. }) => assert_eq!(field, "eye_height"),
        other => panic!("unexpected {other:?}"),
    }

    let config = ScanConfig {
        weights: ScoreWeights {
            safe_point_bonus: Some(f32::INFINITY),
            ..ScoreWeights::default()
        },
        ..ScanConfig::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::NotFinite {
            field: "weights.safe_point_bonus",
            ..
        })
    ));
}

#[test]
fn errors_render_readably() {
    let err = ConfigError::Negative {
        field: "stand_off",
        value: -0.5,
    };
    assert_eq!(err.to_string(), "stand_off must not be negative (got -0.5)");
}

#[test]
fn scanner_rejects_invalid_config_and_keeps_the_old_one() {
    let bad = ScanConfig {
        scan_radius: -3.0,
        ..ScanConfig::default()
    };
    assert!(Scanner::new(bad, FixedSampler::default()).is_err());

    let mut scanner = Scanner::new(ScanConfig::default(), FixedSampler::default()).expect("config");
    assert!(scanner.set_config(bad).is_err());
    assert_eq!(scanner.config(), &ScanConfig::default());

    let tighter = ScanConfig {
        scan_radius: 6.0,
        ..ScanConfig::default()
    };
    scanner.set_config(tighter).expect("valid");
    assert_eq!(scanner.config().scan_radius, 6.0);
    assert_eq!(scanner.policy(), &ScoreWeights::default());
}
