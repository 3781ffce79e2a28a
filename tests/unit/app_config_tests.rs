/*!
 * Tests for application configuration
 */

use std::str::FromStr;
use anyhow::Result;
use gornikeaf::app_config::{Config, LogLevel, OutputDelimiter, TierNames, DEFAULT_OUTPUT_PATH};
use crate::common;

#[test]
fn test_default_config_shouldUseStandardNames() {
    let config = Config::default();

    assert_eq!(config.output_path, DEFAULT_OUTPUT_PATH);
    assert_eq!(config.output_path, "gornikeaf-output.csv");
    assert_eq!(config.delimiter, OutputDelimiter::Comma);
    assert_eq!(config.log_level, LogLevel::Warn);
    assert_eq!(
        config.tiers.required(),
        ["Time Period sub", "Trash sub", "Mother", "Toddler"]
    );
    assert_eq!(config.tiers.toddler_emotion_words, "Emotion Words - Toddler");
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_withEmptyOutputPath_shouldFail() {
    let config = Config {
        output_path: "  ".to_string(),
        ..Config::default()
    };

    let err = config.validate().unwrap_err();

    assert!(err.to_string().contains("Output path"));
}

#[test]
fn test_validate_withEmptyTierName_shouldNameTheKey() {
    let config = Config {
        tiers: TierNames {
            responsivity: String::new(),
            ..TierNames::default()
        },
        ..Config::default()
    };

    let err = config.validate().unwrap_err();

    assert!(err.to_string().contains("responsivity"));
}

#[test]
fn test_validate_withSameTierForTwoRoles_shouldFail() {
    let config = Config {
        tiers: TierNames {
            toddler: "Mother".to_string(),
            ..TierNames::default()
        },
        ..Config::default()
    };

    let err = config.validate().unwrap_err();

    assert!(err.to_string().contains("more than one role"));
}

#[test]
fn test_fromFile_withPartialJson_shouldFillDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{ "delimiter": "tab", "tiers": { "mother": "Mom" } }"#,
    )?;

    let config = Config::from_file(&path)?;

    assert_eq!(config.delimiter, OutputDelimiter::Tab);
    assert_eq!(config.tiers.mother, "Mom");
    assert_eq!(config.tiers.toddler, "Toddler");
    assert_eq!(config.output_path, DEFAULT_OUTPUT_PATH);
    assert_eq!(config.log_level, LogLevel::Warn);
    Ok(())
}

#[test]
fn test_fromFile_withInvalidJson_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "conf.json", "{ not json")?;

    let result = Config::from_file(&path);

    assert!(result.is_err());
    Ok(())
}

#[test]
fn test_fromFile_withMissingFile_shouldFail() {
    assert!(Config::from_file("missing/conf.json").is_err());
}

#[test]
fn test_outputDelimiter_fromStr_shouldParseKnownNames() -> Result<()> {
    assert_eq!(OutputDelimiter::from_str("comma")?, OutputDelimiter::Comma);
    assert_eq!(OutputDelimiter::from_str("TAB")?, OutputDelimiter::Tab);
    assert_eq!(OutputDelimiter::from_str("ascii")?, OutputDelimiter::Ascii);
    assert!(OutputDelimiter::from_str("pipe").is_err());
    Ok(())
}

#[test]
fn test_outputDelimiter_asByte_shouldMatchSeparator() {
    assert_eq!(OutputDelimiter::Comma.as_byte(), b',');
    assert_eq!(OutputDelimiter::Tab.as_byte(), b'\t');
    assert_eq!(OutputDelimiter::Ascii.as_byte(), 0x1f);
    assert_eq!(OutputDelimiter::Ascii.to_string(), "ascii");
}

#[test]
fn test_logLevel_fromVerbosity_shouldRaiseLevel() {
    assert_eq!(LogLevel::from_verbosity(0), None);
    assert_eq!(LogLevel::from_verbosity(1), Some(LogLevel::Info));
    assert_eq!(LogLevel::from_verbosity(2), Some(LogLevel::Debug));
    assert_eq!(LogLevel::from_verbosity(5), Some(LogLevel::Debug));
    assert_eq!(LogLevel::Trace.to_level_filter(), log::LevelFilter::Trace);
}
