//! Environment configuration helpers
//!
//! Thin readers over `std::env` that turn "missing" and "unparsable" into
//! typed errors, so config structs can offer a `from_env` constructor
//! without repeating the same boilerplate.

use std::env;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    Missing(String),

    #[error("environment variable {key}={value} is invalid: {reason}")]
    Invalid {
        key: String,
        value: String,
        reason: String,
    },
}

/// Required variable; empty values count as missing
pub fn env_var(key: &str) -> Result<String, ConfigError> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(key.to_string())),
    }
}

/// Parse an optional variable; `Ok(None)` when it is unset
pub fn env_parse<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Ok(value) = env_var(key) else {
        return Ok(None);
    };
    value
        .trim()
        .parse()
        .map(Some)
        .map_err(|e: T::Err| ConfigError::Invalid {
            key: key.to_string(),
            value,
            reason: e.to_string(),
        })
}

/// Boolean switch accepting `1/0`, `true/false`, `yes/no`, `on/off`
pub fn env_flag(key: &str) -> Result<Option<bool>, ConfigError> {
    let Ok(value) = env_var(key) else {
        return Ok(None);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        _ => Err(ConfigError::Invalid {
            key: key.to_string(),
            value,
            reason: "expected a boolean".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test uses its own variable names; the process environment is shared.

    #[test]
    fn test_env_parse() {
        unsafe { env::set_var("FRED_UTILS_TEST_NUM", "42") };
        assert_eq!(env_parse::<u32>("FRED_UTILS_TEST_NUM"), Ok(Some(42)));
        assert_eq!(env_parse::<u32>("FRED_UTILS_TEST_UNSET_B"), Ok(None));

        unsafe { env::set_var("FRED_UTILS_TEST_BAD", "forty") };
        let err = env_parse::<u32>("FRED_UTILS_TEST_BAD").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "FRED_UTILS_TEST_BAD"));
    }

    #[test]
    fn test_env_flag() {
        unsafe { env::set_var("FRED_UTILS_TEST_FLAG", "Yes") };
        assert_eq!(env_flag("FRED_UTILS_TEST_FLAG"), Ok(Some(true)));
        unsafe { env::set_var("FRED_UTILS_TEST_FLAG_OFF", "0") };
        assert_eq!(env_flag("FRED_UTILS_TEST_FLAG_OFF"), Ok(Some(false)));
        unsafe { env::set_var("FRED_UTILS_TEST_FLAG_BAD", "maybe") };
        assert!(env_flag("FRED_UTILS_TEST_FLAG_BAD").is_err());
    }

    #[test]
    fn test_blank_counts_as_missing() {
        unsafe { env::set_var("FRED_UTILS_TEST_BLANK", "  ") };
        assert_eq!(
            env_var("FRED_UTILS_TEST_BLANK"),
            Err(ConfigError::Missing("FRED_UTILS_TEST_BLANK".to_string()))
        );
    }
}
