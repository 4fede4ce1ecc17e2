//! Configuration validation traits and utilities

use crate::error::{ConfigError, ConfigResult};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Display;
use std::str::FromStr;

static SOURCE_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("source id pattern is valid"));

/// Trait for validatable configuration
pub trait Validatable {
    /// Validate the configuration
    fn validate(&self) -> ConfigResult<()>;

    /// Get the domain name for error reporting
    fn domain_name(&self) -> &'static str;

    /// Helper to create a domain-specific validation error
    fn validation_error(&self, message: impl Into<String>) -> ConfigError {
        ConfigError::DomainError {
            domain: self.domain_name().to_string(),
            message: message.into(),
        }
    }
}

/// Validate a required string field
pub fn validate_required_string(value: &str, field_name: &str, domain: &str) -> ConfigResult<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::DomainError {
            domain: domain.to_string(),
            message: format!("{} cannot be empty", field_name),
        });
    }
    Ok(())
}

/// Validate that a value lies within an inclusive range
pub fn validate_range<T>(value: T, min: T, max: T, field_name: &str, domain: &str) -> ConfigResult<()>
where
    T: PartialOrd + Display,
{
    if value < min || value > max {
        return Err(ConfigError::DomainError {
            domain: domain.to_string(),
            message: format!(
                "{} must be between {} and {}, got {}",
                field_name, min, max, value
            ),
        });
    }
    Ok(())
}

/// Validate a URL
pub fn validate_url(url: &str, field_name: &str, domain: &str) -> ConfigResult<()> {
    validate_required_string(url, field_name, domain)?;

    url::Url::parse(url).map_err(|e| ConfigError::DomainError {
        domain: domain.to_string(),
        message: format!("{} has invalid URL format: {}", field_name, e),
    })?;

    Ok(())
}

/// Check a source id against `[A-Za-z0-9_-]+`
pub fn is_valid_source_id(id: &str) -> bool {
    SOURCE_ID_PATTERN.is_match(id)
}

/// Parse a standard five-field cron expression (minute hour day month weekday)
///
/// The `cron` crate expects a leading seconds field and numbers weekdays from
/// 1 = Sunday, so the expression is rewritten with a `0` seconds field and
/// named weekdays before parsing. Standard numbering applies: 0 and 7 are
/// Sunday, 1 is Monday.
pub fn parse_schedule(expression: &str) -> Result<cron::Schedule, String> {
    let fields: Vec<&str> = expression.split_whitespace().collect();
    if fields.len() != 5 {
        return Err(format!(
            "expected 5 fields (minute hour day month weekday), got {}",
            fields.len()
        ));
    }

    let day_of_week = normalize_day_of_week(fields[4])?;
    let normalized = format!(
        "0 {} {} {} {} {}",
        fields[0], fields[1], fields[2], fields[3], day_of_week
    );

    cron::Schedule::from_str(&normalized).map_err(|e| e.to_string())
}

fn normalize_day_of_week(field: &str) -> Result<String, String> {
    let parts = field
        .split(',')
        .map(|part| {
            let (range, step) = match part.split_once('/') {
                Some((range, step)) => (range, Some(step)),
                None => (part, None),
            };
            let range = range
                .split('-')
                .map(day_name)
                .collect::<Result<Vec<_>, _>>()?
                .join("-");
            Ok(match step {
                Some(step) => format!("{}/{}", range, step),
                None => range,
            })
        })
        .collect::<Result<Vec<String>, String>>()?;

    Ok(parts.join(","))
}

fn day_name(token: &str) -> Result<String, String> {
    const NAMES: [&str; 8] = ["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT", "SUN"];

    if token.is_empty() {
        return Err("empty weekday value".to_string());
    }

    match token.parse::<usize>() {
        Ok(day) if day < NAMES.len() => Ok(NAMES[day].to_string()),
        Ok(day) => Err(format!("weekday {} is out of range 0-7", day)),
        Err(_) => Ok(token.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_source_id_pattern() {
        assert!(is_valid_source_id("weather_a"));
        assert!(is_valid_source_id("ferry-map-2"));
        assert!(!is_valid_source_id(""));
        assert!(!is_valid_source_id("weather a"));
        assert!(!is_valid_source_id("weather/a"));
        assert!(!is_valid_source_id("wëather"));
    }

    #[test]
    fn test_parse_valid_schedules() {
        for expr in [
            "*/15 * * * *",
            "0 * * * *",
            "*/10 6-22 * * *",
            "30 7 * * 1-5",
            "0 9 * * 0",
            "0 9 * * 7",
            "0 12 1 */2 *",
            "5,35 * * * MON,WED",
        ] {
            assert!(parse_schedule(expr).is_ok(), "expected '{}' to parse", expr);
        }
    }

    #[test]
    fn test_parse_invalid_schedules() {
        for expr in [
            "",
            "* * *",
            "0 */5 * * * *",
            "not a cron at all",
            "61 * * * *",
            "* 25 * * *",
            "* * * * 8",
            "* * * 13 *",
        ] {
            assert!(parse_schedule(expr).is_err(), "expected '{}' to fail", expr);
        }
    }

    #[test]
    fn test_weekday_numbering_is_standard() {
        // 1-5 must mean Monday to Friday, never the weekend
        let schedule = parse_schedule("0 9 * * 1-5").unwrap();
        for at in schedule.upcoming(Utc).take(10) {
            let day = at.format("%a").to_string();
            assert_ne!(day, "Sun");
            assert_ne!(day, "Sat");
        }
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range(30, 1, 300, "timeout", "sources").is_ok());
        assert!(validate_range(1, 1, 300, "timeout", "sources").is_ok());
        assert!(validate_range(300, 1, 300, "timeout", "sources").is_ok());
        assert!(validate_range(0, 1, 300, "timeout", "sources").is_err());
        assert!(validate_range(301, 1, 300, "timeout", "sources").is_err());
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("http://signage.local/status", "probe.url", "daemon").is_ok());
        assert!(validate_url("https://example.com:8443/live?x=1", "probe.url", "daemon").is_ok());

        let err = validate_url("not a url", "probe.url", "daemon").unwrap_err();
        assert!(matches!(err, ConfigError::DomainError { .. }));
        assert!(err.to_string().contains("probe.url"));
        assert!(validate_url("   ", "probe.url", "daemon").is_err());
    }
}
