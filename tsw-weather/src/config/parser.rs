//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This is the single place where INI key names are mapped to struct fields.

use std::str::FromStr;

use ini::{Ini, Properties};

use super::file::ConfigFileError;
use super::settings::ConfigFile;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
/// Unknown sections and keys are ignored.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [weather] section
    if let Some(section) = ini.section(Some("weather")) {
        if let Some(v) = section.get("update_threshold_km") {
            let threshold: f64 = parse_value(
                "weather",
                "update_threshold_km",
                v,
                "must be a positive number (kilometers)",
            )?;
            if !(threshold.is_finite() && threshold > 0.0) {
                return Err(invalid(
                    "weather",
                    "update_threshold_km",
                    v,
                    "must be a positive number (kilometers)",
                ));
            }
            config.weather.update_threshold_km = threshold;
        }
        if let Some(v) = section.get("transition_duration_seconds") {
            config.weather.transition_duration_seconds = parse_value(
                "weather",
                "transition_duration_seconds",
                v,
                "must be a non-negative integer (seconds)",
            )?;
        }
    }

    // [update] section
    if let Some(section) = ini.section(Some("update")) {
        if let Some(v) = section.get("location_check_interval_seconds") {
            config.update.location_check_interval_seconds =
                parse_positive_secs("update", "location_check_interval_seconds", v)?;
        }
        if let Some(v) = section.get("failed_update_attempts") {
            config.update.failed_update_attempts = parse_value(
                "update",
                "failed_update_attempts",
                v,
                "must be a non-negative integer (0 = never give up)",
            )?;
        }
    }

    // [retry] section
    if let Some(section) = ini.section(Some("retry")) {
        if let Some(v) = section.get("max_attempts") {
            config.retry.max_attempts =
                parse_value("retry", "max_attempts", v, "must be a non-negative integer")?;
        }
        if let Some(v) = section.get("initial_delay_ms") {
            config.retry.initial_delay_ms = parse_value(
                "retry",
                "initial_delay_ms",
                v,
                "must be a non-negative integer (milliseconds)",
            )?;
        }
        if let Some(v) = section.get("jitter") {
            config.retry.jitter = parse_bool("retry", "jitter", v)?;
        }
    }

    // [simulation] section
    if let Some(section) = ini.section(Some("simulation")) {
        if let Some(v) = non_empty(section, "base_url") {
            config.simulation.base_url = v.to_string();
        }
        if let Some(v) = section.get("timeout_secs") {
            config.simulation.timeout_secs = parse_positive_secs("simulation", "timeout_secs", v)?;
        }
    }

    // [provider] section
    if let Some(section) = ini.section(Some("provider")) {
        if let Some(v) = non_empty(section, "base_url") {
            config.provider.base_url = v.to_string();
        }
        if let Some(v) = section.get("timeout_secs") {
            config.provider.timeout_secs = parse_positive_secs("provider", "timeout_secs", v)?;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = non_empty(section, "level") {
            config.logging.level = v.to_lowercase();
        }
    }

    // [api_keys] section
    if let Some(section) = ini.section(Some("api_keys")) {
        config.api_keys.openweather = non_empty(section, "openweather").map(str::to_string);
        config.api_keys.simulation = non_empty(section, "simulation").map(str::to_string);
    }

    // [conversion] section
    if let Some(section) = ini.section(Some("conversion")) {
        let c = &mut config.conversion;
        let fields: [(&str, &mut f64); 7] = [
            (
                "precipitation_saturation_mm_h",
                &mut c.precipitation_saturation_mm_h,
            ),
            (
                "wetness_precipitation_weight",
                &mut c.wetness_precipitation_weight,
            ),
            ("wetness_humidity_weight", &mut c.wetness_humidity_weight),
            (
                "ground_snow_saturation_mm_h",
                &mut c.ground_snow_saturation_mm_h,
            ),
            ("fog_min_visibility_km", &mut c.fog_min_visibility_km),
            ("fog_max_visibility_km", &mut c.fog_max_visibility_km),
            ("max_fog_density", &mut c.max_fog_density),
        ];
        for (key, field) in fields {
            if let Some(v) = section.get(key) {
                let value: f64 =
                    parse_value("conversion", key, v, "must be a non-negative number")?;
                if !(value.is_finite() && value >= 0.0) {
                    return Err(invalid("conversion", key, v, "must be a non-negative number"));
                }
                *field = value;
            }
        }

        if c.fog_max_visibility_km <= c.fog_min_visibility_km {
            return Err(invalid(
                "conversion",
                "fog_max_visibility_km",
                &c.fog_max_visibility_km.to_string(),
                "must be greater than fog_min_visibility_km",
            ));
        }
    }

    Ok(config)
}

/// Parse a boolean value, accepting true/false, yes/no, on/off and 1/0.
pub(super) fn parse_bool(section: &str, key: &str, value: &str) -> Result<bool, ConfigFileError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(invalid(section, key, value, "must be true or false")),
    }
}

fn parse_value<T: FromStr>(
    section: &str,
    key: &str,
    value: &str,
    reason: &str,
) -> Result<T, ConfigFileError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(section, key, value, reason))
}

/// Parse a whole number of seconds that must be at least 1.
fn parse_positive_secs(section: &str, key: &str, value: &str) -> Result<u64, ConfigFileError> {
    const REASON: &str = "must be a positive integer (seconds)";
    match parse_value::<u64>(section, key, value, REASON)? {
        0 => Err(invalid(section, key, value, REASON)),
        secs => Ok(secs),
    }
}

fn non_empty<'a>(section: &'a Properties, key: &str) -> Option<&'a str> {
    section.get(key).map(str::trim).filter(|v| !v.is_empty())
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
