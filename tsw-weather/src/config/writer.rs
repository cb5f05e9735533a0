//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! Produces the commented INI representation written to `config.ini`.

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let openweather = config.api_keys.openweather.as_deref().unwrap_or("");
    let simulation = config.api_keys.simulation.as_deref().unwrap_or("");
    let jitter = if config.retry.jitter { "true" } else { "false" };
    let c = &config.conversion;

    format!(
        r#"[weather]
; Distance travelled (km) before fetching new weather data
update_threshold_km = {}
; Duration of the smooth transition to new weather (seconds)
transition_duration_seconds = {}

[update]
; How often the player location is read (seconds)
location_check_interval_seconds = {}
; Consecutive failed location reads before stopping (0 = never stop)
failed_update_attempts = {}

[retry]
; Total attempts per request, including the first
max_attempts = {}
; Delay before the first retry, doubled on each further retry (milliseconds)
initial_delay_ms = {}
; Randomise retry delays
jitter = {}

[simulation]
; Train Sim World external interface
base_url = {}
timeout_secs = {}

[provider]
; OpenWeather API
base_url = {}
timeout_secs = {}

[logging]
; debug, info, warn or error
level = {}

[api_keys]
; OpenWeather API key. When empty, WeatherApiKey.txt is read from the
; executable's directory or the config directory.
openweather = {}
; Train Sim World comm key. When empty, CommAPIKey.txt is read from
; Documents/My Games/TrainSimWorld6/Saved/Config or the config directory.
simulation = {}

[conversion]
; Rain + snow intensity (mm/h) that maps to full precipitation
precipitation_saturation_mm_h = {}
; Wetness = precipitation * weight + humidity * weight
wetness_precipitation_weight = {}
wetness_humidity_weight = {}
; Snow intensity (mm/h) that maps to full ground snow
ground_snow_saturation_mm_h = {}
; Visibility range (km) over which fog fades from maximum to none
fog_min_visibility_km = {}
fog_max_visibility_km = {}
max_fog_density = {}
"#,
        config.weather.update_threshold_km,
        config.weather.transition_duration_seconds,
        config.update.location_check_interval_seconds,
        config.update.failed_update_attempts,
        config.retry.max_attempts,
        config.retry.initial_delay_ms,
        jitter,
        config.simulation.base_url,
        config.simulation.timeout_secs,
        config.provider.base_url,
        config.provider.timeout_secs,
        config.logging.level,
        openweather,
        simulation,
        c.precipitation_saturation_mm_h,
        c.wetness_precipitation_weight,
        c.wetness_humidity_weight,
        c.ground_snow_saturation_mm_h,
        c.fog_min_visibility_km,
        c.fog_max_visibility_km,
        c.max_fog_density,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_parseable() {
        let content = to_config_string(&ConfigFile::default());
        let ini = ini::Ini::load_from_str(&content).unwrap();
        let parsed = super::super::parser::parse_ini(&ini).unwrap();
        assert_eq!(parsed, ConfigFile::default());
    }

    #[test]
    fn test_contains_every_section() {
        let content = to_config_string(&ConfigFile::default());
        for section in [
            "[weather]",
            "[update]",
            "[retry]",
            "[simulation]",
            "[provider]",
            "[logging]",
            "[api_keys]",
            "[conversion]",
        ] {
            assert!(content.contains(section), "missing {section}");
        }
    }
}
