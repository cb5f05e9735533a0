//! API-key discovery.
//!
//! Keys are resolved once at startup and handed to the clients that need
//! them. A key set in `config.ini` wins; otherwise well-known key files are
//! searched in order.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::settings::ApiKeySettings;
use super::{config_directory, mask_api_key};

/// File holding the OpenWeather API key.
pub const PROVIDER_KEY_FILE: &str = "WeatherApiKey.txt";

/// File the game writes its comm key to.
pub const SIMULATION_KEY_FILE: &str = "CommAPIKey.txt";

/// Location of the game's config directory below the user's Documents folder.
pub const SIMULATION_KEY_SUBDIR: &[&str] = &["My Games", "TrainSimWorld6", "Saved", "Config"];

/// Resolved keys. `None` means no source supplied a non-empty key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiKeys {
    pub provider: Option<String>,
    pub simulation: Option<String>,
}

/// Where a resolved key came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    Config,
    File(PathBuf),
}

/// Searches the well-known key locations.
#[derive(Debug, Clone, Default)]
pub struct KeyLocator {
    exe_dir: Option<PathBuf>,
    documents_dir: Option<PathBuf>,
    config_dir: Option<PathBuf>,
}

impl KeyLocator {
    /// Locator for the current user and executable.
    pub fn from_environment() -> Self {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));
        Self {
            exe_dir,
            documents_dir: dirs::document_dir(),
            config_dir: Some(config_directory()),
        }
    }

    pub fn with_exe_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.exe_dir = Some(dir.into());
        self
    }

    pub fn with_documents_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.documents_dir = Some(dir.into());
        self
    }

    pub fn with_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config_dir = Some(dir.into());
        self
    }

    /// Candidate files for the provider key, in search order.
    pub fn provider_key_paths(&self) -> Vec<PathBuf> {
        [&self.exe_dir, &self.config_dir]
            .into_iter()
            .flatten()
            .map(|dir| dir.join(PROVIDER_KEY_FILE))
            .collect()
    }

    /// Candidate files for the simulation comm key, in search order.
    pub fn simulation_key_paths(&self) -> Vec<PathBuf> {
        let game_config = self.documents_dir.as_ref().map(|docs| {
            SIMULATION_KEY_SUBDIR
                .iter()
                .fold(docs.clone(), |path, part| path.join(part))
        });
        [game_config.as_ref(), self.config_dir.as_ref()]
            .into_iter()
            .flatten()
            .map(|dir| dir.join(SIMULATION_KEY_FILE))
            .collect()
    }

    /// Resolve both keys, preferring values from the config file.
    pub fn resolve(&self, configured: &ApiKeySettings) -> ApiKeys {
        ApiKeys {
            provider: self
                .find("OpenWeather", configured.openweather.as_deref(), &self.provider_key_paths())
                .map(|(key, _)| key),
            simulation: self
                .find("simulation", configured.simulation.as_deref(), &self.simulation_key_paths())
                .map(|(key, _)| key),
        }
    }

    fn find(
        &self,
        name: &str,
        configured: Option<&str>,
        paths: &[PathBuf],
    ) -> Option<(String, KeySource)> {
        let found = match configured.map(str::trim).filter(|k| !k.is_empty()) {
            Some(key) => Some((key.to_string(), KeySource::Config)),
            None => paths.iter().find_map(|path| {
                read_key_file(path).map(|key| (key, KeySource::File(path.clone())))
            }),
        };

        match &found {
            Some((key, source)) => {
                info!(key = %mask_api_key(key), source = ?source, "{} API key found", name)
            }
            None => debug!(searched = ?paths, "No {} API key found", name),
        }
        found
    }
}

/// Read a key file, trimming whitespace. Missing or empty files yield `None`.
pub fn read_key_file(path: &Path) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    let key = content.trim();
    (!key.is_empty()).then(|| key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(path: &Path, content: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn locator(root: &Path) -> KeyLocator {
        KeyLocator::default()
            .with_exe_dir(root.join("bin"))
            .with_documents_dir(root.join("docs"))
            .with_config_dir(root.join("config"))
    }

    #[test]
    fn test_configured_keys_win() {
        let temp = TempDir::new().unwrap();
        write(&temp.path().join("bin").join(PROVIDER_KEY_FILE), "from-file");

        let keys = locator(temp.path()).resolve(&ApiKeySettings {
            openweather: Some("  from-config  ".to_string()),
            simulation: Some("comm".to_string()),
        });

        assert_eq!(keys.provider.as_deref(), Some("from-config"));
        assert_eq!(keys.simulation.as_deref(), Some("comm"));
    }

    #[test]
    fn test_provider_key_beside_executable_before_config_dir() {
        let temp = TempDir::new().unwrap();
        write(&temp.path().join("bin").join(PROVIDER_KEY_FILE), "exe-key\n");
        write(&temp.path().join("config").join(PROVIDER_KEY_FILE), "config-key");

        let keys = locator(temp.path()).resolve(&ApiKeySettings::default());
        assert_eq!(keys.provider.as_deref(), Some("exe-key"));
    }

    #[test]
    fn test_simulation_key_from_game_config() {
        let temp = TempDir::new().unwrap();
        let game_key = temp
            .path()
            .join("docs/My Games/TrainSimWorld6/Saved/Config")
            .join(SIMULATION_KEY_FILE);
        write(&game_key, "  comm-key  \r\n");

        let keys = locator(temp.path()).resolve(&ApiKeySettings::default());
        assert_eq!(keys.simulation.as_deref(), Some("comm-key"));
        assert_eq!(keys.provider, None);
    }

    #[test]
    fn test_empty_file_counts_as_absent() {
        let temp = TempDir::new().unwrap();
        write(&temp.path().join("bin").join(PROVIDER_KEY_FILE), "   \n");
        write(&temp.path().join("config").join(PROVIDER_KEY_FILE), "fallback");

        let keys = locator(temp.path()).resolve(&ApiKeySettings::default());
        assert_eq!(keys.provider.as_deref(), Some("fallback"));
    }

    #[test]
    fn test_blank_configured_key_falls_back_to_files() {
        let temp = TempDir::new().unwrap();
        write(&temp.path().join("config").join(SIMULATION_KEY_FILE), "comm");

        let keys = locator(temp.path()).resolve(&ApiKeySettings {
            openweather: None,
            simulation: Some("   ".to_string()),
        });
        assert_eq!(keys.simulation.as_deref(), Some("comm"));
    }

    #[test]
    fn test_search_paths_order() {
        let loc = locator(Path::new("/root"));
        assert_eq!(
            loc.provider_key_paths(),
            vec![
                PathBuf::from("/root/bin/WeatherApiKey.txt"),
                PathBuf::from("/root/config/WeatherApiKey.txt"),
            ]
        );
        assert_eq!(
            loc.simulation_key_paths(),
            vec![
                PathBuf::from("/root/docs/My Games/TrainSimWorld6/Saved/Config/CommAPIKey.txt"),
                PathBuf::from("/root/config/CommAPIKey.txt"),
            ]
        );
    }
}
