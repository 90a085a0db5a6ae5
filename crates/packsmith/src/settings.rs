use serde::{Deserialize, Serialize};

use packsmith_model::Architecture;
use packsmith_platform::{AppPaths, write_atomic};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default)]
    pub debug_logging: bool,

    #[serde(default = "default_max_log_size_bytes")]
    pub max_log_size_bytes: u64,

    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    #[serde(default = "default_upload_timeout")]
    pub upload_timeout_secs: u64,

    #[serde(default = "default_retry_delays")]
    pub retry_delays_secs: Vec<u64>,

    #[serde(default)]
    pub feedback_endpoint: Option<String>,

    #[serde(default)]
    pub default_architecture: Architecture,
}

fn default_max_log_size_bytes() -> u64 {
    5 * 1024 * 1024
}

fn default_http_timeout() -> u64 {
    10
}

fn default_upload_timeout() -> u64 {
    120
}

fn default_retry_delays() -> Vec<u64> {
    vec![0, 2, 5]
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            debug_logging: false,
            max_log_size_bytes: default_max_log_size_bytes(),
            http_timeout_secs: default_http_timeout(),
            upload_timeout_secs: default_upload_timeout(),
            retry_delays_secs: default_retry_delays(),
            feedback_endpoint: None,
            default_architecture: Architecture::default(),
        }
    }
}

impl AppSettings {
    /// Missing or malformed settings fall back to the defaults.
    pub fn load(paths: &AppPaths) -> Self {
        let settings_path = paths.settings_file();

        let mut settings: Self = if settings_path.exists() {
            match std::fs::read_to_string(&settings_path) {
                Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
                Err(_) => Self::default(),
            }
        } else {
            Self::default()
        };

        if settings.retry_delays_secs.is_empty() {
            settings.retry_delays_secs = default_retry_delays();
        }

        settings
    }

    pub fn save(&self, paths: &AppPaths) -> Result<(), std::io::Error> {
        paths.ensure_dirs()?;

        let content = serde_json::to_string_pretty(self)?;
        write_atomic(&paths.settings_file(), content.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use packsmith_model::Architecture;
    use packsmith_platform::AppPaths;

    use super::AppSettings;

    #[test]
    fn missing_file_yields_defaults() {
        let temp_dir = tempfile::tempdir().expect("temporary directory should be created");
        let paths = AppPaths::with_root(temp_dir.path());

        assert_eq!(AppSettings::load(&paths), AppSettings::default());
    }

    #[test]
    fn partial_file_fills_remaining_defaults() {
        let temp_dir = tempfile::tempdir().expect("temporary directory should be created");
        let paths = AppPaths::with_root(temp_dir.path());
        paths.ensure_dirs().expect("directories should be created");
        std::fs::write(
            paths.settings_file(),
            r#"{"debug_logging": true, "default_architecture": "X64", "retry_delays_secs": []}"#,
        )
        .expect("settings file should be written");

        let settings = AppSettings::load(&paths);

        assert!(settings.debug_logging);
        assert_eq!(settings.default_architecture, Architecture::X64);
        assert_eq!(settings.http_timeout_secs, 10);
        assert_eq!(settings.retry_delays_secs, vec![0, 2, 5]);
    }

    #[test]
    fn malformed_file_yields_defaults() {
        let temp_dir = tempfile::tempdir().expect("temporary directory should be created");
        let paths = AppPaths::with_root(temp_dir.path());
        paths.ensure_dirs().expect("directories should be created");
        std::fs::write(paths.settings_file(), "{ nope").expect("settings file should be written");

        assert_eq!(AppSettings::load(&paths), AppSettings::default());
    }

    #[test]
    fn save_then_load_round_trips() {
        let temp_dir = tempfile::tempdir().expect("temporary directory should be created");
        let paths = AppPaths::with_root(temp_dir.path());
        let settings = AppSettings {
            debug_logging: true,
            feedback_endpoint: Some("https://feedback.example.com/mail.php".to_string()),
            ..AppSettings::default()
        };

        settings.save(&paths).expect("settings should save");

        assert_eq!(AppSettings::load(&paths), settings);
    }
}
