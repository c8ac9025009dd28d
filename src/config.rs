use crate::cli::Cli;
use config::{Config, ConfigError, Environment, File};
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub application_name: String,
    /// JSON theme descriptor; the built-in theme is used when unset.
    pub theme_path: Option<PathBuf>,
    pub secure_token_storage: bool,
    pub keyring_service: String,
    pub panel_width: f32,
    pub dark_mode: bool,
    pub toast_duration_secs: u64,
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            application_name: "ThemeLab".to_string(),
            theme_path: None,
            secure_token_storage: false,
            keyring_service: "ThemeLab".to_string(),
            panel_width: 350.0,
            dark_mode: false,
            toast_duration_secs: 4,
            log_filter: "themelab=info".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl AppConfig {
    pub fn load(cli: &Cli) -> Result<Self, AppConfigError> {
        let defaults = Self::default();
        let mut builder = Config::builder()
            .set_default("application_name", defaults.application_name.clone())?
            .set_default("secure_token_storage", defaults.secure_token_storage)?
            .set_default("keyring_service", defaults.keyring_service.clone())?
            .set_default("panel_width", f64::from(defaults.panel_width))?
            .set_default("dark_mode", defaults.dark_mode)?
            .set_default("toast_duration_secs", defaults.toast_duration_secs)?
            .set_default("log_filter", defaults.log_filter.clone())?;

        if let Some(profile) = &cli.profile {
            let profile_file_name = format!("themelab.{profile}.toml");
            if let Some(path) = Self::profile_path(&profile_file_name) {
                builder = builder.add_source(File::from(path).required(false));
            }
        }

        if let Some(config_path) = &cli.config {
            builder = builder.add_source(File::from(config_path.clone()).required(true));
        } else if let Some(path) = Self::default_config_path() {
            builder = builder.add_source(File::from(path).required(false));
        }

        builder = builder.add_source(Environment::with_prefix("THEMELAB").separator("__"));

        let built = builder.build()?;
        let mut settings = built.try_deserialize::<AppConfig>()?;
        if let Some(theme) = &cli.theme {
            settings.theme_path = Some(theme.clone());
        }
        Ok(settings)
    }

    fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("themelab.toml"))
    }

    fn profile_path(file_name: &str) -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(file_name))
    }
}

pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "DigitalDataCo", "ThemeLab")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    #[test]
    fn defaults_match_sidebar_layout() {
        let config = AppConfig::default();
        assert_eq!(config.panel_width, 350.0);
        assert!(!config.secure_token_storage);
        assert!(config.theme_path.is_none());
    }

    #[test]
    fn load_reads_explicit_config_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "secure_token_storage = true\nkeyring_service = \"chat-widget\"\ntoast_duration_secs = 9"
        )
        .unwrap();

        let path = file.path().to_str().unwrap().to_owned();
        let cli = Cli::parse_from(["themelab", "--config", path.as_str()]);
        let config = AppConfig::load(&cli).unwrap();

        assert!(config.secure_token_storage);
        assert_eq!(config.keyring_service, "chat-widget");
        assert_eq!(config.toast_duration_secs, 9);
        assert_eq!(config.application_name, "ThemeLab");
    }

    #[test]
    fn theme_flag_overrides_configured_path() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "theme_path = \"from-config.json\"").unwrap();

        let path = file.path().to_str().unwrap().to_owned();
        let cli = Cli::parse_from([
            "themelab",
            "--config",
            path.as_str(),
            "--theme",
            "from-flag.json",
        ]);
        let config = AppConfig::load(&cli).unwrap();

        assert_eq!(config.theme_path, Some(PathBuf::from("from-flag.json")));
    }
}
