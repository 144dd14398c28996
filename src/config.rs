use anyhow::{Context, Result, anyhow, bail};
use chrono::Weekday;
use dirs::home_dir;
use serde::{Deserialize, Serialize};
use std::fs;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

const APP_DIR: &str = ".social-report";
const CONFIG_FILE: &str = "config.json";
pub const DEFAULT_DATA_URL: &str =
    "https://raw.githubusercontent.com/pili-code/social-report/main/reports/latest.json";
pub const DEFAULT_XLSX_URL: &str =
    "https://github.com/pili-code/social-report/raw/main/reports/latest.xlsx";
pub const DEFAULT_SHEETS_URL: &str = "https://docs.google.com/spreadsheets/d/create";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_url: String,
    pub xlsx_url: String,
    pub sheets_base_url: String,
    pub api_port: u16,
    pub week_start: String,
    pub report_dir: PathBuf,
    pub fetch_timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_url: DEFAULT_DATA_URL.to_string(),
            xlsx_url: DEFAULT_XLSX_URL.to_string(),
            sheets_base_url: DEFAULT_SHEETS_URL.to_string(),
            api_port: 7891,
            week_start: "sunday".to_string(),
            report_dir: default_report_dir(),
            fetch_timeout_seconds: 0,
        }
    }
}

impl Config {
    pub fn root_dir() -> Result<PathBuf> {
        Ok(default_root_dir())
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(default_root_dir().join(CONFIG_FILE))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        let content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;
        set_mode_600(config_path)?;

        Ok(())
    }

    pub fn ensure_bootstrap_files(&self) -> Result<()> {
        let root = Self::root_dir()?;
        fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create root directory: {}", root.display()))?;

        fs::create_dir_all(&self.report_dir).with_context(|| {
            format!(
                "Failed to create report directory: {}",
                self.report_dir.display()
            )
        })?;

        Ok(())
    }

    pub fn parse_week_start(&self) -> Result<Weekday> {
        parse_weekday(&self.week_start)
    }

    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match normalize_config_key(key) {
            "data_url" => {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    bail!("data_url must not be empty");
                }
                self.data_url = trimmed.to_string();
            }
            "xlsx_url" => {
                self.xlsx_url = value.trim().to_string();
            }
            "sheets_base_url" => {
                url::Url::parse(value.trim())
                    .with_context(|| format!("sheets_base_url must be an absolute URL: {value}"))?;
                self.sheets_base_url = value.trim().to_string();
            }
            "api_port" => {
                self.api_port = value
                    .parse::<u16>()
                    .map_err(|_| anyhow!("api_port must be a number"))?;
            }
            "week_start" => {
                parse_weekday(value)?;
                self.week_start = value.trim().to_lowercase();
            }
            "report_dir" => {
                self.report_dir = expand_home(value);
            }
            "fetch_timeout_seconds" => {
                self.fetch_timeout_seconds = value
                    .parse::<u64>()
                    .map_err(|_| anyhow!("fetch_timeout_seconds must be a number (0 disables)"))?;
            }
            _ => {
                bail!(
                    "Unsupported config key: {key}. Supported keys: data_url|source.url, xlsx_url|export.xlsx_url, sheets_base_url|export.sheets_url, api_port|api.port, week_start|calendar.week_start, report_dir|report.dir, fetch_timeout_seconds|source.timeout_seconds"
                );
            }
        }

        Ok(())
    }

    pub fn get_value(&self, key: &str) -> Option<String> {
        match normalize_config_key(key) {
            "data_url" => Some(self.data_url.clone()),
            "xlsx_url" => Some(self.xlsx_url.clone()),
            "sheets_base_url" => Some(self.sheets_base_url.clone()),
            "api_port" => Some(self.api_port.to_string()),
            "week_start" => Some(self.week_start.clone()),
            "report_dir" => Some(self.report_dir.display().to_string()),
            "fetch_timeout_seconds" => Some(self.fetch_timeout_seconds.to_string()),
            _ => None,
        }
    }
}

fn normalize_config_key(key: &str) -> &str {
    match key {
        "data_url" | "source.url" => "data_url",
        "xlsx_url" | "export.xlsx_url" => "xlsx_url",
        "sheets_base_url" | "export.sheets_url" => "sheets_base_url",
        "api_port" | "api.port" => "api_port",
        "week_start" | "calendar.week_start" => "week_start",
        "report_dir" | "report.dir" => "report_dir",
        "fetch_timeout_seconds" | "source.timeout_seconds" => "fetch_timeout_seconds",
        _ => key,
    }
}

pub fn parse_weekday(value: &str) -> Result<Weekday> {
    value
        .trim()
        .parse::<Weekday>()
        .map_err(|_| anyhow!("Invalid week_start: {value}. Example: sunday, monday"))
}

pub fn expand_home(raw: &str) -> PathBuf {
    raw.strip_prefix("~/")
        .and_then(|stripped| home_dir().map(|home| home.join(stripped)))
        .unwrap_or_else(|| PathBuf::from(raw))
}

pub fn default_report_dir() -> PathBuf {
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("social-report")
}

fn default_root_dir() -> PathBuf {
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

fn set_mode_600(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))
            .with_context(|| format!("Failed to set file permissions: {}", path.display()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Config, parse_weekday};
    use chrono::Weekday;

    #[test]
    fn set_value_accepts_dotted_aliases() {
        let mut config = Config::default();

        config.set_value("calendar.week_start", "Monday").expect("week start");
        config.set_value("api.port", "8080").expect("port");
        config
            .set_value("source.url", "/tmp/latest.json")
            .expect("data url");

        assert_eq!(config.parse_week_start().expect("weekday"), Weekday::Mon);
        assert_eq!(config.get_value("api_port").as_deref(), Some("8080"));
        assert_eq!(config.get_value("source.url").as_deref(), Some("/tmp/latest.json"));
    }

    #[test]
    fn set_value_rejects_invalid_input() {
        let mut config = Config::default();

        assert!(config.set_value("week_start", "someday").is_err());
        assert!(config.set_value("api_port", "not-a-port").is_err());
        assert!(config.set_value("sheets_base_url", "relative/path").is_err());
        assert!(config.set_value("unknown.key", "x").is_err());
    }

    #[test]
    fn save_and_load_round_trip_through_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.json");
        let mut config = Config::default();
        config.fetch_timeout_seconds = 15;

        config.save_to(&path).expect("saved");
        let loaded = Config::load_from(&path).expect("loaded");

        assert_eq!(loaded, config);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"api_port": 9000}"#).expect("write");

        let loaded = Config::load_from(&path).expect("loaded");

        assert_eq!(loaded.api_port, 9000);
        assert_eq!(loaded.week_start, "sunday");
        assert_eq!(parse_weekday(&loaded.week_start).expect("weekday"), Weekday::Sun);
    }
}
