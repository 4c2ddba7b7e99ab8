use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::{error, info};
use validator::{Validate, ValidationError, ValidationErrors};

// Built-in fallbacks, lowest configuration layer.
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const CONFIG_DIR: &str = "config";

/// Sentinel content written over rows that cannot be removed.
///
/// `{id}` in a name template is replaced with the row id, which keeps
/// blanked names distinct under the unique-name rules.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields, default)]
pub struct BlankTemplates {
    /// Free-text fields (city, street, ...)
    #[validate(length(min = 1))]
    pub placeholder_text: String,

    /// Country/state abbreviations
    #[validate(length(min = 1))]
    pub placeholder_code: String,

    pub employee_first_name: String,
    pub employee_last_name: String,
    pub dish_name: String,
    pub supplier_name: String,
    pub supply_category_name: String,

    #[validate(range(min = 1))]
    pub default_menu_id: i32,

    #[validate(range(min = 1))]
    pub default_schedule_id: i32,

    #[validate(range(min = 1))]
    pub default_position_id: i32,
}

impl Default for BlankTemplates {
    fn default() -> Self {
        Self {
            placeholder_text: "None".to_string(),
            placeholder_code: "XX".to_string(),
            employee_first_name: "Unknown".to_string(),
            employee_last_name: "Employee".to_string(),
            dish_name: "Unknown Dish {id}".to_string(),
            supplier_name: "Missing Supplier {id}".to_string(),
            supply_category_name: "Empty Category {id}".to_string(),
            default_menu_id: 1,
            default_schedule_id: 1,
            default_position_id: 2,
        }
    }
}

impl BlankTemplates {
    /// Fills in `{id}`.
    pub fn render(template: &str, id: i32) -> String {
        template.replace("{id}", &id.to_string())
    }
}

/// Names loaded into the read-only lookup tables at startup, in id order.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields, default)]
pub struct SeedConfig {
    #[validate(length(min = 1))]
    pub menus: Vec<String>,

    #[validate(length(min = 1))]
    pub schedules: Vec<String>,

    #[validate(length(min = 1))]
    pub positions: Vec<String>,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            menus: vec!["Standard".into(), "Brunch".into(), "Late Night".into()],
            schedules: vec!["Daytime".into(), "Extended".into(), "Around The Clock".into()],
            positions: vec![
                "Manager".into(),
                "Crew".into(),
                "Cook".into(),
                "Cashier".into(),
            ],
        }
    }
}

/// Service settings, assembled by [`load_config`].
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Interface to bind
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Profile name (`development`, `production`, ...)
    pub environment: String,

    /// Default level for this crate's log targets
    #[serde(default = "default_log_level")]
    #[validate(custom = "validate_log_level")]
    pub log_level: String,

    /// Emit one JSON object per log line
    #[serde(default)]
    pub log_json: bool,

    /// Page size applied to list requests that do not name `pgsz`
    #[serde(default)]
    #[validate(range(min = 1))]
    pub list_default_page_size: Option<u64>,

    /// Lookup table contents
    #[serde(default)]
    #[validate]
    pub seed: SeedConfig,

    /// Blanking templates
    #[serde(default)]
    #[validate]
    pub blanks: BlankTemplates,
}

impl AppConfig {
    /// Built-in defaults for everything but the listener and profile
    pub fn new(host: String, port: u16, environment: String) -> Self {
        Self {
            host,
            port,
            environment,
            log_level: default_log_level(),
            log_json: false,
            list_default_page_size: None,
            seed: SeedConfig::default(),
            blanks: BlankTemplates::default(),
        }
    }

    /// Returns true if running in production
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    /// Socket address string to bind
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Blank defaults must point at seeded lookup rows, or a blanked row
    /// would hold a dangling key.
    pub fn validate_additional_constraints(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let checks = [
            ("default_menu_id", self.blanks.default_menu_id, self.seed.menus.len()),
            (
                "default_schedule_id",
                self.blanks.default_schedule_id,
                self.seed.schedules.len(),
            ),
            (
                "default_position_id",
                self.blanks.default_position_id,
                self.seed.positions.len(),
            ),
        ];
        for (field, id, seeded) in checks {
            let in_range = usize::try_from(id).map_or(false, |id| id >= 1 && id <= seeded);
            if !in_range {
                let mut err = ValidationError::new("seeded_lookup");
                err.message = Some(
                    format!("{} = {} is not one of the {} seeded rows", field, id, seeded).into(),
                );
                errors.add(field, err);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Error type for configuration operations
#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] ConfigError),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if valid_levels.contains(&level.to_lowercase().as_str()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("log_level");
        err.message = Some("Must be one of: trace, debug, info, warn, error".into());
        Err(err)
    }
}

/// Installs the global subscriber. `RUST_LOG`, when set, replaces the
/// `foodchain_api=<level>` default filter entirely.
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_directive = format!("foodchain_api={},tower_http=debug", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    if json {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .json()
            .try_init();
    } else {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .try_init();
    }
}

/// Reads `./config`, layering sources from lowest to highest priority:
/// 1. Built-in defaults
/// 2. Default config (config/default.toml)
/// 3. Environment-specific config (config/{env}.toml)
/// 4. Environment variables (APP__*)
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    load_config_from(Path::new(CONFIG_DIR))
}

/// Same as [`load_config`] with an explicit config directory.
pub fn load_config_from(config_dir: &Path) -> Result<AppConfig, AppConfigError> {
    // RUN_ENV wins over APP_ENV
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !config_dir.exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            config_dir.display()
        );
    }

    let config = Config::builder()
        .set_default("host", DEFAULT_HOST)?
        .set_default("port", i64::from(DEFAULT_PORT))?
        .set_default("environment", DEFAULT_ENV)?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .add_source(File::from(config_dir.join("default")).required(false))
        .add_source(File::from(config_dir.join(&run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;

    app_config.validate().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    app_config.validate_additional_constraints().map_err(|e| {
        error!("Configuration lookup validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    info!("Configuration loaded successfully");
    Ok(app_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn base_config() -> AppConfig {
        AppConfig::new("127.0.0.1".into(), 8080, "test".into())
    }

    #[test]
    fn defaults_are_consistent() {
        let cfg = base_config();
        assert!(cfg.validate().is_ok());
        assert!(cfg.validate_additional_constraints().is_ok());
        assert_eq!(cfg.bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn blank_defaults_must_hit_seeded_rows() {
        let mut cfg = base_config();
        cfg.blanks.default_position_id = 9;
        let errors = cfg.validate_additional_constraints().unwrap_err();
        assert!(errors.field_errors().contains_key("default_position_id"));
    }

    #[test]
    fn bad_log_level_fails_validation() {
        let mut cfg = base_config();
        cfg.log_level = "loud".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn render_substitutes_id() {
        assert_eq!(BlankTemplates::render("Unknown Dish {id}", 4), "Unknown Dish 4");
        assert_eq!(BlankTemplates::render("Unknown", 4), "Unknown");
    }

    #[test]
    fn loads_file_layer_over_builtin_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("default.toml"),
            r#"
                port = 9090
                log_level = "debug"

                [blanks]
                dish_name = "Retired Dish {id}"

                [seed]
                menus = ["Only"]
            "#,
        )
        .unwrap();

        let cfg = load_config_from(dir.path()).unwrap();
        assert_eq!(cfg.port, 9090);
        assert_eq!(cfg.log_level, "debug");
        assert_eq!(cfg.blanks.dish_name, "Retired Dish {id}");
        assert_eq!(cfg.blanks.placeholder_text, "None");
        assert_eq!(cfg.seed.menus, vec!["Only".to_string()]);
    }

    #[test]
    fn missing_directory_uses_builtin_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = load_config_from(&dir.path().join("absent")).unwrap();
        assert_eq!(cfg.host, DEFAULT_HOST);
        assert_eq!(cfg.blanks.default_position_id, 2);
    }
}
