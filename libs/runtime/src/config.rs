use anyhow::{bail, Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Well-known environment variables read on every load.
pub const ENV_REGION: &str = "AWS_REGION";
pub const ENV_STORE_ENDPOINT: &str = "DYNAMODB_ENDPOINT";
pub const ENV_TABLE_NAME: &str = "TABLE_NAME";
pub const ENV_PORT: &str = "PORT";

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_STORE_ENDPOINT: &str = "http://localhost:8000";
pub const DEFAULT_TABLE_NAME: &str = "Customers";
pub const DEFAULT_PORT: &str = "8080";

/// Main application configuration.
///
/// Built once at startup and handed to the components that need it;
/// nothing reads configuration from ambient global state.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// HTTP listener configuration.
    pub server: ServerConfig,
    /// Backing store connection and table settings.
    pub store: StoreConfig,
    /// Logging configuration (optional, uses defaults if None).
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    /// Kept as a string: any value is accepted here and a bad port
    /// surfaces when the listener binds.
    #[serde(deserialize_with = "string_or_number")]
    pub port: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Region name passed to the store client.
    pub region: String,
    /// Store endpoint URL (e.g. a local DynamoDB on "http://localhost:8000").
    pub endpoint: String,
    /// Table holding the customer items.
    pub table_name: String,
}

/// Logging configuration - maps subsystem names to their logging settings.
/// Key "default" is the catch-all for logs that don't match explicit subsystems.
pub type LoggingConfig = HashMap<String, Section>;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Section {
    pub console_level: String, // "info", "debug", "error", "off"
    #[serde(default)]
    pub file: String, // "logs/customer-api.log", empty = console only
    #[serde(default)]
    pub file_level: String,
    #[serde(default)]
    pub max_backups: Option<usize>, // How many rotated files to keep
    #[serde(default)]
    pub max_size_mb: Option<u64>, // Max size of the file in MB
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT.to_string(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            endpoint: DEFAULT_STORE_ENDPOINT.to_string(),
            table_name: DEFAULT_TABLE_NAME.to_string(),
        }
    }
}

/// Create a default logging configuration.
pub fn default_logging_config() -> LoggingConfig {
    let mut logging = HashMap::new();
    logging.insert(
        "default".to_string(),
        Section {
            console_level: "info".to_string(),
            file: String::new(),
            file_level: "debug".to_string(),
            max_backups: Some(3),
            max_size_mb: Some(100),
        },
    );
    logging
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            store: StoreConfig::default(),
            logging: Some(default_logging_config()),
        }
    }
}

impl AppConfig {
    /// Load configuration with layered loading:
    /// defaults → YAML file (if given) → `APP__` env vars → well-known env vars.
    ///
    /// Each call reads the environment afresh.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(config_path, |key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::load`], with the well-known variables resolved through `lookup`.
    pub fn load_with_env<F>(config_path: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        use figment::{
            providers::{Env, Format, Serialized, Yaml},
            Figment,
        };

        // Start from a base where logging is None, so it remains None
        // unless explicitly provided by YAML/ENV.
        let base = AppConfig {
            logging: None,
            ..AppConfig::default()
        };

        let mut figment = Figment::new().merge(Serialized::defaults(base));
        if let Some(path) = config_path {
            if !path.is_file() {
                bail!("config file not found: {}", path.display());
            }
            figment = figment.merge(Yaml::file(path));
        }
        // Example: APP__SERVER__HOST=127.0.0.1 maps to server.host
        let figment = figment.merge(Env::prefixed("APP__").split("__"));

        let mut config: AppConfig = figment
            .extract()
            .with_context(|| "Failed to extract config from figment".to_string())?;

        config.apply_env_overrides(lookup);
        config.fill_empty_with_defaults();
        Ok(config)
    }

    /// Serialize configuration to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize config to YAML")
    }

    /// Apply overrides from command line arguments.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(port) = args.port {
            self.server.port = port.to_string();
        }

        // Set logging level based on verbose flags for "default" section.
        let logging = self.logging.get_or_insert_with(default_logging_config);
        if let Some(default_section) = logging.get_mut("default") {
            default_section.console_level = match args.verbose {
                0 => default_section.console_level.clone(), // keep
                1 => "debug".to_string(),
                _ => "trace".to_string(),
            };
        }
    }

    /// The `host:port` pair the HTTP listener binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let targets: [(&str, &mut String); 4] = [
            (ENV_REGION, &mut self.store.region),
            (ENV_STORE_ENDPOINT, &mut self.store.endpoint),
            (ENV_TABLE_NAME, &mut self.store.table_name),
            (ENV_PORT, &mut self.server.port),
        ];
        for (key, slot) in targets {
            if let Some(value) = lookup(key).filter(|v| !v.is_empty()) {
                *slot = value;
            }
        }
    }

    /// An empty value anywhere in the layering means "use the default".
    fn fill_empty_with_defaults(&mut self) {
        let targets: [(&mut String, &str); 4] = [
            (&mut self.store.region, DEFAULT_REGION),
            (&mut self.store.endpoint, DEFAULT_STORE_ENDPOINT),
            (&mut self.store.table_name, DEFAULT_TABLE_NAME),
            (&mut self.server.port, DEFAULT_PORT),
        ];
        for (slot, default) in targets {
            if slot.is_empty() {
                *slot = default.to_string();
            }
        }
    }
}

/// Command line arguments structure.
#[derive(Debug, Clone)]
pub struct CliArgs {
    pub port: Option<u16>,
    pub print_config: bool,
    pub verbose: u8,
    pub mock: bool,
}

/// YAML and env layers may hand the port over as a number.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Unsigned(u64),
        Signed(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s,
        Raw::Unsigned(n) => n.to_string(),
        Raw::Signed(n) => n.to_string(),
    })
}
