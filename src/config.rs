//! Server configuration document
//!
//! Mirrors the nested document the original service loaded from
//! `config.json`: connection settings for the broker and the database, and
//! the console/file sink settings, each with field-level defaults. Every
//! section derives `Serialize`/`Deserialize` so the whole tree round-trips
//! through the persisted snapshot unchanged.

use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RabbitmqConfig {
    #[serde(default = "RabbitmqConfig::default_host")]
    pub host: String,
    #[serde(default = "RabbitmqConfig::default_port")]
    pub port: u16,
    #[serde(default = "RabbitmqConfig::default_username")]
    pub username: String,
    #[serde(default = "RabbitmqConfig::default_password")]
    pub password: String,
    #[serde(default = "RabbitmqConfig::default_queue")]
    pub queue: String,
}

impl RabbitmqConfig {
    fn default_host() -> String {
        "localhost".to_string()
    }
    fn default_port() -> u16 {
        5672
    }
    fn default_username() -> String {
        "guest".to_string()
    }
    fn default_password() -> String {
        "guest".to_string()
    }
    fn default_queue() -> String {
        "logs".to_string()
    }
}

impl Default for RabbitmqConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            username: Self::default_username(),
            password: Self::default_password(),
            queue: Self::default_queue(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimescaleDbConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "TimescaleDbConfig::default_host")]
    pub host: String,
    #[serde(default = "TimescaleDbConfig::default_port")]
    pub port: u16,
    #[serde(default = "TimescaleDbConfig::default_username")]
    pub username: String,
    #[serde(default = "TimescaleDbConfig::default_password")]
    pub password: String,
    #[serde(default = "TimescaleDbConfig::default_database")]
    pub database: String,
    #[serde(default = "TimescaleDbConfig::default_reconnect_check_interval_secs")]
    pub reconnect_check_interval_secs: u64,
}

impl TimescaleDbConfig {
    fn default_host() -> String {
        "localhost".to_string()
    }
    fn default_port() -> u16 {
        5432
    }
    fn default_username() -> String {
        "logger".to_string()
    }
    fn default_password() -> String {
        "logger".to_string()
    }
    fn default_database() -> String {
        "logger".to_string()
    }
    /// How often the background task re-checks connectivity with `SELECT 1`
    /// and, on failure, rebuilds the pool. Defaults to 30 minutes.
    fn default_reconnect_check_interval_secs() -> u64 {
        30 * 60
    }
}

impl Default for TimescaleDbConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: Self::default_host(),
            port: Self::default_port(),
            username: Self::default_username(),
            password: Self::default_password(),
            database: Self::default_database(),
            reconnect_check_interval_secs: Self::default_reconnect_check_interval_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConsoleLevelStyles {
    #[serde(default = "ConsoleLevelStyles::default_info")]
    pub info: String,
    #[serde(default = "ConsoleLevelStyles::default_warning")]
    pub warning: String,
    #[serde(default = "ConsoleLevelStyles::default_error")]
    pub error: String,
    #[serde(default = "ConsoleLevelStyles::default_fatal")]
    pub fatal: String,
    #[serde(default = "ConsoleLevelStyles::default_debug")]
    pub debug: String,
    #[serde(default = "ConsoleLevelStyles::default_alert")]
    pub alert: String,
    #[serde(default = "ConsoleLevelStyles::default_unknown")]
    pub unknown: String,
}

impl ConsoleLevelStyles {
    fn default_info() -> String {
        "bold magenta".to_string()
    }
    fn default_warning() -> String {
        "bold yellow".to_string()
    }
    fn default_error() -> String {
        "bold red".to_string()
    }
    fn default_fatal() -> String {
        "bold white on red".to_string()
    }
    fn default_debug() -> String {
        "dim cyan".to_string()
    }
    fn default_alert() -> String {
        "bold magenta".to_string()
    }
    fn default_unknown() -> String {
        "bold white on red".to_string()
    }

    /// Looks up the configured style for a level name, falling back to the
    /// `unknown` style if the name doesn't match one of the seven levels.
    pub fn style_for(&self, level: crate::level::Level) -> &str {
        use crate::level::Level;
        match level {
            Level::Info => &self.info,
            Level::Warning => &self.warning,
            Level::Error => &self.error,
            Level::Fatal => &self.fatal,
            Level::Debug => &self.debug,
            Level::Alert => &self.alert,
            Level::Unknown => &self.unknown,
        }
    }
}

impl Default for ConsoleLevelStyles {
    fn default() -> Self {
        Self {
            info: Self::default_info(),
            warning: Self::default_warning(),
            error: Self::default_error(),
            fatal: Self::default_fatal(),
            debug: Self::default_debug(),
            alert: Self::default_alert(),
            unknown: Self::default_unknown(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConsoleConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "ConsoleConfig::default_format")]
    pub format: String,
    #[serde(default = "ConsoleConfig::default_project_style")]
    pub project_style: String,
    #[serde(default = "ConsoleConfig::default_timestamp_style")]
    pub timestamp_style: String,
    #[serde(default)]
    pub level_styles: ConsoleLevelStyles,
    #[serde(default = "ConsoleConfig::default_module_style")]
    pub module_style: String,
    #[serde(default = "ConsoleConfig::default_function_style")]
    pub function_style: String,
    #[serde(default)]
    pub message_style: String,
    #[serde(default = "ConsoleConfig::default_code_style")]
    pub code_style: String,
    #[serde(default = "ConsoleConfig::default_time_format")]
    pub time_format: String,
    #[serde(default = "ConsoleConfig::default_time_zone")]
    pub time_zone: String,
}

impl ConsoleConfig {
    fn default_format() -> String {
        "[{project}] [{timestamp}] [{level}] {module}.{function}: {message} [{code}]".to_string()
    }
    fn default_project_style() -> String {
        "bold cyan".to_string()
    }
    fn default_timestamp_style() -> String {
        "dim cyan".to_string()
    }
    fn default_module_style() -> String {
        "green".to_string()
    }
    fn default_function_style() -> String {
        "magenta".to_string()
    }
    fn default_code_style() -> String {
        "dim".to_string()
    }
    fn default_time_format() -> String {
        "%Y-%m-%d %H:%M:%S".to_string()
    }
    fn default_time_zone() -> String {
        "UTC".to_string()
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            format: Self::default_format(),
            project_style: Self::default_project_style(),
            timestamp_style: Self::default_timestamp_style(),
            level_styles: ConsoleLevelStyles::default(),
            module_style: Self::default_module_style(),
            function_style: Self::default_function_style(),
            message_style: String::new(),
            code_style: Self::default_code_style(),
            time_format: Self::default_time_format(),
            time_zone: Self::default_time_zone(),
        }
    }
}

/// Rotation trigger kind. `daily` rotates at a fixed wall-clock time,
/// `time` rotates once a file is older than a duration, `size` and `lines`
/// rotate on byte-count/line-count thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationTrigger {
    Time,
    Size,
    Daily,
    Lines,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RotationConfig {
    #[serde(default = "RotationConfig::default_trigger")]
    pub trigger: RotationTrigger,
    #[serde(default = "RotationConfig::default_time")]
    pub time: u64,
    #[serde(default = "RotationConfig::default_daily")]
    pub daily: String,
    #[serde(default = "RotationConfig::default_size")]
    pub size: u64,
    #[serde(default = "RotationConfig::default_lines")]
    pub lines: u64,
}

impl RotationConfig {
    fn default_trigger() -> RotationTrigger {
        RotationTrigger::Daily
    }
    fn default_time() -> u64 {
        24_400
    }
    fn default_daily() -> String {
        "00:00".to_string()
    }
    fn default_size() -> u64 {
        10 * 1024 * 1024
    }
    fn default_lines() -> u64 {
        10_000
    }
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            trigger: Self::default_trigger(),
            time: Self::default_time(),
            daily: Self::default_daily(),
            size: Self::default_size(),
            lines: Self::default_lines(),
        }
    }
}

/// Archive container format. Maps 1:1 onto the compression module each
/// variant is realized with: `zip` and `gz` reuse the `flate2`/`zip` deflate
/// path, `bz2` uses `bzip2`, `xz` uses `xz2`, and `tar` stores uncompressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveFormat {
    Zip,
    Tar,
    Gz,
    Bz2,
    Xz,
}

/// What triggers an archival sweep: `count` keeps only the N newest rotated
/// files per project, `age` archives anything older than a duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveTrigger {
    Age,
    Count,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArchiveConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "ArchiveConfig::default_type")]
    #[serde(rename = "type")]
    pub format: ArchiveFormat,
    #[serde(default = "ArchiveConfig::default_compression_level")]
    pub compression_level: u8,
    #[serde(default = "ArchiveConfig::default_directory")]
    pub directory: String,
    #[serde(default = "ArchiveConfig::default_trigger")]
    pub trigger: ArchiveTrigger,
    #[serde(default = "ArchiveConfig::default_count")]
    pub count: u64,
    #[serde(default = "ArchiveConfig::default_age")]
    pub age: u64,
}

impl ArchiveConfig {
    fn default_type() -> ArchiveFormat {
        ArchiveFormat::Zip
    }
    fn default_compression_level() -> u8 {
        6
    }
    fn default_directory() -> String {
        "archive".to_string()
    }
    fn default_trigger() -> ArchiveTrigger {
        ArchiveTrigger::Count
    }
    fn default_count() -> u64 {
        10
    }
    fn default_age() -> u64 {
        10 * 24_400
    }
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            format: Self::default_type(),
            compression_level: Self::default_compression_level(),
            directory: Self::default_directory(),
            trigger: Self::default_trigger(),
            count: Self::default_count(),
            age: Self::default_age(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilesConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "FilesConfig::default_shared_directory")]
    pub shared_directory: String,
    #[serde(default = "FilesConfig::default_project_directory")]
    pub project_directory: String,
    #[serde(default = "FilesConfig::default_filename")]
    pub filename: String,
    #[serde(default = "FilesConfig::default_date_file_format")]
    pub date_file_format: String,
    #[serde(default = "FilesConfig::default_date_log_format")]
    pub date_log_format: String,
    #[serde(default = "FilesConfig::default_date_timezone")]
    pub date_timezone: String,
    #[serde(default = "FilesConfig::default_log_format")]
    pub log_format: String,
    #[serde(default)]
    pub rotation: RotationConfig,
    #[serde(default)]
    pub archive: ArchiveConfig,
}

impl FilesConfig {
    fn default_shared_directory() -> String {
        "logs".to_string()
    }
    fn default_project_directory() -> String {
        "{project}".to_string()
    }
    fn default_filename() -> String {
        "log_{project}_{date}.log".to_string()
    }
    fn default_date_file_format() -> String {
        "%Y-%m-%d_%H-%M-%S".to_string()
    }
    fn default_date_log_format() -> String {
        "%Y-%m-%d %H:%M:%S".to_string()
    }
    fn default_date_timezone() -> String {
        "UTC".to_string()
    }
    fn default_log_format() -> String {
        "[{project}] [{timestamp}] [{level}] {module}.{function}: {message} [{code}]".to_string()
    }
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            shared_directory: Self::default_shared_directory(),
            project_directory: Self::default_project_directory(),
            filename: Self::default_filename(),
            date_file_format: Self::default_date_file_format(),
            date_log_format: Self::default_date_log_format(),
            date_timezone: Self::default_date_timezone(),
            log_format: Self::default_log_format(),
            rotation: RotationConfig::default(),
            archive: ArchiveConfig::default(),
        }
    }
}

/// Admin-facing HTTP surface: binds a small `/healthz` + config-read stub.
/// The real administration API (project CRUD, config editing UI) lives
/// outside this service; this section only configures what little this
/// process itself exposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "ApiConfig::default_host")]
    pub host: String,
    #[serde(default = "ApiConfig::default_port")]
    pub port: u16,
}

impl ApiConfig {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }
    fn default_port() -> u16 {
        8000
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: Self::default_host(),
            port: Self::default_port(),
        }
    }
}

/// The complete live configuration document, persisted as `config.json` and
/// swapped atomically by [`crate::config_manager::ConfigManager`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default)]
    pub rabbitmq: RabbitmqConfig,
    #[serde(default)]
    pub timescaledb: TimescaleDbConfig,
    #[serde(default)]
    pub console: ConsoleConfig,
    #[serde(default)]
    pub files: FilesConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_original_schema() {
        let config = ServerConfig::default();
        assert_eq!(config.rabbitmq.port, 5672);
        assert_eq!(config.timescaledb.port, 5432);
        assert_eq!(config.files.rotation.trigger, RotationTrigger::Daily);
        assert_eq!(config.files.archive.trigger, ArchiveTrigger::Count);
        assert!(!config.files.archive.enabled);
    }

    #[test]
    fn round_trips_through_json() {
        let config = ServerConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: ServerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.rabbitmq.host, config.rabbitmq.host);
    }

    #[test]
    fn unknown_top_level_key_is_rejected() {
        let mut value: serde_json::Value =
            serde_json::to_value(ServerConfig::default()).unwrap();
        value
            .as_object_mut()
            .unwrap()
            .insert("bogus".to_string(), serde_json::json!(true));
        let result: Result<ServerConfig, _> = serde_json::from_value(value);
        assert!(result.is_err());
    }

    #[test]
    fn partial_document_fills_in_defaults() {
        let parsed: ServerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.console.code_style, "dim");
    }

    #[test]
    fn timescaledb_reconnect_interval_defaults_to_thirty_minutes() {
        let config = TimescaleDbConfig::default();
        assert_eq!(config.reconnect_check_interval_secs, 1800);
    }

    #[test]
    fn identical_configs_compare_equal() {
        assert_eq!(ServerConfig::default(), ServerConfig::default());
    }

    #[test]
    fn configs_differing_in_one_field_compare_unequal() {
        let mut other = ServerConfig::default();
        other.files.enabled = !other.files.enabled;
        assert_ne!(ServerConfig::default(), other);
    }

    #[test]
    fn level_styles_fall_back_for_each_level() {
        use crate::level::Level;
        let styles = ConsoleLevelStyles::default();
        assert_eq!(styles.style_for(Level::Fatal), "bold white on red");
        assert_eq!(styles.style_for(Level::Debug), "dim cyan");
    }
}
