//! Global application configuration manager.
//!
//! `AppConfig` is a lazily initialized, globally accessible singleton containing
//! runtime configuration values loaded from environment variables. It provides
//! thread-safe access and mutation for testing or overrides in runtime environments.
//!
//! Most callers use the free accessor functions at the bottom of this module
//! (`config::min_interval_seconds()`, `config::database_path()`, ...).

use std::env;
use std::str::FromStr;
use std::sync::{OnceLock, PoisonError, RwLock, RwLockReadGuard};

/// Represents the complete application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub project_name: String,
    pub log_level: String,
    pub log_file: String,
    pub log_to_stdout: bool,
    pub database_path: String,
    pub host: String,
    pub port: u16,
    /// Minimum number of seconds between two maintenance passes.
    pub min_interval_seconds: u64,
    /// How long an expired second-phase key is retained before it may be purged.
    pub key_retention_grace_minutes: i64,
    /// Fixed offset applied to the local `session_date` + `start_time` columns.
    pub session_utc_offset_minutes: i32,
    /// Whether sessions in `inactive` auto-activate when their start arrives.
    pub session_resume_inactive: bool,
    pub maintenance_batch_size: u64,
    pub maintenance_max_pass_ms: u64,
    /// Period of the background maintenance loop. `0` disables the loop.
    pub maintenance_loop_seconds: u64,
    pub second_phase_key_ttl_seconds: i64,
}

/// Lazily-initialized, thread-safe singleton instance of `AppConfig`.
static CONFIG_INSTANCE: OnceLock<RwLock<AppConfig>> = OnceLock::new();

/// Reads `key` and parses it, falling back to `default` when the variable is
/// missing or malformed.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(key, value = %raw, "Ignoring malformed config value; using default");
                default
            }
        },
        Err(_) => default,
    }
}

fn env_string(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.into())
}

impl AppConfig {
    /// Loads the configuration from `.env` and environment variables.
    ///
    /// Every key has a default, so this never panics.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            env: env_string("APP_ENV", "development"),
            project_name: env_string("PROJECT_NAME", "attendance-engine"),
            log_level: env_string("LOG_LEVEL", "api=info,services=info"),
            log_file: env_string("LOG_FILE", "api.log"),
            log_to_stdout: env_or("LOG_TO_STDOUT", false),
            database_path: env_string("DATABASE_PATH", "data/attendance.db"),
            host: env_string("HOST", "127.0.0.1"),
            port: env_or("PORT", 3000),
            min_interval_seconds: env_or("MAINTENANCE_MIN_INTERVAL_SECONDS", 120),
            key_retention_grace_minutes: env_or("KEY_RETENTION_GRACE_MINUTES", 60),
            session_utc_offset_minutes: env_or("SESSION_UTC_OFFSET_MINUTES", 180),
            session_resume_inactive: env_or("SESSION_RESUME_INACTIVE", true),
            maintenance_batch_size: env_or("MAINTENANCE_BATCH_SIZE", 500),
            maintenance_max_pass_ms: env_or("MAINTENANCE_MAX_PASS_MS", 2000),
            maintenance_loop_seconds: env_or("MAINTENANCE_LOOP_SECONDS", 60),
            second_phase_key_ttl_seconds: env_or("SECOND_PHASE_KEY_TTL_SECONDS", 30),
        }
    }

    /// Returns a shared reference to the global configuration.
    pub fn global() -> RwLockReadGuard<'static, AppConfig> {
        CONFIG_INSTANCE
            .get_or_init(|| RwLock::new(AppConfig::from_env()))
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Resets the configuration by reloading from environment variables.
    ///
    /// Useful in tests to clear overrides.
    pub fn reset() {
        if let Some(lock) = CONFIG_INSTANCE.get() {
            let mut guard = lock.write().unwrap_or_else(PoisonError::into_inner);
            *guard = AppConfig::from_env();
        }
    }

    /// Generic internal setter for any field in the config.
    fn set_field<F>(setter: F)
    where
        F: FnOnce(&mut AppConfig),
    {
        let lock = CONFIG_INSTANCE.get_or_init(|| RwLock::new(AppConfig::from_env()));
        let mut guard = lock.write().unwrap_or_else(PoisonError::into_inner);
        setter(&mut guard);
    }

    // --- Per-field setters below ---

    pub fn set_env(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.env = value.into());
    }

    pub fn set_min_interval_seconds(value: u64) {
        AppConfig::set_field(|cfg| cfg.min_interval_seconds = value);
    }

    pub fn set_session_utc_offset_minutes(value: i32) {
        AppConfig::set_field(|cfg| cfg.session_utc_offset_minutes = value);
    }

    pub fn set_session_resume_inactive(value: bool) {
        AppConfig::set_field(|cfg| cfg.session_resume_inactive = value);
    }

    pub fn set_key_retention_grace_minutes(value: i64) {
        AppConfig::set_field(|cfg| cfg.key_retention_grace_minutes = value);
    }

    pub fn set_second_phase_key_ttl_seconds(value: i64) {
        AppConfig::set_field(|cfg| cfg.second_phase_key_ttl_seconds = value);
    }
}

// --- Free accessors ---

pub fn env() -> String {
    AppConfig::global().env.clone()
}

pub fn project_name() -> String {
    AppConfig::global().project_name.clone()
}

pub fn log_level() -> String {
    AppConfig::global().log_level.clone()
}

pub fn log_file() -> String {
    AppConfig::global().log_file.clone()
}

pub fn log_to_stdout() -> bool {
    AppConfig::global().log_to_stdout
}

pub fn database_path() -> String {
    AppConfig::global().database_path.clone()
}

pub fn host() -> String {
    AppConfig::global().host.clone()
}

pub fn port() -> u16 {
    AppConfig::global().port
}

pub fn min_interval_seconds() -> u64 {
    AppConfig::global().min_interval_seconds
}

pub fn key_retention_grace_minutes() -> i64 {
    AppConfig::global().key_retention_grace_minutes
}

pub fn session_utc_offset_minutes() -> i32 {
    AppConfig::global().session_utc_offset_minutes
}

pub fn session_resume_inactive() -> bool {
    AppConfig::global().session_resume_inactive
}

pub fn maintenance_batch_size() -> u64 {
    AppConfig::global().maintenance_batch_size
}

pub fn maintenance_max_pass_ms() -> u64 {
    AppConfig::global().maintenance_max_pass_ms
}

pub fn maintenance_loop_seconds() -> u64 {
    AppConfig::global().maintenance_loop_seconds
}

pub fn second_phase_key_ttl_seconds() -> i64 {
    AppConfig::global().second_phase_key_ttl_seconds
}
