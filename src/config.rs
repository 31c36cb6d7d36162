use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use std::fmt;

use crate::puzzles::sampler::DEFAULT_BATCH_SIZE;

#[derive(Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
    pub sled_path: String,
    pub admin_token: String,
    pub cors_origin: String,
    pub worker: WorkerConfig,
    pub puzzles: PuzzleConfig,
}

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub is_leader: bool,
    pub weekly_puzzles_cron: String,
    pub retire_previous_week: bool,
}

#[derive(Debug, Clone)]
pub struct PuzzleConfig {
    pub batch_size: usize,
    pub leaderboard_limit: usize,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("log_level", &self.log_level)
            .field("enable_file_logs", &self.enable_file_logs)
            .field("log_dir", &self.log_dir)
            .field("sled_path", &self.sled_path)
            .field("admin_token", &"***REDACTED***")
            .field("cors_origin", &self.cors_origin)
            .field("worker", &self.worker)
            .field("puzzles", &self.puzzles)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: env_or_parse("HOST", IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))),
            port: env_or_parse("PORT", 3000_u16),
            log_level: env_or("RUST_LOG", "info"),
            enable_file_logs: env_or_bool("ENABLE_FILE_LOGS", false),
            log_dir: env_or("LOG_DIR", "./logs"),
            sled_path: env_or("SLED_PATH", "./data/rws.sled"),
            admin_token: env_or("ADMIN_TOKEN", "change_me_admin_token"),
            cors_origin: env_or("CORS_ORIGIN", "http://localhost:5173"),
            worker: WorkerConfig {
                is_leader: env_or_bool("WORKER_LEADER", true),
                weekly_puzzles_cron: env_or("WEEKLY_PUZZLES_CRON", "0 0 0 * * Mon"),
                retire_previous_week: env_or_bool("RETIRE_PREVIOUS_WEEK", false),
            },
            puzzles: PuzzleConfig {
                batch_size: env_or_parse("PUZZLE_BATCH_SIZE", DEFAULT_BATCH_SIZE).max(1),
                leaderboard_limit: env_or_parse("LEADERBOARD_LIMIT", 50_usize).max(1),
            },
        }
    }
}

pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_or_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match env::var(key) {
        Ok(raw) => match raw.parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(
                    key,
                    value = %raw,
                    "Failed to parse env var, using default"
                );
                default
            }
        },
        Err(_) => default,
    }
}

pub fn env_or_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}
