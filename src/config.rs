// src/config.rs

use std::env;
use std::time::Duration;
use dotenvy::dotenv;

/// Seconds in one minute of quiz duration.
pub const SECONDS_PER_MINUTE: u32 = 60;

/// Period of the attempt countdown.
pub const SESSION_TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub bind_addr: String,
    pub log_dir: String,
    /// Seed sample users, quizzes and a submission at start-up.
    pub seed_fixtures: bool,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set");

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3600);

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let log_dir = env::var("LOG_DIR")
            .unwrap_or_else(|_| "logs".to_string());

        let seed_fixtures = env::var("SEED_FIXTURES")
            .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no"))
            .unwrap_or(true);

        Self {
            jwt_secret,
            jwt_expiration,
            rust_log,
            bind_addr,
            log_dir,
            seed_fixtures,
        }
    }
}
