use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{errors::Error, Result};

/// Typed runtime configuration.
///
/// Everything comes from the environment (optionally seeded by a `.env` file),
/// matching the container contract: no CLI flags, a single entry point.
#[derive(Clone, Debug)]
pub struct Config {
    // Core credentials
    pub telegram_token: String,
    pub gemini_api_key: String,

    // Model
    pub gemini_model: String,
    pub temperature: f32,
    pub request_timeout: Duration,

    // Prompt stack
    pub system_prompt_file: PathBuf,
    pub private_prompt_files: Vec<PathBuf>,

    // Access control (empty = open to everyone)
    pub allowed_users: Vec<i64>,

    // Rate limiting
    pub rate_limit_enabled: bool,
    pub rate_limit_requests: u32,
    pub rate_limit_window: Duration,

    // Telegram limits
    pub telegram_safe_limit: usize,

    // Polling
    pub poll_timeout: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let telegram_token = env_str("TELEGRAM_TOKEN").unwrap_or_default();
        if telegram_token.trim().is_empty() {
            return Err(Error::Config(
                "TELEGRAM_TOKEN environment variable is required".to_string(),
            ));
        }

        let gemini_api_key = env_str("GEMINI_API_KEY").unwrap_or_default();
        if gemini_api_key.trim().is_empty() {
            return Err(Error::Config(
                "GEMINI_API_KEY environment variable is required".to_string(),
            ));
        }

        let gemini_model = env_str("GEMINI_MODEL")
            .and_then(non_empty)
            .unwrap_or_else(|| "gemini-1.5-flash".to_string());
        let temperature = env_f32("GEMINI_TEMPERATURE").unwrap_or(0.6).clamp(0.0, 2.0);
        let request_timeout = Duration::from_secs(env_u64("GEMINI_TIMEOUT_SECS").unwrap_or(30));

        let system_prompt_file = env_path("SYSTEM_PROMPT_FILE")
            .unwrap_or_else(|| PathBuf::from("system_instructions.txt"));
        let private_prompt_files = parse_csv_paths(env_str("PRIVATE_PROMPT_FILES"));

        let allowed_users = parse_csv_i64(env_str("TELEGRAM_ALLOWED_USERS"));

        let rate_limit_enabled = env_bool("RATE_LIMIT_ENABLED").unwrap_or(true);
        let rate_limit_requests = env_u32("RATE_LIMIT_REQUESTS").unwrap_or(20);
        let rate_limit_window = Duration::from_secs(env_u64("RATE_LIMIT_WINDOW").unwrap_or(60));

        // Telegram hard cap is 4096; leave headroom for HTML entities.
        let telegram_safe_limit = env_usize("TELEGRAM_SAFE_LIMIT").unwrap_or(4000);

        let poll_timeout = Duration::from_secs(env_u64("POLL_TIMEOUT_SECS").unwrap_or(30));

        Ok(Self {
            telegram_token,
            gemini_api_key,
            gemini_model,
            temperature,
            request_timeout,
            system_prompt_file,
            private_prompt_files,
            allowed_users,
            rate_limit_enabled,
            rate_limit_requests,
            rate_limit_window,
            telegram_safe_limit,
            poll_timeout,
        })
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // real environment wins
        }

        let mut val = v.trim().to_string();
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn env_bool(key: &str) -> Option<bool> {
    env_str(key).map(|s| {
        matches!(
            s.trim().to_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn env_u32(key: &str) -> Option<u32> {
    env_str(key).and_then(|s| s.trim().parse::<u32>().ok())
}

fn env_usize(key: &str) -> Option<usize> {
    env_str(key).and_then(|s| s.trim().parse::<usize>().ok())
}

fn env_f32(key: &str) -> Option<f32> {
    env_str(key).and_then(|s| s.trim().parse::<f32>().ok())
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var_os(key).map(PathBuf::from)
}

fn parse_csv_i64(v: Option<String>) -> Vec<i64> {
    v.unwrap_or_default()
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<i64>().ok())
        .collect()
}

fn parse_csv_paths(v: Option<String>) -> Vec<PathBuf> {
    v.unwrap_or_default()
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect()
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
