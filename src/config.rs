//! Server configuration from environment variables

use crate::broadcast::HubConfig;
use crate::error::ConfigError;
use crate::types::GameConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    /// JSON array of prompts
    pub questions_path: PathBuf,
    /// Frontend assets served for every non-API path
    pub static_dir: PathBuf,
    /// Snapshots buffered per room before dropping
    pub room_queue: usize,
    /// Messages buffered per connection
    pub player_queue: usize,
    pub send_timeout: Duration,
    /// How long an empty room lives before the reaper removes it
    pub room_idle_timeout: Duration,
    pub reaper_interval: Duration,
    pub game: GameConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            questions_path: PathBuf::from("questions.json"),
            static_dir: PathBuf::from("static"),
            room_queue: 100,
            player_queue: 32,
            send_timeout: Duration::from_millis(1000),
            room_idle_timeout: Duration::from_secs(600),
            reaper_interval: Duration::from_secs(60),
            game: GameConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load config from `WHOSAID_*` environment variables, falling back to defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load config from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        let defaults = Self::default();
        let game_defaults = GameConfig::default();

        let config = Self {
            addr: parse(&get, "WHOSAID_ADDR", defaults.addr)?,
            questions_path: get("WHOSAID_QUESTIONS")
                .map(PathBuf::from)
                .unwrap_or(defaults.questions_path),
            static_dir: get("WHOSAID_STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            room_queue: parse_positive(&get, "WHOSAID_ROOM_QUEUE", defaults.room_queue)?,
            player_queue: parse_positive(&get, "WHOSAID_PLAYER_QUEUE", defaults.player_queue)?,
            send_timeout: Duration::from_millis(parse(
                &get,
                "WHOSAID_SEND_TIMEOUT_MS",
                defaults.send_timeout.as_millis() as u64,
            )?),
            room_idle_timeout: Duration::from_secs(parse(
                &get,
                "WHOSAID_ROOM_IDLE_SECS",
                defaults.room_idle_timeout.as_secs(),
            )?),
            reaper_interval: Duration::from_secs(parse_positive(
                &get,
                "WHOSAID_REAPER_INTERVAL_SECS",
                defaults.reaper_interval.as_secs(),
            )?),
            game: GameConfig {
                winning_score: parse_positive(
                    &get,
                    "WHOSAID_WINNING_SCORE",
                    game_defaults.winning_score,
                )?,
                points_per_correct_guess: parse_positive(
                    &get,
                    "WHOSAID_POINTS_PER_GUESS",
                    game_defaults.points_per_correct_guess,
                )?,
                max_answer_chars: match get("WHOSAID_MAX_ANSWER_CHARS") {
                    Some(_) => Some(parse_positive(&get, "WHOSAID_MAX_ANSWER_CHARS", 0usize)?),
                    None => game_defaults.max_answer_chars,
                },
            },
        };

        Ok(config)
    }

    pub fn hub(&self) -> HubConfig {
        HubConfig {
            capacity: self.room_queue,
            send_timeout: self.send_timeout,
        }
    }
}

fn parse<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key,
            reason: e.to_string(),
            value,
        }),
    }
}

fn parse_positive<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + Default,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    let value = parse(get, key, default)?;
    if value > T::default() {
        Ok(value)
    } else {
        Err(ConfigError::InvalidValue {
            key,
            value: get(key).unwrap_or_default(),
            reason: "must be greater than zero".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.addr.port(), 8080);
        assert_eq!(config.questions_path, PathBuf::from("questions.json"));
        assert_eq!(config.room_queue, 100);
        assert_eq!(config.send_timeout, Duration::from_secs(1));
        assert_eq!(config.game, GameConfig::default());
        assert_eq!(config.game.winning_score, 50);
        assert_eq!(config.game.points_per_correct_guess, 10);
        assert_eq!(config.game.max_answer_chars, None);
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("WHOSAID_ADDR", "127.0.0.1:9000"),
            ("WHOSAID_QUESTIONS", "/srv/prompts.json"),
            ("WHOSAID_ROOM_QUEUE", "8"),
            ("WHOSAID_SEND_TIMEOUT_MS", "250"),
            ("WHOSAID_WINNING_SCORE", "30"),
        ]))
        .unwrap();

        assert_eq!(config.addr, "127.0.0.1:9000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.questions_path, PathBuf::from("/srv/prompts.json"));
        assert_eq!(config.hub().capacity, 8);
        assert_eq!(config.hub().send_timeout, Duration::from_millis(250));
        assert_eq!(config.game.winning_score, 30);
    }

    #[test]
    fn test_blank_values_fall_back() {
        let config = ServerConfig::from_lookup(lookup(&[("WHOSAID_ROOM_QUEUE", "  ")])).unwrap();
        assert_eq!(config.room_queue, 100);
    }

    #[test]
    fn test_invalid_values_are_errors() {
        let err = ServerConfig::from_lookup(lookup(&[("WHOSAID_ROOM_QUEUE", "lots")])).unwrap_err();
        assert!(err.to_string().contains("WHOSAID_ROOM_QUEUE"));

        let err = ServerConfig::from_lookup(lookup(&[("WHOSAID_WINNING_SCORE", "0")])).unwrap_err();
        assert!(err.to_string().contains("greater than zero"));

        assert!(ServerConfig::from_lookup(lookup(&[("WHOSAID_ADDR", "nowhere")])).is_err());
    }

    #[test]
    #[serial]
    fn test_from_env() {
        std::env::set_var("WHOSAID_MAX_ANSWER_CHARS", "140");
        let config = ServerConfig::from_env();
        std::env::remove_var("WHOSAID_MAX_ANSWER_CHARS");

        assert_eq!(config.unwrap().game.max_answer_chars, Some(140));
    }
}
