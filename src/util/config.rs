use std::sync::OnceLock;

use crate::pacing::stats::{MAX_FRAME_DELTA_MS, STATS_WINDOW_MS};
use crate::render::SPLIT_TOGGLE_PROBABILITY;
use crate::scene::DEFAULT_COMPLEXITY;

const CONFIG_PATH: &str = "motionmark.cfg";
const CONFIG_ENV: &str = "MOTIONMARK_CONFIG";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BenchConfig {
    pub complexity: i32,
    /// Fixed generator seed; `None` seeds from the OS.
    pub seed: Option<u64>,
    pub stats_window_ms: f64,
    pub max_frame_delta_ms: f64,
    pub split_toggle_probability: f64,
    /// Off freezes batch boundaries at their generated state.
    pub vary_batches: bool,
    pub log_level: log::LevelFilter,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            complexity: DEFAULT_COMPLEXITY,
            seed: None,
            stats_window_ms: STATS_WINDOW_MS,
            max_frame_delta_ms: MAX_FRAME_DELTA_MS,
            split_toggle_probability: SPLIT_TOGGLE_PROBABILITY,
            vary_batches: true,
            log_level: log::LevelFilter::Info,
        }
    }
}

impl BenchConfig {
    /// Effective per-frame split flip chance.
    pub fn split_toggle(&self) -> f64 {
        if self.vary_batches {
            self.split_toggle_probability
        } else {
            0.0
        }
    }
}

static CONFIG: OnceLock<BenchConfig> = OnceLock::new();

pub fn bench_config() -> &'static BenchConfig {
    CONFIG.get_or_init(read_config)
}

fn read_config() -> BenchConfig {
    let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| CONFIG_PATH.to_string());
    match std::fs::read_to_string(&path) {
        Ok(text) => parse_config(&text),
        Err(_) => BenchConfig::default(),
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value, "1" | "true" | "TRUE" | "on" | "ON" | "yes" | "YES")
}

/// `key = value` lines; `#` starts a comment line. Bad values keep the default.
pub fn parse_config(text: &str) -> BenchConfig {
    let mut cfg = BenchConfig::default();

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut parts = line.splitn(2, '=');
        let key = parts.next().unwrap_or("").trim().to_ascii_lowercase();
        let value = parts.next().unwrap_or("").trim();

        let ok = match key.as_str() {
            "complexity" => value.parse().map(|v| cfg.complexity = v).is_ok(),
            "seed" => value.parse().map(|v| cfg.seed = Some(v)).is_ok(),
            "stats_window_ms" => positive(value).map(|v| cfg.stats_window_ms = v).is_some(),
            "max_frame_delta_ms" => positive(value).map(|v| cfg.max_frame_delta_ms = v).is_some(),
            "split_toggle_probability" => value
                .parse::<f64>()
                .ok()
                .filter(|v| (0.0..=1.0).contains(v))
                .map(|v| cfg.split_toggle_probability = v)
                .is_some(),
            "vary_batches" => {
                cfg.vary_batches = parse_flag(value);
                true
            }
            "log_level" => value.parse().map(|v| cfg.log_level = v).is_ok(),
            _ => {
                log::warn!("config: unknown key {key}");
                continue;
            }
        };
        if !ok {
            log::warn!("config: ignoring {key}={value}");
        }
    }

    cfg
}

fn positive(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| *v > 0.0 && v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_empty() {
        assert_eq!(parse_config(""), BenchConfig::default());
        assert_eq!(BenchConfig::default().complexity, 8);
    }

    #[test]
    fn reads_known_keys_and_skips_noise() {
        let cfg = parse_config(
            "# bench settings\n\
             complexity = 12\n\
             SEED=42\n\
             stats_window_ms = 1000\n\
             max_frame_delta_ms = -5\n\
             split_toggle_probability = 2\n\
             vary_batches = off\n\
             log_level = debug\n\
             colour = blue\n",
        );
        assert_eq!(cfg.complexity, 12);
        assert_eq!(cfg.seed, Some(42));
        assert_eq!(cfg.stats_window_ms, 1000.0);
        assert_eq!(cfg.max_frame_delta_ms, MAX_FRAME_DELTA_MS);
        assert_eq!(cfg.split_toggle_probability, SPLIT_TOGGLE_PROBABILITY);
        assert!(!cfg.vary_batches);
        assert_eq!(cfg.split_toggle(), 0.0);
        assert_eq!(cfg.log_level, log::LevelFilter::Debug);
    }
}
