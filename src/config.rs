use clap::ValueEnum;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

use crate::cli_args::Cli;
use crate::summary::SummaryLimits;

/// Output language for generated titles and messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Ko,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ko => "ko",
        }
    }
}

/// Final resolved configuration for commitsum.
#[derive(Debug, Clone)]
pub struct Config {
    pub limits: SummaryLimits,
    pub title_lang: Language,
    pub message_lang: Language,
}

impl Config {
    /// Build the final config from CLI flags, environment, TOML file, and
    /// defaults.
    ///
    /// Precedence:
    ///   1. CLI flags / `COMMITSUM_*` env vars (clap resolves both)
    ///   2. TOML `~/.config/commitsum.toml`
    ///   3. Hardcoded defaults (30000 / 15000 / depth 3 / threshold 10, en)
    pub fn from_sources(cli: &Cli) -> Self {
        let file_cfg = load_file_config().unwrap_or_default();
        Self::resolve(cli, file_cfg)
    }

    fn resolve(cli: &Cli, file_cfg: FileConfig) -> Self {
        let defaults = SummaryLimits::default();
        let limits = SummaryLimits {
            max_input_size: cli
                .max_input_size
                .or(file_cfg.max_input_size)
                .unwrap_or(defaults.max_input_size),
            max_diff_size: cli
                .max_diff_size
                .or(file_cfg.max_diff_size)
                .unwrap_or(defaults.max_diff_size),
            tree_depth: cli
                .tree_depth
                .or(file_cfg.tree_depth)
                .unwrap_or(defaults.tree_depth),
            compression_threshold: cli
                .compression_threshold
                .or(file_cfg.compression_threshold)
                .unwrap_or(defaults.compression_threshold),
        };

        Config {
            limits,
            title_lang: cli
                .title_lang
                .or(file_cfg.title_lang)
                .unwrap_or(Language::En),
            message_lang: cli
                .message_lang
                .or(file_cfg.message_lang)
                .unwrap_or(Language::En),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    pub max_input_size: Option<usize>,
    pub max_diff_size: Option<usize>,
    pub tree_depth: Option<usize>,
    pub compression_threshold: Option<usize>,
    pub title_lang: Option<Language>,
    pub message_lang: Option<Language>,
}

/// Return `~/.config/commitsum.toml`
fn config_path() -> Option<PathBuf> {
    let home = dirs::home_dir()?;
    Some(home.join(".config").join("commitsum.toml"))
}

fn load_file_config() -> Option<FileConfig> {
    let path = config_path()?;
    if !path.exists() {
        return None;
    }

    let data = fs::read_to_string(&path).ok()?;
    match toml::from_str::<FileConfig>(&data) {
        Ok(cfg) => Some(cfg),
        Err(error) => {
            log::warn!("ignoring malformed config {}: {error}", path.display());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(args: &[&str]) -> Cli {
        let mut full = vec!["commitsum"];
        full.extend_from_slice(args);
        Cli::parse_from(full)
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = Config::resolve(&cli(&[]), FileConfig::default());
        assert_eq!(config.limits, SummaryLimits::default());
        assert_eq!(config.title_lang, Language::En);
        assert_eq!(config.message_lang, Language::En);
    }

    #[test]
    fn file_values_override_defaults() {
        let file_cfg = FileConfig {
            max_diff_size: Some(9000),
            message_lang: Some(Language::Ko),
            ..FileConfig::default()
        };
        let config = Config::resolve(&cli(&[]), file_cfg);

        assert_eq!(config.limits.max_diff_size, 9000);
        assert_eq!(config.limits.max_input_size, 30_000);
        assert_eq!(config.message_lang, Language::Ko);
    }

    #[test]
    fn cli_flags_beat_file_values() {
        let file_cfg = FileConfig {
            max_diff_size: Some(9000),
            tree_depth: Some(5),
            ..FileConfig::default()
        };
        let config = Config::resolve(
            &cli(&["--max-diff-size", "1234", "--title-lang", "ko"]),
            file_cfg,
        );

        assert_eq!(config.limits.max_diff_size, 1234);
        assert_eq!(config.limits.tree_depth, 5);
        assert_eq!(config.title_lang, Language::Ko);
    }

    #[test]
    fn file_config_parses_from_toml() {
        let parsed: FileConfig =
            toml::from_str("max_input_size = 20000\ntitle_lang = \"ko\"\n").unwrap();
        assert_eq!(parsed.max_input_size, Some(20_000));
        assert_eq!(parsed.title_lang, Some(Language::Ko));
    }
}
