use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use taas_core::game::settings::default_names;
use taas_core::policy::CasualPolicy;
use taas_core::{GameSettings, Ruleset, WinCondition};
use thiserror::Error;
use tracing::Level;

const DEFAULT_MAX_STEPS: usize = 100_000;
const RUN_ID_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";

/// Root simulation configuration loaded from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SimulationConfig {
    pub run_id: String,
    pub games: GamesConfig,
    #[serde(default)]
    pub table: TableConfig,
    #[serde(default)]
    pub cpu: PolicyConfig,
    /// Decisions taken for the human seats.
    #[serde(default)]
    pub autopilot: PolicyConfig,
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: SimulationConfig =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Validate the configuration without performing I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        validate_run_id(&self.run_id)?;
        self.games.validate()?;
        self.table.validate()?;
        self.cpu.validate("cpu")?;
        self.autopilot.validate("autopilot")?;
        self.outputs.validate(&self.run_id)?;
        self.logging.normalize();
        Ok(())
    }

    /// Resolve output templates (e.g., `{run_id}` placeholders) into concrete paths.
    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        ResolvedOutputs {
            jsonl: resolve_template(&self.run_id, &self.outputs.jsonl),
            summary_md: resolve_template(&self.run_id, &self.outputs.summary_md),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct GamesConfig {
    pub count: usize,
    pub seed: Option<u64>,
    /// Autopilot steps allowed per game before the run is aborted.
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
}

impl GamesConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.count == 0 {
            return Err(ValidationError::invalid(
                "games.count",
                "number of games must be greater than zero",
            ));
        }
        if self.max_steps == 0 {
            return Err(ValidationError::invalid(
                "games.max_steps",
                "step limit must be greater than zero",
            ));
        }
        Ok(())
    }
}

fn default_max_steps() -> usize {
    DEFAULT_MAX_STEPS
}

/// Table setup shared by every simulated game.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TableConfig {
    #[serde(default = "default_num_players")]
    pub num_players: usize,
    #[serde(default = "default_num_dice")]
    pub num_dice: usize,
    #[serde(default = "default_win_condition")]
    pub win_condition: WinCondition,
    #[serde(default = "default_win_value")]
    pub win_value: u32,
    #[serde(default)]
    pub ruleset: Ruleset,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            num_players: default_num_players(),
            num_dice: default_num_dice(),
            win_condition: default_win_condition(),
            win_value: default_win_value(),
            ruleset: Ruleset::default(),
        }
    }
}

impl TableConfig {
    /// Settings for one game; human seats get the placeholder names.
    pub fn settings(&self) -> GameSettings {
        GameSettings {
            num_players: self.num_players,
            player_names: default_names(self.num_players),
            num_dice: self.num_dice,
            win_condition: self.win_condition,
            win_value: self.win_value,
            ruleset: self.ruleset,
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        self.settings().validate().map_err(|err| {
            let taas_core::SettingsError::InvalidField { field, message } = err;
            ValidationError::InvalidField {
                field: format!("table.{field}"),
                message,
            }
        })
    }
}

fn default_num_players() -> usize {
    1
}

fn default_num_dice() -> usize {
    2
}

fn default_win_condition() -> WinCondition {
    WinCondition::Rounds
}

fn default_win_value() -> u32 {
    10
}

/// Probabilities for a [`CasualPolicy`].
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct PolicyConfig {
    #[serde(default = "default_accept_probability")]
    pub accept_probability: f64,
    #[serde(default = "default_request_probability")]
    pub request_probability: f64,
    #[serde(default = "default_yes_probability")]
    pub yes_probability: f64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            accept_probability: default_accept_probability(),
            request_probability: default_request_probability(),
            yes_probability: default_yes_probability(),
        }
    }
}

impl PolicyConfig {
    pub fn policy(&self) -> CasualPolicy {
        CasualPolicy::new(
            self.accept_probability,
            self.request_probability,
            self.yes_probability,
        )
    }

    fn validate(&self, section: &str) -> Result<(), ValidationError> {
        for (name, value) in [
            ("accept_probability", self.accept_probability),
            ("request_probability", self.request_probability),
            ("yes_probability", self.yes_probability),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ValidationError::invalid(
                    format!("{section}.{name}"),
                    format!("probability must be within [0, 1], got {value}"),
                ));
            }
        }
        Ok(())
    }
}

fn default_accept_probability() -> f64 {
    CasualPolicy::ACCEPT_PROBABILITY
}

fn default_request_probability() -> f64 {
    CasualPolicy::REQUEST_PROBABILITY
}

fn default_yes_probability() -> f64 {
    CasualPolicy::YES_PROBABILITY
}

/// Output artifact configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputsConfig {
    pub jsonl: String,
    pub summary_md: String,
}

impl OutputsConfig {
    fn validate(&self, run_id: &str) -> Result<(), ValidationError> {
        for (label, value) in [
            ("outputs.jsonl", &self.jsonl),
            ("outputs.summary_md", &self.summary_md),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::invalid(label, "path must not be empty"));
            }

            let resolved = resolve_template(run_id, value);
            if resolved.components().count() == 0 {
                return Err(ValidationError::invalid(label, "resolved path is invalid"));
            }
        }
        if self.jsonl == self.summary_md {
            return Err(ValidationError::invalid(
                "outputs.summary_md",
                "summary must not overwrite the JSONL log",
            ));
        }
        Ok(())
    }
}

/// Logging configuration defaults to disabled structured logs.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
        }
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_tracing_level() -> String {
    "info".to_string()
}

fn validate_run_id(run_id: &str) -> Result<(), ValidationError> {
    if run_id.trim().is_empty() {
        return Err(ValidationError::invalid("run_id", "run_id must not be empty"));
    }

    if !run_id.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
        return Err(ValidationError::invalid(
            "run_id",
            "run_id may only contain alphanumeric characters, '.', '_' or '-'",
        ));
    }

    Ok(())
}

fn resolve_template(run_id: &str, template: &str) -> PathBuf {
    PathBuf::from(template.replace("{run_id}", run_id))
}

/// Fully resolved output paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputs {
    pub jsonl: PathBuf,
    pub summary_md: PathBuf,
}

/// Errors surfaced when loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Invalid { path, .. } => path.as_path(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}

impl ValidationError {
    fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError::InvalidField {
            field: field.into(),
            message: message.into(),
        }
    }
}
