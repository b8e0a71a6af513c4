use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_CLASS_PREFIX: &str = "ui-select";
const MAX_BLUR_HIDE_DELAY_MS: u64 = 5_000;

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    Json5(json5::Error),
    UnsupportedFormat(PathBuf),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(error) => write!(f, "io error: {error}"),
            Self::Toml(error) => write!(f, "invalid toml: {error}"),
            Self::Json5(error) => write!(f, "invalid json5: {error}"),
            Self::UnsupportedFormat(path) => {
                write!(f, "unsupported config format: {}", path.display())
            }
            Self::Invalid(error) => write!(f, "invalid options: {error}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Toml(value)
    }
}

impl From<json5::Error> for ConfigError {
    fn from(value: json5::Error) -> Self {
        Self::Json5(value)
    }
}

/// What the output field receives when a query matches nothing. Configured as 0, 1 or 2.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum EmptyMatchMode {
    /// The typed text, passed through the output filter.
    #[default]
    KeepTyped,
    SubmitEmpty,
    /// Leave whatever the field held.
    SubmitNothing,
}

impl TryFrom<u8> for EmptyMatchMode {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::KeepTyped),
            1 => Ok(Self::SubmitEmpty),
            2 => Ok(Self::SubmitNothing),
            other => Err(format!("unknown mode {other}, expected 0, 1 or 2")),
        }
    }
}

impl From<EmptyMatchMode> for u8 {
    fn from(value: EmptyMatchMode) -> Self {
        match value {
            EmptyMatchMode::KeepTyped => 0,
            EmptyMatchMode::SubmitEmpty => 1,
            EmptyMatchMode::SubmitNothing => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Built-in filter name; `None` means `startsWith`.
    pub filter: Option<String>,
    #[serde(alias = "selectFirst")]
    pub select_first: bool,
    #[serde(alias = "submitOnEnter")]
    pub submit_on_enter: bool,
    pub disabled: bool,
    #[serde(alias = "selectOnBlur")]
    pub select_on_blur: bool,
    #[serde(alias = "refreshOnFocus")]
    pub refresh_on_focus: bool,
    pub mode: EmptyMatchMode,
    #[serde(alias = "classPrefix")]
    pub class_prefix: String,
    #[serde(alias = "hoverClass")]
    pub hover_class: String,
    #[serde(alias = "blurHideDelayMs")]
    pub blur_hide_delay_ms: Option<u64>,
    #[serde(alias = "logDir")]
    pub log_dir: Option<PathBuf>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            filter: None,
            select_first: false,
            submit_on_enter: false,
            disabled: false,
            select_on_blur: false,
            refresh_on_focus: false,
            mode: EmptyMatchMode::default(),
            class_prefix: DEFAULT_CLASS_PREFIX.to_string(),
            hover_class: format!("{DEFAULT_CLASS_PREFIX}-hover"),
            blur_hide_delay_ms: None,
            log_dir: None,
        }
    }
}

impl Options {
    pub fn blur_hide_delay(&self) -> Option<Duration> {
        self.blur_hide_delay_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(default_log_dir)
    }
}

pub fn default_log_dir() -> PathBuf {
    std::env::temp_dir().join("autocomplete").join("logs")
}

pub fn validate(options: &Options) -> Result<(), ConfigError> {
    if options.class_prefix.trim().is_empty() {
        return Err(ConfigError::Invalid("class_prefix is required".into()));
    }

    if options.hover_class.trim().is_empty() {
        return Err(ConfigError::Invalid("hover_class is required".into()));
    }

    if options
        .blur_hide_delay_ms
        .is_some_and(|ms| ms > MAX_BLUR_HIDE_DELAY_MS)
    {
        return Err(ConfigError::Invalid(format!(
            "blur_hide_delay_ms must be at most {MAX_BLUR_HIDE_DELAY_MS}"
        )));
    }

    Ok(())
}

pub fn from_toml_str(raw: &str) -> Result<Options, ConfigError> {
    let options: Options = toml::from_str(raw)?;
    validate(&options)?;
    Ok(options)
}

pub fn from_json5_str(raw: &str) -> Result<Options, ConfigError> {
    let options: Options = json5::from_str(raw)?;
    validate(&options)?;
    Ok(options)
}

/// Loads options from a `.toml`, `.json` or `.json5` file.
pub fn load(path: &Path) -> Result<Options, ConfigError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("toml") => from_toml_str(&std::fs::read_to_string(path)?),
        Some("json") | Some("json5") => from_json5_str(&std::fs::read_to_string(path)?),
        _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
    }
}
