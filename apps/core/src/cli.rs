use std::path::PathBuf;

use crate::autocomplete::Autocomplete;
use crate::config::{self, ConfigError, Options};
use crate::data_source;
use crate::logging;
use crate::surface::Surface;

pub const USAGE: &str = "usage: autocomplete-core --candidates <file.json> [--filter <name>] [--config <file>] [--select <index>] <query>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliOptions {
    pub candidates_path: PathBuf,
    pub config_path: Option<PathBuf>,
    pub filter: Option<String>,
    pub select: Option<usize>,
    pub query: String,
}

#[derive(Debug)]
pub enum CliError {
    Config(ConfigError),
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(error) => write!(f, "config error: {error}"),
            Self::Io(error) => write!(f, "io error: {error}"),
            Self::Json(error) => write!(f, "invalid candidates json: {error}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<ConfigError> for CliError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

pub fn parse_cli_args(args: &[String]) -> Result<CliOptions, String> {
    let mut candidates_path = None;
    let mut config_path = None;
    let mut filter = None;
    let mut select = None;
    let mut query: Option<String> = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--candidates" => candidates_path = Some(PathBuf::from(flag_value(&mut iter, arg)?)),
            "--config" => config_path = Some(PathBuf::from(flag_value(&mut iter, arg)?)),
            "--filter" => filter = Some(flag_value(&mut iter, arg)?.to_string()),
            "--select" => {
                let raw = flag_value(&mut iter, arg)?;
                let index = raw
                    .parse::<usize>()
                    .map_err(|_| format!("--select expects an index, got '{raw}'"))?;
                select = Some(index);
            }
            "-h" | "--help" => return Err(USAGE.to_string()),
            other if other.starts_with("--") => {
                return Err(format!("unknown flag '{other}'\n{USAGE}"));
            }
            other => {
                if query.is_some() {
                    return Err(format!("unexpected argument '{other}'\n{USAGE}"));
                }
                query = Some(other.to_string());
            }
        }
    }

    let candidates_path = candidates_path.ok_or_else(|| format!("--candidates is required\n{USAGE}"))?;
    let query = query.ok_or_else(|| format!("a query is required\n{USAGE}"))?;

    Ok(CliOptions {
        candidates_path,
        config_path,
        filter,
        select,
        query,
    })
}

fn flag_value<'a>(
    iter: &mut std::slice::Iter<'a, String>,
    flag: &str,
) -> Result<&'a str, String> {
    iter.next()
        .map(String::as_str)
        .ok_or_else(|| format!("{flag} expects a value"))
}

/// Types the query into a widget fed from the candidates file and reports what it shows.
pub fn run(cli: CliOptions) -> Result<Vec<String>, CliError> {
    let mut options = match &cli.config_path {
        Some(path) => config::load(path)?,
        None => Options::default(),
    };
    if let Some(filter) = cli.filter {
        options.filter = Some(filter);
    }
    if options.log_dir.is_some() {
        logging::init(&options.log_dir())?;
    }

    let raw = std::fs::read_to_string(&cli.candidates_path)?;
    logging::info(&format!(
        "probe candidates={} query={:?}",
        cli.candidates_path.display(),
        cli.query
    ));
    let candidates: serde_json::Value = serde_json::from_str(&raw)?;

    let (surface, probe) = Surface::recording("");
    let mut widget = Autocomplete::new(options, surface, data_source::from_json(candidates));
    widget.focus();
    probe.input.type_text(&cli.query);
    widget.handle_input();

    let rendered = probe.renderer.log().items;
    let mut lines: Vec<String> = widget
        .results()
        .iter()
        .zip(rendered)
        .enumerate()
        .map(|(index, (item, markup))| format!("{index}\t{markup}\t{}", item.target))
        .collect();

    if lines.is_empty() {
        lines.push(format!("no matches; output={:?}", widget.output_value()));
    }

    if let Some(index) = cli.select {
        if widget.select_item(Some(index)) {
            lines.push(format!(
                "selected input={:?} output={:?}",
                widget.value(),
                widget.output_value()
            ));
        } else {
            lines.push(format!("nothing selected at index {index}"));
        }
    }

    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::parse_cli_args;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_flags_and_query() {
        let cli = parse_cli_args(&args(&[
            "--candidates",
            "c.json",
            "--filter",
            "stringMatch",
            "--select",
            "1",
            "TIAN",
        ]))
        .unwrap();
        assert_eq!(cli.query, "TIAN");
        assert_eq!(cli.filter.as_deref(), Some("stringMatch"));
        assert_eq!(cli.select, Some(1));
    }

    #[test]
    fn rejects_missing_candidates_and_bad_index() {
        assert!(parse_cli_args(&args(&["q"])).is_err());
        assert!(parse_cli_args(&args(&["--candidates", "c.json", "--select", "x", "q"])).is_err());
        assert!(parse_cli_args(&args(&["--candidates"])).is_err());
    }
}
