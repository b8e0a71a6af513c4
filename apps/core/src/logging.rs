use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

const LOG_FILE_NAME: &str = "autocomplete.log";
const ARCHIVE_PREFIX: &str = "autocomplete-";
const MAX_LOG_BYTES: u64 = 1_000_000;
const MAX_ARCHIVES: usize = 5;

static LOGGER: OnceLock<Logger> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    fn label(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

struct Logger {
    dir: PathBuf,
    sink: Mutex<Sink>,
}

/// The open log file and how many bytes it holds, so rotation can happen mid-run.
struct Sink {
    file: File,
    written: u64,
}

/// Starts file logging under `log_dir`, rotating an oversized leftover log first.
///
/// Only the first successful call takes effect; until then every log call is a no-op.
pub fn init(log_dir: &Path) -> Result<(), std::io::Error> {
    if LOGGER.get().is_some() {
        return Ok(());
    }

    fs::create_dir_all(log_dir)?;
    let sink = open_sink(log_dir)?;
    let _ = LOGGER.set(Logger {
        dir: log_dir.to_path_buf(),
        sink: Mutex::new(sink),
    });
    Ok(())
}

pub fn debug(message: &str) {
    write_line(Level::Debug, message);
}

pub fn info(message: &str) {
    write_line(Level::Info, message);
}

pub fn warn(message: &str) {
    write_line(Level::Warn, message);
}

pub fn error(message: &str) {
    write_line(Level::Error, message);
}

fn write_line(level: Level, message: &str) {
    let Some(logger) = LOGGER.get() else {
        return;
    };
    let Ok(mut sink) = logger.sink.lock() else {
        return;
    };

    let line = format!("[{}] [{}] {message}\n", epoch_secs(), level.label());
    if sink.written + line.len() as u64 > MAX_LOG_BYTES {
        if let Ok(fresh) = rotate(&logger.dir).and_then(|()| open_sink(&logger.dir)) {
            *sink = fresh;
        }
    }

    if sink.file.write_all(line.as_bytes()).is_ok() {
        sink.written += line.len() as u64;
    }
    let _ = sink.file.flush();
}

fn open_sink(log_dir: &Path) -> Result<Sink, std::io::Error> {
    let path = log_dir.join(LOG_FILE_NAME);
    if fs::metadata(&path).is_ok_and(|meta| meta.len() >= MAX_LOG_BYTES) {
        rotate(log_dir)?;
    }

    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    let written = file.metadata()?.len();
    Ok(Sink { file, written })
}

/// Moves the current log aside as a timestamped archive and keeps only the newest archives.
fn rotate(log_dir: &Path) -> Result<(), std::io::Error> {
    let current = log_dir.join(LOG_FILE_NAME);
    if !current.exists() {
        return Ok(());
    }

    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    fs::rename(&current, log_dir.join(format!("{ARCHIVE_PREFIX}{stamp}.log")))?;

    let mut archives: Vec<PathBuf> = fs::read_dir(log_dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| is_archive(path))
        .collect();
    archives.sort();

    let excess = archives.len().saturating_sub(MAX_ARCHIVES);
    for oldest in archives.into_iter().take(excess) {
        let _ = fs::remove_file(oldest);
    }
    Ok(())
}

fn is_archive(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(ARCHIVE_PREFIX) && name.ends_with(".log"))
}

fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
