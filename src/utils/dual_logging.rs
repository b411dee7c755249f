use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use crate::utils::app_paths::AppPaths;
use crate::utils::logging::LogEntry;

/// Global log file instance
static LOG_FILE: OnceLock<Option<LogFile>> = OnceLock::new();

/// Append-only, timestamped log file with a `latest.log` pointer
pub struct LogFile {
    file: Mutex<File>,
    path: PathBuf,
}

impl LogFile {
    pub fn create_in(log_dir: &Path) -> std::io::Result<Self> {
        std::fs::create_dir_all(log_dir)?;

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let path = log_dir.join(format!("ticker-dash_{}.log", timestamp));

        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        let latest_path = log_dir.join("latest.log");
        #[cfg(unix)]
        {
            let _ = std::fs::remove_file(&latest_path);
            let _ = std::os::unix::fs::symlink(&path, &latest_path);
        }
        #[cfg(not(unix))]
        {
            let _ = std::fs::write(&latest_path, format!("Current log file: {}\n", path.display()));
        }

        Ok(Self {
            file: Mutex::new(file),
            path,
        })
    }

    pub fn append(&self, entry: &LogEntry) {
        if let Ok(mut file) = self.file.lock() {
            let line = format!(
                "[{}] {} [{}] {}\n",
                entry.timestamp, entry.level, entry.target, entry.message
            );
            let _ = file.write_all(line.as_bytes());
        }
    }

    pub fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Initialize the global log file; None when the log directory is unusable
pub fn init_log_file() -> Option<&'static LogFile> {
    LOG_FILE
        .get_or_init(|| {
            AppPaths::log_dir()
                .ok()
                .and_then(|dir| LogFile::create_in(&dir).ok())
        })
        .as_ref()
}

/// Get the global log file, if one was opened
pub fn get_log_file() -> Option<&'static LogFile> {
    LOG_FILE.get().and_then(|f| f.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tracing::Level;

    #[test]
    fn test_log_file_appends_entries() {
        let dir = tempdir().unwrap();
        let log = LogFile::create_in(dir.path()).unwrap();
        log.append(&LogEntry::new(Level::INFO, "session", "restored TCS.NS".to_string()));
        log.flush();

        let contents = std::fs::read_to_string(log.path()).unwrap();
        assert!(contents.contains("INFO [session] restored TCS.NS"));
    }
}
