//! File-backed logger. The show owns the alternate screen, so log output
//! goes to a file or nowhere.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};

use crate::error::{Error, Result};

struct FileLogger {
    file: Mutex<File>,
    level: LevelFilter,
    start: Instant,
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(
                file,
                "{:>9.3}s {:<5} {}: {}",
                self.start.elapsed().as_secs_f32(),
                record.level(),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

fn open(path: &Path, level: LevelFilter) -> Result<FileLogger> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| Error::OpenLog {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(FileLogger {
        file: Mutex::new(file),
        level,
        start: Instant::now(),
    })
}

/// Installs the global logger. Without a path, logging stays disabled.
pub fn init(path: Option<&Path>, level: LevelFilter) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    log::set_boxed_logger(Box::new(open(path, level)?))?;
    log::set_max_level(level);
    Ok(())
}
