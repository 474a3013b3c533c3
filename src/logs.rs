use std::path::Path;
use std::sync::{mpsc, LazyLock, Mutex};

use anyhow::Result;
use file_rotate::{
    compression::Compression,
    suffix::{AppendTimestamp, FileLimit},
    {ContentLimit, FileRotate},
};
use log::Log;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

/// Where formatted log lines go besides the file, e.g. a log panel in the
/// control surface.
static LOG_LISTENER: LazyLock<Mutex<Option<mpsc::Sender<String>>>> =
    LazyLock::new(|| Mutex::new(None));

pub struct MainLogger {
    write_logger: Box<WriteLogger<FileRotate<AppendTimestamp>>>,
}

impl MainLogger {
    fn new(write_logger: Box<WriteLogger<FileRotate<AppendTimestamp>>>) -> Self {
        Self { write_logger }
    }
}

impl Log for MainLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.write_logger.enabled(metadata)
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        self.write_logger.log(record);

        let message = format_record(record);
        let mut listener = LOG_LISTENER.lock().unwrap();
        match listener.as_ref() {
            Some(tx) => {
                if tx.send(message).is_err() {
                    // receiver dropped, stop forwarding
                    *listener = None;
                }
            }
            None => eprintln!("{}", message),
        }
    }

    fn flush(&self) {
        self.write_logger.flush();
    }
}

pub fn format_record(record: &log::Record) -> String {
    format!(
        "{}:{} -- {}",
        record.level(),
        record.target(),
        record.args()
    )
}

/// Logs go to `<log_dir>/playback.log`, rotated every 1000 lines, keeping
/// three old files.
pub fn init(log_dir: &Path, level: LevelFilter) -> Result<()> {
    let path = log_dir.join("playback.log");
    let log = FileRotate::new(
        path,
        AppendTimestamp::default(FileLimit::MaxFiles(3)),
        ContentLimit::Lines(1000),
        Compression::None,
        #[cfg(unix)]
        None,
    );
    let config = ConfigBuilder::new().set_time_format_rfc3339().build();
    let write_logger = WriteLogger::new(level, config, log);
    let main_logger = MainLogger::new(write_logger);
    log::set_boxed_logger(Box::new(main_logger))?;
    log::set_max_level(level);
    Ok(())
}

pub fn set_listener(tx: mpsc::Sender<String>) {
    let mut guard = LOG_LISTENER.lock().unwrap();
    *guard = Some(tx);
}

pub fn clear_listener() {
    let mut guard = LOG_LISTENER.lock().unwrap();
    *guard = None;
}
