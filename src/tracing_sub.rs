use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing::Level;

/// Install the global subscriber.
///
/// The terminal belongs to the UI, so log lines go to `log_file` when one is
/// given and are discarded otherwise. Safe to call more than once; later
/// calls leave the first subscriber in place.
pub fn init(log_file: Option<&Path>, level: Level) -> io::Result<()> {
    match log_file {
        Some(path) => {
            let file = open_log(path)?;
            let _ = tracing_subscriber::fmt()
                .with_max_level(level)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false)
                .with_thread_names(false)
                .try_init();
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_max_level(level)
                .with_writer(io::sink)
                .try_init();
        }
    }
    Ok(())
}

pub fn init_default() {
    // a sink writer cannot fail to open
    let _ = init(None, Level::INFO);
}

fn open_log(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}
