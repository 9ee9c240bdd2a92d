//! Raw device-event log files, rotated by calendar date.
//!
//! Two files exist: everything the terminals post, and access events only.
//! Files live under `logs/<subfolder>/YYYY/MM/` and the handle is closed
//! and reopened on the first write of a new day. Logging failures are
//! reported via tracing and never propagate to the webhook path.

use chrono::{Local, NaiveDate};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::warn;

struct OpenLog {
    date: NaiveDate,
    file: File,
}

/// One daily-rotated log file.
pub struct DailyLogFile {
    dir: PathBuf,
    /// File name template with a `{date}` placeholder.
    template: String,
    state: Mutex<Option<OpenLog>>,
}

impl DailyLogFile {
    #[must_use]
    pub fn new(log_dir: PathBuf, subfolder: &str, template: &str) -> Self {
        Self {
            dir: log_dir.join(subfolder),
            template: template.to_string(),
            state: Mutex::new(None),
        }
    }

    fn open_for(&self, date: NaiveDate) -> std::io::Result<File> {
        let month_dir = self
            .dir
            .join(format!("{}", date.format("%Y")))
            .join(format!("{}", date.format("%m")));
        std::fs::create_dir_all(&month_dir)?;
        let file_name = self.template.replace("{date}", &date.to_string());
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(month_dir.join(file_name))
    }

    /// Append one timestamped line, rotating the handle if the day changed.
    pub async fn append(&self, line: &str) {
        let now = Local::now();
        let today = now.date_naive();
        let mut state = self.state.lock().await;

        if state.as_ref().map(|open| open.date) != Some(today) {
            // Dropping the previous entry closes yesterday's handle.
            *state = match self.open_for(today) {
                Ok(file) => Some(OpenLog { date: today, file }),
                Err(err) => {
                    warn!(dir = %self.dir.display(), error = %err, "cannot open daily log file");
                    None
                }
            };
        }

        if let Some(open) = state.as_mut() {
            let stamped = format!("{} {line}\n", now.format("%Y-%m-%d %H:%M:%S%.3f"));
            if let Err(err) = open.file.write_all(stamped.as_bytes()) {
                warn!(error = %err, "daily log write failed");
            }
        }
    }
}
