/// Daemon trigger and run exclusion
///
/// This module handles:
/// - Computing the next daily fire time
/// - The cross-process run lock (one in-flight invocation at a time)
/// - The scheduler loop that runs the daily reply-then-new job
use crate::error::AllocationError;
use crate::types::RunSummary;
use crate::ui;
use chrono::{Duration as ChronoDuration, Local, NaiveDate, NaiveDateTime, NaiveTime};
use fs2::FileExt;
use log::{debug, error, info, warn};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::thread;

/// Next time `at` occurs strictly after `now`: today if still ahead, else tomorrow
pub fn next_fire_time(now: NaiveDateTime, at: NaiveTime) -> NaiveDateTime {
    let today = now.date().and_time(at);
    if today > now { today } else { today + ChronoDuration::days(1) }
}

/// Exclusive lock held for the duration of one run
///
/// Released when dropped.
#[derive(Debug)]
pub struct RunLock {
    file: File,
    path: PathBuf,
}

impl RunLock {
    /// Take the lock without blocking; a held lock is a `Lock` error
    pub fn acquire(path: &Path) -> Result<Self, AllocationError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).truncate(false).write(true).open(path)?;
        file.try_lock_exclusive().map_err(|_| AllocationError::Lock(path.display().to_string()))?;

        debug!("acquired run lock {:?}", path);
        Ok(RunLock { file, path: path.to_path_buf() })
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
        debug!("released run lock {:?}", self.path);
    }
}

/// Outcome of one scheduler tick
#[derive(Debug)]
pub enum TickOutcome {
    Completed(RunSummary),
    /// Another invocation held the lock
    Skipped,
    Failed(AllocationError),
}

/// Run the daily job once for `today` under the run lock
///
/// Never propagates: failures are logged and reported in the outcome so the
/// scheduler keeps going.
pub fn tick<F>(lock_path: &Path, today: NaiveDate, run: &mut F) -> TickOutcome
where
    F: FnMut(NaiveDate) -> Result<RunSummary, AllocationError>,
{
    let _lock = match RunLock::acquire(lock_path) {
        Ok(lock) => lock,
        Err(AllocationError::Lock(path)) => {
            warn!("Skipping scheduled run: lock {} is held", path);
            return TickOutcome::Skipped;
        }
        Err(e) => {
            error!("Scheduled run failed: {}", e);
            return TickOutcome::Failed(e);
        }
    };

    match run(today) {
        Ok(summary) => TickOutcome::Completed(summary),
        Err(e) => {
            error!("Scheduled run failed: {}", e);
            TickOutcome::Failed(e)
        }
    }
}

/// Print what a tick did on the console
fn report(outcome: TickOutcome) {
    match outcome {
        TickOutcome::Completed(summary) => ui::print_summary(&summary),
        TickOutcome::Skipped => ui::status("scheduled run skipped: another run is in progress"),
        TickOutcome::Failed(e) => ui::print_error(&format!("scheduled run failed: {}", e)),
    }
}

/// Run the job every day at `at` local time, forever
///
/// With `run_now`, one run happens immediately at startup as well.
pub fn run_daemon<F>(at: NaiveTime, lock_path: &Path, run_now: bool, mut run: F) -> !
where
    F: FnMut(NaiveDate) -> Result<RunSummary, AllocationError>,
{
    info!("Scheduler started: daily run at {}", at.format("%H:%M"));

    if run_now {
        report(tick(lock_path, Local::now().date_naive(), &mut run));
    }

    loop {
        let now = Local::now().naive_local();
        let fire = next_fire_time(now, at);
        info!("Next run at {}", fire.format("%Y-%m-%d %H:%M"));

        // Negative only if the clock jumped; fire right away in that case
        let wait = (fire - now).to_std().unwrap_or_default();
        thread::sleep(wait);

        report(tick(lock_path, fire.date(), &mut run));
    }
}
