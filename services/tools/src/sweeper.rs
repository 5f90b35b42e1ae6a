//! Periodic removal of leftovers in the temp and output directories

use std::{
    path::{Path, PathBuf},
    time::{Duration, SystemTime},
};

use anyhow::Result;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

use crate::{archive::ARCHIVE_PREFIX, upload::WORK_DIR_PREFIX};

/// One directory to clean and what counts as stale there
#[derive(Debug, Clone)]
pub struct SweepTarget {
    pub dir: PathBuf,
    pub max_age: Duration,
    /// Only entries whose name starts with this are considered
    pub prefix: Option<&'static str>,
}

#[derive(Debug, Clone)]
pub struct Sweeper {
    targets: Vec<SweepTarget>,
}

impl Sweeper {
    /// Work dirs older than `work_dir_max_age`, archives older than `archive_max_age`
    pub fn new(
        tmp_dir: PathBuf,
        work_dir_max_age: Duration,
        output_dir: PathBuf,
        archive_max_age: Duration,
    ) -> Self {
        Self {
            targets: vec![
                SweepTarget {
                    dir: tmp_dir,
                    max_age: work_dir_max_age,
                    prefix: Some(WORK_DIR_PREFIX),
                },
                SweepTarget {
                    dir: output_dir,
                    max_age: archive_max_age,
                    prefix: Some(ARCHIVE_PREFIX),
                },
            ],
        }
    }

    /// Run every target once; returns how many entries were removed
    pub async fn sweep(&self) -> usize {
        let mut removed = 0;
        for target in &self.targets {
            match sweep_dir(&target.dir, target.max_age, target.prefix).await {
                Ok(count) => removed += count,
                Err(e) => error!("Failed to sweep {}: {}", target.dir.display(), e),
            }
        }
        removed
    }

    pub async fn start(self, schedule: &str) -> Result<JobScheduler> {
        let scheduler = JobScheduler::new().await?;

        let job = Job::new_async(schedule, move |_, _| {
            let sweeper = self.clone();
            Box::pin(async move {
                let removed = sweeper.sweep().await;
                if removed > 0 {
                    info!("Sweeper removed {} stale entries", removed);
                }
            })
        })?;

        scheduler.add(job).await?;
        scheduler.start().await?;

        info!("Started sweeper with schedule: {}", schedule);
        Ok(scheduler)
    }
}

/// Delete entries in `dir` last modified more than `max_age` ago
pub async fn sweep_dir(dir: &Path, max_age: Duration, prefix: Option<&str>) -> Result<usize> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };

    let now = SystemTime::now();
    let mut removed = 0;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let matches_prefix = prefix.is_none_or(|p| name.to_string_lossy().starts_with(p));
        if !matches_prefix {
            continue;
        }

        let metadata = entry.metadata().await?;
        let age = metadata
            .modified()
            .ok()
            .and_then(|modified| now.duration_since(modified).ok())
            .unwrap_or_default();
        if age < max_age {
            continue;
        }

        let path = entry.path();
        let result = if metadata.is_dir() {
            tokio::fs::remove_dir_all(&path).await
        } else {
            tokio::fs::remove_file(&path).await
        };
        match result {
            Ok(()) => removed += 1,
            Err(e) => warn!("Could not remove {}: {}", path.display(), e),
        }
    }

    Ok(removed)
}
