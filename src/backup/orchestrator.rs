use crate::backup::backup_config::{BackupConfig, DbTarget};
use crate::backup::logging::Logger;
use crate::backup::pipeline::DumpPipeline;
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use crate::backup::result_error::WithMsg;
use crate::backup::validate::validate_dir_exist_or_created;
use chrono::Local;
use getset::Getters;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Terminal state of one target's unit of work.
#[derive(Debug, Getters)]
#[getset(get = "pub")]
pub struct TargetOutcome {
    db_number: String,
    db_name: String,
    result: Result<PathBuf>,
}

#[derive(Debug, Default, Getters)]
#[getset(get = "pub")]
pub struct BackupReport {
    outcomes: Vec<TargetOutcome>,
}

impl BackupReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &TargetOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_ok())
    }

    pub fn failed(&self) -> impl Iterator<Item = &TargetOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }
}

/// Runs one pipeline per target, at most `concurrency` of them at a time.
///
/// A failing target is logged and does not affect the others. `run` returns
/// only once every target reached a terminal state.
pub struct BackupOrchestrator<P: DumpPipeline> {
    pipeline: P,
    concurrency: NonZeroUsize,
    logger: Logger,
}

impl<P: DumpPipeline> BackupOrchestrator<P> {
    pub fn new(pipeline: P, concurrency: NonZeroUsize, logger: Logger) -> Self {
        Self {
            pipeline,
            concurrency,
            logger,
        }
    }

    pub fn run(&self, config: &BackupConfig) -> Result<BackupReport> {
        self.logger.in_scope(|| self.run_in_scope(config))
    }

    fn run_in_scope(&self, config: &BackupConfig) -> Result<BackupReport> {
        let out_dir = config.out_dir();
        validate_dir_exist_or_created(out_dir)
            .map_err(Error::from)
            .with_msg(format!("Failed to create backup target path {:?}", out_dir))?;

        for (db_number, db_name) in config.duplicate_targets() {
            warn!(
                "Target {}_{} is configured more than once, runs within the same second will collide",
                db_number, db_name
            );
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(self.concurrency.get())
            .thread_name(|i| format!("backup-worker-{i}"))
            .build()
            .map_err(Error::from)
            .with_msg("Failed to build backup worker pool")?;

        info!(
            "Backing up {} database(s) into {:?} with concurrency {}",
            config.targets().len(),
            out_dir,
            self.concurrency
        );

        let outcomes = pool.install(|| {
            config
                .targets()
                .par_iter()
                .map(|target| self.logger.in_scope(|| self.backup_target(target, out_dir)))
                .collect::<Vec<_>>()
        });

        let report = BackupReport { outcomes };
        info!(
            "Backup run finished: {} succeeded, {} failed",
            report.succeeded().count(),
            report.failed().count()
        );
        Ok(report)
    }

    fn backup_target(&self, target: &DbTarget, out_dir: &Path) -> TargetOutcome {
        let result = self.pipeline.run(target, out_dir, Local::now());
        match &result {
            Ok(path) => info!(
                "Successfully backed up and compressed database {} to {:?}",
                target.db_name(),
                path
            ),
            Err(e) => error!("Backup of database {} failed:\n{}", target.db_name(), e),
        }

        TargetOutcome {
            db_number: target.db_number().clone(),
            db_name: target.db_name().clone(),
            result,
        }
    }
}
