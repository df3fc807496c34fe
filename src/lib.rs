//! # dbdump-backup
//!
//! Runs a database dump tool for each configured database, pipes the output
//! through a compressor and stores the result as a timestamped file.
//!
//! ## Features
//!
//! - **Bounded Concurrency**: At most N dumps run at the same time
//! - **Failure Isolation**: One failing database never stops the others
//! - **No Partial Artifacts**: Output is written to a temporary file and moved into place
//! - **Listing**: Shows the files currently in the backup directory
//!
//! ## Quick Start
//!
//! ```no_run
//! use dbdump_backup::backup::backup_config::BackupConfig;
//! use dbdump_backup::backup::logging::{LogSink, Logger};
//! use dbdump_backup::backup::orchestrator::BackupOrchestrator;
//! use dbdump_backup::backup::pipeline::CommandPipeline;
//! use std::num::NonZeroUsize;
//!
//! let config = BackupConfig::load("config.json")?;
//! let logger = Logger::new(&LogSink::from_config(*config.enable_logging(), "."))?;
//! let pipeline = CommandPipeline::new(config.tools().clone());
//! let concurrency = NonZeroUsize::new(3).ok_or("concurrency must be positive")?;
//!
//! let report = BackupOrchestrator::new(pipeline, concurrency, logger).run(&config)?;
//! println!("{} backups written", report.succeeded().count());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod backup;
