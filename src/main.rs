use clap::{Parser, ValueEnum};
use dbdump_backup::backup::backup_config::BackupConfig;
use dbdump_backup::backup::listing::list_backups;
use dbdump_backup::backup::logging::{LogSink, Logger};
use dbdump_backup::backup::orchestrator::BackupOrchestrator;
use dbdump_backup::backup::pipeline::CommandPipeline;
use dbdump_backup::backup::result_error::result::Result;
use std::io::Write;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::exit;
use tracing::error;

/// Dump configured databases into compressed files, or list what is there
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What to do
    #[arg(short, long, value_enum)]
    action: Action,
    /// Number of databases dumped at the same time
    #[arg(long, default_value = "3")]
    concurrency: NonZeroUsize,
    /// Location of config file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,
    /// Directory for the dated log file when `enable_logging` is set
    #[arg(long, default_value = ".")]
    log_dir: PathBuf,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Action {
    /// Back up every configured database
    Backup,
    /// List files in the backup directory
    List,
}

fn main() {
    let args = Args::parse();
    let bootstrap = Logger::stdout();

    if let Err(e) = run(&args, &mut std::io::stdout().lock()) {
        bootstrap.in_scope(|| error!("{e}"));
        exit(1);
    }
}

/// Everything the user is meant to read goes to `out`; logs go through the logger.
fn run<W: Write>(args: &Args, out: &mut W) -> Result<()> {
    let config = BackupConfig::load(&args.config)?;
    let logger = Logger::new(&LogSink::from_config(
        *config.enable_logging(),
        &args.log_dir,
    ))?;

    match args.action {
        Action::Backup => {
            let pipeline = CommandPipeline::new(config.tools().clone());
            BackupOrchestrator::new(pipeline, args.concurrency, logger).run(&config)?;
            writeln!(out, "All database backups completed.")?;
        }
        Action::List => {
            let listing = logger.in_scope(|| list_backups(config.out_dir()))?;
            writeln!(out, "{listing}")?;
        }
    }

    Ok(())
}
