use crate::backup::artifact::ArtifactPaths;
use crate::backup::backup_config::{DbTarget, ToolsConfig};
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use crate::backup::result_error::{WithDebugObjectAndFnName, WithMsg};
use chrono::{DateTime, Local};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};
use tracing::{debug, info};
use validator::Validate;

/// Produces one backup artifact for one target.
///
/// Implementations must be shareable across worker threads; the orchestrator
/// calls `run` concurrently for different targets.
pub trait DumpPipeline: Send + Sync {
    /// Returns the path of the finished artifact inside `out_dir`.
    fn run(&self, target: &DbTarget, out_dir: &Path, captured_at: DateTime<Local>)
        -> Result<PathBuf>;
}

/// `dump_program | compress_program > artifact`, run as two child processes.
#[derive(Clone, Debug, Default)]
pub struct CommandPipeline {
    tools: ToolsConfig,
}

impl CommandPipeline {
    pub fn new(tools: ToolsConfig) -> Self {
        Self { tools }
    }

    fn dump_command(&self, target: &DbTarget) -> Command {
        let mut cmd = Command::new(&**self.tools.dump_program());
        cmd.arg("-h")
            .arg(target.db_host())
            .arg("-u")
            .arg(target.db_user())
            .arg(format!("-p{}", target.db_password().expose()))
            .arg(target.db_name())
            .stdin(Stdio::null())
            .stdout(Stdio::piped());
        cmd
    }

    fn spawn_compressor(&self, input: ChildStdout, output: File) -> io::Result<Child> {
        // The command owns the parent's copy of the pipe and drops it on return,
        // so the compressor sees end of input as soon as the dump exits.
        Command::new(&**self.tools.compress_program())
            .stdin(Stdio::from(input))
            .stdout(Stdio::from(output))
            .spawn()
    }

    fn dump_and_compress(&self, target: &DbTarget, output: File) -> Result<()> {
        let dump_program = self.tools.dump_program();
        let compress_program = self.tools.compress_program();
        let db_name = target.db_name();

        let mut dump = self
            .dump_command(target)
            .spawn()
            .map_err(Error::from)
            .with_msg(format!(
                "Failed to start {} for database {}",
                dump_program, db_name
            ))?;

        let Some(dump_stdout) = dump.stdout.take() else {
            reap(&mut dump);
            return Err(Error::MissingStdout {
                program: dump_program.to_string(),
            });
        };

        let mut compressor = match self.spawn_compressor(dump_stdout, output) {
            Ok(child) => child,
            Err(e) => {
                reap(&mut dump);
                return Err(Error::from(e).with_msg(format!(
                    "Failed to start {} for database {}",
                    compress_program, db_name
                )));
            }
        };
        debug!(
            "Started {} (pid {}) | {} (pid {}) for database {}",
            dump_program,
            dump.id(),
            compress_program,
            compressor.id(),
            db_name
        );

        let dump_status = dump.wait().map_err(Error::from);
        let dump_result = dump_status.and_then(|status| {
            if status.success() {
                Ok(())
            } else {
                Err(Error::process_failed(dump_program.to_string(), status))
            }
        });
        if let Err(e) = dump_result {
            reap(&mut compressor);
            return Err(e.with_msg(format!(
                "Failed to complete {} for database {}",
                dump_program, db_name
            )));
        }

        compressor
            .wait()
            .map_err(Error::from)
            .and_then(|status| {
                if status.success() {
                    Ok(())
                } else {
                    Err(Error::process_failed(compress_program.to_string(), status))
                }
            })
            .with_msg(format!(
                "Failed to complete {} for database {}",
                compress_program, db_name
            ))
    }
}

/// Kills and waits for a child whose result no longer matters.
fn reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

impl DumpPipeline for CommandPipeline {
    fn run(
        &self,
        target: &DbTarget,
        out_dir: &Path,
        captured_at: DateTime<Local>,
    ) -> Result<PathBuf> {
        target
            .validate()
            .map_err(Error::from)
            .with_msg(format!("Invalid target for database {}", target.db_name()))?;

        let paths = ArtifactPaths::new(out_dir, target, &captured_at);
        let output = File::create_new(paths.tmp_path())
            .map_err(Error::from)
            .with_msg(format!("Failed to create backup file {:?}", paths.tmp_path()))?;

        info!(
            "Backing up database {} from {} into {:?}",
            target.db_name(),
            target.db_host(),
            paths.final_path()
        );

        self.dump_and_compress(target, output)
            .and_then(|_| {
                std::fs::rename(paths.tmp_path(), paths.final_path())
                    .map_err(Error::from)
                    .with_msg(format!(
                        "Failed to move {:?} to {:?}",
                        paths.tmp_path(),
                        paths.final_path()
                    ))
            })
            .map(|_| paths.final_path().clone())
            .map_err(|mut e| {
                if let Err(e2) = std::fs::remove_file(paths.tmp_path()) {
                    e = e.chain(Error::from(e2).with_msg(format!(
                        "Failed to remove partial backup file {:?}",
                        paths.tmp_path()
                    )));
                }
                e
            })
            .with_debug_object_and_fn_name(target.clone(), "dump_pipeline")
    }
}
