use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use crate::backup::result_error::WithMsg;
use crate::backup::validate::validate_dir_exist;
use derive_more::{Deref, From};
use std::fmt::{Display, Formatter};
use std::fs::read_dir;
use std::io;
use std::path::Path;

pub static EMPTY_LISTING_MSG: &str = "No backup files found";
pub static LISTING_HEADER: &str = "Backed-up files:";

/// Entry names of the backup directory, in the order the OS enumerated them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deref, From)]
pub struct BackupListing(Vec<String>);

impl Display for BackupListing {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return f.write_str(EMPTY_LISTING_MSG);
        }

        f.write_str(LISTING_HEADER)?;
        for name in &self.0 {
            write!(f, "\n{}", name)?;
        }
        Ok(())
    }
}

/// Non-recursive listing of `dir`.
pub fn list_backups<P: AsRef<Path>>(dir: P) -> Result<BackupListing> {
    let dir = dir.as_ref();
    let msg = || format!("Failed to read backup target path {:?}", dir);
    validate_dir_exist(dir).map_err(Error::from).with_msg(msg())?;

    read_dir(dir)
        .and_then(|entries| {
            entries
                .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
                .collect::<io::Result<Vec<_>>>()
        })
        .map(BackupListing::from)
        .map_err(Error::from)
        .with_msg(msg())
}
