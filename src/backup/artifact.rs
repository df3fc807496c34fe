use crate::backup::backup_config::DbTarget;
use chrono::{DateTime, TimeZone};
use getset::Getters;
use std::fmt::Display;
use std::path::{Path, PathBuf};

static TIME_FORMAT: &str = "%Y%m%d_%H%M%S";
pub static ARTIFACT_EXT: &str = "sql.gz";
static TMP_EXT: &str = "tmp";

/// `{db_number}_{db_name}_{YYYYMMDD_HHMMSS}.sql.gz`
pub fn artifact_file_name<O: Display, T: TimeZone<Offset = O>>(
    target: &DbTarget,
    captured_at: &DateTime<T>,
) -> String {
    format!(
        "{}_{}_{}.{}",
        target.db_number(),
        target.db_name(),
        captured_at.format(TIME_FORMAT),
        ARTIFACT_EXT
    )
}

/// Where a pipeline writes while running, and where the result ends up.
#[derive(Clone, Debug, Getters)]
#[getset(get = "pub")]
pub struct ArtifactPaths {
    final_path: PathBuf,
    tmp_path: PathBuf,
}

impl ArtifactPaths {
    pub fn new<P: AsRef<Path>, O: Display, T: TimeZone<Offset = O>>(
        out_dir: P,
        target: &DbTarget,
        captured_at: &DateTime<T>,
    ) -> Self {
        let file_name = artifact_file_name(target, captured_at);
        let out_dir = out_dir.as_ref();
        Self {
            tmp_path: out_dir.join(format!("{file_name}.{TMP_EXT}")),
            final_path: out_dir.join(file_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn orders() -> DbTarget {
        DbTarget::builder()
            .db_number("01")
            .db_name("orders")
            .db_user("root")
            .db_password("pw")
            .db_host("localhost")
            .build()
    }

    #[test]
    fn test_artifact_file_name() {
        let captured_at = Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap();
        assert_eq!(
            artifact_file_name(&orders(), &captured_at),
            "01_orders_20240305_120000.sql.gz"
        );
    }

    #[test]
    fn test_artifact_file_name_second_precision() {
        let captured_at = Utc
            .with_ymd_and_hms(2023, 12, 31, 23, 59, 58)
            .unwrap()
            .checked_add_signed(chrono::Duration::milliseconds(999))
            .unwrap();
        assert_eq!(
            artifact_file_name(&orders(), &captured_at),
            "01_orders_20231231_235958.sql.gz"
        );
    }

    #[test]
    fn test_artifact_paths() {
        let captured_at = Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap();
        let paths = ArtifactPaths::new("/backups", &orders(), &captured_at);

        assert_eq!(
            paths.final_path(),
            Path::new("/backups/01_orders_20240305_120000.sql.gz")
        );
        assert_eq!(
            paths.tmp_path(),
            Path::new("/backups/01_orders_20240305_120000.sql.gz.tmp")
        );
    }
}
