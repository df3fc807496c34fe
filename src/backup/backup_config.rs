use crate::backup::redacted::RedactedString;
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use crate::backup::result_error::WithMsg;
use crate::backup::validate::validate_file_name_component;
use bon::Builder;
use getset::Getters;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;
use validator::Validate;

pub static DEFAULT_DUMP_PROGRAM: &str = "mysqldump";
pub static DEFAULT_COMPRESS_PROGRAM: &str = "gzip";

/// Top level configuration, loaded once per invocation and never mutated.
#[derive(Clone, Serialize, Deserialize, Debug, Builder, Getters)]
#[getset(get = "pub")]
pub struct BackupConfig {
    /// Directory the artifacts are written to and listed from
    #[serde(rename = "backup_target_path")]
    #[builder(into)]
    out_dir: Arc<Path>,
    /// Log to a dated file instead of stdout
    #[serde(default)]
    #[builder(default)]
    enable_logging: bool,
    #[serde(rename = "dblists", default)]
    #[builder(into, default)]
    targets: Arc<Vec<DbTarget>>,
    #[serde(default)]
    #[builder(default)]
    tools: ToolsConfig,
}

/// One database to back up.
///
/// Missing fields load as empty strings; a target that cannot be dumped fails
/// on its own when its pipeline runs. `db_number` and `db_name` become part of
/// the artifact file name, so they are validated before a pipeline touches the
/// filesystem.
#[derive(Clone, Serialize, Deserialize, Debug, Validate, Builder, Getters)]
#[getset(get = "pub")]
pub struct DbTarget {
    #[serde(default)]
    #[validate(custom(function = validate_file_name_component))]
    #[builder(into)]
    db_number: String,
    #[serde(default)]
    #[validate(custom(function = validate_file_name_component))]
    #[builder(into)]
    db_name: String,
    #[serde(default)]
    #[builder(into)]
    db_user: String,
    #[serde(default)]
    #[builder(into)]
    db_password: RedactedString,
    #[serde(default)]
    #[builder(into)]
    db_host: String,
    #[serde(default)]
    #[builder(into, default)]
    remark: String,
}

/// External programs the dump pipeline shells out to.
#[derive(Clone, Serialize, Deserialize, Debug, Getters)]
#[serde(default)]
#[getset(get = "pub")]
pub struct ToolsConfig {
    dump_program: Arc<str>,
    compress_program: Arc<str>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DUMP_PROGRAM, DEFAULT_COMPRESS_PROGRAM)
    }
}

impl ToolsConfig {
    pub fn new<A: Into<Arc<str>>, B: Into<Arc<str>>>(dump_program: A, compress_program: B) -> Self {
        Self {
            dump_program: dump_program.into(),
            compress_program: compress_program.into(),
        }
    }
}

impl BackupConfig {
    /// Reads and parses the JSON config at `path`.
    ///
    /// Only well-formedness is checked here; nothing on disk besides the config
    /// file itself is touched.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(Error::from)
            .with_msg(format!("Failed to open config file {:?}", path))?;

        serde_json::from_reader(BufReader::new(file))
            .map_err(Error::from)
            .with_msg(format!("Failed to parse config file {:?}", path))
    }

    /// `(db_number, db_name)` pairs that occur more than once.
    ///
    /// Such targets produce the same artifact name when captured within the
    /// same second.
    pub fn duplicate_targets(&self) -> Vec<(&str, &str)> {
        self.targets
            .iter()
            .map(|t| (t.db_number.as_str(), t.db_name.as_str()))
            .duplicates()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    static SAMPLE: &str = r#"{
        "backup_target_path": "/var/backups/mysql",
        "enable_logging": true,
        "dblists": [
            {"db_number": "01", "db_name": "orders", "db_user": "root",
             "db_password": "s3cret", "db_host": "10.0.0.1", "remark": "primary"},
            {"db_number": "02", "db_name": "users", "db_user": "backup",
             "db_password": "pw", "db_host": "10.0.0.2", "remark": ""}
        ]
    }"#;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_config() {
        let file = write_config(SAMPLE);
        let config = BackupConfig::load(file.path()).unwrap();

        assert_eq!(&**config.out_dir(), Path::new("/var/backups/mysql"));
        assert!(*config.enable_logging());
        assert_eq!(config.targets().len(), 2);

        let first = &config.targets()[0];
        assert_eq!(first.db_number(), "01");
        assert_eq!(first.db_name(), "orders");
        assert_eq!(first.db_user(), "root");
        assert_eq!(first.db_password().expose(), "s3cret");
        assert_eq!(first.db_host(), "10.0.0.1");
        assert_eq!(first.remark(), "primary");

        assert_eq!(&**config.tools().dump_program(), DEFAULT_DUMP_PROGRAM);
        assert_eq!(&**config.tools().compress_program(), DEFAULT_COMPRESS_PROGRAM);
    }

    #[test]
    fn test_load_config_with_tools_and_unknown_fields() {
        let file = write_config(
            r#"{
                "backup_target_path": "out",
                "enable_logging": false,
                "dblists": [],
                "tools": {"compress_program": "zstd"},
                "comment": "ignored"
            }"#,
        );
        let config = BackupConfig::load(file.path()).unwrap();

        assert!(config.targets().is_empty());
        assert_eq!(&**config.tools().dump_program(), DEFAULT_DUMP_PROGRAM);
        assert_eq!(&**config.tools().compress_program(), "zstd");
    }

    #[test]
    fn test_load_missing_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let err = BackupConfig::load(tmp.path().join("config.json")).unwrap_err();
        assert!(err.to_string().starts_with("Failed to open config file"));
    }

    #[test]
    fn test_load_malformed_json() {
        let file = write_config("{ \"backup_target_path\": ");
        let err = BackupConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse config file"));
    }

    #[test]
    fn test_load_target_with_missing_fields() {
        let file = write_config(
            r#"{
                "backup_target_path": "out",
                "dblists": [
                    {"db_number": "01", "db_name": "orders", "db_user": "root",
                     "db_password": "pw", "db_host": "10.0.0.1"},
                    {"db_number": "02", "db_name": "users"},
                    {}
                ]
            }"#,
        );
        let config = BackupConfig::load(file.path()).unwrap();

        assert_eq!(config.targets().len(), 3);
        let partial = &config.targets()[1];
        assert_eq!(partial.db_name(), "users");
        assert!(partial.db_host().is_empty());
        assert!(partial.db_user().is_empty());
        assert!(partial.db_password().expose().is_empty());
        assert!(partial.validate().is_ok());
        assert!(config.targets()[2].validate().is_err());
    }

    #[test]
    fn test_load_wrong_shape() {
        let file = write_config(r#"{"backup_target_path": 42}"#);
        assert!(BackupConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_target_debug_redacts_password() {
        let file = write_config(SAMPLE);
        let config = BackupConfig::load(file.path()).unwrap();
        let debug_str = format!("{:?}", config);
        assert!(!debug_str.contains("s3cret"));
        assert!(debug_str.contains("orders"));
    }

    #[test]
    fn test_target_validation() {
        let valid = DbTarget::builder()
            .db_number("01")
            .db_name("orders")
            .db_user("root")
            .db_password("pw")
            .db_host("localhost")
            .build();
        assert!(valid.validate().is_ok());

        let invalid = DbTarget::builder()
            .db_number("01")
            .db_name("../orders")
            .db_user("root")
            .db_password("pw")
            .db_host("localhost")
            .build();
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_duplicate_targets() {
        let target = |number: &str, name: &str| {
            DbTarget::builder()
                .db_number(number)
                .db_name(name)
                .db_user("u")
                .db_password("p")
                .db_host("h")
                .build()
        };
        let config = BackupConfig::builder()
            .out_dir(Path::new("out"))
            .targets(vec![
                target("01", "orders"),
                target("02", "orders"),
                target("01", "orders"),
            ])
            .build();

        assert_eq!(config.duplicate_targets(), vec![("01", "orders")]);
    }
}
