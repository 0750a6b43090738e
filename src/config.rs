use std::{env, ffi::OsString, fs, path::PathBuf};

use crate::error::{TodoError, TodoResult};

const DEFAULT_DIR: &str = ".todo";
const DEFAULT_FILE: &str = "todolists.sqlite";
const LOG_FILE: &str = "todolists.log";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub db_path: PathBuf,
}

impl Config {
    /// `db` comes from `--db` or `TODOLISTS_DB`; otherwise the file lives
    /// under `$HOME/.todo/`.
    pub fn resolve(db: Option<PathBuf>) -> TodoResult<Config> {
        Config::resolve_with_home(db, env::var_os("HOME"))
    }

    fn resolve_with_home(db: Option<PathBuf>, home: Option<OsString>) -> TodoResult<Config> {
        let db_path = match db {
            Some(path) => path,
            None => {
                let home: PathBuf = home
                    .ok_or_else(|| {
                        TodoError::Config("could not determine home directory".to_string())
                    })?
                    .into();
                home.join(DEFAULT_DIR).join(DEFAULT_FILE)
            }
        };
        Ok(Config { db_path })
    }

    pub fn ensure_parent_dir(&self) -> TodoResult<()> {
        if let Some(dir) = self.db_path.parent() {
            if !dir.as_os_str().is_empty() && !dir.is_dir() {
                fs::create_dir_all(dir)?;
            }
        }
        Ok(())
    }

    pub fn log_path(&self) -> PathBuf {
        self.db_path.with_file_name(LOG_FILE)
    }
}
