use crate::error::{Result, ShellError};
use std::collections::HashMap;
use std::env as stdenv;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Mutable session context threaded through the pipeline runner.
///
/// The environment contains:
/// - `vars`: a snapshot of environment variables, used for `PATH`/`HOME` lookups and
///   handed to spawned programs.
/// - `current_dir`: the working directory builtins and external programs observe.
///
/// The only place that changes the process-wide working directory is
/// [`Environment::change_dir`].
#[derive(Debug, Clone)]
pub struct Environment {
    /// Key-value store of environment variables (e.g., PATH, HOME).
    pub vars: HashMap<String, String>,
    /// The current working directory for command execution.
    pub current_dir: PathBuf,
}

impl Environment {
    /// Capture the current process state into a new `Environment` instance.
    pub fn new() -> Self {
        let vars = stdenv::vars().collect();
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self { vars, current_dir }
    }

    /// Get the value of an environment variable.
    ///
    /// Looks up the key in `self.vars` first, falling back to `std::env::var`.
    pub fn get_var(&self, key: &str) -> Option<String> {
        self.vars
            .get(key)
            .cloned()
            .or_else(|| stdenv::var(key).ok())
    }

    /// Set or override an environment variable in `self.vars`.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }

    /// Interpret `path` relative to the session working directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.current_dir.join(path)
        }
    }

    /// Change the working directory of both this context and the process.
    ///
    /// On failure nothing is modified.
    pub fn change_dir(&mut self, target: &Path) -> Result<()> {
        let dir_error = |source| ShellError::Directory {
            path: target.to_path_buf(),
            source,
        };
        // An empty target would otherwise resolve to the current directory.
        if target.as_os_str().is_empty() {
            return Err(dir_error(io::Error::from(io::ErrorKind::NotFound)));
        }
        let new_dir = self.resolve(target);

        let canonical = fs::canonicalize(&new_dir).map_err(dir_error)?;
        if !canonical.is_dir() {
            return Err(dir_error(io::Error::from(io::ErrorKind::NotADirectory)));
        }
        stdenv::set_current_dir(&canonical).map_err(dir_error)?;

        debug!(from = %self.current_dir.display(), to = %canonical.display(), "changed directory");
        self.current_dir = canonical;
        Ok(())
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{env_in, lock_current_dir};
    use super::*;

    #[test]
    fn test_env_set_and_get_var() {
        let mut env = env_in(&stdenv::temp_dir());

        // initially absent
        assert_eq!(env.get_var("SOME_RANDOM_ENV_VAR_12345"), None);

        env.set_var("KEY", "VALUE");

        assert_eq!(env.get_var("KEY"), Some("VALUE".to_string()));
    }

    #[test]
    fn test_env_reads_from_process_env() {
        let env = Environment::new();
        assert!(env.get_var("PATH").is_some());
    }

    #[test]
    fn test_resolve_relative_against_current_dir() {
        let env = env_in(Path::new("/srv/data"));
        assert_eq!(env.resolve(Path::new("logs")), PathBuf::from("/srv/data/logs"));
        assert_eq!(env.resolve(Path::new("/etc")), PathBuf::from("/etc"));
    }

    #[test]
    fn test_change_dir_relative() {
        let _lock = lock_current_dir();
        let orig = stdenv::current_dir().unwrap();
        let temp = tempfile::tempdir().unwrap();
        let root = fs::canonicalize(temp.path()).unwrap();
        fs::create_dir(root.join("nested")).unwrap();

        let mut env = env_in(&root);
        env.change_dir(Path::new("nested")).unwrap();

        assert_eq!(env.current_dir, root.join("nested"));
        assert_eq!(fs::canonicalize(stdenv::current_dir().unwrap()).unwrap(), root.join("nested"));

        stdenv::set_current_dir(orig).unwrap();
    }

    #[test]
    fn test_change_dir_missing_leaves_state_untouched() {
        let _lock = lock_current_dir();
        let orig = stdenv::current_dir().unwrap();
        let mut env = env_in(&orig);

        let err = env.change_dir(Path::new("/does/not/exist")).unwrap_err();

        assert!(matches!(err, ShellError::Directory { .. }));
        assert_eq!(env.current_dir, orig);
        assert_eq!(stdenv::current_dir().unwrap(), orig);
    }

    #[test]
    fn test_change_dir_empty_target_is_missing() {
        let _lock = lock_current_dir();
        let orig = stdenv::current_dir().unwrap();
        let mut env = env_in(&orig);

        let err = env.change_dir(Path::new("")).unwrap_err();

        match err {
            ShellError::Directory { source, .. } => {
                assert_eq!(source.kind(), io::ErrorKind::NotFound)
            }
            other => panic!("expected Directory, got {other:?}"),
        }
        assert_eq!(env.current_dir, orig);
        assert_eq!(stdenv::current_dir().unwrap(), orig);
    }

    #[test]
    fn test_change_dir_to_file_is_rejected() {
        let _lock = lock_current_dir();
        let orig = stdenv::current_dir().unwrap();
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("plain.txt");
        fs::write(&file, "x").unwrap();

        let mut env = env_in(&orig);
        let err = env.change_dir(&file).unwrap_err();

        assert!(matches!(err, ShellError::Directory { .. }));
        assert_eq!(stdenv::current_dir().unwrap(), orig);
    }
}
