use crate::env::Environment;
use crate::error::{Result, ShellError};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

/// A program outside the interpreter, invoked through `exec`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    name: String,
    args: Vec<String>,
}

impl ExternalCommand {
    pub fn new(name: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// Split `line` on single spaces: the first word names the program, the rest are
    /// passed through as arguments.
    pub fn from_command_line(line: &str) -> Self {
        let mut words = line.split(' ').map(str::to_string);
        let name = words.next().unwrap_or_default();
        Self::new(name, words.collect())
    }

    /// Run the program to completion and return everything it wrote to stdout.
    ///
    /// Standard input and standard error stay attached to the interpreter's own streams.
    pub fn run(&self, env: &Environment) -> Result<Vec<u8>> {
        let path = find_command_path(env, &self.name)?;
        debug!(program = %path.display(), args = ?self.args, "spawning");

        let process_error = |reason: String| ShellError::ExternalProcess {
            program: self.name.clone(),
            reason,
        };

        let child = Command::new(&path)
            .args(&self.args)
            .envs(env.vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .current_dir(&env.current_dir)
            .stdin(Stdio::inherit())
            .stderr(Stdio::inherit())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|e| process_error(e.to_string()))?;

        let output = child
            .wait_with_output()
            .map_err(|e| process_error(e.to_string()))?;
        debug!(program = %path.display(), status = %output.status, "exited");

        if output.status.success() {
            Ok(output.stdout)
        } else {
            Err(process_error(output.status.to_string()))
        }
    }
}

/// Resolve the program named by `name`.
///
/// Behavior:
/// - Absolute path: used as-is; a missing file surfaces later as a spawn failure.
/// - Otherwise, if `name` joined with the session working directory is a regular file,
///   that path is used.
/// - Otherwise each directory of `PATH` is searched for an executable file.
/// - Empty name or no match: [`ShellError::ExecutableNotFound`].
pub fn find_command_path(env: &Environment, name: &str) -> Result<PathBuf> {
    let not_found = || ShellError::ExecutableNotFound(name.to_string());
    if name.is_empty() {
        return Err(not_found());
    }

    let path = Path::new(name);
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }

    let local = env.current_dir.join(path);
    if local.is_file() {
        return Ok(local);
    }

    let search_paths = env.get_var("PATH").ok_or_else(not_found)?;
    find_in_path(OsStr::new(&search_paths), path).ok_or_else(not_found)
}

fn find_in_path(search_paths: &OsStr, cmd: &Path) -> Option<PathBuf> {
    std::env::split_paths(search_paths)
        .map(|dir| dir.join(cmd))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::testing::env_in;
    use std::fs;

    fn env_with_path(dir: &Path, search_paths: &str) -> Environment {
        let mut env = env_in(dir);
        env.set_var("PATH", search_paths);
        env
    }

    #[cfg(unix)]
    /// Writes a shell script and returns the command that runs it through `/bin/sh`.
    fn sh_script(dir: &Path, body: &str, args: &[&str]) -> ExternalCommand {
        let script = dir.join("script.sh");
        fs::write(&script, format!("{body}\n")).expect("write script");
        let mut argv = vec![script.to_string_lossy().into_owned()];
        argv.extend(args.iter().map(|a| a.to_string()));
        ExternalCommand::new("/bin/sh", argv)
    }

    #[test]
    fn absolute_is_used_directly() {
        let env = env_with_path(Path::new("/"), "/nowhere");
        let found = find_command_path(&env, "/bin/does-not-exist").unwrap();
        assert_eq!(found, PathBuf::from("/bin/does-not-exist"));
    }

    #[test]
    #[cfg(unix)]
    fn single_component_found_in_path() {
        let env = env_with_path(Path::new("/"), "/nonexistent:/bin");
        let found = find_command_path(&env, "sh").expect("Expected to find 'sh' in /bin");
        assert_eq!(found, PathBuf::from("/bin/sh"));
    }

    #[test]
    fn single_component_not_found_in_path() {
        let temp = tempfile::tempdir().unwrap();
        let env = env_with_path(temp.path(), "/bin");
        let err = find_command_path(&env, "nonexisting-program-xyz").unwrap_err();
        assert!(matches!(err, ShellError::ExecutableNotFound(name) if name == "nonexisting-program-xyz"));
    }

    #[test]
    fn working_directory_wins_over_path() {
        let temp = tempfile::tempdir().unwrap();
        fs::create_dir(temp.path().join("bin")).unwrap();
        fs::write(temp.path().join("bin").join("sh"), "").unwrap();

        let env = env_with_path(temp.path(), "/bin");
        let found = find_command_path(&env, "bin/sh").unwrap();
        assert_eq!(found, temp.path().join("bin").join("sh"));
    }

    #[test]
    #[cfg(unix)]
    fn non_executable_path_entries_are_skipped() {
        let temp = tempfile::tempdir().unwrap();
        let plain = temp.path().join("plain");
        fs::create_dir(&plain).unwrap();
        fs::write(plain.join("tool"), "").unwrap();

        let env = env_with_path(Path::new("/"), plain.to_str().unwrap());
        assert!(find_command_path(&env, "tool").is_err());
    }

    #[test]
    fn empty_name_is_not_found() {
        let env = env_with_path(Path::new("/"), "/bin");
        assert!(matches!(
            find_command_path(&env, ""),
            Err(ShellError::ExecutableNotFound(_))
        ));
    }

    #[test]
    fn command_line_split() {
        let cmd = ExternalCommand::from_command_line("ls -la /tmp");
        assert_eq!(cmd, ExternalCommand::new("ls", vec!["-la".into(), "/tmp".into()]));
    }

    #[test]
    #[cfg(unix)]
    fn run_captures_stdout() {
        let temp = tempfile::tempdir().unwrap();
        let greet = sh_script(temp.path(), "echo \"hi $1\"", &["there"]);

        let env = env_with_path(temp.path(), "/usr/bin:/bin");
        let out = greet.run(&env).unwrap();
        assert_eq!(out, b"hi there\n");
    }

    #[test]
    #[cfg(unix)]
    fn run_uses_session_working_directory() {
        let temp = tempfile::tempdir().unwrap();
        let canonical = fs::canonicalize(temp.path()).unwrap();
        let env = env_with_path(&canonical, "/usr/bin:/bin");

        let out = ExternalCommand::from_command_line("pwd").run(&env).unwrap();
        assert_eq!(String::from_utf8(out).unwrap().trim_end(), canonical.to_str().unwrap());
    }

    #[test]
    #[cfg(unix)]
    fn non_zero_exit_is_process_error() {
        let temp = tempfile::tempdir().unwrap();
        let fail = sh_script(temp.path(), "echo partial; exit 3", &[]);

        let env = env_with_path(temp.path(), "/usr/bin:/bin");
        let err = fail.run(&env).unwrap_err();
        match err {
            ShellError::ExternalProcess { program, reason } => {
                assert_eq!(program, "/bin/sh");
                assert!(reason.contains('3'), "unexpected reason {reason}");
            }
            other => panic!("expected ExternalProcess, got {other:?}"),
        }
    }

    #[test]
    fn missing_absolute_program_fails_to_spawn() {
        let env = env_with_path(Path::new("/"), "/bin");
        let err = ExternalCommand::from_command_line("/does/not/exist/prog")
            .run(&env)
            .unwrap_err();
        assert!(matches!(err, ShellError::ExternalProcess { .. }));
    }
}
