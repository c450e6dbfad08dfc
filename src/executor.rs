//! Test command execution
//!
//! The test command is opaque: it's handed to the platform shell as-is and
//! only its exit status and output are interpreted.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::{MutationError, Result};

/// How often a running test command is polled when a timeout is set
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Outcome of one test command invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestResult {
    pub succeeded: bool,
    /// Trimmed stdout and stderr, newline-separated when both are present
    pub output: String,
    pub timed_out: bool,
    pub duration: Duration,
    /// `None` when the command was killed
    pub exit_code: Option<i32>,
}

impl TestResult {
    /// The shell couldn't find or execute the command (exit status 126 or 127)
    ///
    /// Only meaningful against the unmutated tree: a mutant may legitimately
    /// make a suite exit with these codes.
    pub fn command_not_found(&self) -> bool {
        cfg!(unix) && matches!(self.exit_code, Some(126 | 127))
    }
}

/// Something that can run the test suite once
pub trait TestExecutor {
    /// Run `command` to completion
    ///
    /// A test run that fails is `Ok` with `succeeded == false`. `Err` means the
    /// command could not be executed at all.
    fn run_tests(&self, command: &str) -> Result<TestResult>;
}

/// Runs test commands through the platform shell
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    working_dir: PathBuf,
    timeout: Option<Duration>,
}

impl ShellExecutor {
    pub fn new(working_dir: &Path) -> Self {
        Self {
            working_dir: working_dir.to_path_buf(),
            timeout: None,
        }
    }

    /// Kill the test command after `timeout` and report it as timed out
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn wait(&self, child: &mut Child, command: &str) -> Result<Option<ExitStatus>> {
        let execution_error = |e: std::io::Error| MutationError::TestExecutionError {
            command: command.to_string(),
            error: e.to_string(),
        };

        let Some(timeout) = self.timeout else {
            return child.wait().map(Some).map_err(execution_error);
        };

        let start = Instant::now();
        loop {
            if let Some(status) = child.try_wait().map_err(execution_error)? {
                return Ok(Some(status));
            }
            if start.elapsed() > timeout {
                kill_process_group(child);
                let _ = child.wait();
                return Ok(None);
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

impl TestExecutor for ShellExecutor {
    fn run_tests(&self, command: &str) -> Result<TestResult> {
        let start = Instant::now();
        debug!("running `{}` in {}", command, self.working_dir.display());

        let mut child = shell_command(command)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| MutationError::TestExecutionError {
                command: command.to_string(),
                error: e.to_string(),
            })?;

        // Drain both pipes concurrently so a chatty suite can't fill one and block
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let Some(status) = self.wait(&mut child, command)? else {
            debug!("`{}` timed out after {:?}", command, self.timeout);
            let stdout = stdout.map(collect).unwrap_or_default();
            let stderr = stderr.map(collect).unwrap_or_default();
            return Ok(TestResult {
                succeeded: false,
                output: combine_output(&stdout, &stderr),
                timed_out: true,
                duration: start.elapsed(),
                exit_code: None,
            });
        };

        let stdout = stdout.map(collect).unwrap_or_default();
        let stderr = stderr.map(collect).unwrap_or_default();

        Ok(TestResult {
            succeeded: status.success(),
            output: combine_output(&stdout, &stderr),
            timed_out: false,
            duration: start.elapsed(),
            exit_code: status.code(),
        })
    }
}

/// `sh -c` in a fresh process group, so a timeout can take down everything
/// the suite spawned
#[cfg(unix)]
fn shell_command(command: &str) -> Command {
    use std::os::unix::process::CommandExt;

    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command).process_group(0);
    cmd
}

#[cfg(windows)]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}

#[cfg(unix)]
fn kill_process_group(child: &mut Child) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    // The shell leads its own group; its pid is the group id
    if let Err(e) = killpg(Pid::from_raw(child.id() as i32), Signal::SIGKILL) {
        debug!("killpg failed: {}", e);
        let _ = child.kill();
    }
}

#[cfg(not(unix))]
fn kill_process_group(child: &mut Child) {
    let _ = child.kill();
}

fn drain<R: Read + Send + 'static>(mut stream: R) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = stream.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    })
}

fn collect(handle: JoinHandle<String>) -> String {
    handle.join().unwrap_or_default()
}

/// Join trimmed stdout and stderr, skipping whichever is empty
pub fn combine_output(stdout: &str, stderr: &str) -> String {
    [stdout.trim(), stderr.trim()]
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_output() {
        assert_eq!(combine_output("ok\n", ""), "ok");
        assert_eq!(combine_output("", "  boom \n"), "boom");
        assert_eq!(combine_output(" 3 passed \n", "\nwarning\n"), "3 passed\nwarning");
        assert_eq!(combine_output("  \n", "\t"), "");
        assert_eq!(combine_output("", ""), "");
    }

    #[cfg(unix)]
    mod shell {
        use super::super::*;

        fn executor() -> ShellExecutor {
            ShellExecutor::new(Path::new("."))
        }

        #[test]
        fn test_passing_command() {
            let result = executor().run_tests("echo all good").unwrap();
            assert!(result.succeeded);
            assert!(!result.timed_out);
            assert_eq!(result.output, "all good");
        }

        #[test]
        fn test_failing_command_captures_both_streams() {
            let result = executor()
                .run_tests("echo '1 failed'; echo 'assertion failed' >&2; exit 1")
                .unwrap();
            assert!(!result.succeeded);
            assert_eq!(result.output, "1 failed\nassertion failed");
        }

        #[test]
        fn test_missing_command_is_reported_as_not_found() {
            let result = executor()
                .run_tests("definitely-not-a-real-test-runner-7f3a")
                .unwrap();
            assert!(!result.succeeded);
            assert_eq!(result.exit_code, Some(127));
            assert!(result.command_not_found());
        }

        #[test]
        fn test_ordinary_failure_is_not_command_not_found() {
            let result = executor().run_tests("exit 101").unwrap();
            assert_eq!(result.exit_code, Some(101));
            assert!(!result.command_not_found());
        }

        #[test]
        fn test_spawn_failure_is_an_execution_error() {
            let result = ShellExecutor::new(Path::new("/definitely/not/a/dir-7f3a"))
                .run_tests("true");
            assert!(matches!(
                result,
                Err(MutationError::TestExecutionError { .. })
            ));
        }

        #[test]
        fn test_timeout() {
            let result = executor()
                .with_timeout(Some(Duration::from_millis(100)))
                .run_tests("sleep 5")
                .unwrap();
            assert!(result.timed_out);
            assert!(!result.succeeded);
            assert_eq!(result.exit_code, None);
            assert!(result.duration < Duration::from_secs(5));
        }

        #[test]
        fn test_timeout_kills_background_work() {
            let dir = tempfile::tempdir().unwrap();

            let result = ShellExecutor::new(dir.path())
                .with_timeout(Some(Duration::from_millis(200)))
                .run_tests("(sleep 1; touch late.txt); true")
                .unwrap();
            assert!(result.timed_out);

            // Long enough for an orphaned subshell to have written its file
            thread::sleep(Duration::from_millis(1500));
            assert!(!dir.path().join("late.txt").exists());
        }

        #[test]
        fn test_timeout_keeps_output_written_so_far() {
            let result = executor()
                .with_timeout(Some(Duration::from_millis(200)))
                .run_tests("echo started; sleep 5")
                .unwrap();
            assert!(result.timed_out);
            assert_eq!(result.output, "started");
        }

        #[test]
        fn test_runs_in_working_directory() {
            let dir = tempfile::tempdir().unwrap();
            std::fs::write(dir.path().join("marker.txt"), "here").unwrap();

            let result = ShellExecutor::new(dir.path())
                .run_tests("cat marker.txt")
                .unwrap();
            assert!(result.succeeded);
            assert_eq!(result.output, "here");
        }

        #[test]
        fn test_classification_is_stable() {
            let first = executor().run_tests("exit 3").unwrap();
            let second = executor().run_tests("exit 3").unwrap();
            assert_eq!(first.succeeded, second.succeeded);
            assert!(!first.succeeded);
        }
    }
}
