use std::cell::RefCell;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context};
use wait_timeout::ChildExt;

use crate::util::shell_join;

/// One subprocess invocation: a program plus a structured argument list.
///
/// Nothing here is ever passed through a shell; the preview is for display only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    program: String,
    args: Vec<String>,
    cwd: Option<PathBuf>,
    stdin: Option<String>,
    capture_output: bool,
    timeout: Option<Duration>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Feed `data` to the child's stdin and close it.
    pub fn stdin(mut self, data: impl Into<String>) -> Self {
        self.stdin = Some(data.into());
        self
    }

    pub fn capture_output(mut self, capture: bool) -> Self {
        self.capture_output = capture;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    pub fn get_cwd(&self) -> Option<&PathBuf> {
        self.cwd.as_ref()
    }

    #[cfg(test)]
    pub(crate) fn stdin_data(&self) -> Option<&str> {
        self.stdin.as_deref()
    }

    /// Program followed by its arguments.
    pub fn argv(&self) -> Vec<String> {
        let mut v = Vec::with_capacity(self.args.len() + 1);
        v.push(self.program.clone());
        v.extend(self.args.iter().cloned());
        v
    }

    /// Shell-quoted rendering used for --verbose/--dry-run output and error messages.
    pub fn preview(&self) -> String {
        shell_join(&self.argv())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
    /// None when the process was terminated by a signal.
    pub code: Option<i32>,
    pub duration: Duration,
    pub stdout: String,
    pub stderr: String,
}

impl ExecOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    pub fn with_code(code: i32) -> Self {
        Self {
            code: Some(code),
            ..Self::default()
        }
    }
}

/// Seam between the handlers and the operating system.
pub trait Runner {
    fn run(&self, invocation: &Invocation) -> anyhow::Result<ExecOutput>;

    /// True when commands are only printed, never executed.
    fn is_dry_run(&self) -> bool {
        false
    }
}

/// Executes invocations as real child processes.
///
/// Captured invocations fall back to `default_timeout`; streamed ones (composer, artisan,
/// interactive shells) run without a bound unless the invocation sets one.
#[derive(Debug, Clone)]
pub struct ExecService {
    default_timeout: Duration,
    verbose: bool,
}

impl ExecService {
    pub fn new(default_timeout: Duration) -> Self {
        Self {
            default_timeout,
            verbose: false,
        }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

impl Default for ExecService {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl Runner for ExecService {
    fn run(&self, request: &Invocation) -> anyhow::Result<ExecOutput> {
        if self.verbose {
            eprintln!("larabox: exec: {}", request.preview());
        }
        tracing::debug!(command = %request.preview(), "spawning");

        let mut cmd = Command::new(&request.program);
        cmd.args(&request.args);
        if let Some(ref cwd) = request.cwd {
            cmd.current_dir(cwd);
        }
        if request.capture_output {
            cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        }
        if request.stdin.is_some() {
            cmd.stdin(Stdio::piped());
        }

        let mut child = cmd.spawn().map_err(|e| {
            let kind = e.kind();
            anyhow::Error::new(io::Error::new(
                kind,
                format!("failed to spawn {}: {e}", request.program),
            ))
        })?;

        // Drain pipes on helper threads so a chatty child cannot block on a full pipe.
        let stdout_reader = child.stdout.take().map(spawn_reader);
        let stderr_reader = child.stderr.take().map(spawn_reader);

        if let Some(data) = &request.stdin {
            if let Some(mut pipe) = child.stdin.take() {
                pipe.write_all(data.as_bytes())
                    .context("failed to write child stdin")?;
            }
        }

        let timeout = request.timeout.or(if request.capture_output {
            Some(self.default_timeout)
        } else {
            None
        });
        let started = Instant::now();
        let status = match timeout {
            Some(t) if !t.is_zero() => match child
                .wait_timeout(t)
                .context("failed to wait with timeout")?
            {
                Some(status) => status,
                None => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(anyhow!(
                        "command `{}` timed out after {:?}",
                        request.preview(),
                        t
                    ));
                }
            },
            _ => child.wait().context("failed to wait for process")?,
        };
        let duration = started.elapsed();

        let stdout = join_reader(stdout_reader)?;
        let stderr = join_reader(stderr_reader)?;
        tracing::debug!(code = ?status.code(), ?duration, "finished");

        Ok(ExecOutput {
            code: status.code(),
            duration,
            stdout,
            stderr,
        })
    }
}

type ReaderHandle = std::thread::JoinHandle<io::Result<String>>;

fn spawn_reader<R: Read + Send + 'static>(mut pipe: R) -> ReaderHandle {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        pipe.read_to_end(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    })
}

fn join_reader(handle: Option<ReaderHandle>) -> anyhow::Result<String> {
    match handle {
        Some(h) => h
            .join()
            .map_err(|_| anyhow!("output reader thread panicked"))?
            .context("failed to read process output"),
        None => Ok(String::new()),
    }
}

/// Prints each invocation instead of running it; every command "succeeds".
#[derive(Debug, Default, Clone)]
pub struct DryRunService;

impl Runner for DryRunService {
    fn run(&self, invocation: &Invocation) -> anyhow::Result<ExecOutput> {
        eprintln!("larabox: would run: {}", invocation.preview());
        Ok(ExecOutput::with_code(0))
    }

    fn is_dry_run(&self) -> bool {
        true
    }
}

/// Scripted reply used by [`RecordingRunner`].
#[derive(Debug, Clone)]
struct Reply {
    needle: String,
    output: ExecOutput,
    remaining: Option<usize>,
}

/// Records every invocation and answers from a list of scripted replies.
///
/// A reply matches when its needle is a substring of the invocation preview; the first
/// matching reply wins. Unmatched invocations succeed with empty output.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    calls: RefCell<Vec<Invocation>>,
    replies: RefCell<Vec<Reply>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer invocations containing `needle` with the given exit code and stdout.
    pub fn reply(&self, needle: &str, code: i32, stdout: &str) -> &Self {
        self.push_reply(needle, code, stdout, None)
    }

    /// Like [`reply`](Self::reply) but only for the next `times` matches.
    pub fn reply_times(&self, needle: &str, code: i32, stdout: &str, times: usize) -> &Self {
        self.push_reply(needle, code, stdout, Some(times))
    }

    fn push_reply(&self, needle: &str, code: i32, stdout: &str, remaining: Option<usize>) -> &Self {
        self.replies.borrow_mut().push(Reply {
            needle: needle.to_string(),
            output: ExecOutput {
                code: Some(code),
                stdout: stdout.to_string(),
                ..ExecOutput::default()
            },
            remaining,
        });
        self
    }

    /// Answer `docker inspect` with a running container state.
    pub fn with_running_container(self) -> Self {
        self.reply("inspect", 0, r#"{"Status":"running","Running":true}"#);
        self
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }

    /// Previews of every recorded invocation, in order.
    pub fn previews(&self) -> Vec<String> {
        self.calls.borrow().iter().map(Invocation::preview).collect()
    }
}

impl Runner for RecordingRunner {
    fn run(&self, invocation: &Invocation) -> anyhow::Result<ExecOutput> {
        self.calls.borrow_mut().push(invocation.clone());
        let preview = invocation.preview();
        let mut replies = self.replies.borrow_mut();
        for reply in replies.iter_mut() {
            if reply.remaining == Some(0) || !preview.contains(&reply.needle) {
                continue;
            }
            if let Some(n) = reply.remaining.as_mut() {
                *n -= 1;
            }
            return Ok(reply.output.clone());
        }
        Ok(ExecOutput::with_code(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_quotes_arguments() {
        let inv = Invocation::new("docker")
            .args(["exec", "app"])
            .arg("pkill")
            .arg("-f")
            .arg("artisan serve --port=8000");
        assert_eq!(
            inv.preview(),
            "docker exec app pkill -f 'artisan serve --port=8000'"
        );
    }

    #[test]
    fn recording_runner_replies_in_order_and_counts_down() {
        let r = RecordingRunner::new();
        r.reply_times("probe", 1, "", 2).reply("probe", 0, "ok");
        let inv = Invocation::new("probe");
        assert_eq!(r.run(&inv).unwrap().code, Some(1));
        assert_eq!(r.run(&inv).unwrap().code, Some(1));
        let out = r.run(&inv).unwrap();
        assert!(out.success());
        assert_eq!(out.stdout, "ok");
        assert_eq!(r.calls().len(), 3);
    }

    #[test]
    fn unmatched_invocations_succeed() {
        let r = RecordingRunner::new();
        assert!(r.run(&Invocation::new("true")).unwrap().success());
    }

    #[cfg(unix)]
    #[test]
    fn exec_service_captures_stdout_and_code() {
        let svc = ExecService::default();
        let out = svc
            .run(
                &Invocation::new("sh")
                    .args(["-c", "echo hello; exit 3"])
                    .capture_output(true),
            )
            .unwrap();
        assert_eq!(out.code, Some(3));
        assert_eq!(out.stdout.trim(), "hello");
    }

    #[cfg(unix)]
    #[test]
    fn exec_service_feeds_stdin() {
        let svc = ExecService::default();
        let out = svc
            .run(&Invocation::new("cat").stdin("piped\n").capture_output(true))
            .unwrap();
        assert_eq!(out.stdout, "piped\n");
    }

    #[cfg(unix)]
    #[test]
    fn exec_service_times_out() {
        let svc = ExecService::new(Duration::from_millis(100));
        let err = svc
            .run(&Invocation::new("sleep").arg("5").capture_output(true))
            .unwrap_err();
        assert!(err.to_string().contains("timed out"), "{err}");
    }

    #[test]
    fn missing_program_is_not_found() {
        let svc = ExecService::default();
        let err = svc
            .run(&Invocation::new("larabox-definitely-missing-binary"))
            .unwrap_err();
        let io = err.downcast_ref::<io::Error>().expect("io error");
        assert_eq!(io.kind(), io::ErrorKind::NotFound);
    }
}
