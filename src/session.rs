//! One foreground tool process at a time: start, wait, clean.
//!
//! A [`Session`] is bound to a resolved executable and its fixed arguments. It
//! owns at most one live child; `wait` always clears it, so the same session can
//! be run again after any completed run, successful or not.
use std::ffi::{OsStr, OsString};
use std::fs::{File, OpenOptions};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

use tracing::{debug, instrument, warn};
use url::Url;

use crate::errors::{Result, SensibleError};
use crate::scratch;
use crate::tool::ToolKind;

/// Where a standard stream of the spawned tool is connected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Redirect {
    #[default]
    Inherit,
    Null,
    /// Read from (stdin) or append to (stdout/stderr) this file.
    File(PathBuf),
}

impl Redirect {
    fn stdio(&self, writable: bool) -> io::Result<Stdio> {
        let Redirect::File(p) = self else {
            return Ok(match self {
                Redirect::Null => Stdio::null(),
                _ => Stdio::inherit(),
            });
        };
        let opened = if writable {
            OpenOptions::new().create(true).append(true).open(p)
        } else {
            File::open(p)
        };
        // Name the redirect target; the tool itself was never involved.
        opened.map(Stdio::from).map_err(|e| {
            io::Error::new(
                e.kind(),
                format!("failed to open redirect {}: {e}", p.display()),
            )
        })
    }
}

/// Process attributes applied when spawning. When set on a session they replace
/// the defaults wholesale; fields are not merged with the inherited ones.
#[derive(Debug, Clone, Default)]
pub struct SpawnAttrs {
    cwd: Option<PathBuf>,
    env: Option<Vec<(OsString, OsString)>>,
    stdin: Redirect,
    stdout: Redirect,
    stderr: Redirect,
}

impl SpawnAttrs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Replace the child's environment with exactly these variables.
    pub fn env<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<OsString>,
        V: Into<OsString>,
    {
        self.env = Some(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    pub fn stdin(mut self, r: Redirect) -> Self {
        self.stdin = r;
        self
    }

    pub fn stdout(mut self, r: Redirect) -> Self {
        self.stdout = r;
        self
    }

    pub fn stderr(mut self, r: Redirect) -> Self {
        self.stderr = r;
        self
    }

    fn apply(&self, cmd: &mut Command, piped_stdin: bool) -> io::Result<()> {
        if let Some(ref dir) = self.cwd {
            cmd.current_dir(dir);
        }
        if let Some(ref vars) = self.env {
            cmd.env_clear();
            for (k, v) in vars {
                cmd.env(k, v);
            }
        }
        if !piped_stdin {
            cmd.stdin(self.stdin.stdio(false)?);
        }
        cmd.stdout(self.stdout.stdio(true)?);
        cmd.stderr(self.stderr.stdio(true)?);
        Ok(())
    }
}

/// A resolved tool plus its (at most one) running process.
#[derive(Debug)]
pub struct Session {
    kind: ToolKind,
    path: PathBuf,
    args: Vec<String>,
    attrs: Option<SpawnAttrs>,
    child: Option<Child>,
    feeder: Option<Receiver<io::Result<u64>>>,
}

impl Session {
    pub fn new(kind: ToolKind, path: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            kind,
            path: path.into(),
            args,
            attrs: None,
            child: None,
            feeder: None,
        }
    }

    pub fn kind(&self) -> ToolKind {
        self.kind
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Arguments passed before any positional input.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn set_spawn_attrs(&mut self, attrs: Option<SpawnAttrs>) {
        self.attrs = attrs;
    }

    pub fn is_running(&self) -> bool {
        self.child.is_some()
    }

    /// OS process id of the live child, if any.
    pub fn id(&self) -> Option<u32> {
        self.child.as_ref().map(Child::id)
    }

    /// Launch the tool with `inputs` appended to its arguments. Does not block.
    #[instrument(level = "debug", skip_all, fields(tool = %self.kind, program = %self.path.display()))]
    pub fn start<I, S>(&mut self, inputs: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        if self.child.is_some() {
            return Err(SensibleError::AlreadyRunning);
        }
        let mut cmd = self.command(inputs, false)?;
        let child = cmd.spawn().map_err(|e| self.spawn_failed(e))?;
        debug!(pid = child.id(), "started");
        self.child = Some(child);
        Ok(())
    }

    /// Launch the tool with `reader` streamed into its standard input.
    ///
    /// The reader is drained on a feeder thread; if the tool exits before
    /// consuming everything the remaining input is dropped.
    #[instrument(level = "debug", skip_all, fields(tool = %self.kind, program = %self.path.display()))]
    pub fn start_reader<R>(&mut self, reader: R) -> Result<()>
    where
        R: Read + Send + 'static,
    {
        if self.child.is_some() {
            return Err(SensibleError::AlreadyRunning);
        }
        let mut cmd = self.command(std::iter::empty::<&OsStr>(), true)?;
        cmd.stdin(Stdio::piped());
        let mut child = cmd.spawn().map_err(|e| self.spawn_failed(e))?;
        let Some(stdin) = child.stdin.take() else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(SensibleError::Io(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "child stdin was not captured",
            )));
        };
        let (tx, rx) = mpsc::channel();
        let feeder = thread::Builder::new()
            .name("sensible-feed".to_string())
            .spawn(move || feed(reader, stdin, tx));
        match feeder {
            Ok(_) => {
                debug!(pid = child.id(), "started with piped stdin");
                self.feeder = Some(rx);
                self.child = Some(child);
                Ok(())
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                Err(SensibleError::Io(e))
            }
        }
    }

    /// Block until the running tool exits. The session is cleared whatever the outcome.
    #[instrument(level = "debug", skip_all, fields(tool = %self.kind, program = %self.path.display()))]
    pub fn wait(&mut self) -> Result<()> {
        let mut child = self.child.take().ok_or(SensibleError::NotRunning)?;
        let feeder = self.feeder.take();
        let status = child.wait()?;
        debug!(%status, "exited");

        let fed = match feeder.map(|rx| rx.try_recv()) {
            Some(Ok(r)) => Some(r),
            Some(Err(TryRecvError::Empty)) => {
                warn!("tool exited before its input was drained; abandoning feeder");
                None
            }
            Some(Err(TryRecvError::Disconnected)) => {
                warn!("stdin feeder panicked");
                None
            }
            None => None,
        };

        if !status.success() {
            return Err(SensibleError::NonZeroExit {
                program: self.path.clone(),
                status,
            });
        }
        if let Some(Err(e)) = fed {
            warn!(error = %e, "failed to feed tool input");
            return Err(SensibleError::Io(e));
        }
        Ok(())
    }

    /// `start` followed by `wait`.
    pub fn run<I, S>(&mut self, inputs: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.start(inputs)?;
        self.wait()
    }

    /// Open `files` in the tool and wait for it to exit.
    pub fn edit<P: AsRef<Path>>(&mut self, files: &[P]) -> Result<()> {
        self.run(files.iter().map(|p| p.as_ref().as_os_str()))
    }

    /// Open `urls` in the tool and wait for it to exit.
    pub fn browse(&mut self, urls: &[Url]) -> Result<()> {
        self.run(urls.iter().map(Url::as_str))
    }

    /// Show everything `reader` yields in the tool and wait for it to exit.
    pub fn page<R>(&mut self, reader: R) -> Result<()>
    where
        R: Read + Send + 'static,
    {
        self.start_reader(reader)?;
        self.wait()
    }

    /// Stage `text` in a scratch file, run the tool on it, and return what the
    /// file holds afterwards.
    pub fn edit_tmp(&mut self, text: &str) -> Result<String> {
        scratch::round_trip(self, text)
    }

    fn command<I, S>(&self, inputs: I, piped_stdin: bool) -> Result<Command>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = Command::new(&self.path);
        cmd.args(&self.args);
        cmd.args(inputs);
        if let Some(ref attrs) = self.attrs {
            attrs.apply(&mut cmd, piped_stdin)?;
        }
        Ok(cmd)
    }

    fn spawn_failed(&self, source: io::Error) -> SensibleError {
        SensibleError::SpawnFailed {
            program: self.path.clone(),
            hint: self.kind.spawn_hint(),
            source,
        }
    }
}

impl Drop for Session {
    /// A session dropped mid-run takes its child down with it and reaps it.
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            warn!(pid = child.id(), program = %self.path.display(), "session dropped while running; killing tool");
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// Copy `reader` into the child's stdin. The outcome is sent before the pipe is
/// closed, so it is already queued by the time a tool that reads to EOF exits.
fn feed<R: Read>(mut reader: R, mut stdin: ChildStdin, done: Sender<io::Result<u64>>) {
    let res = match io::copy(&mut reader, &mut stdin) {
        Ok(n) => Ok(n),
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(0),
        Err(e) => Err(e),
    };
    let _ = done.send(res);
    drop(stdin);
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Session {
        Session::new(
            ToolKind::Editor,
            "/bin/sh",
            vec!["-c".to_string(), script.to_string(), "sh".to_string()],
        )
    }

    #[test]
    fn test_wait_without_start_is_not_running() {
        let mut s = sh("exit 0");
        assert!(matches!(s.wait(), Err(SensibleError::NotRunning)));
    }

    #[test]
    fn test_session_is_reusable_after_success() {
        let mut s = sh("exit 0");
        s.run(std::iter::empty::<&str>()).expect("first run");
        assert!(!s.is_running());
        s.run(std::iter::empty::<&str>()).expect("second run");
    }

    #[test]
    fn test_non_zero_exit_clears_handle() {
        let mut s = sh("exit 3");
        match s.run(std::iter::empty::<&str>()) {
            Err(SensibleError::NonZeroExit { status, .. }) => assert_eq!(status.code(), Some(3)),
            other => panic!("expected NonZeroExit, got {other:?}"),
        }
        assert!(!s.is_running());
        assert!(matches!(s.wait(), Err(SensibleError::NotRunning)));
    }

    #[test]
    fn test_inputs_follow_fixed_args() {
        let td = tempfile::tempdir().expect("tmpdir");
        let out = td.path().join("argv");
        let mut s = sh("printf '%s\\n' \"$@\" > \"$OUT\"");
        s.set_spawn_attrs(Some(
            SpawnAttrs::new().env([("OUT", out.as_os_str().to_os_string())]),
        ));
        s.run(["a b", "c"]).expect("run");
        let got = std::fs::read_to_string(&out).expect("read argv");
        assert_eq!(got, "a b\nc\n");
    }

    #[test]
    fn test_spawn_attrs_cwd_and_stdout_redirect() {
        let td = tempfile::tempdir().expect("tmpdir");
        let log = td.path().join("out.log");
        let mut s = sh("pwd");
        s.set_spawn_attrs(Some(
            SpawnAttrs::new()
                .cwd(td.path())
                .stdin(Redirect::Null)
                .stdout(Redirect::File(log.clone())),
        ));
        s.run(std::iter::empty::<&str>()).expect("run");
        let got = std::fs::read_to_string(&log).expect("read log");
        let want = td.path().canonicalize().expect("canon");
        assert_eq!(std::path::Path::new(got.trim()).canonicalize().expect("canon"), want);
    }

    #[test]
    fn test_missing_program_is_spawn_failure() {
        let mut s = Session::new(ToolKind::Browser, "/nonexistent/sensible-tool", vec![]);
        let e = s
            .start(std::iter::empty::<&str>())
            .expect_err("spawn should fail");
        assert!(e.is_launch_failure());
        assert!(e.to_string().contains("$BROWSER"), "msg: {e}");
        assert!(!s.is_running());
    }

    #[test]
    fn test_missing_redirect_file_names_the_file() {
        let mut s = sh("exit 0");
        s.set_spawn_attrs(Some(
            SpawnAttrs::new().stdin(Redirect::File(PathBuf::from("/nonexistent/input"))),
        ));
        let e = s
            .start(std::iter::empty::<&str>())
            .expect_err("redirect cannot be opened");
        assert!(matches!(e, SensibleError::Io(_)), "got {e:?}");
        assert!(!e.is_launch_failure());
        assert_eq!(e.exit_code(), 1);
        let msg = e.to_string();
        assert!(msg.contains("/nonexistent/input"), "msg: {msg}");
        assert!(!msg.contains("failed to start"), "msg: {msg}");
        assert!(!s.is_running());
    }

    #[test]
    fn test_drop_kills_and_reaps_live_child() {
        let mut s = sh("sleep 30");
        s.start(std::iter::empty::<&str>()).expect("start");
        let pid = s.id().expect("pid of live child");
        drop(s);
        let alive = Command::new("kill")
            .arg("-0")
            .arg(pid.to_string())
            .stderr(Stdio::null())
            .status()
            .expect("run kill");
        assert!(!alive.success(), "child {pid} still exists after drop");
    }

    #[test]
    fn test_page_streams_reader_to_stdin() {
        let td = tempfile::tempdir().expect("tmpdir");
        let out = td.path().join("paged");
        let mut s = Session::new(
            ToolKind::Pager,
            "/bin/sh",
            vec!["-c".to_string(), format!("cat > '{}'", out.display())],
        );
        s.page(io::Cursor::new(b"a\nb\nc".to_vec())).expect("page");
        assert_eq!(std::fs::read_to_string(&out).expect("read"), "a\nb\nc");
    }

    #[test]
    fn test_page_survives_early_exit() {
        let mut s = Session::new(
            ToolKind::Pager,
            "/bin/sh",
            vec!["-c".to_string(), "head -c 1 >/dev/null".to_string()],
        );
        let big = vec![b'x'; 4 * 1024 * 1024];
        s.page(io::Cursor::new(big)).expect("page");
        assert!(!s.is_running());
    }
}
