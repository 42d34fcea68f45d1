use crate::matcher::FontMatcher;
use crate::{Context, DetectError, Detector, InstallStatus};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// How long to wait for the font lister to exit after it was killed or its output ended.
pub const WAIT_DELAY: Duration = Duration::from_millis(10);

/// How often the output loop wakes up to check for cancellation.
#[cfg(unix)]
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Runs `fc-list` (fontconfig) and checks every line of its output for a Nerd Font name.
///
/// The program is looked up in `PATH` once, when the detector is built; if it was missing,
/// the detector returns [`DetectError::ToolNotFound`]. Output is read line by line, and the
/// process is killed as soon as a line matches or the [`Context`] is cancelled.
///
/// This is a no-op on non-Unix systems.
#[derive(Debug, Clone)]
#[cfg_attr(not(unix), allow(dead_code))]
pub struct FontConfigDetector {
    program: String,
    executable: Option<PathBuf>,
    args: Vec<OsString>,
    wait_delay: Duration,
    matcher: Arc<FontMatcher>,
}

impl FontConfigDetector {
    pub fn new() -> Self {
        Self::with_command("fc-list", None::<&str>)
    }

    /// Run a different line-oriented font lister.
    pub fn with_command<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let program = program.into();
        let executable = resolve_executable(&program);

        Self {
            program,
            executable,
            args: args.into_iter().map(Into::into).collect(),
            wait_delay: WAIT_DELAY,
            matcher: FontMatcher::nerd_fonts(),
        }
    }

    pub fn wait_delay(mut self, wait_delay: Duration) -> Self {
        self.wait_delay = wait_delay;
        self
    }

    pub fn matcher(mut self, matcher: Arc<FontMatcher>) -> Self {
        self.matcher = matcher;
        self
    }

    /// Where the program was found, if it was.
    pub fn executable(&self) -> Option<&Path> {
        self.executable.as_deref()
    }
}

#[cfg(unix)]
fn resolve_executable(program: &str) -> Option<PathBuf> {
    unix::resolve_program(program, &unix::parse_system_path())
}

#[cfg(not(unix))]
fn resolve_executable(_program: &str) -> Option<PathBuf> {
    None
}

impl Default for FontConfigDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for FontConfigDetector {
    fn name(&self) -> &str {
        &self.program
    }

    #[cfg(unix)]
    fn detect(&self, cx: &Context) -> Result<InstallStatus, DetectError> {
        let Some(executable) = &self.executable else {
            return Err(DetectError::ToolNotFound(self.program.clone()));
        };

        unix::run(self, executable, cx)
    }

    #[cfg(not(unix))]
    fn detect(&self, _cx: &Context) -> Result<InstallStatus, DetectError> {
        Ok(InstallStatus::NotInstalled)
    }
}

#[cfg(unix)]
mod unix {
    use super::{FontConfigDetector, POLL_INTERVAL};
    use crate::{Context, DetectError, InstallStatus};
    use std::io::{BufRead, BufReader};
    use std::path::{Path, PathBuf};
    use std::process::{Child, Command, Stdio};
    use std::sync::mpsc::{self, RecvTimeoutError};
    use std::thread;
    use std::time::{Duration, Instant};

    pub(super) fn run(
        detector: &FontConfigDetector,
        program: &Path,
        cx: &Context,
    ) -> Result<InstallStatus, DetectError> {
        let spawn_error = |source| DetectError::Spawn {
            program: detector.program.clone(),
            source,
        };

        let mut child = Command::new(program)
            .args(&detector.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(spawn_error)?;

        let Some(stdout) = child.stdout.take() else {
            terminate(child, detector.wait_delay);
            return Err(spawn_error(std::io::Error::other("stdout was not captured")));
        };

        // Reading happens on its own thread so that cancellation is noticed even while the
        // child is silent. The thread ends once the pipe closes, which killing the child does.
        let (lines_tx, lines_rx) = mpsc::channel::<String>();
        thread::spawn(move || {
            let mut reader = BufReader::new(stdout);
            let mut buf = vec![];
            loop {
                buf.clear();
                match reader.read_until(b'\n', &mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(_) => {
                        let line = String::from_utf8_lossy(&buf).trim_end().to_owned();
                        if lines_tx.send(line).is_err() {
                            break;
                        }
                    }
                }
            }
        });

        loop {
            if cx.is_cancelled() {
                terminate(child, detector.wait_delay);
                return Err(DetectError::Cancelled);
            }

            match lines_rx.recv_timeout(POLL_INTERVAL) {
                Ok(line) => {
                    if detector.matcher.is_match(&line) {
                        #[cfg(feature = "log")]
                        log::debug!("{} listed a nerd font: {line}", detector.program);

                        terminate(child, detector.wait_delay);
                        return Ok(InstallStatus::Installed);
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        // output is done; give the child a moment to exit on its own
        if !wait_with_delay(&mut child, detector.wait_delay) {
            terminate(child, detector.wait_delay);
        }

        Ok(InstallStatus::NotInstalled)
    }

    /// Kills the child. If it isn't reaped within `wait_delay`, a thread waits for it instead,
    /// so it never lingers as a zombie.
    pub(super) fn terminate(mut child: Child, wait_delay: Duration) {
        let _ = child.kill();

        if wait_with_delay(&mut child, wait_delay) {
            return;
        }

        #[cfg(feature = "log")]
        log::debug!("process {} did not exit within {wait_delay:?}", child.id());

        thread::spawn(move || {
            let _ = child.wait();
        });
    }

    /// Returns whether the child was reaped within `wait_delay`.
    fn wait_with_delay(child: &mut Child, wait_delay: Duration) -> bool {
        let deadline = Instant::now().checked_add(wait_delay);

        loop {
            match child.try_wait() {
                Ok(Some(_status)) => return true,
                Ok(None) => {}
                Err(_) => return false,
            }

            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                return false;
            }
            thread::sleep(Duration::from_millis(1));
        }
    }

    /// Check whether a file has executable permission bits set.
    fn is_executable(path: &Path) -> bool {
        use std::os::unix::fs::PermissionsExt;
        path.metadata()
            .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }

    /// Resolve a program to the first executable match in `path_entries`.
    ///
    /// Programs containing a path separator are used as-is.
    pub(super) fn resolve_program(program: &str, path_entries: &[PathBuf]) -> Option<PathBuf> {
        let as_path = Path::new(program);
        if as_path.components().count() > 1 {
            return is_executable(as_path).then(|| as_path.to_owned());
        }

        path_entries
            .iter()
            .map(|dir| dir.join(program))
            .find(|candidate| is_executable(candidate))
    }

    pub(super) fn parse_system_path() -> Vec<PathBuf> {
        std::env::var_os("PATH")
            .map(|path| std::env::split_paths(&path).collect())
            .unwrap_or_default()
    }
}

#[cfg(all(test, unix))]
mod test {
    use crate::fontconfig::FontConfigDetector;
    use crate::fontconfig::unix::{parse_system_path, resolve_program, terminate};
    use crate::{Context, DetectError, Detector, InstallStatus, detect_installed};
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};
    use std::process::Command;
    use std::thread;
    use std::time::{Duration, Instant};

    fn sh(script: &str) -> FontConfigDetector {
        FontConfigDetector::with_command("sh", ["-c", script])
    }

    #[test]
    fn test_matching_line() {
        let detector = sh(
            "echo '/usr/share/fonts/noto/NotoSans-Regular.ttf: Noto Sans:style=Regular'; \
             echo '/usr/share/fonts/TTF/HackNerdFont-Regular.ttf: Hack Nerd Font:style=Regular'",
        );

        assert_eq!(detector.detect(&Context::new()).unwrap(), InstallStatus::Installed);
    }

    #[test]
    fn test_no_matching_line() {
        let detector = sh("echo 'DejaVu Sans Mono'; echo 'Inconsolata'");

        assert_eq!(detector.detect(&Context::new()).unwrap(), InstallStatus::NotInstalled);
    }

    #[test]
    fn test_match_does_not_wait_for_remaining_output() {
        let detector = sh("echo 'Hack NFM'; sleep 30");

        let start = Instant::now();
        assert_eq!(detector.detect(&Context::new()).unwrap(), InstallStatus::Installed);
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_missing_tool() {
        let name = "definitely-not-a-font-lister";
        let detector = FontConfigDetector::with_command(name, None::<&str>);
        assert_eq!(detector.executable(), None);

        let err = detector.detect(&Context::new()).unwrap_err();
        assert!(matches!(err, DetectError::ToolNotFound(missing) if missing == name));
    }

    #[test]
    fn test_program_resolved_when_built() {
        let detector = FontConfigDetector::with_command("sh", None::<&str>);
        assert!(detector.executable().is_some_and(Path::is_absolute));

        let dir = tempfile::tempdir().unwrap();
        let lister = dir.path().join("font-lister");
        fs::write(&lister, "#!/bin/sh\necho 'Hack Nerd Font'\n").unwrap();
        fs::set_permissions(&lister, fs::Permissions::from_mode(0o755)).unwrap();

        let detector = FontConfigDetector::with_command(lister.to_str().unwrap(), None::<&str>);
        assert_eq!(detector.executable(), Some(lister.as_path()));

        // the remembered path is used as-is, so a vanished program fails to spawn
        fs::remove_file(&lister).unwrap();
        assert!(matches!(
            detector.detect(&Context::new()),
            Err(DetectError::Spawn { .. })
        ));
    }

    #[test]
    fn test_cancel_returns_promptly() {
        let detector = sh("sleep 30");
        let cx = Context::new();

        let canceller = cx.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            canceller.cancel();
        });

        let start = Instant::now();
        let result = detector.detect(&cx);
        assert!(matches!(result, Err(DetectError::Cancelled)));
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_timeout_returns_promptly() {
        let detector = sh("sleep 30");
        let cx = Context::with_timeout(Duration::from_millis(100));

        let start = Instant::now();
        assert!(matches!(detector.detect(&cx), Err(DetectError::Cancelled)));
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_chain_returns_promptly_when_cancelled() {
        let chain: [Box<dyn Detector>; 2] =
            [Box::new(sh("sleep 30")), Box::new(sh("echo 'Hack NF'"))];
        let cx = Context::with_timeout(Duration::from_millis(100));

        let start = Instant::now();
        let err = detect_installed(&cx, &chain).unwrap_err();
        assert!(err.errors().all(|e| matches!(e, DetectError::Cancelled)));
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_resolve_program() {
        let path = parse_system_path();

        let sh = resolve_program("sh", &path).unwrap();
        assert!(sh.is_absolute());
        assert_eq!(resolve_program(sh.to_str().unwrap(), &[]), Some(sh.clone()));

        let missing = [PathBuf::from("/this/path/does/not/exist")];
        assert_eq!(resolve_program("sh", &missing), None);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_terminate_reaps_slow_exit() {
        let child = Command::new("sleep").arg("30").spawn().unwrap();
        let proc_entry = PathBuf::from(format!("/proc/{}", child.id()));

        terminate(child, Duration::ZERO);

        let start = Instant::now();
        while proc_entry.exists() && start.elapsed() < Duration::from_secs(5) {
            thread::sleep(Duration::from_millis(10));
        }
        assert!(!proc_entry.exists(), "killed child was never reaped");
    }
}
