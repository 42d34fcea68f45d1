use crate::matcher::{FontFileType, FontMatcher};
use crate::{Context, DetectError, Detector, InstallStatus};
use std::fs::ReadDir;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// How many levels below a root the filesystem detector looks. Entries directly inside a root
/// are at depth 1.
pub const MAX_DEPTH: usize = 4;

/// Font directories that are scanned by default. `~/` is relative to the home directory.
pub const FONT_DIRECTORIES: &[&str] = &[
    "/usr/share/fonts",
    "/usr/local/share/fonts",
    "/var/lib/snapd/desktop/fonts",
    "~/.fonts",
    "~/.local/share/fonts",
];

#[cfg(target_os = "macos")]
const MACOS_FONT_DIRECTORIES: &[&str] = &[
    "/Library/Fonts",
    "/System/Library/Fonts",
    "~/Library/Fonts",
];

/// Looks for font files with a Nerd Font name in a set of font directories.
///
/// Each root is walked up to [`MAX_DEPTH`] levels deep. Only `.ttf`, `.otf`, `.woff` and
/// `.woff2` files are considered, and the first file whose name matches stops the whole scan.
/// Symlinked directories are not followed, and subtrees that can't be read are skipped.
///
/// This is a no-op on non-Unix systems.
///
/// # Example
///
/// ```
/// use nerdfont_detect::{Context, Detector, FilesystemDetector};
///
/// let detector = FilesystemDetector::new(["~/.fonts", "/opt/fonts"]).max_depth(2);
/// let _ = detector.detect(&Context::new());
/// ```
#[derive(Debug, Clone)]
pub struct FilesystemDetector {
    roots: Vec<PathBuf>,
    max_depth: usize,
    matcher: Arc<FontMatcher>,
}

enum Walk {
    Found(PathBuf),
    Exhausted,
    Cancelled,
}

impl FilesystemDetector {
    /// Roots starting with `~/` are resolved against the home directory now, and dropped if
    /// there is no home directory.
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let home = std::env::home_dir();

        let mut expanded: Vec<PathBuf> = vec![];
        for root in roots {
            let Some(root) = expand_home(root.as_ref(), home.as_deref()) else {
                continue;
            };
            if !expanded.contains(&root) {
                expanded.push(root);
            }
        }

        Self {
            roots: expanded,
            max_depth: MAX_DEPTH,
            matcher: FontMatcher::nerd_fonts(),
        }
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn matcher(mut self, matcher: Arc<FontMatcher>) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    fn scan_root(&self, cx: &Context, root: &Path) -> Result<Walk, DetectError> {
        let scan_error = |source| DetectError::Scan {
            path: root.to_owned(),
            source,
        };

        match root.metadata() {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => return Ok(Walk::Exhausted),
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Walk::Exhausted),
            Err(e) => return Err(scan_error(e)),
        }

        let entries = root.read_dir().map_err(scan_error)?;

        Ok(self.scan_dir(cx, entries, 1))
    }

    /// `depth` is the depth of the entries yielded by `entries`.
    fn scan_dir(&self, cx: &Context, entries: ReadDir, depth: usize) -> Walk {
        if depth > self.max_depth {
            return Walk::Exhausted;
        }
        if cx.is_cancelled() {
            return Walk::Cancelled;
        }

        for entry in entries.flatten() {
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            let path = entry.path();

            if file_type.is_dir() {
                if depth >= self.max_depth {
                    continue;
                }

                let sub_entries = match path.read_dir() {
                    Ok(sub_entries) => sub_entries,
                    Err(_e) => {
                        #[cfg(feature = "log")]
                        log::debug!("skipping font directory {path:?} because {_e}");

                        continue;
                    }
                };

                match self.scan_dir(cx, sub_entries, depth + 1) {
                    Walk::Exhausted => {}
                    done => return done,
                }
            } else if self.is_nerd_font_file(&path) {
                return Walk::Found(path);
            }
        }

        Walk::Exhausted
    }

    fn is_nerd_font_file(&self, path: &Path) -> bool {
        // the extension check is much cheaper than running the matchers
        if FontFileType::from_path_ext(path).is_none() {
            return false;
        }

        path.file_name()
            .is_some_and(|name| self.matcher.is_match(&name.to_string_lossy()))
    }
}

impl Detector for FilesystemDetector {
    fn name(&self) -> &str {
        "filesystem"
    }

    fn detect(&self, cx: &Context) -> Result<InstallStatus, DetectError> {
        if !cfg!(unix) {
            return Ok(InstallStatus::NotInstalled);
        }

        let mut errors = vec![];

        for root in &self.roots {
            match self.scan_root(cx, root) {
                Ok(Walk::Found(_path)) => {
                    #[cfg(feature = "log")]
                    log::debug!("found nerd font file {_path:?}");

                    return Ok(InstallStatus::Installed);
                }
                Ok(Walk::Exhausted) => {}
                Ok(Walk::Cancelled) => {
                    errors.push(DetectError::Cancelled);
                    break;
                }
                Err(e) => errors.push(e),
            }
        }

        match DetectError::join(errors) {
            Some(error) => Err(error),
            None => Ok(InstallStatus::NotInstalled),
        }
    }
}

impl Default for FilesystemDetector {
    fn default() -> Self {
        Self::new(default_roots())
    }
}

#[cfg(unix)]
fn default_roots() -> Vec<PathBuf> {
    let xdg = xdg::BaseDirectories::new();

    let mut directories: Vec<PathBuf> = FONT_DIRECTORIES.iter().map(PathBuf::from).collect();

    #[cfg(target_os = "macos")]
    directories.extend(MACOS_FONT_DIRECTORIES.iter().map(PathBuf::from));

    xdg.data_dirs
        .into_iter()
        .map(|data_dir| data_dir.join("fonts"))
        .for_each(|dir| directories.push(dir));

    directories
}

#[cfg(not(unix))]
fn default_roots() -> Vec<PathBuf> {
    vec![]
}

fn expand_home(path: &Path, home: Option<&Path>) -> Option<PathBuf> {
    match path.strip_prefix("~") {
        Ok(rest) => home.map(|home| home.join(rest)),
        Err(_) => Some(path.to_owned()),
    }
}
