//! Turns out knowing whether Nerd Fonts can be used is kind of hard.
//!
//! This crate, `nerdfont-detect`, gives applications a best-effort answer to "are Nerd Fonts
//! installed, or did the user explicitly turn them on or off?", so they can decide between
//! decorative glyphs and plain text. It cannot tell whether the terminal emulator actually
//! renders with a Nerd Font; see <https://github.com/ryanoasis/nerd-fonts/discussions/829>.
//!
//! # Quick start
//!
//! ```
//! use nerdfont_detect::{Context, InstallStatus};
//!
//! match nerdfont_detect::detect(&Context::new()) {
//!     Ok(InstallStatus::Enabled) => println!("nerd fonts were explicitly enabled"),
//!     Ok(InstallStatus::Installed) => println!("nerd fonts are installed"),
//!     Ok(_) => println!("nerd fonts are disabled or not installed"),
//!     Err(e) => println!("nerd fonts were not found:\n{e}"),
//! }
//! ```
//!
//! # High level design
//!
//! Detection runs a chain of [Detector]s in order, and stops at the first one that reports
//! [InstallStatus::Enabled], [InstallStatus::Disabled] or [InstallStatus::Installed].
//! A detector that fails returns a [DetectError]; the chain continues, and the errors are only
//! handed back (joined together) if nothing was found. Treat an error the same as
//! [InstallStatus::NotInstalled].
//!
//! The default chain, from [default_detectors], is:
//!
//! 1.  *Environment variables* `NERD_FONTS` (preferred), `NERDFONTS` and `NF_FONTS`, parsed as
//!     booleans. These are explicit user opinions and always win. See [EnvVarDetector].
//! 2.  *Font directories*, scanned for font files with a Nerd Font name (Unix only).
//!     See [FilesystemDetector].
//! 3.  *`fc-list`*, whose output is matched line by line (Unix only). See [FontConfigDetector].
//! 4.  *GDI font enumeration* (Windows only). See [GdiDetector].
//!
//! Cheap, explicit checks come first and invasive ones last. To add your own checks, start
//! from [default_detectors] and put yours in front, or pick and choose.

mod context;
mod env;
mod error;
mod fontconfig;
mod fs;
mod gdi;
mod matcher;
mod status;

pub use context::Context;
pub use env::EnvVarDetector;
pub use error::DetectError;
pub use fontconfig::{FontConfigDetector, WAIT_DELAY};
pub use fs::{FONT_DIRECTORIES, FilesystemDetector, MAX_DEPTH};
pub use gdi::{FamilySource, GdiDetector, SystemFamilies};
pub use matcher::{FontFileType, FontMatcher, NERD_FONT_PATTERNS};
pub use status::InstallStatus;

/// Environment variables read by the default chain, most preferred first.
pub const ENV_VARS: [&str; 3] = ["NERD_FONTS", "NERDFONTS", "NF_FONTS"];

/// A single check contributing to the detection.
///
/// `Err` means the check could not run; it counts as [InstallStatus::NotInstalled].
/// Closures taking a [Context] are detectors too.
pub trait Detector {
    /// Short name used in log output.
    fn name(&self) -> &str;

    fn detect(&self, cx: &Context) -> Result<InstallStatus, DetectError>;
}

impl<F> Detector for F
where
    F: Fn(&Context) -> Result<InstallStatus, DetectError>,
{
    fn name(&self) -> &str {
        "custom"
    }

    fn detect(&self, cx: &Context) -> Result<InstallStatus, DetectError> {
        self(cx)
    }
}

/// The detectors used when none are given, explicit signals first.
pub fn default_detectors() -> Vec<Box<dyn Detector>> {
    let mut detectors: Vec<Box<dyn Detector>> = ENV_VARS
        .into_iter()
        .map(|name| Box::new(EnvVarDetector::new(name)) as Box<dyn Detector>)
        .collect();

    detectors.push(Box::new(FilesystemDetector::default()));
    detectors.push(Box::new(FontConfigDetector::new()));
    detectors.push(Box::new(GdiDetector::new()));

    detectors
}

/// Runs [default_detectors].
pub fn detect(cx: &Context) -> Result<InstallStatus, DetectError> {
    detect_installed(cx, &[])
}

/// Runs `detectors` in order until one of them reports a terminal status.
///
/// An empty slice means [default_detectors]. Errors from detectors don't stop the chain, and
/// are discarded once a terminal status is found. If the chain runs out, the result is
/// `Ok(NotInstalled)` or, when detectors failed along the way, all of their errors joined.
/// A cancelled [Context] stops the chain before the next detector runs.
pub fn detect_installed(
    cx: &Context,
    detectors: &[Box<dyn Detector>],
) -> Result<InstallStatus, DetectError> {
    let defaults;
    let detectors = if detectors.is_empty() {
        defaults = default_detectors();
        defaults.as_slice()
    } else {
        detectors
    };

    let mut errors = vec![];

    for detector in detectors {
        if let Err(e) = cx.check() {
            errors.push(e);
            break;
        }

        match detector.detect(cx) {
            Ok(InstallStatus::NotInstalled) => {}
            Ok(status) => {
                #[cfg(feature = "log")]
                log::debug!("detector {} reported {status}", detector.name());

                return Ok(status);
            }
            Err(e) => {
                #[cfg(feature = "log")]
                log::debug!("detector {} failed: {e}", detector.name());

                errors.push(e);
            }
        }
    }

    match DetectError::join(errors) {
        Some(error) => Err(error),
        None => Ok(InstallStatus::NotInstalled),
    }
}
