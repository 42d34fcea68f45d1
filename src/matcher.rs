use regex::Regex;
use std::path::Path;
use std::sync::{Arc, LazyLock};

/// Patterns that identify a Nerd Font by name.
///
/// Matches "nerd font", "nerd fonts", "NerdFont", "nerd_fonts" and so on, or a standalone
/// `NF`, `NFP` or `NFM` word as used in patched family names like "Hack NFM".
pub const NERD_FONT_PATTERNS: [&str; 2] = [r"(?i)nerd[\s_-]*fonts?", r"(?i)\bnf[pm]?\b"];

static DEFAULT_MATCHER: LazyLock<Arc<FontMatcher>> = LazyLock::new(|| {
    let matchers = NERD_FONT_PATTERNS
        .iter()
        .map(|pattern| Regex::new(pattern).expect("built-in pattern is valid"))
        .collect();

    Arc::new(FontMatcher { matchers })
});

/// A compiled set of font name patterns. A name matches if any pattern matches.
///
/// Built once and shared between detectors; it is never mutated afterwards.
#[derive(Debug, Clone)]
pub struct FontMatcher {
    matchers: Vec<Regex>,
}

impl FontMatcher {
    pub fn new<I, S>(patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let matchers = patterns
            .into_iter()
            .map(|pattern| Regex::new(pattern.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { matchers })
    }

    /// The shared matcher for [`NERD_FONT_PATTERNS`].
    pub fn nerd_fonts() -> Arc<FontMatcher> {
        Arc::clone(&DEFAULT_MATCHER)
    }

    pub fn is_match(&self, name: &str) -> bool {
        self.matchers.iter().any(|matcher| matcher.is_match(name))
    }
}

/// Font file formats that the filesystem detector looks at.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FontFileType {
    TrueType,
    OpenType,
    Woff,
    Woff2,
}

impl FontFileType {
    pub fn from_path_ext(path: &Path) -> Option<Self> {
        let ext = path.extension()?;
        let ext = ext.to_str()?;

        if ext.eq_ignore_ascii_case("ttf") {
            Some(FontFileType::TrueType)
        } else if ext.eq_ignore_ascii_case("otf") {
            Some(FontFileType::OpenType)
        } else if ext.eq_ignore_ascii_case("woff") {
            Some(FontFileType::Woff)
        } else if ext.eq_ignore_ascii_case("woff2") {
            Some(FontFileType::Woff2)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod test {
    use crate::matcher::{FontFileType, FontMatcher};
    use std::path::Path;

    #[test]
    fn test_nerd_font_names() {
        let matcher = FontMatcher::nerd_fonts();

        for name in [
            "JetBrainsMono Nerd Font",
            "Hack Nerd Font Mono",
            "NerdFontsSymbolsOnly.ttf",
            "symbols_nerd_fonts",
            "FiraCode-NERD-FONT",
            "Hack NF",
            "CaskaydiaCove NFM",
            "CaskaydiaCove NFP Bold",
            "/usr/share/fonts/TTF/JetBrainsMonoNLNerdFont-Bold.ttf: \
             JetBrainsMonoNL Nerd Font:style=Bold",
        ] {
            assert!(matcher.is_match(name), "{name} should match");
        }
    }

    #[test]
    fn test_other_font_names() {
        let matcher = FontMatcher::nerd_fonts();

        for name in [
            "DejaVu Sans Mono",
            "Inconsolata",
            "ConfigNFO",
            "Noto Sans CJK",
            "nfs-utils",
            "/usr/share/fonts/noto/NotoSans-Regular.ttf: Noto Sans:style=Regular",
        ] {
            assert!(!matcher.is_match(name), "{name} should not match");
        }
    }

    #[test]
    fn test_custom_matcher() {
        let matcher = FontMatcher::new(["(?i)powerline"]).unwrap();
        assert!(matcher.is_match("Meslo LG S for Powerline"));
        assert!(!matcher.is_match("Hack Nerd Font"));

        assert!(FontMatcher::new(["("]).is_err());
    }

    #[test]
    fn test_font_file_type() {
        let ty = |p: &str| FontFileType::from_path_ext(Path::new(p));

        assert_eq!(ty("a.ttf"), Some(FontFileType::TrueType));
        assert_eq!(ty("a.OTF"), Some(FontFileType::OpenType));
        assert_eq!(ty("a.woff"), Some(FontFileType::Woff));
        assert_eq!(ty("a.woff2"), Some(FontFileType::Woff2));
        assert_eq!(ty("a.pcf.gz"), None);
        assert_eq!(ty("fonts.dir"), None);
        assert_eq!(ty("ttf"), None);
    }
}
