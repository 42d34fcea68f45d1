use std::fmt;

/// The detected state of Nerd Fonts on this system.
///
/// The variants are not ordered. [`Enabled`](InstallStatus::Enabled) and
/// [`Disabled`](InstallStatus::Disabled) are explicit user declarations,
/// [`Installed`](InstallStatus::Installed) is passive evidence, and
/// [`NotInstalled`](InstallStatus::NotInstalled) means nothing was found.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum InstallStatus {
    /// Nerd Fonts were explicitly disabled by the user, e.g. `NERD_FONTS=0`.
    Disabled,
    /// Nerd Fonts were explicitly enabled by the user, e.g. `NERD_FONTS=1`.
    Enabled,
    /// No detector found any evidence. This is the safe fallback.
    NotInstalled,
    /// Nerd Font files or font families were found on the system.
    ///
    /// This does not mean the terminal emulator is configured to use them. A good use
    /// is to offer enabling glyphs, rather than enabling them outright.
    Installed,
}

impl InstallStatus {
    /// Whether this status halts a detection chain.
    pub fn is_terminal(self) -> bool {
        !matches!(self, InstallStatus::NotInstalled)
    }

    /// Whether this status came from an explicit user declaration.
    pub fn is_explicit(self) -> bool {
        matches!(self, InstallStatus::Enabled | InstallStatus::Disabled)
    }
}

impl fmt::Display for InstallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InstallStatus::Disabled => "disabled",
            InstallStatus::Enabled => "enabled",
            InstallStatus::NotInstalled => "not installed",
            InstallStatus::Installed => "installed",
        };

        f.write_str(s)
    }
}

#[cfg(test)]
mod test {
    use crate::InstallStatus;

    #[test]
    fn test_terminal_and_explicit() {
        assert!(InstallStatus::Enabled.is_terminal());
        assert!(InstallStatus::Disabled.is_terminal());
        assert!(InstallStatus::Installed.is_terminal());
        assert!(!InstallStatus::NotInstalled.is_terminal());

        assert!(InstallStatus::Enabled.is_explicit());
        assert!(InstallStatus::Disabled.is_explicit());
        assert!(!InstallStatus::Installed.is_explicit());
        assert!(!InstallStatus::NotInstalled.is_explicit());
    }

    #[test]
    fn test_display() {
        assert_eq!(InstallStatus::NotInstalled.to_string(), "not installed");
        assert_eq!(InstallStatus::Installed.to_string(), "installed");
        assert_eq!(InstallStatus::Enabled.to_string(), "enabled");
        assert_eq!(InstallStatus::Disabled.to_string(), "disabled");
    }
}
