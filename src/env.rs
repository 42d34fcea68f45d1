use crate::{Context, DetectError, Detector, InstallStatus};
use std::env::VarError;

type Lookup = Box<dyn Fn(&str) -> Result<String, VarError>>;

/// Reads an environment variable as an explicit user opinion.
///
/// Unset or empty means no opinion ([`InstallStatus::NotInstalled`]). Otherwise the value is
/// parsed as a boolean: `1`, `t`, `true` enable, `0`, `f`, `false` disable (also in upper case
/// and title case). Anything else is an error.
pub struct EnvVarDetector {
    name: String,
    lookup: Lookup,
}

impl EnvVarDetector {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_lookup(name, |key: &str| std::env::var(key))
    }

    /// Use a custom variable lookup instead of the process environment.
    pub fn with_lookup<F>(name: impl Into<String>, lookup: F) -> Self
    where
        F: Fn(&str) -> Result<String, VarError> + 'static,
    {
        Self {
            name: name.into(),
            lookup: Box::new(lookup),
        }
    }
}

impl Detector for EnvVarDetector {
    fn name(&self) -> &str {
        &self.name
    }

    fn detect(&self, _cx: &Context) -> Result<InstallStatus, DetectError> {
        let value = match (self.lookup)(&self.name) {
            Ok(value) => value,
            Err(VarError::NotPresent) => return Ok(InstallStatus::NotInstalled),
            Err(VarError::NotUnicode(value)) => {
                return Err(DetectError::InvalidEnvVar {
                    name: self.name.clone(),
                    value: value.to_string_lossy().into_owned(),
                });
            }
        };

        if value.is_empty() {
            return Ok(InstallStatus::NotInstalled);
        }

        match parse_bool(&value) {
            Some(true) => Ok(InstallStatus::Enabled),
            Some(false) => Ok(InstallStatus::Disabled),
            None => Err(DetectError::InvalidEnvVar {
                name: self.name.clone(),
                value,
            }),
        }
    }
}

pub(crate) fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}
