use std::io;
use std::path::PathBuf;

/// Why a detector could not produce evidence.
///
/// These errors are diagnostic. A detector that returns one is treated as having
/// found nothing, and the chain moves on to the next detector.
#[derive(Debug, thiserror::Error)]
pub enum DetectError {
    #[error("env var `{name}` is not a boolean: {value:?}")]
    InvalidEnvVar { name: String, value: String },
    #[error("`{0}` was not found in PATH")]
    ToolNotFound(String),
    #[error("failed to run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to scan font directory {path:?}: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("detection was cancelled")]
    Cancelled,
    #[error("{}", display_joined(.0))]
    Multiple(Vec<DetectError>),
}

impl DetectError {
    /// Combines a list of errors into one, or `None` if the list is empty.
    ///
    /// A single error is returned as-is, and nested [`DetectError::Multiple`]s are flattened.
    pub fn join<I>(errors: I) -> Option<DetectError>
    where
        I: IntoIterator<Item = DetectError>,
    {
        let mut flat = vec![];
        for error in errors {
            match error {
                DetectError::Multiple(inner) => flat.extend(inner),
                error => flat.push(error),
            }
        }

        match flat.len() {
            0 => None,
            1 => flat.pop(),
            _ => Some(DetectError::Multiple(flat)),
        }
    }

    /// Iterates over the individual errors, looking through [`DetectError::Multiple`].
    pub fn errors(&self) -> impl Iterator<Item = &DetectError> {
        let slice = match self {
            DetectError::Multiple(errors) => errors.as_slice(),
            error => std::slice::from_ref(error),
        };

        slice.iter()
    }
}

fn display_joined(errors: &[DetectError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod test {
    use crate::DetectError;

    #[test]
    fn test_join() {
        assert!(DetectError::join([]).is_none());

        let single = DetectError::join([DetectError::Cancelled]).unwrap();
        assert!(matches!(single, DetectError::Cancelled));

        let nested = DetectError::join([
            DetectError::ToolNotFound("fc-list".into()),
            DetectError::Multiple(vec![DetectError::Cancelled, DetectError::Cancelled]),
        ])
        .unwrap();
        assert_eq!(nested.errors().count(), 3);
    }

    #[test]
    fn test_display_joined() {
        let error = DetectError::join([
            DetectError::ToolNotFound("fc-list".into()),
            DetectError::Cancelled,
        ])
        .unwrap();

        assert_eq!(
            error.to_string(),
            "`fc-list` was not found in PATH\ndetection was cancelled"
        );
    }
}
