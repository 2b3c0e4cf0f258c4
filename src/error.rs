//! Error types for taplock.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TaplockError>;

/// Fatal conditions that abort a record or unlock session.
///
/// A rhythm that does not match is not represented here: it is an expected
/// outcome of an unlock attempt and never leaves the session loop.
#[derive(Error, Debug)]
pub enum TaplockError {
    /// The display surface (and with it the event source) could not be created.
    #[error("Cannot open display surface: {0}")]
    DisplayInit(#[source] std::io::Error),

    /// Rhythm file access failed, or waiting on the event source failed.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Stored rhythm length is not a whole number of delay records.
    #[error("Bad file length: {len} bytes is not a multiple of {record_width}")]
    CorruptFormat { len: usize, record_width: usize },

    /// Fewer taps than a recordable rhythm needs.
    #[error("The rhythm must be at least {required} taps long (got {taps})")]
    TooShort { taps: usize, required: usize },
}

impl TaplockError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        TaplockError::Io {
            context: context.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = TaplockError::TooShort {
            taps: 2,
            required: 3,
        };
        assert_eq!(
            err.to_string(),
            "The rhythm must be at least 3 taps long (got 2)"
        );

        let err = TaplockError::CorruptFormat {
            len: 9,
            record_width: 8,
        };
        assert!(err.to_string().contains("9 bytes"));

        let err = TaplockError::io(
            "Cannot open 'rhythm'",
            std::io::Error::from(std::io::ErrorKind::NotFound),
        );
        assert!(err.to_string().starts_with("Cannot open 'rhythm'"));
    }
}
