use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::sml::SmlError;

#[derive(Debug, Error)]
pub enum EtcError {
    #[error("Illegal source format: {reason}")]
    IllegalSourceFormat { reason: String },

    #[error("Cannot read file {path}: {source}")]
    CannotReadFile { path: PathBuf, source: io::Error },

    #[error("Cannot post-process configuration: {source}")]
    CannotPostProcess { source: Box<EtcError> },

    #[error("Cannot split configuration: {reason}")]
    CannotSplit { reason: String },

    #[error("Cannot apply values at '{path}': {reason}")]
    CannotApply { path: String, reason: String },

    #[error("Invalid path '{path}'")]
    InvalidPath { path: String },
}

impl From<SmlError> for EtcError {
    fn from(err: SmlError) -> Self {
        EtcError::IllegalSourceFormat {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cannot_read_file_formats_with_path() {
        let err = EtcError::CannotReadFile {
            path: "/etc/myapp/app.sml".into(),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        let msg = err.to_string();
        assert!(msg.contains("app.sml"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn invalid_path_formats() {
        let err = EtcError::InvalidPath {
            path: "/etc/a/b".into(),
        };
        assert!(err.to_string().contains("/etc/a/b"));
    }

    #[test]
    fn post_process_wraps_cause() {
        let cause = EtcError::InvalidPath {
            path: "/etc/a".into(),
        };
        let err = EtcError::CannotPostProcess {
            source: Box::new(cause),
        };
        let msg = err.to_string();
        assert!(msg.contains("post-process"));
        assert!(msg.contains("/etc/a"));
    }

    #[test]
    fn sml_error_converts_to_illegal_source_format() {
        let err: EtcError = SmlError::UnexpectedEnd.into();
        assert!(matches!(err, EtcError::IllegalSourceFormat { .. }));
    }
}
