//! Input checks run before any remote call.

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;
use tfpb_core::Diagnostics;

pub const VALIDATION_SUMMARY: &str = "Validation Error";

lazy_static! {
    static ref HTTP_URI: Regex = Regex::new(r"^https?://.*").expect("static regex");
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} cannot be empty")]
    Empty(&'static str),
    #[error("URI must be a valid HTTP or HTTPS URL")]
    InvalidUri,
}

impl ValidationError {
    pub fn to_diagnostics(&self) -> Diagnostics {
        let mut diags = Diagnostics::new();
        diags.add_error(VALIDATION_SUMMARY, self.to_string());
        diags
    }
}

/// Fail on the first empty field, in the order given.
pub fn require_non_empty(fields: &[(&'static str, &str)]) -> Result<(), ValidationError> {
    match fields.iter().find(|(_, value)| value.is_empty()) {
        Some((label, _)) => Err(ValidationError::Empty(label)),
        None => Ok(()),
    }
}

/// The uri must start with `http://` or `https://`.
pub fn require_http_uri(uri: &str) -> Result<(), ValidationError> {
    if HTTP_URI.is_match(uri) {
        Ok(())
    } else {
        Err(ValidationError::InvalidUri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_empty_field_reported() {
        let err = require_non_empty(&[("Name", "db"), ("Username", ""), ("URI", "")]).unwrap_err();
        assert_eq!(err, ValidationError::Empty("Username"));
        assert_eq!(err.to_string(), "Username cannot be empty");
    }

    #[test]
    fn all_present_passes() {
        assert!(require_non_empty(&[("Name", "db")]).is_ok());
    }

    #[test]
    fn http_and_https_accepted() {
        assert!(require_http_uri("http://db").is_ok());
        assert!(require_http_uri("https://db.example.com/path").is_ok());
    }

    #[test]
    fn other_schemes_rejected() {
        for uri in ["ftp://db", "db.example.com", "HTTPS://db", " https://db", "https:/db"] {
            assert_eq!(require_http_uri(uri), Err(ValidationError::InvalidUri), "{uri}");
        }
    }

    #[test]
    fn diagnostics_use_validation_summary() {
        let diags = ValidationError::InvalidUri.to_diagnostics();
        let d = diags.iter().next().unwrap();
        assert_eq!(d.summary, "Validation Error");
        assert_eq!(d.detail, "URI must be a valid HTTP or HTTPS URL");
    }
}
