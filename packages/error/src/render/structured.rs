//! Machine-readable rendering

use super::{encode, RenderError};
use crate::error::Error;
use crate::stack::Stack;
use crate::verbosity::Verbosity;
use serde::{Deserialize, Serialize};

use super::text::shown_details;

/// Serializable subset of an [`Error`] for one verbosity tier
///
/// Absent fields are omitted from the encoding, so decoding the output of
/// [`Error::to_json`] yields exactly the fields emitted at that tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Structured {
    /// Error code; omitted only for causes that are not [`Error`] values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<i64>,

    /// Primary message, or the description of a foreign cause
    pub error_message: String,

    /// Shown details prefix, present from [`Verbosity::Verbose`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_details: Option<Vec<String>>,

    /// Nested cause, present from [`Verbosity::Debug`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<Box<Structured>>,

    /// Captured frames of the top-level record, present from [`Verbosity::Debug`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<Stack>,
}

impl Structured {
    /// The tier-gated subset of `error`, without frames
    pub(crate) fn subset(error: &Error, verbosity: Verbosity) -> Self {
        let error_details = (verbosity >= Verbosity::Verbose)
            .then(|| shown_details(error.details(), verbosity).to_vec());

        let cause = if verbosity >= Verbosity::Debug {
            error
                .cause()
                .map(|cause| Box::new(Self::from_cause(cause, verbosity)))
        } else {
            None
        };

        Self {
            error_code: Some(error.code()),
            error_message: error.message().to_string(),
            error_details,
            cause,
            stack: None,
        }
    }

    fn from_cause(cause: &(dyn std::error::Error + 'static), verbosity: Verbosity) -> Self {
        if let Some(nested) = cause.downcast_ref::<Error>() {
            return Self::subset(nested, verbosity);
        }
        Self {
            error_code: None,
            error_message: cause.to_string(),
            error_details: None,
            cause: cause
                .source()
                .map(|source| Box::new(Self::from_cause(source, verbosity))),
            stack: None,
        }
    }

    /// Decode a record produced by [`Error::to_json`]
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Decode`] if `bytes` is not a valid record.
    pub fn from_json(bytes: &[u8]) -> Result<Self, RenderError> {
        serde_json::from_slice(bytes).map_err(RenderError::Decode)
    }

    /// Encode this record as JSON
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Encode`] if the record cannot be encoded.
    pub fn to_json(&self) -> Result<Vec<u8>, RenderError> {
        encode(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Io(Option<Box<dyn std::error::Error + Send + Sync>>);

    impl std::fmt::Display for Io {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("disk unavailable")
        }
    }

    impl std::error::Error for Io {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            self.0
                .as_ref()
                .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
        }
    }

    #[test]
    fn test_subset_fields_per_tier() {
        let e = Error::new(12, ["error message", "error details", "error hint"])
            .wrap(Error::new(2, ["inner"]));

        let info = Structured::subset(&e, Verbosity::Info);
        assert_eq!(info.error_code, Some(12));
        assert!(info.error_details.is_none());
        assert!(info.cause.is_none());

        let verbose = Structured::subset(&e, Verbosity::Verbose);
        assert_eq!(verbose.error_details, Some(vec!["error details".to_string()]));
        assert!(verbose.cause.is_none());

        let debug = Structured::subset(&e, Verbosity::Debug);
        let cause = debug.cause.expect("cause at debug tier");
        assert_eq!(cause.error_code, Some(2));
        assert_eq!(cause.error_details, Some(Vec::new()));
        assert!(cause.stack.is_none());
    }

    #[test]
    fn test_foreign_cause_follows_source_chain() {
        let root = Error::new(5, ["root", "d1", "d2", "d3"]);
        let e = Error::new(1, ["top"]).wrap(Io(Some(Box::new(root))));

        let record = Structured::subset(&e, Verbosity::Debug);
        let io = record.cause.expect("io cause");
        assert_eq!(io.error_code, None);
        assert_eq!(io.error_message, "disk unavailable");

        let nested = io.cause.expect("nested strata error");
        assert_eq!(nested.error_code, Some(5));
        assert_eq!(
            nested.error_details,
            Some(vec!["d1".to_string(), "d2".to_string()])
        );
    }

    #[test]
    fn test_foreign_cause_omits_code_in_json() {
        let e = Error::new(1, ["top"]).wrap(Io(None));
        let json = encode(&Structured::subset(&e, Verbosity::Debug)).expect("encode record");
        assert_eq!(
            String::from_utf8(json).expect("utf-8"),
            r#"{"error_code":1,"error_message":"top","error_details":[],"cause":{"error_message":"disk unavailable"}}"#
        );
    }
}
