//! Variant Errors
//!
//! Retrieval and conversion report failure as `Option`/`bool`. Only the
//! convenience wrappers [`Variant::get`](crate::Variant::get) and
//! [`Variant::convert_to`](crate::Variant::convert_to) turn a failure into a
//! [`VariantError`].

use thiserror::Error;

/// Error returned by the throwing retrieval and conversion wrappers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VariantError {
    /// The stored value is not a `requested`
    #[error("invalid cast: variant holds {actual}, requested {requested}")]
    InvalidCast {
        requested: &'static str,
        actual: &'static str,
    },

    /// No conversion rule reaches `requested` from the stored value
    #[error("cannot convert {actual} to {requested}")]
    Conversion {
        requested: &'static str,
        actual: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = VariantError::InvalidCast {
            requested: "i64",
            actual: "i32",
        };
        assert_eq!(err.to_string(), "invalid cast: variant holds i32, requested i64");

        let err = VariantError::Conversion {
            requested: "u64",
            actual: "i32",
        };
        assert_eq!(err.to_string(), "cannot convert i32 to u64");
    }
}
