//! Error types for the storage boundary
//!
//! Decoding never fails, so the only errors here come from writing to the
//! node store.

/// Node store write failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The backend refuses writes to this property
    #[error("property `{property}` is read-only")]
    ReadOnly {
        /// Property name
        property: String,
    },

    /// Any other backend failure
    #[error("storage backend failed: {0}")]
    Backend(String),
}

impl StoreError {
    /// Create backend error
    #[inline]
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_property() {
        let err = StoreError::ReadOnly {
            property: "cover".to_string(),
        };
        assert_eq!(err.to_string(), "property `cover` is read-only");
    }

    #[test]
    fn backend_constructor() {
        let err = StoreError::backend("disk full");
        assert_eq!(err, StoreError::Backend("disk full".to_string()));
    }
}
