//! Raw SQL passthrough fragments.
//!
//! A [`Raw`] value is emitted verbatim into compiled SQL: the prefix
//! resolver never rewrites it and the translator never turns it into a
//! bound parameter.
//!
//! # Safety
//! Raw fragments bypass parameter binding. Never build one from
//! untrusted input.

/// A verbatim SQL fragment, exempt from prefixing and parameter binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raw(String);

impl Raw {
    /// Wrap a SQL fragment for verbatim emission.
    pub fn new(sql: impl Into<String>) -> Self {
        Raw(sql.into())
    }

    /// The fragment text as it will appear in compiled SQL.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Raw {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Create a [`Raw`] fragment.
///
/// # Example
/// ```ignore
/// use prefixql::raw;
///
/// let fragment = raw("NOW()");
/// ```
pub fn raw(sql: impl Into<String>) -> Raw {
    Raw::new(sql)
}
