//! Table-prefix resolution.
//!
//! Multi-tenant shared-schema deployments (the WordPress `wp_` convention)
//! prepend a fixed string to every table identifier. [`TablePrefix`] applies
//! that rewrite to table references before they enter the clause set.
//!
//! Prefixing is plain string concatenation with no separator:
//! `wp_` + `posts` = `wp_posts`.

use crate::raw::Raw;

/// How a prefix target is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixMode {
    /// Every entry is a table name: prefix unconditionally.
    TablesOnly,
    /// Entries mix field and table names: only a dotted name
    /// (`table.field`) is a table reference, so only dotted names are
    /// prefixed; bare names are left alone.
    FieldTableMix,
}

/// A reference to a table in the FROM clause.
///
/// Alias mappings are a distinct record rather than an overloaded map key,
/// so the prefix target is always explicit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableRef {
    /// A plain table name.
    Named(String),
    /// `table AS alias`; the prefix applies to `table`, never `alias`.
    Aliased { table: String, alias: String },
    /// A verbatim fragment, exempt from prefixing.
    Raw(Raw),
}

impl TableRef {
    /// Render the reference as it appears in the FROM clause.
    pub fn render(&self) -> String {
        match self {
            TableRef::Named(name) => name.clone(),
            TableRef::Aliased { table, alias } => format!("{} AS {}", table, alias),
            TableRef::Raw(raw) => raw.as_str().to_string(),
        }
    }
}

impl From<&str> for TableRef {
    fn from(name: &str) -> Self {
        TableRef::Named(name.to_string())
    }
}

impl From<String> for TableRef {
    fn from(name: String) -> Self {
        TableRef::Named(name)
    }
}

impl From<Raw> for TableRef {
    fn from(raw: Raw) -> Self {
        TableRef::Raw(raw)
    }
}

/// A fixed table prefix, supplied at builder construction and immutable
/// thereafter. `None` disables prefixing entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TablePrefix(Option<String>);

impl TablePrefix {
    /// A prefix that leaves every identifier unchanged.
    pub fn none() -> Self {
        TablePrefix(None)
    }

    /// Create a prefix from a literal string.
    pub fn new(prefix: impl Into<String>) -> Self {
        TablePrefix(Some(prefix.into()))
    }

    /// Whether a prefix is set.
    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }

    /// Apply the prefix to a single identifier under the given mode.
    ///
    /// With [`PrefixMode::FieldTableMix`], only identifiers containing a
    /// `.` separator are treated as table references and prefixed.
    pub fn apply(&self, target: &str, mode: PrefixMode) -> String {
        match &self.0 {
            None => target.to_string(),
            Some(prefix) => match mode {
                PrefixMode::TablesOnly => format!("{}{}", prefix, target),
                PrefixMode::FieldTableMix => {
                    if target.contains('.') {
                        format!("{}{}", prefix, target)
                    } else {
                        target.to_string()
                    }
                }
            },
        }
    }

    /// Resolve a single table reference. Raw fragments pass through
    /// untouched; aliased entries are prefixed on the table side only.
    pub fn resolve(&self, entry: TableRef, mode: PrefixMode) -> TableRef {
        match entry {
            TableRef::Named(name) => TableRef::Named(self.apply(&name, mode)),
            TableRef::Aliased { table, alias } => TableRef::Aliased {
                table: self.apply(&table, mode),
                alias,
            },
            TableRef::Raw(raw) => TableRef::Raw(raw),
        }
    }

    /// Resolve an ordered list of table references, preserving order.
    pub fn resolve_all(&self, entries: Vec<TableRef>, mode: PrefixMode) -> Vec<TableRef> {
        entries
            .into_iter()
            .map(|entry| self.resolve(entry, mode))
            .collect()
    }
}

impl From<&str> for TablePrefix {
    fn from(prefix: &str) -> Self {
        TablePrefix::new(prefix)
    }
}

impl From<String> for TablePrefix {
    fn from(prefix: String) -> Self {
        TablePrefix::new(prefix)
    }
}

impl From<Option<String>> for TablePrefix {
    fn from(prefix: Option<String>) -> Self {
        TablePrefix(prefix)
    }
}
