//! Schema seam consumed by the parser and the code generators.
//!
//! The snowflake/column-metadata model is an external collaborator; this
//! module specifies only the narrow interface the compiler needs: resolve a
//! logical dotted path to the concrete storage columns beneath it.

use serde::{Deserialize, Serialize};

use super::datatype::DataType;

/// A concrete storage column behind a logical field path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Storage field name, e.g. `status.~s~`
    pub name: String,
    /// Logical dotted path, e.g. `status`
    pub full_name: String,
    /// JSON type stored in this column
    pub jx_type: DataType,
    /// Nesting path, outermost first; empty for top-level columns
    pub nested_path: Vec<String>,
    /// Whether the column can hold more than one value per document
    pub multi: bool,
}

/// Column lookup by logical path.
pub trait Schema {
    /// All concrete storage columns at or under `path`, excluding
    /// struct/object container columns.
    fn leaves(&self, path: &str) -> Vec<Column>;

    /// Columns exactly at `path`, filtered by type. Duplicates are
    /// preserved for multi-typed fields.
    fn values(&self, path: &str, exclude: &[DataType]) -> Vec<Column>;
}

/// In-memory schema for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemorySchema {
    columns: Vec<Column>,
}

impl MemorySchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a top-level, single-valued column.
    pub fn with_column(
        mut self,
        full_name: impl Into<String>,
        name: impl Into<String>,
        jx_type: DataType,
    ) -> Self {
        self.columns.push(Column {
            name: name.into(),
            full_name: full_name.into(),
            jx_type,
            nested_path: Vec::new(),
            multi: false,
        });
        self
    }

    /// Add a fully specified column.
    pub fn push(&mut self, column: Column) {
        self.columns.push(column);
    }
}

impl Schema for MemorySchema {
    fn leaves(&self, path: &str) -> Vec<Column> {
        self.columns
            .iter()
            .filter(|c| {
                !matches!(c.jx_type, DataType::Object | DataType::Nested)
                    && (c.full_name == path
                        || path.is_empty()
                        || c.full_name.starts_with(&format!("{path}.")))
            })
            .cloned()
            .collect()
    }

    fn values(&self, path: &str, exclude: &[DataType]) -> Vec<Column> {
        self.columns
            .iter()
            .filter(|c| c.full_name == path && !exclude.contains(&c.jx_type))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> MemorySchema {
        MemorySchema::new()
            .with_column("status", "status.~s~", DataType::Text)
            .with_column("status", "status.~n~", DataType::Number)
            .with_column("build.revision", "build.revision.~s~", DataType::Text)
    }

    #[test]
    fn leaves_include_descendants() {
        let s = schema();
        assert_eq!(s.leaves("build").len(), 1);
        assert_eq!(s.leaves("status").len(), 2);
        assert!(s.leaves("nope").is_empty());
    }

    #[test]
    fn values_filter_by_type() {
        let s = schema();
        let only_text = s.values("status", &[DataType::Number]);
        assert_eq!(only_text.len(), 1);
        assert_eq!(only_text[0].name, "status.~s~");
    }
}
