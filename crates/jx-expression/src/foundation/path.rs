//! Dot-delimited variable paths.
//!
//! A `Variable` names a logical field like `build.revision12` or
//! `status`. Equality and hashing are by path string so variables can be
//! collected into sets and used as map keys when gathering free variables.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

use super::datatype::DataType;

/// A reference to a document field by dotted path.
///
/// The data type is resolved from the schema at parse time when one is
/// supplied; it is deliberately excluded from equality and hashing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variable {
    name: String,
    #[serde(default = "default_type")]
    typ: DataType,
}

fn default_type() -> DataType {
    DataType::Object
}

impl Variable {
    /// Create a variable with the generic `Object` type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            typ: DataType::Object,
        }
    }

    /// Create a variable with a schema-resolved type.
    pub fn with_type(name: impl Into<String>, typ: DataType) -> Self {
        Self {
            name: name.into(),
            typ,
        }
    }

    /// The full dotted path.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path segments, split on dots.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.name.split('.')
    }

    /// The resolved data type (`Object` when unresolved or ambiguous).
    pub fn datatype(&self) -> DataType {
        self.typ
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Variable {}

impl Hash for Variable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn equality_ignores_resolved_type() {
        let a = Variable::new("build.revision");
        let b = Variable::with_type("build.revision", DataType::Text);
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        set.insert(b);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn segments_split_on_dots() {
        let v = Variable::new("a.b.c");
        assert_eq!(v.segments().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }
}
