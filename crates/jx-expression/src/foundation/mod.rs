//! Foundation types shared by the parser, evaluator, and backends.

pub mod datatype;
pub mod path;
pub mod schema;
pub mod value;

pub use datatype::DataType;
pub use path::Variable;
pub use schema::{Column, MemorySchema, Schema};
pub use value::JxValue;
