use serde::{Deserialize, Serialize};

/// Represents the data types a column can declare in a table definition.
///
/// Declared types are advisory: rows are not checked against them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// A 64-bit signed integer.
    Int,
    /// A 64-bit floating-point number.
    Float,
    /// A variable-length UTF-8 character string.
    String,
    /// A point in time, stored in UTC.
    DateTime,
    /// A boolean value (true or false).
    Bool,
}
