//! Readable view of a Delta schema.
//!
//! The log stores the schema as a JSON struct type. [`TableSchema`] keeps
//! only what callers compare and print: column names, Delta type names and
//! nullability, rendered as `(id:long, name:string, age:long)`.
use std::fmt;

use serde::Deserialize;
use serde_json::Value;

/// One top-level column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Delta type name (`long`, `string`, ...); nested types render as
    /// `struct`, `array` or `map`.
    pub data_type: String,
    /// Whether the column accepts nulls.
    pub nullable: bool,
}

/// Top-level columns of a table, in schema order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    /// The columns.
    pub columns: Vec<Column>,
}

#[derive(Deserialize)]
struct StructJson {
    fields: Vec<FieldJson>,
}

#[derive(Deserialize)]
struct FieldJson {
    name: String,
    #[serde(rename = "type")]
    data_type: Value,
    #[serde(default = "default_nullable")]
    nullable: bool,
}

fn default_nullable() -> bool {
    true
}

fn type_name(data_type: &Value) -> String {
    match data_type {
        Value::String(name) => name.clone(),
        Value::Object(map) => map
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string(),
        other => other.to_string(),
    }
}

impl TableSchema {
    /// Read a Delta struct type given as JSON.
    pub fn from_json(value: Value) -> Result<Self, serde_json::Error> {
        let parsed: StructJson = serde_json::from_value(value)?;
        Ok(Self {
            columns: parsed
                .fields
                .into_iter()
                .map(|f| Column {
                    data_type: type_name(&f.data_type),
                    name: f.name,
                    nullable: f.nullable,
                })
                .collect(),
        })
    }

    /// Column names in order.
    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

impl fmt::Display for TableSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}:{}", column.name, column.data_type)?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn renders_primitive_columns() -> Result<(), serde_json::Error> {
        let schema = TableSchema::from_json(json!({
            "type": "struct",
            "fields": [
                {"name": "id", "type": "long", "nullable": true, "metadata": {}},
                {"name": "name", "type": "string", "nullable": true, "metadata": {}},
                {"name": "age", "type": "long", "nullable": false, "metadata": {}}
            ]
        }))?;
        assert_eq!(schema.to_string(), "(id:long, name:string, age:long)");
        assert_eq!(schema.names(), vec!["id", "name", "age"]);
        assert!(!schema.columns[2].nullable);
        Ok(())
    }

    #[test]
    fn nested_types_render_by_kind() -> Result<(), serde_json::Error> {
        let schema = TableSchema::from_json(json!({
            "type": "struct",
            "fields": [
                {"name": "tags", "type": {"type": "array", "elementType": "string", "containsNull": true}, "nullable": true},
                {"name": "p", "type": {"type": "struct", "fields": []}}
            ]
        }))?;
        assert_eq!(schema.to_string(), "(tags:array, p:struct)");
        assert!(schema.columns[1].nullable);
        Ok(())
    }

    #[test]
    fn missing_fields_is_an_error() {
        assert!(TableSchema::from_json(json!({"type": "struct"})).is_err());
    }
}
