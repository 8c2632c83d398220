//! The sample table provisioned by the fixture binary.
//!
//! Three people records with 64-bit integer `id`/`age` columns and a string
//! `name` column, all nullable. Symlink-table readers see the integer columns
//! as BIGINT.
use std::sync::Arc;

use deltalake::arrow::{
    array::{Int64Array, RecordBatch, StringArray},
    datatypes::{DataType, Field, Schema, SchemaRef},
    error::ArrowError,
};

/// Table path used when none is given.
pub const DEFAULT_TABLE_PATH: &str = "/tmp/my_delta_table";

/// Application name the fixture session runs under.
pub const APP_NAME: &str = "DeltaManifest";

/// One sample record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Person {
    /// Identifier.
    pub id: i64,
    /// Display name.
    pub name: &'static str,
    /// Age in years.
    pub age: i64,
}

/// The fixed input rows, in write order.
pub const SAMPLE_PEOPLE: [Person; 3] = [
    Person {
        id: 1,
        name: "Alice",
        age: 34,
    },
    Person {
        id: 2,
        name: "Bob",
        age: 28,
    },
    Person {
        id: 3,
        name: "Charlie",
        age: 42,
    },
];

/// Arrow schema of the sample table.
pub fn sample_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, true),
        Field::new("name", DataType::Utf8, true),
        Field::new("age", DataType::Int64, true),
    ]))
}

/// Build a batch from `people` using [`sample_schema`].
pub fn people_batch(people: &[Person]) -> Result<RecordBatch, ArrowError> {
    let ids: Int64Array = people.iter().map(|p| Some(p.id)).collect();
    let names: StringArray = people.iter().map(|p| Some(p.name)).collect();
    let ages: Int64Array = people.iter().map(|p| Some(p.age)).collect();

    RecordBatch::try_new(
        sample_schema(),
        vec![Arc::new(ids), Arc::new(names), Arc::new(ages)],
    )
}

/// The three sample records as one batch.
pub fn sample_batch() -> Result<RecordBatch, ArrowError> {
    people_batch(&SAMPLE_PEOPLE)
}
