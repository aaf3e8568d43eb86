mod schema_def;

pub use schema_def::{
    table_column_names, Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, DEFAULT_TIMESTAMP,
};
