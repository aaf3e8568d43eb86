use anyhow::{bail, Result};
use rusqlite::{params, Connection};

pub const DEFAULT_TIMESTAMP: &str = "(cast(strftime('%s','now') as int))";

#[macro_export]
macro_rules! sqlite_column {
    ($name:expr, $sql_type:expr $(, $field:ident = $value:expr)*) => {
        {
            // Allow unused_mut because the variable is only mutated when optional
            // field assignments are passed to the macro (e.g., `is_primary_key = true`)
            #[allow(unused_mut)]
            let mut column = Column {
                name: $name,
                sql_type: $sql_type,
                is_primary_key: false,
                non_null: false,
                is_unique: false,
                default_value: None,
                foreign_key: None,
            };
            $(
                column.$field = $value;
            )*
            column
        }
    };
}

#[derive(Debug, PartialEq, Eq)]
pub enum SqlType {
    Text,
    Integer,
    Real,
    Blob,
}

impl SqlType {
    fn sql_name(&self) -> &'static str {
        match self {
            SqlType::Text => "TEXT",
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
            SqlType::Blob => "BLOB",
        }
    }

    fn from_sql_name(name: &str) -> Option<&'static SqlType> {
        match name {
            "TEXT" => Some(&SqlType::Text),
            "INTEGER" => Some(&SqlType::Integer),
            "REAL" => Some(&SqlType::Real),
            "BLOB" => Some(&SqlType::Blob),
            _ => None,
        }
    }
}

#[allow(unused)]
pub enum ForeignKeyOnChange {
    NoAction,
    Restrict,
    SetNull,
    SetDefault,
    Cascade,
}

impl ForeignKeyOnChange {
    fn sql_name(&self) -> &'static str {
        match self {
            ForeignKeyOnChange::NoAction => "NO ACTION",
            ForeignKeyOnChange::Restrict => "RESTRICT",
            ForeignKeyOnChange::SetNull => "SET NULL",
            ForeignKeyOnChange::SetDefault => "SET DEFAULT",
            ForeignKeyOnChange::Cascade => "CASCADE",
        }
    }
}

pub struct ForeignKey {
    pub foreign_table: &'static str,
    pub foreign_column: &'static str,
    pub on_delete: ForeignKeyOnChange,
}

pub struct Column<'a, S: AsRef<str>> {
    pub name: S,
    pub sql_type: &'a SqlType,
    pub is_primary_key: bool,
    pub non_null: bool,
    pub is_unique: bool,
    pub default_value: Option<S>,
    pub foreign_key: Option<&'a ForeignKey>,
}

pub struct Table {
    pub name: &'static str,
    pub columns: &'static [Column<'static, &'static str>],
    /// Table-level PRIMARY KEY (col, col); leave empty when a single column
    /// carries `is_primary_key`.
    pub composite_primary_key: &'static [&'static str],
    pub unique_constraints: &'static [&'static [&'static str]],
}

impl Table {
    pub fn create(&self, conn: &Connection) -> Result<()> {
        self.create_as(conn, self.name)
    }

    /// Creates the table under a different physical name. Used for the
    /// staging tables that are renamed over the originals at the end of a
    /// rewrite.
    pub fn create_as(&self, conn: &Connection, physical_name: &str) -> Result<()> {
        let mut create_sql = format!("CREATE TABLE {} (", physical_name);
        for (column_index, column) in self.columns.iter().enumerate() {
            if column_index > 0 {
                create_sql.push_str(", ");
            }
            create_sql.push_str(&format!("{} {}", column.name, column.sql_type.sql_name()));
            if column.is_primary_key {
                create_sql.push_str(" PRIMARY KEY");
            }
            if column.non_null {
                create_sql.push_str(" NOT NULL");
            }
            if column.is_unique {
                create_sql.push_str(" UNIQUE");
            }
            if let Some(default_value) = column.default_value {
                create_sql.push_str(&format!(" DEFAULT {}", default_value));
            }
            if let Some(foreign_key) = column.foreign_key {
                create_sql.push_str(&format!(
                    " REFERENCES {}({}) ON DELETE {}",
                    foreign_key.foreign_table,
                    foreign_key.foreign_column,
                    foreign_key.on_delete.sql_name()
                ));
            }
        }

        if !self.composite_primary_key.is_empty() {
            create_sql.push_str(&format!(
                ", PRIMARY KEY ({})",
                self.composite_primary_key.join(", ")
            ));
        }
        for unique_constraint in self.unique_constraints {
            create_sql.push_str(&format!(", UNIQUE ({})", unique_constraint.join(", ")));
        }
        create_sql.push_str(");");
        conn.execute(&create_sql, params![])?;
        Ok(())
    }

    /// Checks that every declared column is present in the live table with a
    /// matching type. Extra columns are tolerated: the albums table may or may
    /// not carry the companion source_id column depending on which migrations
    /// have run.
    pub fn validate_columns(&self, conn: &Connection) -> Result<()> {
        let actual = table_columns(conn, self.name)?;
        if actual.is_empty() {
            bail!("Table {} does not exist", self.name);
        }

        for expected in self.columns {
            match actual.iter().find(|(name, _)| name == expected.name) {
                None => bail!(
                    "Table {} is missing column {}. Found columns: {}",
                    self.name,
                    expected.name,
                    actual
                        .iter()
                        .map(|(name, _)| name.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
                Some((_, actual_type)) => {
                    if *actual_type != expected.sql_type {
                        bail!(
                            "Table {} column {} type mismatch: expected {:?}, got {:?}",
                            self.name,
                            expected.name,
                            expected.sql_type,
                            actual_type
                        );
                    }
                }
            }
        }
        Ok(())
    }
}

/// Column names of a table in declaration order; empty when the table does
/// not exist.
pub fn table_column_names(conn: &Connection, table_name: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({});", table_name))?;
    let names = stmt
        .query_map(params![], |row| row.get::<_, String>(1))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(names)
}

fn table_columns(conn: &Connection, table_name: &str) -> Result<Vec<(String, &'static SqlType)>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({});", table_name))?;
    let mut columns = Vec::new();
    let mut rows = stmt.query(params![])?;
    while let Some(row) = rows.next()? {
        let name = row.get::<_, String>(1)?;
        let type_name = row.get::<_, String>(2)?;
        let sql_type = match SqlType::from_sql_name(&type_name) {
            Some(t) => t,
            None => bail!(
                "Table {} column {} has unsupported type {}",
                table_name,
                name,
                type_name
            ),
        };
        columns.push((name, sql_type));
    }
    Ok(columns)
}
