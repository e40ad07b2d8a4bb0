//! SQL Transpiler for migration steps.
//!
//! Converts [`Step`]s into PostgreSQL statements and comment lines.

use crate::step::Step;

/// Comment marker shared by every non-executable line.
pub const COMMENT: &str = "--";

/// Trait for converting migration steps to SQL.
pub trait ToSql {
    /// Convert this node to a SQL string.
    fn to_sql(&self) -> String;
}

impl ToSql for Step {
    fn to_sql(&self) -> String {
        match self {
            Step::Error(msg) => format!("{} ERROR: {}", COMMENT, msg),
            Step::Caution(msg) => format!("{} CAUTION: {}", COMMENT, msg),
            Step::Note(msg) => format!("{} {}", COMMENT, msg),

            Step::AddEnumValue { type_name, value } => {
                format!("ALTER TYPE {} ADD VALUE {};", type_name, quote_literal(value))
            }
            Step::CreateEnum { name, values } => {
                let values: Vec<String> = values.iter().map(|v| quote_literal(v)).collect();
                format!("CREATE TYPE {} AS ENUM ({});", name, values.join(", "))
            }

            Step::RenameTable { from, to } => format!("ALTER TABLE {} RENAME TO {};", from, to),
            Step::CreateTable { name, columns } => {
                let defs: Vec<String> = columns
                    .iter()
                    .map(|c| format!("  {}", c.to_definition()))
                    .collect();
                format!("CREATE TABLE {} (\n{}\n);", name, defs.join(",\n"))
            }
            Step::CopyData { from, to, columns } => {
                let cols = columns.join(", ");
                format!("INSERT INTO {} ({}) SELECT {} FROM {};", to, cols, cols, from)
            }
            Step::DropTable(name) => format!("DROP TABLE {};", name),

            Step::AddColumn { table, column } => {
                format!("ALTER TABLE {} ADD COLUMN {};", table, column.to_definition())
            }
            Step::DropColumn { table, column } => {
                format!("ALTER TABLE {} DROP COLUMN {};", table, column)
            }
            Step::AlterType {
                table,
                column,
                new_type,
                using,
            } => {
                let mut sql = format!(
                    "ALTER TABLE {} ALTER COLUMN {} TYPE {}",
                    table, column, new_type
                );
                if let Some(expr) = using {
                    sql.push_str(" USING ");
                    sql.push_str(expr);
                }
                sql.push(';');
                sql
            }
            Step::SetDefault {
                table,
                column,
                value,
            } => format!(
                "ALTER TABLE {} ALTER COLUMN {} SET DEFAULT {};",
                table, column, value
            ),
            Step::DropDefault { table, column } => {
                format!("ALTER TABLE {} ALTER COLUMN {} DROP DEFAULT;", table, column)
            }
            Step::SetNotNull { table, column } => {
                format!("ALTER TABLE {} ALTER COLUMN {} SET NOT NULL;", table, column)
            }
            Step::DropNotNull { table, column } => {
                format!("ALTER TABLE {} ALTER COLUMN {} DROP NOT NULL;", table, column)
            }
            Step::AddPrimaryKey { table, column } => {
                format!("ALTER TABLE {} ADD PRIMARY KEY ({});", table, column)
            }
            Step::DropPrimaryKey { table } => {
                format!("ALTER TABLE {} DROP CONSTRAINT {}_pkey;", table, table)
            }
        }
    }
}

/// Quote a string literal, doubling embedded single quotes.
fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
