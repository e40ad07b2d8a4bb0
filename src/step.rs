//! Migration steps (AST-native)
//!
//! The differencer emits typed steps; [`crate::transpiler::ToSql`] turns them
//! into statement strings.

use crate::ast::Column;

/// A single entry in a migration plan.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Reported problem; never executed.
    Error(String),
    /// Warning that precedes a destructive statement.
    Caution(String),
    /// Informational comment.
    Note(String),

    /// ALTER TYPE ... ADD VALUE
    AddEnumValue { type_name: String, value: String },
    /// CREATE TYPE ... AS ENUM
    CreateEnum { name: String, values: Vec<String> },

    /// ALTER TABLE ... RENAME TO
    RenameTable { from: String, to: String },
    /// CREATE TABLE
    CreateTable { name: String, columns: Vec<Column> },
    /// INSERT INTO new (...) SELECT ... FROM old
    CopyData {
        from: String,
        to: String,
        columns: Vec<String>,
    },
    DropTable(String),

    AddColumn { table: String, column: Column },
    DropColumn { table: String, column: String },
    /// ALTER COLUMN ... TYPE ... [USING ...]
    AlterType {
        table: String,
        column: String,
        new_type: String,
        using: Option<String>,
    },
    SetDefault {
        table: String,
        column: String,
        value: String,
    },
    DropDefault { table: String, column: String },
    SetNotNull { table: String, column: String },
    DropNotNull { table: String, column: String },
    /// ADD PRIMARY KEY (column)
    AddPrimaryKey { table: String, column: String },
    /// `DROP CONSTRAINT {table}_pkey`
    DropPrimaryKey { table: String },
}
