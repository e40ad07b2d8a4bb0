//! Schema model produced by the parser.
//!
//! All maps are [`IndexMap`]s so iteration follows declaration order; the
//! differencer relies on that to produce reproducible output.

use indexmap::IndexMap;
use serde::Serialize;

const PRIMARY_KEY: &str = "PRIMARY KEY";

/// A parsed schema: user-defined types and tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Schema {
    pub types: IndexMap<String, TypeDef>,
    pub tables: IndexMap<String, Vec<Column>>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the schema declares neither types nor tables.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.tables.is_empty()
    }

    /// Register a type. A later declaration under the same name replaces
    /// the earlier one in place.
    pub fn add_type(&mut self, name: impl Into<String>, def: TypeDef) {
        self.types.insert(name.into(), def);
    }

    /// Register a table. A later declaration under the same name replaces
    /// the earlier column list entirely; columns are never merged.
    pub fn add_table(&mut self, name: impl Into<String>, columns: Vec<Column>) {
        self.tables.insert(name.into(), columns);
    }
}

/// A user-defined type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeDef {
    /// `CREATE TYPE name AS ENUM (...)`. Order is significant.
    Enum { values: Vec<String> },
    /// `CREATE TYPE name AS (...)`. Compared textually.
    Composite { definition: String },
}

impl TypeDef {
    pub fn kind_name(&self) -> &'static str {
        match self {
            TypeDef::Enum { .. } => "ENUM",
            TypeDef::Composite { .. } => "composite",
        }
    }
}

/// A table column as written in the schema text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: String,
    /// Raw type text, including qualifiers such as `PRIMARY KEY`.
    pub data_type: String,
    pub not_null: bool,
    pub default: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            not_null: false,
            default: None,
        }
    }

    /// Builder: mark as NOT NULL.
    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// Builder: set the default expression.
    pub fn default(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// The type text without a trailing `PRIMARY KEY` qualifier.
    pub fn base_type(&self) -> &str {
        let ty = self.data_type.trim_end();
        if ty.to_ascii_uppercase().ends_with(PRIMARY_KEY) {
            ty[..ty.len() - PRIMARY_KEY.len()].trim_end()
        } else {
            ty
        }
    }

    /// Whether the type text carries a trailing `PRIMARY KEY` qualifier.
    pub fn is_primary_key(&self) -> bool {
        self.base_type().len() != self.data_type.trim_end().len()
    }

    /// Render as a column definition: `name type [DEFAULT v] [NOT NULL]`.
    pub fn to_definition(&self) -> String {
        let mut def = format!("{} {}", self.name, self.data_type);
        if let Some(value) = &self.default {
            def.push_str(" DEFAULT ");
            def.push_str(value);
        }
        if self.not_null {
            def.push_str(" NOT NULL");
        }
        def
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_type_strips_primary_key() {
        let col = Column::new("id", "SERIAL PRIMARY KEY");
        assert_eq!(col.base_type(), "SERIAL");
        assert!(col.is_primary_key());

        let col = Column::new("id", "serial primary key");
        assert_eq!(col.base_type(), "serial");
        assert!(col.is_primary_key());

        let col = Column::new("name", "VARCHAR(100)");
        assert_eq!(col.base_type(), "VARCHAR(100)");
        assert!(!col.is_primary_key());
    }

    #[test]
    fn test_column_definition() {
        let col = Column::new("mood", "mood").default("'ok'").not_null();
        assert_eq!(col.to_definition(), "mood mood DEFAULT 'ok' NOT NULL");
    }

    #[test]
    fn test_redeclared_table_keeps_position() {
        let mut schema = Schema::new();
        schema.add_table("a", vec![Column::new("x", "INT")]);
        schema.add_table("b", vec![Column::new("y", "INT")]);
        schema.add_table("a", vec![Column::new("z", "TEXT")]);

        let names: Vec<_> = schema.tables.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(schema.tables["a"], vec![Column::new("z", "TEXT")]);
    }
}
