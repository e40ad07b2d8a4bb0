//! Schema Diff
//!
//! Computes the difference between two schemas and emits an ordered list of
//! [`Step`]s. Phases run in a fixed order:
//!
//! 1. enum/composite type changes
//! 2. table renames (identity matches first, then column similarity)
//! 3. column changes on every matched table
//! 4. new enum types
//! 5. replacement matching for leftover tables (data-copy hints only)
//! 6. new tables
//! 7. dropped tables
//!
//! All working state lives in a [`Differ`] scoped to one call.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use tracing::{debug, trace};

use crate::ast::{Column, Schema, TypeDef};
use crate::error::{SchemaError, SchemaResult};
use crate::step::Step;
use crate::transpiler::ToSql;

/// Minimum similarity for an unmatched old table to be treated as renamed.
pub const RENAME_THRESHOLD: f64 = 0.5;
/// Minimum similarity for a new table to be suggested as a replacement.
pub const REPLACEMENT_THRESHOLD: f64 = 0.3;
/// Shared column names that make a match credible regardless of ratio.
pub const MIN_SHARED_COLUMNS: usize = 3;
/// Overlap ratio that makes a match credible regardless of shared count.
pub const MIN_OVERLAP_RATIO: f64 = 0.7;

/// Tunable heuristics for table matching.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct DiffOptions {
    pub rename_threshold: f64,
    pub replacement_threshold: f64,
    pub min_shared_columns: usize,
    pub min_overlap_ratio: f64,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            rename_threshold: RENAME_THRESHOLD,
            replacement_threshold: REPLACEMENT_THRESHOLD,
            min_shared_columns: MIN_SHARED_COLUMNS,
            min_overlap_ratio: MIN_OVERLAP_RATIO,
        }
    }
}

impl DiffOptions {
    /// Check that every ratio lies in `[0, 1]`.
    pub fn validate(&self) -> SchemaResult<()> {
        let ratios = [
            ("rename_threshold", self.rename_threshold),
            ("replacement_threshold", self.replacement_threshold),
            ("min_overlap_ratio", self.min_overlap_ratio),
        ];
        for (key, value) in ratios {
            if !(0.0..=1.0).contains(&value) {
                return Err(SchemaError::config(format!(
                    "{} must be between 0 and 1, got {}",
                    key, value
                )));
            }
        }
        Ok(())
    }
}

/// Jaccard similarity of two column-name sets, in `[0, 1]`.
///
/// Scores are forced to zero unless the tables share at least
/// `min_shared_columns` names or overlap by at least `min_overlap_ratio`,
/// so a lone `id` column never makes two tables look alike.
pub fn column_similarity(old: &[Column], new: &[Column], options: &DiffOptions) -> f64 {
    match (old.is_empty(), new.is_empty()) {
        (true, true) => return 1.0,
        (true, false) | (false, true) => return 0.0,
        _ => {}
    }

    let old_names: HashSet<&str> = old.iter().map(|c| c.name.as_str()).collect();
    let new_names: HashSet<&str> = new.iter().map(|c| c.name.as_str()).collect();

    let shared = old_names.intersection(&new_names).count();
    let union = old_names.union(&new_names).count();
    let ratio = shared as f64 / union as f64;

    if shared >= options.min_shared_columns || ratio >= options.min_overlap_ratio {
        ratio
    } else {
        0.0
    }
}

/// Diff two schemas into migration steps.
///
/// Fails only when a column added to an existing table is `NOT NULL`
/// without a default.
pub fn diff_schemas(old: &Schema, new: &Schema, options: &DiffOptions) -> SchemaResult<Vec<Step>> {
    Differ::new(old, new, options).run()
}

/// Diff two schemas with default options and render every step as SQL.
pub fn diff(old: &Schema, new: &Schema) -> SchemaResult<Vec<String>> {
    let steps = diff_schemas(old, new, &DiffOptions::default())?;
    Ok(steps.iter().map(ToSql::to_sql).collect())
}

/// Working state for a single diff call.
struct Differ<'a> {
    old: &'a Schema,
    new: &'a Schema,
    options: &'a DiffOptions,
    steps: Vec<Step>,
    matched_old: HashSet<&'a str>,
    matched_new: HashSet<&'a str>,
    /// new table -> old table
    renames: HashMap<&'a str, &'a str>,
    /// new table -> old table it likely replaces
    replacements: HashMap<&'a str, &'a str>,
}

impl<'a> Differ<'a> {
    fn new(old: &'a Schema, new: &'a Schema, options: &'a DiffOptions) -> Self {
        Self {
            old,
            new,
            options,
            steps: Vec::new(),
            matched_old: HashSet::new(),
            matched_new: HashSet::new(),
            renames: HashMap::new(),
            replacements: HashMap::new(),
        }
    }

    fn run(mut self) -> SchemaResult<Vec<Step>> {
        self.diff_types();
        self.match_same_name_tables();
        self.detect_renames();
        self.diff_matched_tables()?;
        self.create_types();
        self.detect_replacements();
        self.create_tables();
        self.drop_tables();
        Ok(self.steps)
    }

    fn diff_types(&mut self) {
        let (old, new) = (self.old, self.new);
        for (name, new_def) in &new.types {
            let Some(old_def) = old.types.get(name) else {
                continue;
            };

            match (old_def, new_def) {
                (TypeDef::Enum { values: old_values }, TypeDef::Enum { values: new_values }) => {
                    for (old_value, new_value) in old_values.iter().zip(new_values) {
                        if old_value != new_value {
                            self.steps.push(Step::Error(format!(
                                "Cannot modify existing enum value in {} ('{}' -> '{}')",
                                name, old_value, new_value
                            )));
                        }
                    }
                    for removed in old_values.iter().skip(new_values.len()) {
                        self.steps.push(Step::Error(format!(
                            "Cannot remove existing enum value in {} ('{}')",
                            name, removed
                        )));
                    }
                    for value in new_values.iter().skip(old_values.len()) {
                        self.steps.push(Step::AddEnumValue {
                            type_name: name.clone(),
                            value: value.clone(),
                        });
                    }
                }
                (
                    TypeDef::Composite { definition: old_def },
                    TypeDef::Composite { definition: new_def },
                ) => {
                    if old_def != new_def {
                        self.steps.push(Step::Error(format!(
                            "Cannot modify composite type {}; drop and recreate it manually",
                            name
                        )));
                        break;
                    }
                }
                (old_def, new_def) => {
                    self.steps.push(Step::Error(format!(
                        "Cannot change type {} between {} and {}",
                        name,
                        old_def.kind_name(),
                        new_def.kind_name()
                    )));
                }
            }
        }
    }

    fn match_same_name_tables(&mut self) {
        let (old, new) = (self.old, self.new);
        for name in old.tables.keys() {
            if new.tables.contains_key(name) {
                self.matched_old.insert(name);
                self.matched_new.insert(name);
            }
        }
    }

    /// Best-scoring unclaimed new table at or above `threshold`.
    /// Ties go to the table declared first.
    fn best_match(&self, old_columns: &[Column], threshold: f64) -> Option<&'a str> {
        let new = self.new;
        let mut best: Option<(&'a str, f64)> = None;

        for (name, columns) in &new.tables {
            let name = name.as_str();
            if self.matched_new.contains(name) || self.replacements.contains_key(name) {
                continue;
            }
            let score = column_similarity(old_columns, columns, self.options);
            trace!(candidate = name, score, "table similarity");
            if score < threshold {
                continue;
            }
            match best {
                Some((_, best_score)) if best_score >= score => {}
                _ => best = Some((name, score)),
            }
        }

        best.map(|(name, _)| name)
    }

    fn detect_renames(&mut self) {
        let old = self.old;
        for (old_name, old_columns) in &old.tables {
            if self.new.tables.contains_key(old_name) {
                continue;
            }
            let Some(new_name) = self.best_match(old_columns, self.options.rename_threshold)
            else {
                continue;
            };

            debug!(from = %old_name, to = new_name, "detected table rename");
            self.renames.insert(new_name, old_name);
            self.matched_old.insert(old_name);
            self.matched_new.insert(new_name);
            self.steps.push(Step::RenameTable {
                from: old_name.clone(),
                to: new_name.to_string(),
            });
        }
    }

    fn diff_matched_tables(&mut self) -> SchemaResult<()> {
        let (old, new) = (self.old, self.new);
        for (name, new_columns) in &new.tables {
            if !self.matched_new.contains(name.as_str()) {
                continue;
            }
            let old_name = self.renames.get(name.as_str()).copied().unwrap_or(name.as_str());
            if let Some(old_columns) = old.tables.get(old_name) {
                self.diff_table(name, old_columns, new_columns)?;
            }
        }
        Ok(())
    }

    fn diff_table(&mut self, table: &str, old: &[Column], new: &[Column]) -> SchemaResult<()> {
        let find_old = |name: &str| old.iter().find(|c| c.name == name);

        for column in new.iter().filter(|c| find_old(c.name.as_str()).is_none()) {
            if column.not_null && column.default.is_none() {
                return Err(SchemaError::NotNullWithoutDefault {
                    table: table.to_string(),
                    column: column.name.clone(),
                });
            }
            self.steps.push(Step::AddColumn {
                table: table.to_string(),
                column: column.clone(),
            });
        }

        for column in new {
            if let Some(old_column) = find_old(column.name.as_str()) {
                self.diff_column(table, old_column, column);
            }
        }

        for column in old {
            if !new.iter().any(|c| c.name == column.name) {
                self.steps.push(Step::DropColumn {
                    table: table.to_string(),
                    column: column.name.clone(),
                });
            }
        }

        Ok(())
    }

    /// Primary-key toggles are also emitted when the base type is unchanged.
    fn diff_column(&mut self, table: &str, old: &Column, new: &Column) {
        let table = table.to_string();
        let column = new.name.clone();

        if old.base_type() != new.base_type() {
            if old.default.is_some() {
                self.steps.push(Step::DropDefault {
                    table: table.clone(),
                    column: column.clone(),
                });
            }
            self.steps.push(Step::AlterType {
                table: table.clone(),
                column: column.clone(),
                new_type: new.base_type().to_string(),
                using: boolean_cast(old.base_type(), new.base_type(), &column),
            });
            if let Some(value) = &new.default {
                self.steps.push(Step::SetDefault {
                    table: table.clone(),
                    column: column.clone(),
                    value: value.clone(),
                });
            }
        } else if old.default != new.default {
            self.steps.push(match &new.default {
                Some(value) => Step::SetDefault {
                    table: table.clone(),
                    column: column.clone(),
                    value: value.clone(),
                },
                None => Step::DropDefault {
                    table: table.clone(),
                    column: column.clone(),
                },
            });
        }

        match (old.is_primary_key(), new.is_primary_key()) {
            (true, false) => self.steps.push(Step::DropPrimaryKey {
                table: table.clone(),
            }),
            (false, true) => self.steps.push(Step::AddPrimaryKey {
                table: table.clone(),
                column: column.clone(),
            }),
            _ => {}
        }

        if old.not_null != new.not_null {
            self.steps.push(if new.not_null {
                Step::SetNotNull { table, column }
            } else {
                Step::DropNotNull { table, column }
            });
        }
    }

    fn create_types(&mut self) {
        let (old, new) = (self.old, self.new);
        for (name, def) in &new.types {
            if old.types.contains_key(name) {
                continue;
            }
            match def {
                TypeDef::Enum { values } => self.steps.push(Step::CreateEnum {
                    name: name.clone(),
                    values: values.clone(),
                }),
                TypeDef::Composite { .. } => {
                    debug!(type_name = %name, "skipping creation of composite type");
                }
            }
        }
    }

    fn detect_replacements(&mut self) {
        let old = self.old;
        for (old_name, old_columns) in &old.tables {
            if self.matched_old.contains(old_name.as_str()) {
                continue;
            }
            if let Some(new_name) =
                self.best_match(old_columns, self.options.replacement_threshold)
            {
                debug!(old = %old_name, new = new_name, "detected likely table replacement");
                self.replacements.insert(new_name, old_name);
            }
        }
    }

    fn create_tables(&mut self) {
        let (old, new) = (self.old, self.new);
        for (name, columns) in &new.tables {
            if self.matched_new.contains(name.as_str()) {
                continue;
            }
            self.steps.push(Step::CreateTable {
                name: name.clone(),
                columns: columns.clone(),
            });

            let Some(&old_name) = self.replacements.get(name.as_str()) else {
                continue;
            };
            let Some(old_columns) = old.tables.get(old_name) else {
                continue;
            };
            let shared: Vec<String> = columns
                .iter()
                .filter(|c| old_columns.iter().any(|o| o.name == c.name))
                .map(|c| c.name.clone())
                .collect();
            if shared.is_empty() {
                continue;
            }
            self.steps.push(Step::Note(format!(
                "Migrate data from {} to {} (similar columns detected)",
                old_name, name
            )));
            self.steps.push(Step::CopyData {
                from: old_name.to_string(),
                to: name.clone(),
                columns: shared,
            });
        }
    }

    fn drop_tables(&mut self) {
        let old = self.old;
        for name in old.tables.keys() {
            if self.matched_old.contains(name.as_str()) {
                continue;
            }
            self.steps.push(Step::Caution(format!(
                "Dropping table {} will permanently delete its data",
                name
            )));
            self.steps.push(Step::DropTable(name.clone()));
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeFamily {
    Boolean,
    Numeric,
    Text,
    Other,
}

fn type_family(data_type: &str) -> TypeFamily {
    let upper = data_type.to_ascii_uppercase();
    let base = upper.split('(').next().unwrap_or_default().trim();
    match base {
        "BOOLEAN" | "BOOL" => TypeFamily::Boolean,
        "SMALLINT" | "INTEGER" | "INT" | "BIGINT" | "INT2" | "INT4" | "INT8" | "SERIAL"
        | "SMALLSERIAL" | "BIGSERIAL" | "DECIMAL" | "NUMERIC" | "REAL" | "FLOAT" | "FLOAT4"
        | "FLOAT8" | "DOUBLE PRECISION" => TypeFamily::Numeric,
        "TEXT" | "VARCHAR" | "CHAR" | "CHARACTER" | "CHARACTER VARYING" | "BPCHAR" | "CITEXT" => {
            TypeFamily::Text
        }
        _ => TypeFamily::Other,
    }
}

/// `USING` expression for a conversion to boolean, when one is needed.
fn boolean_cast(old_type: &str, new_type: &str, column: &str) -> Option<String> {
    if type_family(new_type) != TypeFamily::Boolean {
        return None;
    }
    match type_family(old_type) {
        TypeFamily::Boolean => None,
        TypeFamily::Numeric => Some(format!("{} <> 0", column)),
        TypeFamily::Text => Some(format!(
            "CASE WHEN {} = 'true' THEN TRUE ELSE FALSE END",
            column
        )),
        TypeFamily::Other => Some(format!("{}::boolean", column)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use pretty_assertions::assert_eq;

    fn sql(old: &str, new: &str) -> Vec<String> {
        diff(&parse(old).unwrap(), &parse(new).unwrap()).unwrap()
    }

    fn cols(names: &[&str]) -> Vec<Column> {
        names.iter().map(|n| Column::new(*n, "INT")).collect()
    }

    #[test]
    fn test_similarity_edge_cases() {
        let opts = DiffOptions::default();
        assert_eq!(column_similarity(&[], &[], &opts), 1.0);
        assert_eq!(column_similarity(&cols(&["id"]), &[], &opts), 0.0);
        assert_eq!(column_similarity(&[], &cols(&["id"]), &opts), 0.0);
    }

    #[test]
    fn test_similarity_guard() {
        let opts = DiffOptions::default();
        // Only `id` shared: ratio 1/3 and fewer than three shared names.
        assert_eq!(
            column_similarity(&cols(&["id", "a"]), &cols(&["id", "b"]), &opts),
            0.0
        );
        // Three shared names pass the guard even with a low ratio.
        let score = column_similarity(
            &cols(&["id", "a", "b", "x", "y"]),
            &cols(&["id", "a", "b", "z", "w"]),
            &opts,
        );
        assert!((score - 3.0 / 7.0).abs() < 1e-9);
        // High overlap passes with fewer than three shared names.
        assert_eq!(
            column_similarity(&cols(&["id", "a"]), &cols(&["id", "a"]), &opts),
            1.0
        );
    }

    #[test]
    fn test_identical_schema_yields_nothing() {
        let text = "CREATE TYPE mood AS ENUM ('a', 'b');
                    CREATE TABLE t (id SERIAL PRIMARY KEY, m mood DEFAULT 'a' NOT NULL);";
        assert!(sql(text, text).is_empty());
    }

    #[test]
    fn test_enum_append() {
        let out = sql(
            "CREATE TYPE mood AS ENUM ('a', 'b');",
            "CREATE TYPE mood AS ENUM ('a', 'b', 'c');",
        );
        assert_eq!(out, vec!["ALTER TYPE mood ADD VALUE 'c';"]);
    }

    #[test]
    fn test_enum_mutation_is_reported() {
        let out = sql(
            "CREATE TYPE mood AS ENUM ('a', 'b');",
            "CREATE TYPE mood AS ENUM ('x', 'b', 'c');",
        );
        assert_eq!(
            out,
            vec![
                "-- ERROR: Cannot modify existing enum value in mood ('a' -> 'x')",
                "ALTER TYPE mood ADD VALUE 'c';",
            ]
        );
    }

    #[test]
    fn test_composite_change_stops_type_phase() {
        let out = sql(
            "CREATE TYPE p AS (x INT); CREATE TYPE mood AS ENUM ('a');
             CREATE TABLE t (id INT);",
            "CREATE TYPE p AS (x BIGINT); CREATE TYPE mood AS ENUM ('a', 'b');
             CREATE TABLE t (id INT, name TEXT);",
        );
        assert_eq!(
            out,
            vec![
                "-- ERROR: Cannot modify composite type p; drop and recreate it manually",
                "ALTER TABLE t ADD COLUMN name TEXT;",
            ]
        );
    }

    #[test]
    fn test_type_kind_change() {
        let out = sql("CREATE TYPE p AS ENUM ('a');", "CREATE TYPE p AS (x INT);");
        assert_eq!(
            out,
            vec!["-- ERROR: Cannot change type p between ENUM and composite"]
        );
    }

    #[test]
    fn test_new_enum_precedes_new_table() {
        let out = sql(
            "",
            "CREATE TABLE t (m mood); CREATE TYPE mood AS ENUM ('a'); CREATE TYPE pt AS (x INT);",
        );
        assert_eq!(
            out,
            vec![
                "CREATE TYPE mood AS ENUM ('a');",
                "CREATE TABLE t (\n  m mood\n);",
            ]
        );
    }

    #[test]
    fn test_type_change_reapplies_default() {
        let out = sql(
            "CREATE TABLE t (n INT DEFAULT 0);",
            "CREATE TABLE t (n BIGINT DEFAULT 1);",
        );
        assert_eq!(
            out,
            vec![
                "ALTER TABLE t ALTER COLUMN n DROP DEFAULT;",
                "ALTER TABLE t ALTER COLUMN n TYPE BIGINT;",
                "ALTER TABLE t ALTER COLUMN n SET DEFAULT 1;",
            ]
        );
    }

    #[test]
    fn test_boolean_casts() {
        let out = sql(
            "CREATE TABLE t (a INT, b VARCHAR(5), c DATE, d BOOL);",
            "CREATE TABLE t (a BOOLEAN, b BOOLEAN, c BOOLEAN, d BOOLEAN);",
        );
        assert_eq!(
            out,
            vec![
                "ALTER TABLE t ALTER COLUMN a TYPE BOOLEAN USING a <> 0;",
                "ALTER TABLE t ALTER COLUMN b TYPE BOOLEAN USING CASE WHEN b = 'true' THEN TRUE ELSE FALSE END;",
                "ALTER TABLE t ALTER COLUMN c TYPE BOOLEAN USING c::boolean;",
                "ALTER TABLE t ALTER COLUMN d TYPE BOOLEAN;",
            ]
        );
    }

    #[test]
    fn test_primary_key_toggle() {
        let out = sql(
            "CREATE TABLE t (id INT PRIMARY KEY, code INT);",
            "CREATE TABLE t (id BIGINT, code INT PRIMARY KEY);",
        );
        assert_eq!(
            out,
            vec![
                "ALTER TABLE t ALTER COLUMN id TYPE BIGINT;",
                "ALTER TABLE t DROP CONSTRAINT t_pkey;",
                "ALTER TABLE t ADD PRIMARY KEY (code);",
            ]
        );
    }

    #[test]
    fn test_default_and_not_null_changes() {
        let out = sql(
            "CREATE TABLE t (a TEXT DEFAULT 'x', b TEXT, c TEXT NOT NULL);",
            "CREATE TABLE t (a TEXT, b TEXT NOT NULL DEFAULT 'y', c TEXT);",
        );
        // `NOT NULL` before `DEFAULT` is honoured; the default swallows the rest.
        assert_eq!(
            out,
            vec![
                "ALTER TABLE t ALTER COLUMN a DROP DEFAULT;",
                "ALTER TABLE t ALTER COLUMN b SET DEFAULT 'y';",
                "ALTER TABLE t ALTER COLUMN b SET NOT NULL;",
                "ALTER TABLE t ALTER COLUMN c DROP NOT NULL;",
            ]
        );
    }

    #[test]
    fn test_dropped_columns_follow_old_order() {
        let out = sql(
            "CREATE TABLE t (a INT, b INT, c INT);",
            "CREATE TABLE t (b INT);",
        );
        assert_eq!(
            out,
            vec![
                "ALTER TABLE t DROP COLUMN a;",
                "ALTER TABLE t DROP COLUMN c;",
            ]
        );
    }

    #[test]
    fn test_not_null_without_default_is_fatal() {
        let old = parse("CREATE TABLE t (a INT);").unwrap();
        let new = parse("CREATE TABLE t (a INT, b INT NOT NULL);").unwrap();
        let err = diff(&old, &new).unwrap_err();
        assert_eq!(err.to_string(), "New column t.b is NOT NULL without default");
    }

    #[test]
    fn test_replacement_suggests_data_copy() {
        // 3 shared of 7 names: below the rename threshold, above the replacement one.
        let out = sql(
            "CREATE TABLE legacy (id INT, name TEXT, email TEXT, fax TEXT, pager TEXT);",
            "CREATE TABLE contacts (id INT, name TEXT, email TEXT, phone TEXT, city TEXT);",
        );
        assert_eq!(
            out,
            vec![
                "CREATE TABLE contacts (\n  id INT,\n  name TEXT,\n  email TEXT,\n  phone TEXT,\n  city TEXT\n);",
                "-- Migrate data from legacy to contacts (similar columns detected)",
                "INSERT INTO contacts (id, name, email) SELECT id, name, email FROM legacy;",
                "-- CAUTION: Dropping table legacy will permanently delete its data",
                "DROP TABLE legacy;",
            ]
        );
    }

    #[test]
    fn test_custom_thresholds_turn_replacement_into_rename() {
        let old = parse("CREATE TABLE legacy (id INT, name TEXT, email TEXT, fax TEXT, pager TEXT);").unwrap();
        let new = parse("CREATE TABLE contacts (id INT, name TEXT, email TEXT, phone TEXT, city TEXT);").unwrap();
        let options = DiffOptions {
            rename_threshold: 0.4,
            ..DiffOptions::default()
        };
        let steps = diff_schemas(&old, &new, &options).unwrap();
        assert_eq!(
            steps[0],
            Step::RenameTable {
                from: "legacy".into(),
                to: "contacts".into()
            }
        );
        assert!(!steps.iter().any(|s| matches!(s, Step::DropTable(_))));
    }

    #[test]
    fn test_rename_prefers_best_score() {
        let out = sql(
            "CREATE TABLE person (id INT, name TEXT, mood TEXT, age INT);",
            "CREATE TABLE people (id INT, name TEXT, mood TEXT);
             CREATE TABLE humans (id INT, name TEXT, mood TEXT, age INT);",
        );
        assert_eq!(out[0], "ALTER TABLE person RENAME TO humans;");
        assert_eq!(out[1], "CREATE TABLE people (\n  id INT,\n  name TEXT,\n  mood TEXT\n);");
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_enum_value_removal_is_reported() {
        let out = sql(
            "CREATE TYPE m AS ENUM ('a', 'b', 'c');",
            "CREATE TYPE m AS ENUM ('a', 'b');",
        );
        assert_eq!(out, vec!["-- ERROR: Cannot remove existing enum value in m ('c')"]);
    }

    #[test]
    fn test_rename_tie_goes_to_first_declared() {
        let out = sql(
            "CREATE TABLE person (id INT, name TEXT, mood TEXT);",
            "CREATE TABLE people (id INT, name TEXT, mood TEXT);
             CREATE TABLE humans (id INT, name TEXT, mood TEXT);",
        );
        assert_eq!(
            out,
            vec![
                "ALTER TABLE person RENAME TO people;",
                "CREATE TABLE humans (\n  id INT,\n  name TEXT,\n  mood TEXT\n);",
            ]
        );
    }

    #[test]
    fn test_replacement_tie_goes_to_first_declared() {
        // Both new tables score 3/7 against `legacy`.
        let old = parse("CREATE TABLE legacy (id INT, name TEXT, email TEXT, fax TEXT, pager TEXT);").unwrap();
        let new = parse(
            "CREATE TABLE contacts (id INT, name TEXT, email TEXT, phone TEXT, city TEXT);
             CREATE TABLE leads (id INT, name TEXT, email TEXT, source TEXT, score INT);",
        )
        .unwrap();
        let steps = diff_schemas(&old, &new, &DiffOptions::default()).unwrap();
        let copies: Vec<_> = steps
            .iter()
            .filter(|s| matches!(s, Step::CopyData { .. }))
            .collect();
        assert_eq!(
            copies,
            vec![&Step::CopyData {
                from: "legacy".into(),
                to: "contacts".into(),
                columns: vec!["id".into(), "name".into(), "email".into()],
            }]
        );
    }

    #[test]
    fn test_replacement_target_claimed_once() {
        let out = sql(
            "CREATE TABLE a (id INT, name TEXT, email TEXT, fax TEXT, pager TEXT);
             CREATE TABLE b (id INT, name TEXT, email TEXT, fax TEXT, telex TEXT);",
            "CREATE TABLE c (id INT, name TEXT, email TEXT, phone TEXT, city TEXT);",
        );
        let inserts: Vec<_> = out.iter().filter(|l| l.starts_with("INSERT")).collect();
        assert_eq!(inserts, vec!["INSERT INTO c (id, name, email) SELECT id, name, email FROM a;"]);
        assert!(out.contains(&"DROP TABLE a;".to_string()));
        assert!(out.contains(&"DROP TABLE b;".to_string()));
    }

    #[test]
    fn test_primary_key_toggle_with_same_base_type() {
        let out = sql(
            "CREATE TABLE t (id SERIAL PRIMARY KEY);",
            "CREATE TABLE t (id SERIAL);",
        );
        assert_eq!(out, vec!["ALTER TABLE t DROP CONSTRAINT t_pkey;"]);
    }

    #[test]
    fn test_options_validation() {
        assert!(DiffOptions::default().validate().is_ok());
        let bad = DiffOptions {
            replacement_threshold: 1.5,
            ..DiffOptions::default()
        };
        assert_eq!(
            bad.validate().unwrap_err().to_string(),
            "Configuration error: replacement_threshold must be between 0 and 1, got 1.5"
        );
    }
}
