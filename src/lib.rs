//! # schemashift
//!
//! > **Two schemas in, one migration out.**
//!
//! schemashift compares two SQL schema texts made of `CREATE TYPE` and
//! `CREATE TABLE` statements and produces the ordered statements that turn
//! the first into the second.
//!
//! ## Quick Example
//!
//! ```
//! let old = "CREATE TABLE person (id SERIAL PRIMARY KEY, name VARCHAR(100), mood TEXT);";
//! let new = "CREATE TABLE users (id SERIAL PRIMARY KEY, name VARCHAR(150), mood TEXT);";
//!
//! let lines = schemashift::generate_schema_alters(old, new);
//! assert_eq!(lines[0], "ALTER TABLE person RENAME TO users;");
//! assert_eq!(lines[1], "ALTER TABLE users ALTER COLUMN name TYPE VARCHAR(150);");
//! ```
//!
//! ## Output lines
//!
//! | Prefix         | Meaning                                   |
//! |----------------|-------------------------------------------|
//! | `-- ERROR:`    | Problem that needs a human; not executed  |
//! | `-- CAUTION:`  | The next statement destroys data          |
//! | `-- ...`       | Informational note                        |
//! | anything else  | Executable statement ending in `;`        |

pub mod ast;
pub mod config;
pub mod diff;
pub mod error;
pub mod output;
pub mod parser;
pub mod step;
pub mod transpiler;

use tracing::warn;

use crate::diff::DiffOptions;
use crate::step::Step;
use crate::transpiler::ToSql;

pub mod prelude {
    pub use crate::ast::*;
    pub use crate::config::Config;
    pub use crate::diff::{DiffOptions, column_similarity, diff, diff_schemas};
    pub use crate::error::*;
    pub use crate::output::{LineKind, MigrationFile, classify};
    pub use crate::parser::parse;
    pub use crate::step::Step;
    pub use crate::transpiler::ToSql;
    pub use crate::{generate_schema_alters, generate_schema_alters_with, parse_schema};
}

/// Parse a schema text into its structured model.
///
/// # Example
///
/// ```
/// use schemashift::parse_schema;
///
/// let schema = parse_schema("CREATE TYPE mood AS ENUM ('sad', 'happy');").unwrap();
/// assert!(schema.types.contains_key("mood"));
/// ```
pub fn parse_schema(text: &str) -> error::SchemaResult<ast::Schema> {
    parser::parse(text)
}

/// Generate migration lines from `old_text` to `new_text` with default options.
///
/// Never fails: parse errors and fatal diff errors come back as a single
/// `-- ERROR:` line.
pub fn generate_schema_alters(old_text: &str, new_text: &str) -> Vec<String> {
    generate_schema_alters_with(old_text, new_text, &DiffOptions::default())
}

/// Like [`generate_schema_alters`], with explicit matching heuristics.
pub fn generate_schema_alters_with(
    old_text: &str,
    new_text: &str,
    options: &DiffOptions,
) -> Vec<String> {
    match try_generate(old_text, new_text, options) {
        Ok(lines) => lines,
        Err(e) => {
            warn!(error = %e, "schema diff failed");
            vec![Step::Error(e.to_string()).to_sql()]
        }
    }
}

fn try_generate(
    old_text: &str,
    new_text: &str,
    options: &DiffOptions,
) -> error::SchemaResult<Vec<String>> {
    let old = parser::parse(old_text)?;
    let new = parser::parse(new_text)?;

    for (label, text, schema) in [("old", old_text, &old), ("new", new_text, &new)] {
        if schema.is_empty() && !parser::clean(text).is_empty() {
            return Ok(vec![
                Step::Error(format!(
                    "No valid CREATE TYPE or CREATE TABLE statements found in {} schema",
                    label
                ))
                .to_sql(),
            ]);
        }
    }

    let steps = diff::diff_schemas(&old, &new, options)?;
    Ok(steps.iter().map(ToSql::to_sql).collect())
}
