//! Schema parser.
//!
//! Parses a constrained subset of SQL DDL into a [`Schema`].
//!
//! # Accepted statements
//!
//! ```text
//! CREATE TYPE name AS ENUM ('a', 'b', ...)
//! CREATE TYPE name AS ( field type, ... )
//! CREATE TABLE [IF NOT EXISTS] name ( column_def | table_constraint, ... )
//!
//! column_def = name type_tokens* [NOT NULL] [DEFAULT expr...]
//! ```
//!
//! Anything else is skipped. Statements and columns are split on `;` and `,`
//! that sit outside parentheses.

use nom::{
    bytes::complete::{tag_no_case, take_while1},
    character::complete::{char, multispace0, multispace1},
    combinator::opt,
    sequence::tuple,
    IResult,
};
use tracing::trace;

use crate::ast::{Column, Schema, TypeDef};
use crate::error::{SchemaError, SchemaResult};

/// Longest statement prefix echoed back in error messages.
const ERROR_SNIPPET_LEN: usize = 50;

/// Keywords that end the type portion of a column definition.
const COLUMN_CONSTRAINT_KEYWORDS: [&str; 4] = ["DEFAULT", "NOT", "NULL", "CHECK"];

/// Leading keywords of table-level constraint entries.
const TABLE_CONSTRAINT_KEYWORDS: [&str; 4] = ["CONSTRAINT", "UNIQUE", "CHECK", "EXCLUDE"];

/// Parse a schema text into a [`Schema`].
///
/// Empty or comment-only input yields an empty schema.
///
/// # Example
///
/// ```
/// use schemashift::parser::parse;
///
/// let schema = parse("CREATE TABLE users (id SERIAL PRIMARY KEY, name TEXT NOT NULL);").unwrap();
/// assert_eq!(schema.tables["users"].len(), 2);
/// assert!(schema.tables["users"][1].not_null);
/// ```
pub fn parse(input: &str) -> SchemaResult<Schema> {
    let cleaned = clean(input);
    let mut schema = Schema::new();

    if cleaned.is_empty() {
        return Ok(schema);
    }

    check_parentheses(&cleaned)?;

    for raw in split_outside_parens(&cleaned, ';') {
        let stmt = collapse_whitespace(raw);
        if stmt.is_empty() {
            continue;
        }
        trace!(statement = %stmt, "parsing statement");
        parse_statement(&stmt, &mut schema)?;
    }

    Ok(schema)
}

/// Strip `--` comments and identifier quotes, then trim.
pub(crate) fn clean(input: &str) -> String {
    input
        .lines()
        .map(|line| match line.find("--") {
            Some(idx) => &line[..idx],
            None => line,
        })
        .collect::<Vec<_>>()
        .join("\n")
        .replace(['"', '`'], "")
        .trim()
        .to_string()
}

fn check_parentheses(text: &str) -> SchemaResult<()> {
    let open = text.matches('(').count();
    let close = text.matches(')').count();
    if open != close {
        return Err(SchemaError::parse(format!(
            "Unbalanced parentheses: {} opening, {} closing",
            open, close
        )));
    }
    Ok(())
}

/// Split on `sep` wherever it is not enclosed in parentheses.
/// Returns trimmed, non-empty fragments.
fn split_outside_parens(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (idx, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if c == sep && depth == 0 => {
                parts.push(&text[start..idx]);
                start = idx + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);

    parts
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn snippet(stmt: &str) -> String {
    if stmt.chars().count() > ERROR_SNIPPET_LEN {
        let head: String = stmt.chars().take(ERROR_SNIPPET_LEN).collect();
        format!("{}...", head)
    } else {
        stmt.to_string()
    }
}

fn starts_with_keywords(stmt: &str, keywords: &[&str]) -> bool {
    let mut words = stmt.split_whitespace();
    keywords
        .iter()
        .all(|kw| words.next().is_some_and(|w| w.eq_ignore_ascii_case(kw)))
}

fn parse_statement(stmt: &str, schema: &mut Schema) -> SchemaResult<()> {
    if starts_with_keywords(stmt, &["CREATE", "TYPE"]) {
        let (name, def) = parse_create_type(stmt)?;
        schema.add_type(name, def);
    } else if starts_with_keywords(stmt, &["CREATE", "TABLE"]) {
        let (name, columns) = parse_create_table(stmt)?;
        schema.add_table(name, columns);
    }
    Ok(())
}

/// Parse an identifier (type, table or column name), optionally schema-qualified.
fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '_' || c == '.' || c == '$')(input)
}

/// `CREATE TYPE <name> AS`
fn type_header(input: &str) -> IResult<&str, &str> {
    let (input, _) = tuple((
        tag_no_case("CREATE"),
        multispace1,
        tag_no_case("TYPE"),
        multispace1,
    ))(input)?;
    let (input, name) = identifier(input)?;
    let (input, _) = tuple((multispace1, tag_no_case("AS")))(input)?;
    Ok((input, name))
}

/// `ENUM (` — returns what follows the opening parenthesis.
fn enum_open(input: &str) -> IResult<&str, ()> {
    let (input, _) = tuple((multispace0, tag_no_case("ENUM"), multispace0, char('(')))(input)?;
    Ok((input, ()))
}

/// `CREATE TABLE [IF NOT EXISTS] <name> (` — returns what follows the
/// opening parenthesis.
fn table_header(input: &str) -> IResult<&str, &str> {
    let (input, _) = tuple((
        tag_no_case("CREATE"),
        multispace1,
        tag_no_case("TABLE"),
        multispace1,
    ))(input)?;
    let (input, _) = opt(tuple((
        tag_no_case("IF"),
        multispace1,
        tag_no_case("NOT"),
        multispace1,
        tag_no_case("EXISTS"),
        multispace1,
    )))(input)?;
    let (input, name) = identifier(input)?;
    let (input, _) = tuple((multispace0, char('(')))(input)?;
    Ok((input, name))
}

fn parse_create_type(stmt: &str) -> SchemaResult<(String, TypeDef)> {
    let invalid = || SchemaError::parse(format!("Invalid CREATE TYPE syntax: {}", snippet(stmt)));

    let (rest, name) = type_header(stmt).map_err(|_| invalid())?;

    if let Ok((body, ())) = enum_open(rest) {
        let inner = body.trim_end().strip_suffix(')').ok_or_else(invalid)?;
        let values = split_enum_values(inner);
        if values.is_empty() {
            return Err(SchemaError::parse(format!(
                "ENUM type '{}' has no values",
                name
            )));
        }
        return Ok((name.to_string(), TypeDef::Enum { values }));
    }

    let definition = rest.trim();
    if !definition.starts_with('(') || !definition.ends_with(')') {
        return Err(invalid());
    }

    Ok((
        name.to_string(),
        TypeDef::Composite {
            definition: definition.to_string(),
        },
    ))
}

/// Split enum values on commas outside single quotes and unquote them.
fn split_enum_values(body: &str) -> Vec<String> {
    let mut values = Vec::new();
    let mut current = String::new();
    let mut in_quote = false;

    for c in body.chars() {
        match c {
            '\'' => {
                in_quote = !in_quote;
                current.push(c);
            }
            ',' if !in_quote => values.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    values.push(current);

    values
        .iter()
        .map(|v| unquote(v.trim()))
        .filter(|v| !v.is_empty())
        .collect()
}

fn unquote(value: &str) -> String {
    value
        .strip_prefix('\'')
        .and_then(|v| v.strip_suffix('\''))
        .map(|v| v.replace("''", "'"))
        .unwrap_or_else(|| value.to_string())
}

fn parse_create_table(stmt: &str) -> SchemaResult<(String, Vec<Column>)> {
    let invalid = || {
        SchemaError::parse(format!(
            "Incomplete or invalid CREATE TABLE statement: {}",
            snippet(stmt)
        ))
    };

    let (rest, name) = table_header(stmt).map_err(|_| invalid())?;
    // Column list ends at the matching parenthesis; trailing clauses are ignored.
    let close = matching_paren(rest).ok_or_else(invalid)?;
    let body = &rest[..close];

    if body.trim().is_empty() {
        return Err(SchemaError::parse(format!(
            "Table '{}' has no columns defined",
            name
        )));
    }

    let fragments: Vec<&str> = split_outside_parens(body, ',')
        .into_iter()
        .filter(|f| !is_table_constraint(f))
        .collect();

    if fragments.is_empty() {
        return Err(SchemaError::parse(format!(
            "Table '{}' has no valid column definitions",
            name
        )));
    }

    let columns = fragments
        .into_iter()
        .map(|f| parse_column(f, name))
        .collect::<SchemaResult<Vec<_>>>()?;

    Ok((name.to_string(), columns))
}

/// Byte offset of the `)` closing a `(` that was already consumed.
fn matching_paren(text: &str) -> Option<usize> {
    let mut depth = 1usize;
    for (idx, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

fn leading_word(text: &str) -> &str {
    let end = text
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(text.len());
    &text[..end]
}

fn is_table_constraint(fragment: &str) -> bool {
    let first = leading_word(fragment);
    if TABLE_CONSTRAINT_KEYWORDS
        .iter()
        .any(|kw| first.eq_ignore_ascii_case(kw))
    {
        return true;
    }
    if first.eq_ignore_ascii_case("PRIMARY") || first.eq_ignore_ascii_case("FOREIGN") {
        let next = leading_word(fragment[first.len()..].trim_start());
        return next.eq_ignore_ascii_case("KEY");
    }
    false
}

fn is_column_constraint_keyword(token: &str) -> bool {
    COLUMN_CONSTRAINT_KEYWORDS
        .iter()
        .any(|kw| token.eq_ignore_ascii_case(kw))
}

fn parse_column(fragment: &str, table: &str) -> SchemaResult<Column> {
    let tokens: Vec<&str> = fragment.split_whitespace().collect();

    if tokens.len() < 2 {
        return Err(SchemaError::parse(format!(
            "Invalid column definition in table '{}': {}",
            table, fragment
        )));
    }

    let name = tokens[0];
    let type_end = tokens[1..]
        .iter()
        .position(|t| is_column_constraint_keyword(t))
        .map_or(tokens.len(), |pos| pos + 1);
    let data_type = tokens[1..type_end].join(" ");

    if data_type.is_empty() {
        return Err(SchemaError::parse(format!(
            "Column '{}' in table '{}' has no type specified",
            name, table
        )));
    }

    let mut column = Column::new(name, data_type);

    let mut i = type_end;
    while i < tokens.len() {
        let token = tokens[i];
        if token.eq_ignore_ascii_case("NOT")
            && tokens
                .get(i + 1)
                .is_some_and(|t| t.eq_ignore_ascii_case("NULL"))
        {
            column.not_null = true;
            i += 2;
            continue;
        }
        if token.eq_ignore_ascii_case("DEFAULT") {
            let value = &tokens[i + 1..];
            if value.is_empty() {
                return Err(SchemaError::parse(format!(
                    "Column '{}' in table '{}' has DEFAULT keyword but no value specified",
                    name, table
                )));
            }
            column.default = Some(value.join(" "));
            break;
        }
        i += 1;
    }

    Ok(column)
}
