//! Testing utilities for catalog parity verification against rusqlite.
//!
//! This module is gated behind the `testing` feature.
//!
//! # Provided helpers
//!
//! - [`assert_round_trip`]: parse, format and re-parse a statement
//! - [`test_parse_roundtrip`]: the same check for arbitrary, possibly invalid text
//! - [`test_rewrite_roundtrip`]: rename a column in arbitrary text and re-parse the result
//! - [`catalog_sql`]: execute DDL in rusqlite and read the text SQLite stored
//! - [`assert_catalog_parity`]: check that formatted statements rebuild the same schema
//! - [`FuzzSchema`]: arbitrary-driven table and index statements SQLite accepts

extern crate std;

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use arbitrary::{Arbitrary, Unstructured};
use rusqlite::Connection;

use crate::sql::{FormatSql, RenameMap, Statement, parse, quote_identifier};

/// Parse `sql`, format it, and parse the output again.
///
/// Returns the parsed statement.
///
/// # Panics
///
/// Panics if `sql` is invalid, if the formatted text is rejected, or if the
/// two parses disagree.
pub fn assert_round_trip(sql: &str) -> Statement {
    let statement = parse(sql).unwrap_or_else(|e| panic!("Failed to parse {sql:?}: {e}"));
    let formatted = statement.format_sql();
    let reparsed =
        parse(&formatted).unwrap_or_else(|e| panic!("Formatted SQL rejected: {e}\n{formatted}"));
    assert_eq!(
        statement, reparsed,
        "Round trip changed the statement\ninput: {sql}\nformatted: {formatted}"
    );
    assert_eq!(formatted, reparsed.format_sql(), "Formatting is not stable");
    statement
}

/// Round-trip check for arbitrary input.
///
/// Invalid input is ignored. For valid input the formatted text must parse
/// again and reach a fixed point after one normalization.
///
/// # Panics
///
/// Panics if the formatted text of a valid statement is rejected or keeps
/// changing.
pub fn test_parse_roundtrip(sql: &str) {
    let Ok(statement) = parse(sql) else {
        return;
    };
    let formatted = statement.format_sql();
    let normalized = parse(&formatted)
        .unwrap_or_else(|e| panic!("Formatted SQL rejected: {e}\ninput: {sql:?}\n{formatted}"));
    let canonical = normalized.format_sql();
    let again = parse(&canonical)
        .unwrap_or_else(|e| panic!("Canonical SQL rejected: {e}\n{canonical}"));
    assert_eq!(normalized, again, "Canonical form is not stable\ninput: {sql:?}");
    assert_eq!(canonical, again.format_sql());
}

/// Rewrite check for arbitrary input.
///
/// Renames `old` to `new` and retargets the statement at `table`. When both
/// the parse and the rewrite succeed, the formatted text must parse back to
/// the rewritten statement.
///
/// # Panics
///
/// Panics if a rewritten statement does not survive formatting.
pub fn test_rewrite_roundtrip(sql: &str, table: &str, old: &str, new: &str) {
    let Ok(mut statement) = parse(sql) else {
        return;
    };
    if !statement.replace(table, &RenameMap::new().rename(old, new)) {
        return;
    }
    let formatted = statement.format_sql();
    let reparsed = parse(&formatted).unwrap_or_else(|e| {
        panic!("Rewritten SQL rejected: {e}\ninput: {sql:?}\noutput: {formatted}")
    });
    assert_eq!(
        formatted,
        reparsed.format_sql(),
        "Rewritten SQL is not stable\ninput: {sql:?}"
    );
}

/// Execute `statements` in a fresh in-memory database and return the text
/// SQLite stored for each named object, in order.
///
/// # Errors
///
/// Returns an error if SQLite rejects any statement.
pub fn catalog_sql(statements: &[&str]) -> Result<Vec<String>, rusqlite::Error> {
    let conn = Connection::open_in_memory()?;
    let mut stored = Vec::with_capacity(statements.len());
    for &sql in statements {
        conn.execute_batch(sql)?;
    }
    let mut stmt = conn.prepare(
        "SELECT sql FROM sqlite_master \
         WHERE sql IS NOT NULL AND substr(name, 1, 7) <> 'sqlite_' \
         ORDER BY rowid",
    )?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
    for row in rows {
        stored.push(row?);
    }
    Ok(stored)
}

/// Column metadata from `pragma_table_info`: name, type, not null, pk.
type ColumnInfo = (String, String, bool, bool, i64);

/// Index metadata: uniqueness, partialness and `pragma_index_xinfo` rows.
type IndexInfo = (bool, bool, Vec<(i64, Option<String>, bool, Option<String>, bool)>);

fn table_info(conn: &Connection, table: &str) -> Result<Vec<ColumnInfo>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT name, type, \"notnull\", dflt_value IS NOT NULL, pk FROM pragma_table_info(?1) ORDER BY cid",
    )?;
    let rows = stmt.query_map([table], |row| {
        let declared: String = row.get(1)?;
        Ok((
            row.get(0)?,
            declared.replace(' ', "").to_ascii_uppercase(),
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
        ))
    })?;
    rows.collect()
}

fn has_rowid(conn: &Connection, table: &str) -> Result<bool, rusqlite::Error> {
    conn.query_row(
        "SELECT wr = 0 FROM pragma_table_list WHERE name = ?1",
        [table],
        |row| row.get(0),
    )
}

fn uses_autoincrement(conn: &Connection) -> Result<bool, rusqlite::Error> {
    conn.query_row(
        "SELECT count(*) > 0 FROM sqlite_master WHERE name = 'sqlite_sequence'",
        [],
        |row| row.get(0),
    )
}

fn index_info(conn: &Connection, table: &str, index: &str) -> Result<IndexInfo, rusqlite::Error> {
    let (unique, partial) = conn.query_row(
        "SELECT \"unique\", partial FROM pragma_index_list(?1) WHERE name = ?2",
        [table, index],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    let mut stmt = conn.prepare(
        "SELECT cid, name, \"desc\", coll, key FROM pragma_index_xinfo(?1) ORDER BY seqno",
    )?;
    let columns = stmt
        .query_map([index], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok((unique, partial, columns))
}

/// Execute `statements`, rebuild the schema from the formatted catalog text
/// in a second database, and compare the metadata SQLite reports for both.
///
/// # Panics
///
/// Panics if SQLite rejects a statement, if the catalog text does not parse,
/// or if any table or index differs between the two databases.
pub fn assert_catalog_parity(statements: &[&str]) {
    let original = Connection::open_in_memory().unwrap();
    for &sql in statements {
        original
            .execute_batch(sql)
            .unwrap_or_else(|e| panic!("SQLite rejected {sql}: {e}"));
    }

    let stored = catalog_sql(statements).unwrap();
    let parsed: Vec<Statement> = stored
        .iter()
        .map(|sql| parse(sql).unwrap_or_else(|e| panic!("Catalog SQL rejected: {e}\n{sql}")))
        .collect();

    let rebuilt = Connection::open_in_memory().unwrap();
    for statement in &parsed {
        let formatted = statement.format_sql();
        rebuilt
            .execute_batch(&formatted)
            .unwrap_or_else(|e| panic!("SQLite rejected formatted SQL: {e}\n{formatted}"));
    }

    for statement in &parsed {
        match statement {
            Statement::CreateTable(table) => {
                assert_eq!(
                    table_info(&original, &table.name).unwrap(),
                    table_info(&rebuilt, &table.name).unwrap(),
                    "Columns differ for {}\n{}",
                    table.name,
                    statement.format_sql()
                );
                assert_eq!(
                    has_rowid(&original, &table.name).unwrap(),
                    has_rowid(&rebuilt, &table.name).unwrap(),
                    "Rowid differs for {}",
                    table.name
                );
            }
            Statement::CreateIndex(index) => {
                assert_eq!(
                    index_info(&original, &index.table_name, &index.name).unwrap(),
                    index_info(&rebuilt, &index.table_name, &index.name).unwrap(),
                    "Index differs for {}\n{}",
                    index.name,
                    statement.format_sql()
                );
            }
        }
    }
    assert_eq!(
        uses_autoincrement(&original).unwrap(),
        uses_autoincrement(&rebuilt).unwrap(),
        "AUTOINCREMENT differs"
    );
}

/// Run the catalog parity check on a generated schema.
///
/// # Panics
///
/// Panics if the schema does not survive a rebuild from formatted text.
pub fn test_catalog_parity(schema: &FuzzSchema) {
    let statements = schema.statements();
    let refs: Vec<&str> = statements.iter().map(String::as_str).collect();
    assert_catalog_parity(&refs);
    for sql in &statements {
        assert_round_trip(sql);
    }
}

const TYPE_NAMES: &[&str] = &[
    "",
    "INTEGER",
    "TEXT",
    "REAL",
    "BLOB",
    "NUMERIC",
    "VARCHAR(10)",
    "DECIMAL(10,2)",
    "UNSIGNED BIG INT",
];

const DEFAULTS: &[&str] = &[
    "0",
    "-1",
    "+2.5",
    "'x'",
    "'it''s'",
    "NULL",
    "X'00FF'",
    "(1 + 2)",
    "CURRENT_TIMESTAMP",
];

/// A column name and the way it is written in generated SQL.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FuzzName {
    name: String,
    written: String,
}

impl FuzzName {
    fn generate(u: &mut Unstructured<'_>, prefix: &str, i: usize) -> arbitrary::Result<Self> {
        Ok(match u.int_in_range(0..=3u8)? {
            0 => {
                let name = format!("{prefix}{i}");
                Self {
                    written: name.clone(),
                    name,
                }
            }
            1 => {
                let name = format!("{prefix} \"{i}\"");
                Self {
                    written: quote_identifier(&name),
                    name,
                }
            }
            2 => {
                let name = format!("{prefix} {i}");
                Self {
                    written: format!("[{name}]"),
                    name,
                }
            }
            _ => {
                let name = format!("{prefix}`{i}");
                Self {
                    written: format!("`{}`", name.replace('`', "``")),
                    name,
                }
            }
        })
    }
}

/// A generated `CREATE TABLE` statement that SQLite accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuzzTable {
    /// Table name.
    pub name: String,
    /// The statement text.
    pub sql: String,
    columns: Vec<FuzzName>,
}

impl<'a> Arbitrary<'a> for FuzzTable {
    fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
        let table = FuzzName::generate(u, "t", 0)?;
        let num_cols: usize = u.int_in_range(1..=6)?;
        let columns = (0..num_cols)
            .map(|i| FuzzName::generate(u, "c", i))
            .collect::<arbitrary::Result<Vec<_>>>()?;

        // 0: no key, 1: inline key on the first column, 2: table-level key.
        let key_style = u.int_in_range(0..=2u8)?;
        let autoincrement = key_style == 1 && u.ratio(1, 3)?;
        let without_rowid = key_style != 0 && !autoincrement && u.ratio(1, 4)?;

        let mut definitions = Vec::with_capacity(num_cols + 2);
        for (i, column) in columns.iter().enumerate() {
            let mut definition = column.written.clone();
            let type_name = if autoincrement && i == 0 {
                "INTEGER"
            } else {
                *u.choose(TYPE_NAMES)?
            };
            if !type_name.is_empty() {
                definition.push(' ');
                definition.push_str(type_name);
            }
            if key_style == 1 && i == 0 {
                definition.push_str(" PRIMARY KEY");
                if autoincrement {
                    definition.push_str(" AUTOINCREMENT");
                }
            }
            if u.ratio(1, 3)? {
                definition.push_str(" NOT NULL");
            }
            if u.ratio(1, 3)? {
                definition.push_str(" DEFAULT ");
                definition.push_str(u.choose(DEFAULTS)?);
            }
            if u.ratio(1, 6)? {
                definition.push_str(" UNIQUE");
            }
            if u.ratio(1, 6)? {
                definition.push_str(&format!(" CHECK ({} IS NOT 42)", column.written));
            }
            definitions.push(definition);
        }

        if key_style == 2 {
            let key_len = u.int_in_range(1..=num_cols)?;
            let key: Vec<&str> = columns
                .iter()
                .rev()
                .take(key_len)
                .map(|c| c.written.as_str())
                .collect();
            definitions.push(format!("PRIMARY KEY ({})", key.join(", ")));
        }
        if u.ratio(1, 5)? {
            definitions.push(format!(
                "CONSTRAINT fk FOREIGN KEY ({}) REFERENCES parent (id) ON DELETE CASCADE",
                columns[0].written
            ));
        }

        let mut sql = format!(
            "CREATE TABLE {} (\n  {}\n)",
            table.written,
            definitions.join(",\n  ")
        );
        if without_rowid {
            sql.push_str(" WITHOUT ROWID");
        }
        Ok(Self {
            name: table.name,
            sql,
            columns,
        })
    }
}

/// A generated `CREATE INDEX` statement on a [`FuzzTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuzzIndex {
    /// The statement text.
    pub sql: String,
}

impl FuzzIndex {
    fn generate(
        u: &mut Unstructured<'_>,
        table: &FuzzTable,
        position: usize,
    ) -> arbitrary::Result<Self> {
        let num_cols: usize = u.int_in_range(1..=3)?;
        let mut columns = Vec::with_capacity(num_cols);
        for _ in 0..num_cols {
            let column = &u.choose(&table.columns)?.written;
            let expression = match u.int_in_range(0..=5u8)? {
                0 => column.clone(),
                1 => format!("{column} DESC"),
                2 => format!("{column} COLLATE NOCASE ASC"),
                3 => format!("lower({column})"),
                4 => format!("{column} + 1"),
                _ => format!("'{}'", column_literal(table, column)),
            };
            columns.push(expression);
        }

        let unique = if u.arbitrary()? { "UNIQUE " } else { "" };
        let mut sql = format!(
            "CREATE {unique}INDEX IF NOT EXISTS ix{position} ON {} ({})",
            table_reference(table),
            columns.join(", ")
        );
        if u.ratio(1, 3)? {
            let column = &u.choose(&table.columns)?.written;
            sql.push_str(&format!(" WHERE {column} NOTNULL AND {column} <> ''"));
        }
        Ok(Self { sql })
    }
}

/// The table name as written in an index statement.
fn table_reference(table: &FuzzTable) -> String {
    quote_identifier(&table.name)
}

/// The column name as a string literal, with quotes doubled.
fn column_literal(table: &FuzzTable, written: &str) -> String {
    table
        .columns
        .iter()
        .find(|c| c.written == written)
        .map_or_else(String::new, |c| c.name.replace('\'', "''"))
}

/// A table with indexes on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuzzSchema {
    /// The table.
    pub table: FuzzTable,
    /// Indexes on the table.
    pub indexes: Vec<FuzzIndex>,
}

impl FuzzSchema {
    /// All statements, table first.
    #[must_use]
    pub fn statements(&self) -> Vec<String> {
        core::iter::once(self.table.sql.clone())
            .chain(self.indexes.iter().map(|ix| ix.sql.clone()))
            .collect()
    }
}

impl<'a> Arbitrary<'a> for FuzzSchema {
    fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
        let table = FuzzTable::arbitrary(u)?;
        let num_indexes: usize = u.int_in_range(0..=3)?;
        let indexes = (0..num_indexes)
            .map(|i| FuzzIndex::generate(u, &table, i))
            .collect::<arbitrary::Result<Vec<_>>>()?;
        Ok(Self { table, indexes })
    }
}

impl core::fmt::Display for FuzzSchema {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for sql in self.statements() {
            writeln!(f, "{sql};")?;
        }
        Ok(())
    }
}
