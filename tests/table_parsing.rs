//! Integration tests for parsing `CREATE TABLE` statements.

use sqlite_ddl_rs::{CreateTable, ParseError, Statement, StatementKind, parse};

fn table(sql: &str) -> CreateTable {
    match parse(sql) {
        Ok(Statement::CreateTable(table)) => table,
        other => panic!("Expected CreateTable for {sql}, got {other:?}"),
    }
}

// =============================================================================
// Columns
// =============================================================================

#[test]
fn test_autoincrement_and_default() {
    let t = table("CREATE TABLE t (a INTEGER PRIMARY KEY AUTOINCREMENT, b TEXT NOT NULL DEFAULT 'x')");
    assert_eq!(t.name, "t");
    assert_eq!(t.fields.len(), 2);
    assert!(t.has_rowid);

    let a = &t.fields[0];
    assert_eq!(a.type_name, "INTEGER");
    assert!(a.is_part_of_primary_key);
    assert!(a.is_auto_increment);

    let b = &t.fields[1];
    assert!(b.is_not_null);
    assert!(!b.is_part_of_primary_key);
    assert_eq!(b.default_value.as_deref(), Some("x"));
    assert!(b.default_is_quoted);
    assert!(!b.default_is_expression);
    assert_eq!(t.primary_key, [0]);
}

#[test]
fn test_type_names() {
    let t = table(
        "CREATE TABLE t (a VARCHAR ( 10 ), b DOUBLE PRECISION, c DECIMAL(10, -2), d, e unsigned big int NOT NULL)",
    );
    let types: Vec<&str> = t.fields.iter().map(|f| f.type_name.as_str()).collect();
    assert_eq!(types, ["VARCHAR(10)", "DOUBLE PRECISION", "DECIMAL(10,-2)", "", "unsigned big int"]);
    assert!(t.fields[4].is_not_null);
}

#[test]
fn test_default_values() {
    let t = table(
        "CREATE TABLE t (
            a DEFAULT -1,
            b DEFAULT CURRENT_TIMESTAMP,
            c DEFAULT (datetime('now')),
            d DEFAULT X'AB',
            e DEFAULT 'it''s',
            f DEFAULT NULL,
            g DEFAULT +1.5e3
        )",
    );
    let defaults: Vec<(&str, bool, bool)> = t
        .fields
        .iter()
        .map(|f| {
            (
                f.default_value.as_deref().unwrap(),
                f.default_is_quoted,
                f.default_is_expression,
            )
        })
        .collect();
    assert_eq!(
        defaults,
        [
            ("-1", false, false),
            ("CURRENT_TIMESTAMP", false, false),
            ("datetime('now')", false, true),
            ("X'AB'", false, false),
            ("it's", true, false),
            ("NULL", false, false),
            ("+1.5e3", false, false),
        ]
    );
}

#[test]
fn test_quoted_type_names() {
    let t = table("CREATE TABLE t (a \"TEXT\", b [big int] NOT NULL, c 'VARCHAR'(10), d `x` INTEGER)");
    let types: Vec<&str> = t.fields.iter().map(|f| f.type_name.as_str()).collect();
    assert_eq!(types, ["\"TEXT\"", "[big int]", "'VARCHAR'(10)", "`x` INTEGER"]);
    assert!(t.fields[1].is_not_null);
}

#[test]
fn test_quoted_names() {
    let t = table("CREATE TABLE \"my \"\"t\"\"\" ([a b], `c`, 'd', \"e\")");
    assert_eq!(t.name, "my \"t\"");
    assert_eq!(t.column_names(), ["a b", "c", "d", "e"]);
}

#[test]
fn test_field_lookup_ignores_case() {
    let t = table("CREATE TABLE t (Name TEXT)");
    assert_eq!(t.field("NAME").map(|f| f.type_name.as_str()), Some("TEXT"));
    assert!(t.field("other").is_none());
}

#[test]
fn test_comments_and_whitespace() {
    let t = table("CREATE TABLE t ( -- the key\n a /* inline */ INTEGER\n\t,b)");
    assert_eq!(t.column_names(), ["a", "b"]);
    assert_eq!(t.fields[0].type_name, "INTEGER");
}

// =============================================================================
// Constraints
// =============================================================================

#[test]
fn test_without_rowid_composite_key() {
    let t = table("CREATE TABLE t (a,b,c, PRIMARY KEY(a,c)) WITHOUT ROWID");
    assert!(!t.has_rowid);
    assert!(t.fields[0].is_part_of_primary_key);
    assert!(!t.fields[1].is_part_of_primary_key);
    assert!(t.fields[2].is_part_of_primary_key);
    assert_eq!(t.primary_key, [0, 2]);
}

#[test]
fn test_table_key_keeps_declared_order() {
    let t = table("CREATE TABLE t (a, b, CONSTRAINT pk PRIMARY KEY (b COLLATE NOCASE DESC, a ASC))");
    assert_eq!(t.primary_key, [1, 0]);
}

#[test]
fn test_skipped_constraints() {
    let t = table(
        "CREATE TABLE t (
            id INTEGER CONSTRAINT pk PRIMARY KEY ON CONFLICT REPLACE,
            parent INTEGER REFERENCES p(id) ON DELETE SET NULL ON UPDATE CASCADE DEFERRABLE INITIALLY DEFERRED,
            name TEXT COLLATE NOCASE UNIQUE CHECK (length(name) > 0),
            doubled INTEGER GENERATED ALWAYS AS (id * 2) STORED,
            tripled AS (id * 3),
            UNIQUE (name, parent) ON CONFLICT IGNORE,
            CHECK (id > 0),
            FOREIGN KEY (parent) REFERENCES p (id) MATCH SIMPLE NOT DEFERRABLE
        )",
    );
    assert_eq!(t.column_names(), ["id", "parent", "name", "doubled", "tripled"]);
    assert_eq!(t.fields[2].type_name, "TEXT");
    assert_eq!(t.fields[4].type_name, "");
    assert!(t.fields.iter().all(|f| f.default_value.is_none()));
    assert_eq!(t.primary_key, [0]);
}

#[test]
fn test_check_and_generated_bodies_are_skipped() {
    // Bodies SQLite accepts but the expression grammar does not cover.
    for sql in [
        "CREATE TABLE t1 (a, CHECK (a IN ()))",
        "CREATE TABLE t2 (a, CHECK (a ->> '$.x' IS NOT NULL))",
        "CREATE TABLE t3 (a, b AS (a -> '$.x'))",
        "CREATE TABLE t4 (a CHECK (a -> 0 IN ()), b GENERATED ALWAYS AS (a ->> 1) STORED)",
        "CREATE TABLE t5 (a CHECK ((a > 0) AND (((a < 10)))), CHECK (a BETWEEN 1 AND 2 OR a = ''))",
    ] {
        let t = table(sql);
        assert!(!t.fields.is_empty(), "{sql}");
    }
    assert_eq!(table("CREATE TABLE t3 (a, b AS (a -> '$.x'))").column_names(), ["a", "b"]);
}

#[test]
fn test_unbalanced_check_is_rejected() {
    assert!(matches!(
        parse("CREATE TABLE t (a CHECK (a > (0))"),
        Err(ParseError::UnexpectedEof { .. })
    ));
    assert!(parse("CREATE TABLE t (a, CHECK a > 0)").is_err());
}

#[test]
fn test_null_constraint_is_accepted() {
    let t = table("CREATE TABLE t (a TEXT NULL, b NOT NULL)");
    assert!(!t.fields[0].is_not_null);
    assert!(t.fields[1].is_not_null);
}

#[test]
fn test_unknown_key_column_is_ignored() {
    let t = table("CREATE TABLE t (a, PRIMARY KEY (missing, a))");
    assert_eq!(t.primary_key, [0]);
}

// =============================================================================
// Statement forms
// =============================================================================

#[test]
fn test_temporary_and_qualified() {
    let t = table("CREATE TEMP TABLE IF NOT EXISTS main.t (a)");
    assert_eq!(t.name, "t");
    assert!(t.is_temporary);
    assert!(table("create temporary table t (a)").is_temporary);
}

#[test]
fn test_from_str() {
    let stmt: Statement = "CREATE TABLE t (a)".parse().unwrap();
    assert_eq!(stmt.kind(), StatementKind::Table);
    assert_eq!(stmt.table_name(), "t");
    assert_eq!(stmt.index_name(), None);
    assert_eq!(Statement::try_from("CREATE TABLE t (a)"), Ok(stmt));
}

// =============================================================================
// Rejections
// =============================================================================

#[test]
fn test_trailing_comma() {
    assert!(parse("CREATE TABLE t (a INTEGER, )").is_err());
}

#[test]
fn test_nothing_after_without_rowid() {
    assert!(matches!(
        parse("CREATE TABLE t (a PRIMARY KEY) WITHOUT ROWID, STRICT"),
        Err(ParseError::TrailingInput { .. })
    ));
    assert!(matches!(
        parse("CREATE TABLE t (a);"),
        Err(ParseError::TrailingInput { .. })
    ));
}

#[test]
fn test_empty_column_list() {
    assert_eq!(
        parse("CREATE TABLE t (PRIMARY KEY (a))"),
        Err(ParseError::EmptyColumnList)
    );
    assert!(parse("CREATE TABLE t ()").is_err());
}

#[test]
fn test_rejected_statements() {
    for sql in [
        "",
        "CREATE",
        "CREATE VIEW v AS SELECT 1",
        "CREATE TABLE t AS SELECT 1",
        "CREATE TABLE t (a",
        "CREATE TABLE t (a DEFAULT)",
        "CREATE TABLE t (a VARCHAR(x))",
        "CREATE TABLE t (a CONSTRAINT c)",
        "CREATE TABLE t (a CHECK a > 0)",
        "CREATE TABLE t (a) WITHOUT",
        "CREATE TABLE t (a REFERENCES p ON DELETE EXPLODE)",
        "CREATE TEMP INDEX ix ON t (a)",
    ] {
        assert!(parse(sql).is_err(), "{sql} should be rejected");
    }
    assert!(matches!(parse(""), Err(ParseError::UnexpectedEof { .. })));
}
