//! Column rename and drop rewriting.
//!
//! When a column is renamed or dropped, the statements of the indexes on its
//! table have to be regenerated. Only tokens that SQLite would resolve as
//! column references are touched; deciding which tokens those are depends on
//! where the token sits:
//!
//! | Token                     | Indexed column | Nested expression | `WHERE` |
//! |---------------------------|----------------|-------------------|---------|
//! | number                    | no             | no                | no      |
//! | `'x'`                     | yes            | no                | no      |
//! | `"x"`, `[x]`, `` `x` ``   | yes            | yes               | yes     |
//! | bare word                 | yes            | yes               | no      |
//! | bare `NULL`               | no             | no                | no      |
//!
//! A string literal is a column name only when it is the whole indexed
//! column, optionally followed by `COLLATE` or `ASC`/`DESC`.

use alloc::string::String;
use hashbrown::HashMap;

use super::expr::Expr;
use super::format::FormatSql;
use super::lexer::{Token, TokenKind};
use super::parser::{CreateIndex, CreateTable, Statement, parse};
use crate::errors::Error;

/// What happens to a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnChange {
    /// The column is renamed to the given name.
    Rename(String),
    /// The column is removed from its table.
    Drop,
}

/// Column changes keyed by the old column name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenameMap {
    changes: HashMap<String, ColumnChange>,
}

impl RenameMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rename from `old` to `new`.
    #[must_use]
    pub fn rename(mut self, old: impl Into<String>, new: impl Into<String>) -> Self {
        self.insert(old, ColumnChange::Rename(new.into()));
        self
    }

    /// Mark `old` as dropped.
    #[must_use]
    pub fn drop_column(mut self, old: impl Into<String>) -> Self {
        self.insert(old, ColumnChange::Drop);
        self
    }

    /// Record a change, replacing any previous change for `old`.
    pub fn insert(&mut self, old: impl Into<String>, change: ColumnChange) {
        self.changes.insert(old.into(), change);
    }

    /// The change recorded for `old`, matched exactly.
    #[must_use]
    pub fn get(&self, old: &str) -> Option<&ColumnChange> {
        self.changes.get(old)
    }

    /// Number of recorded changes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Whether no change is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

impl FromIterator<(String, ColumnChange)> for RenameMap {
    fn from_iter<I: IntoIterator<Item = (String, ColumnChange)>>(iter: I) -> Self {
        Self {
            changes: iter.into_iter().collect(),
        }
    }
}

/// Errors that stop a rewrite.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RewriteError {
    /// A statement references a dropped column and cannot be recreated.
    #[error("Column '{0}' is dropped but still referenced")]
    DroppedColumn(String),
    /// Every column of the table was dropped.
    #[error("No columns left in table '{0}'")]
    NoColumnsLeft(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    IndexedColumn,
    Nested,
    Where,
}

impl Position {
    fn nested(self) -> Self {
        match self {
            Position::IndexedColumn | Position::Nested => Position::Nested,
            Position::Where => Position::Where,
        }
    }
}

fn is_column_reference(token: &Token, position: Position) -> bool {
    match token.kind {
        TokenKind::QuotedIdentifier
        | TokenKind::BracketedIdentifier
        | TokenKind::BackquotedIdentifier => true,
        TokenKind::Identifier => {
            position != Position::Where && !token.text.eq_ignore_ascii_case("NULL")
        }
        TokenKind::StringLiteral => position == Position::IndexedColumn,
        _ => false,
    }
}

fn rewrite_token(
    token: &mut Token,
    position: Position,
    changes: &RenameMap,
) -> Result<(), RewriteError> {
    if !is_column_reference(token, position) {
        return Ok(());
    }
    match changes.get(&token.text) {
        Some(ColumnChange::Drop) => Err(RewriteError::DroppedColumn(token.text.clone())),
        Some(ColumnChange::Rename(new)) => {
            tracing::trace!(old = %token.text, new = %new, "rewriting column reference");
            token.text.clone_from(new);
            token.kind = TokenKind::QuotedIdentifier;
            Ok(())
        }
        None => Ok(()),
    }
}

fn rewrite_expr(
    expr: &mut Expr,
    position: Position,
    changes: &RenameMap,
) -> Result<(), RewriteError> {
    match expr {
        Expr::Leaf(token) => rewrite_token(token, position, changes),
        // Ordering keywords leave an indexed column at the top level.
        Expr::Postfix { operand, .. } => rewrite_expr(operand, position, changes),
        // The right side of COLLATE is a collation name.
        Expr::Infix { left, op, .. } if op.is_keyword("COLLATE") => {
            rewrite_expr(left, position, changes)
        }
        Expr::Infix { left, right, .. } => {
            rewrite_expr(left, position.nested(), changes)?;
            rewrite_expr(right, position.nested(), changes)
        }
        Expr::Prefix { operand, .. } => rewrite_expr(operand, position.nested(), changes),
        Expr::Call { args, .. } => match args {
            Some(args) => rewrite_expr(args, position.nested(), changes),
            None => Ok(()),
        },
        Expr::Group(inner) => rewrite_expr(inner, position.nested(), changes),
    }
}

impl CreateIndex {
    /// Rewrite column references in the indexed columns and the predicate.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::DroppedColumn`] at the first reference to a
    /// dropped column; rewrites already applied are kept.
    pub fn rewrite_columns(&mut self, changes: &RenameMap) -> Result<(), RewriteError> {
        for column in &mut self.columns {
            rewrite_expr(column, Position::IndexedColumn, changes)?;
        }
        if let Some(predicate) = &mut self.where_predicate {
            rewrite_expr(predicate, Position::Where, changes)?;
        }
        Ok(())
    }
}

impl CreateTable {
    /// Rename and drop fields, keeping the primary key consistent.
    ///
    /// Field names are matched exactly, like index column references.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::NoColumnsLeft`] if every field is dropped.
    pub fn rewrite_columns(&mut self, changes: &RenameMap) -> Result<(), RewriteError> {
        let mut remap = alloc::vec::Vec::with_capacity(self.fields.len());
        let mut kept = 0usize;
        for field in &mut self.fields {
            match changes.get(&field.name) {
                Some(ColumnChange::Drop) => remap.push(None),
                Some(ColumnChange::Rename(new)) => {
                    field.name.clone_from(new);
                    remap.push(Some(kept));
                    kept += 1;
                }
                None => {
                    remap.push(Some(kept));
                    kept += 1;
                }
            }
        }

        if kept == 0 {
            return Err(RewriteError::NoColumnsLeft(self.name.clone()));
        }

        let mut index = 0;
        self.fields.retain(|_| {
            let keep = remap[index].is_some();
            index += 1;
            keep
        });
        self.primary_key = self
            .primary_key
            .iter()
            .filter_map(|&old| remap[old])
            .collect();
        Ok(())
    }
}

impl Statement {
    /// Apply column changes without touching the table name.
    ///
    /// # Errors
    ///
    /// Returns an error when an index references a dropped column or a
    /// table loses all of its columns.
    pub fn rewrite_columns(&mut self, changes: &RenameMap) -> Result<(), RewriteError> {
        match self {
            Statement::CreateTable(table) => table.rewrite_columns(changes),
            Statement::CreateIndex(index) => index.rewrite_columns(changes),
        }
    }

    /// Point the statement at `new_table_name` and apply column changes.
    ///
    /// The table name is always replaced. Returns `false` when the statement
    /// can no longer be recreated: it should be dropped, not re-executed.
    pub fn replace(&mut self, new_table_name: &str, changes: &RenameMap) -> bool {
        match self {
            Statement::CreateTable(table) => table.name = new_table_name.into(),
            Statement::CreateIndex(index) => index.table_name = new_table_name.into(),
        }
        match self.rewrite_columns(changes) {
            Ok(()) => true,
            Err(error) => {
                tracing::debug!(%error, "statement cannot be recreated");
                false
            }
        }
    }
}

/// Regenerate catalog text after a table rename and column changes.
///
/// # Errors
///
/// Returns an error if `sql` does not parse or the statement can no longer
/// be recreated.
pub fn regenerate(sql: &str, new_table_name: &str, changes: &RenameMap) -> Result<String, Error> {
    let mut statement = parse(sql)?;
    match &mut statement {
        Statement::CreateTable(table) => table.name = new_table_name.into(),
        Statement::CreateIndex(index) => index.table_name = new_table_name.into(),
    }
    statement.rewrite_columns(changes)?;
    Ok(statement.format_sql())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec;

    fn index(sql: &str) -> CreateIndex {
        match parse(sql).unwrap() {
            Statement::CreateIndex(index) => index,
            Statement::CreateTable(_) => panic!("Expected CreateIndex"),
        }
    }

    fn rewritten(sql: &str, changes: &RenameMap) -> Result<CreateIndex, RewriteError> {
        let mut ix = index(sql);
        ix.rewrite_columns(changes)?;
        Ok(ix)
    }

    #[test]
    fn test_rename_forces_quoted_identifier() {
        let ix = rewritten("CREATE INDEX ix ON t (a, [b] DESC)", &RenameMap::new().rename("a", "x y").rename("b", "z")).unwrap();
        assert_eq!(ix.columns[0].to_string(), "\"x y\"");
        assert_eq!(ix.columns[1].to_string(), "\"z\" DESC");
    }

    #[test]
    fn test_drop_fails() {
        let changes = RenameMap::new().drop_column("b");
        assert_eq!(
            rewritten("CREATE INDEX ix ON t (a, b)", &changes),
            Err(RewriteError::DroppedColumn("b".into()))
        );
        assert!(rewritten("CREATE INDEX ix ON t (a)", &changes).is_ok());
    }

    #[test]
    fn test_string_literal_only_at_top_level() {
        let changes = RenameMap::new().rename("a", "b");
        let ix = rewritten(
            "CREATE INDEX ix ON t ('a' COLLATE NOCASE, lower('a'), 'a' || x) WHERE 'a' = x",
            &changes,
        )
        .unwrap();
        assert_eq!(ix.columns[0].to_string(), "\"b\" COLLATE NOCASE");
        assert_eq!(ix.columns[1].to_string(), "lower('a')");
        assert_eq!(ix.columns[2].to_string(), "'a' || x");
        assert_eq!(ix.where_predicate.unwrap().to_string(), "'a' = x");
    }

    #[test]
    fn test_bare_words_in_where_are_kept() {
        let changes = RenameMap::new().rename("a", "b");
        let ix = rewritten(
            "CREATE INDEX ix ON t (a + 1) WHERE a > 0 AND \"a\" < 9",
            &changes,
        )
        .unwrap();
        assert_eq!(ix.columns[0].to_string(), "\"b\" + 1");
        assert_eq!(
            ix.where_predicate.unwrap().to_string(),
            "a > 0 AND \"b\" < 9"
        );
    }

    #[test]
    fn test_numbers_null_and_callees_are_never_columns() {
        let changes = RenameMap::new()
            .rename("1", "one")
            .rename("null", "n")
            .rename("NULL", "n")
            .rename("lower", "l")
            .rename("nocase", "c");
        let ix = rewritten(
            "CREATE INDEX ix ON t (1, null, lower(x) COLLATE nocase, \"1\")",
            &changes,
        )
        .unwrap();
        let columns: vec::Vec<_> = ix.columns.iter().map(ToString::to_string).collect();
        assert_eq!(columns, ["1", "null", "lower(x) COLLATE nocase", "\"one\""]);
    }

    #[test]
    fn test_table_rename_and_drop() {
        let mut stmt = parse("CREATE TABLE t (a, b, c, PRIMARY KEY (c, a))").unwrap();
        assert!(stmt.replace("u", &RenameMap::new().drop_column("a").rename("c", "d")));
        let Statement::CreateTable(table) = stmt else {
            panic!("Expected CreateTable");
        };
        assert_eq!(table.name, "u");
        assert_eq!(table.column_names(), vec!["b", "d"]);
        assert_eq!(table.primary_key, vec![1]);
    }

    #[test]
    fn test_table_drop_all() {
        let mut stmt = parse("CREATE TABLE t (a)").unwrap();
        assert_eq!(
            stmt.rewrite_columns(&RenameMap::new().drop_column("a")),
            Err(RewriteError::NoColumnsLeft("t".into()))
        );
    }

    #[test]
    fn test_replace_always_renames_table() {
        let mut stmt = parse("CREATE INDEX ix ON t (a)").unwrap();
        assert!(!stmt.replace("t2", &RenameMap::new().drop_column("a")));
        assert_eq!(stmt.table_name(), "t2");
    }

    #[test]
    fn test_regenerate() {
        let sql = regenerate(
            "CREATE INDEX ix ON t (a) WHERE \"a\" NOTNULL",
            "t2",
            &RenameMap::new().rename("a", "b"),
        )
        .unwrap();
        assert_eq!(
            sql,
            "CREATE INDEX \"ix\" ON \"t2\" (\n\t\"b\"\n) WHERE \"b\" NOTNULL"
        );
        assert!(matches!(
            regenerate("CREATE INDEX ix ON t (a)", "t", &RenameMap::new().drop_column("a")),
            Err(Error::Rewrite(RewriteError::DroppedColumn(_)))
        ));
        assert!(matches!(
            regenerate("CREATE VIEW v", "t", &RenameMap::new()),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn test_rename_map_from_iter() {
        let changes: RenameMap = [("a".to_string(), ColumnChange::Drop)].into_iter().collect();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes.get("a"), Some(&ColumnChange::Drop));
        assert_eq!(changes.get("A"), None);
        assert!(RenameMap::new().is_empty());
    }
}
