//! SQL output formatting.
//!
//! Statements are rendered in one canonical layout: every table, column and
//! index name is double-quoted, one column per line. Expression tokens keep
//! the quoting style they were written with.

use alloc::string::{String, ToString};
use core::fmt::{self, Display, Write};

use super::expr::Expr;
use super::lexer::{Token, TokenKind};
use super::parser::{CreateIndex, CreateTable, FieldInfo, Statement};

/// Write `text` between `quote` characters, doubling embedded quotes.
fn write_quoted(f: &mut impl Write, text: &str, quote: char) -> fmt::Result {
    f.write_char(quote)?;
    for c in text.chars() {
        if c == quote {
            f.write_char(quote)?;
        }
        f.write_char(c)?;
    }
    f.write_char(quote)
}

/// Push `text` between `quote` characters onto `sql`, doubling embedded
/// quotes.
fn push_quoted(sql: &mut String, text: &str, quote: char) {
    sql.push(quote);
    for c in text.chars() {
        if c == quote {
            sql.push(quote);
        }
        sql.push(c);
    }
    sql.push(quote);
}

/// Quote a name as a double-quoted SQL identifier.
#[must_use]
pub fn quote_identifier(name: &str) -> String {
    let mut quoted = String::with_capacity(name.len() + 2);
    push_quoted(&mut quoted, name, '"');
    quoted
}

impl Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::QuotedIdentifier => write_quoted(f, &self.text, '"'),
            TokenKind::BackquotedIdentifier => write_quoted(f, &self.text, '`'),
            TokenKind::StringLiteral => write_quoted(f, &self.text, '\''),
            TokenKind::BracketedIdentifier => write!(f, "[{}]", self.text),
            TokenKind::BlobLiteral => write!(f, "X'{}'", self.text),
            TokenKind::Identifier
            | TokenKind::Numeric
            | TokenKind::Operator
            | TokenKind::PostfixKeyword
            | TokenKind::Punctuation => f.write_str(&self.text),
        }
    }
}

/// The token printed last, unless the expression ends with an operator or
/// a parenthesis.
fn last_token(expr: &Expr) -> Option<&Token> {
    match expr {
        Expr::Leaf(token) => Some(token),
        Expr::Prefix { operand: last, .. } | Expr::Infix { right: last, .. } => last_token(last),
        Expr::Postfix { .. } | Expr::Call { .. } | Expr::Group(_) => None,
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Leaf(token) => write!(f, "{token}"),
            Expr::Prefix { op, operand } => {
                let operand = operand.to_string();
                // `- -1` must not collapse into a line comment.
                if op.text.bytes().all(|b| b.is_ascii_alphabetic()) || operand.starts_with('-') {
                    write!(f, "{op} {operand}")
                } else {
                    write!(f, "{op}{operand}")
                }
            }
            Expr::Infix { left, op, right } => match (op.kind, op.text.as_str()) {
                (TokenKind::Punctuation, ",") => write!(f, "{left}, {right}"),
                (TokenKind::Punctuation, "") => write!(f, "{left} {right}"),
                (TokenKind::Operator, ".") => {
                    let right = right.to_string();
                    // `1.a` would lex as the number `1.` followed by `a`.
                    if last_token(left).is_some_and(|t| t.kind == TokenKind::Numeric)
                        || right.starts_with(|c: char| c.is_ascii_digit())
                    {
                        write!(f, "{left} . {right}")
                    } else {
                        write!(f, "{left}.{right}")
                    }
                }
                _ => write!(f, "{left} {op} {right}"),
            },
            Expr::Postfix { operand, op } => write!(f, "{operand} {op}"),
            Expr::Call { callee, args } => match args {
                Some(args) => write!(f, "{callee}({args})"),
                None => write!(f, "{callee}()"),
            },
            Expr::Group(inner) => write!(f, "({inner})"),
        }
    }
}

/// Trait for types that can be formatted as SQL statements.
pub trait FormatSql {
    /// Format this value as a SQL string.
    fn format_sql(&self) -> String;
}

fn write_field(sql: &mut String, field: &FieldInfo) {
    sql.push('\t');
    push_quoted(sql, &field.name, '"');
    if !field.type_name.is_empty() {
        sql.push('\t');
        sql.push_str(&field.type_name);
    }
    if field.is_not_null {
        sql.push_str(" NOT NULL");
    }
    if let Some(default) = &field.default_value {
        sql.push_str(" DEFAULT ");
        if field.default_is_quoted {
            push_quoted(sql, default, '\'');
        } else if field.default_is_expression {
            sql.push('(');
            sql.push_str(default);
            sql.push(')');
        } else {
            sql.push_str(default);
        }
    }
}

impl FormatSql for CreateTable {
    fn format_sql(&self) -> String {
        let mut sql = String::new();
        if self.is_temporary {
            sql.push_str("CREATE TEMPORARY TABLE ");
        } else {
            sql.push_str("CREATE TABLE ");
        }
        sql.push_str(&quote_identifier(&self.name));
        sql.push_str(" (\n");

        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                sql.push_str(",\n");
            }
            write_field(&mut sql, field);
        }

        // Table-level PRIMARY KEY constraint
        if !self.primary_key.is_empty() {
            sql.push_str(",\n\tPRIMARY KEY(");
            for (i, &idx) in self.primary_key.iter().enumerate() {
                if i > 0 {
                    sql.push(',');
                }
                sql.push_str(&quote_identifier(&self.fields[idx].name));
            }
            if self
                .primary_key
                .iter()
                .all(|&idx| self.fields[idx].is_auto_increment)
            {
                sql.push_str(" AUTOINCREMENT");
            }
            sql.push(')');
        }

        sql.push_str("\n)");
        if !self.has_rowid {
            sql.push_str(" WITHOUT ROWID");
        }
        sql
    }
}

impl FormatSql for CreateIndex {
    fn format_sql(&self) -> String {
        let mut sql = String::new();
        if self.is_unique {
            sql.push_str("CREATE UNIQUE INDEX ");
        } else {
            sql.push_str("CREATE INDEX ");
        }
        sql.push_str(&quote_identifier(&self.name));
        sql.push_str(" ON ");
        sql.push_str(&quote_identifier(&self.table_name));
        sql.push_str(" (\n");

        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                sql.push_str(",\n");
            }
            sql.push('\t');
            sql.push_str(&column.to_string());
        }

        sql.push_str("\n)");
        if let Some(predicate) = &self.where_predicate {
            sql.push_str(" WHERE ");
            sql.push_str(&predicate.to_string());
        }
        sql
    }
}

impl FormatSql for Statement {
    fn format_sql(&self) -> String {
        match self {
            Statement::CreateTable(table) => table.format_sql(),
            Statement::CreateIndex(index) => index.format_sql(),
        }
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_sql())
    }
}
