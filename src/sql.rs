//! Parser, formatter and rewriter for SQLite schema statements.
//!
//! SQLite keeps the text of every `CREATE TABLE` and `CREATE INDEX` statement
//! in its catalog. This module turns such text into a structured model and
//! back:
//!
//! - [`lexer`] splits the text into classified tokens
//! - [`expr`] folds tokens into expression trees without operator precedence
//! - [`parser`] builds [`CreateTable`] and [`CreateIndex`] models
//! - [`format`] renders a model in a canonical layout
//! - [`rewrite`] renames or drops columns ahead of a table rebuild
//!
//! Only the subset of the grammar the catalog actually contains is handled.
//! Unsupported constraints are consumed and forgotten, and anything the
//! parser does not recognize makes the whole statement invalid.

pub mod expr;
pub mod format;
pub mod lexer;
pub mod parser;
pub mod rewrite;

pub use expr::{Expr, parse_expression};
pub use format::{FormatSql, quote_identifier};
pub use lexer::{Lexer, Token, TokenKind, tokenize};
pub use parser::{
    CreateIndex, CreateTable, FieldInfo, ParseError, ParseResult, Parser, Statement,
    StatementKind, parse,
};
pub use rewrite::{ColumnChange, RenameMap, RewriteError, regenerate};
