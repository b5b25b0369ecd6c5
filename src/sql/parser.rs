//! Parser for `CREATE TABLE` and `CREATE INDEX` statements.
//!
//! The parser is single-pass and fail-fast: the first token that does not
//! fit the grammar aborts the parse with a [`ParseError`], and no partial
//! model is ever returned.

use alloc::collections::VecDeque;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::str::FromStr;

use super::expr::{Expr, parse_expression, parse_operand};
use super::lexer::{Token, TokenKind, tokenize};

/// Bare words that end a column's type name.
const COLUMN_CONSTRAINT_WORDS: &[&str] = &[
    "CONSTRAINT",
    "PRIMARY",
    "NULL",
    "UNIQUE",
    "CHECK",
    "DEFAULT",
    "REFERENCES",
    "GENERATED",
];

/// Bare words that start a table constraint instead of a column.
const TABLE_CONSTRAINT_WORDS: &[&str] = &["CONSTRAINT", "PRIMARY", "UNIQUE", "CHECK", "FOREIGN"];

const CONFLICT_ACTIONS: &[&str] = &["ROLLBACK", "ABORT", "FAIL", "IGNORE", "REPLACE"];

/// A column of a `CREATE TABLE` statement.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldInfo {
    /// Column name, unquoted.
    pub name: String,
    /// Declared type, empty when the column has none.
    pub type_name: String,
    /// `DEFAULT` value, unquoted when [`Self::default_is_quoted`].
    pub default_value: Option<String>,
    /// Whether the default was a parenthesized expression.
    pub default_is_expression: bool,
    /// Whether the default was a string literal.
    pub default_is_quoted: bool,
    /// Whether the column belongs to the primary key.
    pub is_part_of_primary_key: bool,
    /// Whether the column is declared `AUTOINCREMENT`.
    pub is_auto_increment: bool,
    /// Whether the column is declared `NOT NULL`.
    pub is_not_null: bool,
}

impl FieldInfo {
    /// Create a column with the given name and type and no constraints.
    #[must_use]
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            ..Self::default()
        }
    }
}

/// A `CREATE TABLE` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CreateTable {
    /// Table name, unquoted.
    pub name: String,
    /// Column definitions.
    pub fields: Vec<FieldInfo>,
    /// Indices into [`Self::fields`] of the primary key, in declared order.
    pub primary_key: Vec<usize>,
    /// `false` for `WITHOUT ROWID` tables.
    pub has_rowid: bool,
    /// Whether the table was created `TEMP` or `TEMPORARY`.
    pub is_temporary: bool,
}

impl CreateTable {
    /// Create an empty rowid table.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            primary_key: Vec::new(),
            has_rowid: true,
            is_temporary: false,
        }
    }

    /// Get the column names.
    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Find a column by name, ignoring ASCII case as SQLite does.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.position(name).map(|i| &self.fields[i])
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|f| f.name.eq_ignore_ascii_case(name))
    }

    /// Mark a column as part of the primary key, keeping declared order.
    fn mark_primary_key(&mut self, index: usize) {
        self.fields[index].is_part_of_primary_key = true;
        if !self.primary_key.contains(&index) {
            self.primary_key.push(index);
        }
    }
}

/// A `CREATE INDEX` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CreateIndex {
    /// Index name, unquoted.
    pub name: String,
    /// Name of the indexed table, unquoted.
    pub table_name: String,
    /// Whether this is a `UNIQUE` index.
    pub is_unique: bool,
    /// One expression per indexed column, including `COLLATE`/`ASC`/`DESC`.
    pub columns: Vec<Expr>,
    /// The partial-index predicate.
    pub where_predicate: Option<Expr>,
}

/// Which grammar a statement was parsed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StatementKind {
    /// `CREATE TABLE`
    Table,
    /// `CREATE INDEX`
    Index,
}

/// A parsed schema statement.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Statement {
    /// CREATE TABLE statement.
    CreateTable(CreateTable),
    /// CREATE INDEX statement.
    CreateIndex(CreateIndex),
}

impl Statement {
    /// Whether this is a table or an index.
    #[must_use]
    pub fn kind(&self) -> StatementKind {
        match self {
            Statement::CreateTable(_) => StatementKind::Table,
            Statement::CreateIndex(_) => StatementKind::Index,
        }
    }

    /// The table created, or the table an index is built on.
    #[must_use]
    pub fn table_name(&self) -> &str {
        match self {
            Statement::CreateTable(table) => &table.name,
            Statement::CreateIndex(index) => &index.table_name,
        }
    }

    /// The index name, for indexes.
    #[must_use]
    pub fn index_name(&self) -> Option<&str> {
        match self {
            Statement::CreateTable(_) => None,
            Statement::CreateIndex(index) => Some(&index.name),
        }
    }
}

/// Outcome of parsing one statement.
///
/// A statement is either fully parsed or rejected: there is no partial
/// result to inspect when parsing fails.
pub type ParseResult = Result<Statement, ParseError>;

/// SQL parser errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Unexpected token.
    #[error("Unexpected token {found}, expected {expected}")]
    UnexpectedToken {
        /// What was expected.
        expected: &'static str,
        /// What was found.
        found: Token,
    },
    /// Unexpected end of input.
    #[error("Unexpected end of input, expected {expected}")]
    UnexpectedEof {
        /// What was expected.
        expected: &'static str,
    },
    /// An expression could not be parsed.
    #[error("Invalid expression in {context}")]
    InvalidExpression {
        /// Where the expression appeared.
        context: &'static str,
    },
    /// Tokens remain after a complete statement.
    #[error("Unexpected trailing input starting at {found}")]
    TrailingInput {
        /// The first token after the statement.
        found: Token,
    },
    /// The table declares constraints but no columns.
    #[error("Empty column list in CREATE TABLE")]
    EmptyColumnList,
}

/// Parse one `CREATE TABLE` or `CREATE INDEX` statement.
///
/// # Errors
///
/// Returns an error if the text is not a complete statement of either kind.
pub fn parse(sql: &str) -> ParseResult {
    Parser::new(sql).parse()
}

impl FromStr for Statement {
    type Err = ParseError;

    fn from_str(sql: &str) -> Result<Self, Self::Err> {
        parse(sql)
    }
}

impl TryFrom<&str> for Statement {
    type Error = ParseError;

    fn try_from(sql: &str) -> Result<Self, Self::Error> {
        parse(sql)
    }
}

/// SQL parser.
pub struct Parser {
    tokens: VecDeque<Token>,
}

impl Parser {
    /// Create a new parser for the given input.
    #[must_use]
    pub fn new(input: &str) -> Self {
        Self {
            tokens: tokenize(input).into(),
        }
    }

    /// Parse the statement, consuming the parser.
    ///
    /// # Errors
    ///
    /// Returns an error at the first token that does not fit the grammar,
    /// or if any input remains after the statement.
    pub fn parse(mut self) -> ParseResult {
        let result = self.parse_statement();
        if let Err(error) = &result {
            tracing::debug!(%error, "rejected schema statement");
        }
        result
    }

    fn parse_statement(&mut self) -> ParseResult {
        self.expect_keyword("CREATE")?;

        if self.eat_keyword("TEMP") || self.eat_keyword("TEMPORARY") {
            self.expect_keyword("TABLE")?;
            return Ok(Statement::CreateTable(self.parse_create_table(true)?));
        }
        if self.eat_keyword("TABLE") {
            return Ok(Statement::CreateTable(self.parse_create_table(false)?));
        }
        if self.eat_keyword("UNIQUE") {
            self.expect_keyword("INDEX")?;
            return Ok(Statement::CreateIndex(self.parse_create_index(true)?));
        }
        if self.eat_keyword("INDEX") {
            return Ok(Statement::CreateIndex(self.parse_create_index(false)?));
        }
        Err(self.unexpected("TABLE or INDEX"))
    }

    /// Parse the rest of a CREATE TABLE statement.
    fn parse_create_table(&mut self, is_temporary: bool) -> Result<CreateTable, ParseError> {
        self.parse_if_not_exists()?;
        let mut table = CreateTable::new(self.parse_qualified_name()?);
        table.is_temporary = is_temporary;
        self.expect_punct('(')?;

        loop {
            if self
                .peek()
                .is_some_and(|t| TABLE_CONSTRAINT_WORDS.iter().any(|w| t.is_keyword(w)))
            {
                self.parse_table_constraint(&mut table)?;
            } else {
                self.parse_column_def(&mut table)?;
            }

            if !self.eat_punct(',') {
                break;
            }
        }
        self.expect_punct(')')?;

        if table.fields.is_empty() {
            return Err(ParseError::EmptyColumnList);
        }

        if self.eat_keyword("WITHOUT") {
            self.expect_keyword("ROWID")?;
            table.has_rowid = false;
        }
        self.expect_end()?;

        Ok(table)
    }

    /// Parse a column definition.
    fn parse_column_def(&mut self, table: &mut CreateTable) -> Result<(), ParseError> {
        let name = self.expect_name("column name")?;
        let type_name = self.parse_type_name()?;
        let mut field = FieldInfo::new(name, type_name);

        while self.parse_column_constraint(&mut field)? {}

        let index = table.fields.len();
        let is_primary_key = field.is_part_of_primary_key;
        table.fields.push(field);
        if is_primary_key {
            table.mark_primary_key(index);
        }
        Ok(())
    }

    /// Parse an optional type name such as `INTEGER` or `VARCHAR(10)`.
    ///
    /// Quoted words are part of the type and keep their quoting.
    fn parse_type_name(&mut self) -> Result<String, ParseError> {
        let mut type_name = String::new();
        while let Some(token) = self.peek() {
            let is_type_word = match token.kind {
                TokenKind::Identifier => {
                    !COLUMN_CONSTRAINT_WORDS.iter().any(|w| token.is_keyword(w))
                }
                TokenKind::QuotedIdentifier
                | TokenKind::BracketedIdentifier
                | TokenKind::BackquotedIdentifier
                | TokenKind::StringLiteral => true,
                _ => false,
            };
            if !is_type_word {
                break;
            }
            if !type_name.is_empty() {
                type_name.push(' ');
            }
            type_name.push_str(&token.to_string());
            self.tokens.pop_front();
        }

        if !type_name.is_empty() && self.eat_punct('(') {
            type_name.push('(');
            type_name.push_str(&self.parse_signed_number()?);
            if self.eat_punct(',') {
                type_name.push(',');
                type_name.push_str(&self.parse_signed_number()?);
            }
            self.expect_punct(')')?;
            type_name.push(')');
        }

        Ok(type_name)
    }

    fn parse_signed_number(&mut self) -> Result<String, ParseError> {
        let mut number = String::new();
        if let Some(sign) = self
            .peek()
            .filter(|t| t.is_operator("-") || t.is_operator("+"))
        {
            number.push_str(&sign.text);
            self.tokens.pop_front();
        }
        let token = self.next("number")?;
        if token.kind != TokenKind::Numeric {
            return Err(ParseError::UnexpectedToken {
                expected: "number",
                found: token,
            });
        }
        number.push_str(&token.text);
        Ok(number)
    }

    /// Parse one column constraint, returning `false` when none starts here.
    fn parse_column_constraint(&mut self, field: &mut FieldInfo) -> Result<bool, ParseError> {
        let named = self.eat_keyword("CONSTRAINT");
        if named {
            self.expect_name("constraint name")?;
        }

        if self.eat_keyword("PRIMARY") {
            self.expect_keyword("KEY")?;
            let _ = self.eat_keyword("ASC") || self.eat_keyword("DESC");
            self.parse_conflict_clause()?;
            if self.eat_keyword("AUTOINCREMENT") {
                field.is_auto_increment = true;
            }
            field.is_part_of_primary_key = true;
        } else if self.eat_keyword("NOT") {
            self.expect_keyword("NULL")?;
            self.parse_conflict_clause()?;
            field.is_not_null = true;
        } else if self.eat_keyword("NULL") || self.eat_keyword("UNIQUE") {
            self.parse_conflict_clause()?;
        } else if self.eat_keyword("CHECK") {
            self.skip_balanced()?;
        } else if self.eat_keyword("DEFAULT") {
            self.parse_default(field)?;
        } else if self.eat_keyword("COLLATE") {
            self.expect_name("collation name")?;
        } else if self.eat_keyword("REFERENCES") {
            self.parse_foreign_key_clause()?;
        } else if self.eat_keyword("GENERATED") {
            self.expect_keyword("ALWAYS")?;
            self.expect_keyword("AS")?;
            self.parse_generated_body()?;
        } else if self.eat_keyword("AS") {
            self.parse_generated_body()?;
        } else if named {
            return Err(self.unexpected("column constraint"));
        } else {
            return Ok(false);
        }

        Ok(true)
    }

    /// Parse the value following `DEFAULT`.
    fn parse_default(&mut self, field: &mut FieldInfo) -> Result<(), ParseError> {
        if self.peek().is_some_and(|t| t.is_punct('(')) {
            let Some(Expr::Group(inner)) = parse_operand(&mut self.tokens) else {
                return Err(ParseError::InvalidExpression {
                    context: "DEFAULT value",
                });
            };
            field.default_value = Some(inner.to_string());
            field.default_is_expression = true;
            return Ok(());
        }

        if self
            .peek()
            .is_some_and(|t| t.is_operator("-") || t.is_operator("+"))
        {
            field.default_value = Some(self.parse_signed_number()?);
            return Ok(());
        }

        let token = self.next("default value")?;
        match token.kind {
            TokenKind::StringLiteral
            | TokenKind::QuotedIdentifier
            | TokenKind::BracketedIdentifier
            | TokenKind::BackquotedIdentifier => {
                field.default_value = Some(token.text);
                field.default_is_quoted = true;
            }
            TokenKind::BlobLiteral => {
                field.default_value = Some(alloc::format!("X'{}'", token.text));
            }
            TokenKind::Numeric | TokenKind::Identifier => {
                field.default_value = Some(token.text);
            }
            _ => {
                return Err(ParseError::UnexpectedToken {
                    expected: "default value",
                    found: token,
                });
            }
        }
        Ok(())
    }

    /// Parse `( expr ) [STORED | VIRTUAL]` of a generated column.
    fn parse_generated_body(&mut self) -> Result<(), ParseError> {
        self.skip_balanced()?;
        let _ = self.eat_keyword("STORED") || self.eat_keyword("VIRTUAL");
        Ok(())
    }

    /// Parse `ON CONFLICT <action>` if present.
    fn parse_conflict_clause(&mut self) -> Result<(), ParseError> {
        if self.eat_keyword("ON") {
            self.expect_keyword("CONFLICT")?;
            self.expect_one_of(CONFLICT_ACTIONS, "conflict resolution")?;
        }
        Ok(())
    }

    /// Parse the part of a foreign key clause following `REFERENCES`.
    fn parse_foreign_key_clause(&mut self) -> Result<(), ParseError> {
        self.expect_name("referenced table")?;
        if self.peek().is_some_and(|t| t.is_punct('(')) {
            self.skip_balanced()?;
        }

        loop {
            if self.eat_keyword("ON") {
                self.expect_one_of(&["DELETE", "UPDATE"], "DELETE or UPDATE")?;
                if self.eat_keyword("SET") {
                    self.expect_one_of(&["NULL", "DEFAULT"], "NULL or DEFAULT")?;
                } else if self.eat_keyword("NO") {
                    self.expect_keyword("ACTION")?;
                } else {
                    self.expect_one_of(&["CASCADE", "RESTRICT"], "foreign key action")?;
                }
            } else if self.eat_keyword("MATCH") {
                self.expect_name("match type")?;
            } else {
                break;
            }
        }

        let not_deferrable = self.peek().is_some_and(|t| t.is_keyword("NOT"))
            && self.tokens.get(1).is_some_and(|t| t.is_keyword("DEFERRABLE"));
        if not_deferrable {
            self.tokens.pop_front();
        }
        if self.eat_keyword("DEFERRABLE") && self.eat_keyword("INITIALLY") {
            self.expect_one_of(&["DEFERRED", "IMMEDIATE"], "DEFERRED or IMMEDIATE")?;
        }
        Ok(())
    }

    /// Parse a table constraint.
    fn parse_table_constraint(&mut self, table: &mut CreateTable) -> Result<(), ParseError> {
        if self.eat_keyword("CONSTRAINT") {
            self.expect_name("constraint name")?;
        }

        if self.eat_keyword("PRIMARY") {
            self.expect_keyword("KEY")?;
            self.expect_punct('(')?;
            let mut key_columns = Vec::new();
            loop {
                let name = self.expect_name("primary key column")?;
                if self.eat_keyword("COLLATE") {
                    self.expect_name("collation name")?;
                }
                let _ = self.eat_keyword("ASC") || self.eat_keyword("DESC");
                match table.position(&name) {
                    Some(index) => key_columns.push(index),
                    None => tracing::debug!(column = %name, "primary key names unknown column"),
                }
                if !self.eat_punct(',') {
                    break;
                }
            }
            let is_auto_increment = self.eat_keyword("AUTOINCREMENT");
            self.expect_punct(')')?;
            self.parse_conflict_clause()?;

            for index in key_columns {
                table.mark_primary_key(index);
                if is_auto_increment {
                    table.fields[index].is_auto_increment = true;
                }
            }
        } else if self.eat_keyword("UNIQUE") {
            self.skip_balanced()?;
            self.parse_conflict_clause()?;
        } else if self.eat_keyword("CHECK") {
            self.skip_balanced()?;
        } else if self.eat_keyword("FOREIGN") {
            self.expect_keyword("KEY")?;
            self.skip_balanced()?;
            self.expect_keyword("REFERENCES")?;
            self.parse_foreign_key_clause()?;
        } else {
            return Err(self.unexpected("table constraint"));
        }
        Ok(())
    }

    /// Parse the rest of a CREATE INDEX statement.
    fn parse_create_index(&mut self, is_unique: bool) -> Result<CreateIndex, ParseError> {
        self.parse_if_not_exists()?;
        let name = self.parse_qualified_name()?;
        self.expect_keyword("ON")?;
        let table_name = self.expect_name("table name")?;
        self.expect_punct('(')?;

        let mut columns = Vec::new();
        loop {
            let column = parse_expression(&mut self.tokens, &[]).ok_or(
                ParseError::InvalidExpression {
                    context: "indexed column",
                },
            )?;
            columns.push(column);
            if !self.eat_punct(',') {
                break;
            }
        }
        self.expect_punct(')')?;

        let where_predicate = if self.eat_keyword("WHERE") {
            Some(
                parse_expression(&mut self.tokens, &[]).ok_or(ParseError::InvalidExpression {
                    context: "WHERE clause",
                })?,
            )
        } else {
            None
        };
        self.expect_end()?;

        Ok(CreateIndex {
            name,
            table_name,
            is_unique,
            columns,
            where_predicate,
        })
    }

    fn parse_if_not_exists(&mut self) -> Result<(), ParseError> {
        if self.eat_keyword("IF") {
            self.expect_keyword("NOT")?;
            self.expect_keyword("EXISTS")?;
        }
        Ok(())
    }

    /// Parse `[schema.]name`, dropping the schema.
    fn parse_qualified_name(&mut self) -> Result<String, ParseError> {
        let name = self.expect_name("name")?;
        if self.peek().is_some_and(|t| t.is_operator(".")) {
            self.tokens.pop_front();
            return self.expect_name("name");
        }
        Ok(name)
    }

    /// Skip a parenthesized token run, tracking nesting.
    fn skip_balanced(&mut self) -> Result<(), ParseError> {
        self.expect_punct('(')?;
        let mut depth = 1usize;
        while depth > 0 {
            let token = self.next(")")?;
            if token.is_punct('(') {
                depth += 1;
            } else if token.is_punct(')') {
                depth -= 1;
            }
        }
        Ok(())
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.front()
    }

    fn next(&mut self, expected: &'static str) -> Result<Token, ParseError> {
        self.tokens
            .pop_front()
            .ok_or(ParseError::UnexpectedEof { expected })
    }

    fn unexpected(&mut self, expected: &'static str) -> ParseError {
        match self.tokens.pop_front() {
            Some(found) => ParseError::UnexpectedToken { expected, found },
            None => ParseError::UnexpectedEof { expected },
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.peek().is_some_and(|t| t.is_keyword(keyword)) {
            self.tokens.pop_front();
            true
        } else {
            false
        }
    }

    fn expect_keyword(&mut self, keyword: &'static str) -> Result<(), ParseError> {
        if self.eat_keyword(keyword) {
            Ok(())
        } else {
            Err(self.unexpected(keyword))
        }
    }

    fn expect_one_of(
        &mut self,
        keywords: &[&str],
        expected: &'static str,
    ) -> Result<(), ParseError> {
        if keywords.iter().any(|k| self.eat_keyword(k)) {
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn eat_punct(&mut self, symbol: char) -> bool {
        if self.peek().is_some_and(|t| t.is_punct(symbol)) {
            self.tokens.pop_front();
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, symbol: char) -> Result<(), ParseError> {
        if self.eat_punct(symbol) {
            Ok(())
        } else {
            Err(self.unexpected(match symbol {
                '(' => "(",
                ')' => ")",
                _ => "punctuation",
            }))
        }
    }

    /// Expect a name and return its unquoted text.
    fn expect_name(&mut self, expected: &'static str) -> Result<String, ParseError> {
        let token = self.next(expected)?;
        if token.is_name() {
            Ok(token.text)
        } else {
            Err(ParseError::UnexpectedToken {
                expected,
                found: token,
            })
        }
    }

    fn expect_end(&mut self) -> Result<(), ParseError> {
        match self.tokens.pop_front() {
            Some(found) => Err(ParseError::TrailingInput { found }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn table(sql: &str) -> CreateTable {
        match parse(sql).unwrap() {
            Statement::CreateTable(table) => table,
            Statement::CreateIndex(_) => panic!("Expected CreateTable"),
        }
    }

    fn index(sql: &str) -> CreateIndex {
        match parse(sql).unwrap() {
            Statement::CreateIndex(index) => index,
            Statement::CreateTable(_) => panic!("Expected CreateIndex"),
        }
    }

    #[test]
    fn test_parse_create_table_simple() {
        let ct = table("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)");
        assert_eq!(ct.name, "users");
        assert_eq!(ct.column_names(), vec!["id", "name"]);
        assert!(ct.fields[0].is_part_of_primary_key);
        assert!(!ct.fields[1].is_part_of_primary_key);
        assert_eq!(ct.primary_key, vec![0]);
        assert!(ct.has_rowid);
    }

    #[test]
    fn test_parse_create_table_composite_pk() {
        let ct = table("CREATE TABLE t (a INT, b INT, c TEXT, PRIMARY KEY (b, a))");
        assert_eq!(ct.primary_key, vec![1, 0]);
        assert!(ct.fields[0].is_part_of_primary_key);
        assert!(!ct.fields[2].is_part_of_primary_key);
    }

    #[test]
    fn test_type_names() {
        let ct = table(
            "CREATE TABLE t (a VARCHAR(255), b DECIMAL(10, -5), c UNSIGNED BIG INT, d, e TEXT NULL)",
        );
        let types: Vec<&str> = ct.fields.iter().map(|f| f.type_name.as_str()).collect();
        assert_eq!(
            types,
            vec!["VARCHAR(255)", "DECIMAL(10,-5)", "UNSIGNED BIG INT", "", "TEXT"]
        );
    }

    #[test]
    fn test_defaults() {
        let ct = table(
            "CREATE TABLE t (a DEFAULT 'it''s', b DEFAULT -1, c DEFAULT (1 + 2), \
             d DEFAULT CURRENT_TIMESTAMP, e DEFAULT X'00FF', f DEFAULT +2.5)",
        );
        let a = &ct.fields[0];
        assert_eq!(a.default_value.as_deref(), Some("it's"));
        assert!(a.default_is_quoted && !a.default_is_expression);
        assert_eq!(ct.fields[1].default_value.as_deref(), Some("-1"));
        let c = &ct.fields[2];
        assert_eq!(c.default_value.as_deref(), Some("1 + 2"));
        assert!(c.default_is_expression && !c.default_is_quoted);
        assert_eq!(
            ct.fields[3].default_value.as_deref(),
            Some("CURRENT_TIMESTAMP")
        );
        assert_eq!(ct.fields[4].default_value.as_deref(), Some("X'00FF'"));
        assert_eq!(ct.fields[5].default_value.as_deref(), Some("+2.5"));
    }

    #[test]
    fn test_skipped_constraints() {
        let ct = table(
            "CREATE TABLE t (\
               id INTEGER CONSTRAINT pk PRIMARY KEY DESC ON CONFLICT REPLACE AUTOINCREMENT, \
               parent INTEGER REFERENCES t(id) ON DELETE SET NULL ON UPDATE NO ACTION \
                 MATCH SIMPLE NOT DEFERRABLE INITIALLY DEFERRED NOT NULL, \
               name TEXT UNIQUE ON CONFLICT IGNORE COLLATE NOCASE CHECK (length(name) > (0)), \
               total AS (id * 2) STORED, \
               other GENERATED ALWAYS AS (id) VIRTUAL, \
               CONSTRAINT u UNIQUE (name, parent) ON CONFLICT ABORT, \
               CHECK (id > 0), \
               FOREIGN KEY (parent) REFERENCES t (id) DEFERRABLE)",
        );
        assert_eq!(ct.fields.len(), 5);
        assert!(ct.fields[0].is_auto_increment);
        assert!(ct.fields[1].is_not_null);
        assert!(!ct.fields[2].is_not_null);
    }

    #[test]
    fn test_table_primary_key_autoincrement() {
        let ct = table("CREATE TABLE t (id INTEGER, v, PRIMARY KEY(\"ID\" ASC AUTOINCREMENT))");
        assert_eq!(ct.primary_key, vec![0]);
        assert!(ct.fields[0].is_auto_increment);
        assert!(!ct.fields[1].is_auto_increment);
    }

    #[test]
    fn test_temporary_and_qualified() {
        let ct = table("CREATE TEMP TABLE IF NOT EXISTS main.\"my table\" (a)");
        assert!(ct.is_temporary);
        assert_eq!(ct.name, "my table");
    }

    #[test]
    fn test_without_rowid_is_terminal() {
        assert!(!table("CREATE TABLE t (a PRIMARY KEY) WITHOUT ROWID").has_rowid);
        assert!(matches!(
            parse("CREATE TABLE t (a PRIMARY KEY) WITHOUT ROWID, STRICT"),
            Err(ParseError::TrailingInput { .. })
        ));
        assert!(matches!(
            parse("CREATE TABLE t (a) STRICT"),
            Err(ParseError::TrailingInput { .. })
        ));
    }

    #[test]
    fn test_invalid_tables() {
        assert!(parse("CREATE TABLE t (a INTEGER, )").is_err());
        assert!(parse("CREATE TABLE t ()").is_err());
        assert!(parse("CREATE TABLE t (a").is_err());
        assert!(parse("CREATE TABLE t AS SELECT 1").is_err());
        assert!(parse("CREATE VIEW v AS SELECT 1").is_err());
        assert!(parse("CREATE TABLE t (a CONSTRAINT c)").is_err());
        assert!(parse("CREATE TABLE t (a CHECK a > 0)").is_err());
        assert_eq!(
            parse("CREATE TABLE t (PRIMARY KEY (a))"),
            Err(ParseError::EmptyColumnList)
        );
        assert_eq!(
            parse(""),
            Err(ParseError::UnexpectedEof { expected: "CREATE" })
        );
    }

    #[test]
    fn test_parse_index() {
        let ix = index("CREATE UNIQUE INDEX IF NOT EXISTS ix ON t (a COLLATE NOCASE, lower(b) DESC)");
        assert_eq!(ix.name, "ix");
        assert_eq!(ix.table_name, "t");
        assert!(ix.is_unique);
        assert_eq!(ix.columns.len(), 2);
        assert!(ix.where_predicate.is_none());
    }

    #[test]
    fn test_parse_partial_index() {
        let ix = index("CREATE INDEX ix ON t (a) WHERE a IS NOT NULL AND b > 0");
        assert!(!ix.is_unique);
        assert_eq!(
            ix.where_predicate.as_ref().map(ToString::to_string).as_deref(),
            Some("a IS NOT NULL AND b > 0")
        );
    }

    #[test]
    fn test_invalid_indexes() {
        assert!(parse("CREATE INDEX ix ON t ()").is_err());
        assert!(parse("CREATE INDEX ix ON t (a,)").is_err());
        assert!(parse("CREATE INDEX ix ON t (a) WHERE").is_err());
        assert!(matches!(
            parse("CREATE INDEX ix ON t (a) WHERE a, b"),
            Err(ParseError::TrailingInput { .. })
        ));
        assert!(matches!(
            parse("CREATE INDEX ix ON t (a);"),
            Err(ParseError::TrailingInput { .. })
        ));
    }

    #[test]
    fn test_statement_accessors() {
        let stmt: Statement = "CREATE INDEX ix ON t (a)".parse().unwrap();
        assert_eq!(stmt.kind(), StatementKind::Index);
        assert_eq!(stmt.table_name(), "t");
        assert_eq!(stmt.index_name(), Some("ix"));

        let stmt = Statement::try_from("CREATE TABLE t (a)").unwrap();
        assert_eq!(stmt.kind(), StatementKind::Table);
        assert_eq!(stmt.index_name(), None);
    }
}
