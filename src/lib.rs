#![doc = include_str!("../README.md")]
#![no_std]
#![deny(clippy::mod_module_files)]

extern crate alloc;

pub mod errors;
pub mod sql;
#[cfg(feature = "testing")]
pub mod testing;

pub use sql::{
    ColumnChange, CreateIndex, CreateTable, Expr, FieldInfo, FormatSql, ParseError, ParseResult,
    RenameMap, RewriteError, Statement, StatementKind, parse, regenerate,
};

// Re-export errors
pub use errors::Error;
