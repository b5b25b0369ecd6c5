//! Differential fuzzer against SQLite.
//!
//! Generates a table with indexes that SQLite accepts, reads the catalog
//! text back, and checks that the formatted statements rebuild a schema
//! SQLite describes identically.

use honggfuzz::fuzz;
use sqlite_ddl_rs::testing::{FuzzSchema, test_catalog_parity};

fn main() {
    loop {
        fuzz!(|schema: FuzzSchema| {
            test_catalog_parity(&schema);
        });
    }
}
