//! Rewrite fuzzer.
//!
//! Parses arbitrary text, renames one column and retargets the statement at
//! a new table. A statement that survives the rewrite must format to text
//! that parses back to the rewritten statement.

use honggfuzz::fuzz;
use sqlite_ddl_rs::testing::test_rewrite_roundtrip;

fn main() {
    loop {
        fuzz!(|input: (String, String, String, String)| {
            let (sql, table, old, new) = input;
            test_rewrite_roundtrip(&sql, &table, &old, &new);
        });
    }
}
