//! Parser fuzzer for arbitrary statement text.
//!
//! Any input must be accepted or rejected without panicking. Accepted input
//! is formatted, and the formatted text must parse again and settle into a
//! stable canonical form.

use honggfuzz::fuzz;
use sqlite_ddl_rs::testing::test_parse_roundtrip;

fn main() {
    loop {
        fuzz!(|sql: String| {
            test_parse_roundtrip(&sql);
        });
    }
}
