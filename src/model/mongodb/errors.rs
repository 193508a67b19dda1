//! Server error codes the mongodb crate does not name for us.

use mongodb::error::{Error as DbError, ErrorKind, WriteFailure};

pub const DUPLICATE_KEY: i32 = 11000;

/// Return true if the given error is a duplicate key write error, i.e. an
/// insert collided with an existing `_id` or unique index entry.
pub fn is_duplicate_key(err: &DbError) -> bool {
    match *err.kind {
        ErrorKind::Write(WriteFailure::WriteError(ref e)) => e.code == DUPLICATE_KEY,
        _ => false,
    }
}
