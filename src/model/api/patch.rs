use mongodb::bson::{self, ser::Error as BsonSerError, Document};
use serde::{Deserialize, Deserializer, Serialize};

/// A partial update body.
///
/// Implementors are serde structs whose every field is optional and skipped
/// when absent, so serialising one yields exactly the fields the caller sent.
pub trait Patch: Serialize {
    /// The fields to `$set`.
    fn changes(&self) -> Result<Document, BsonSerError> {
        bson::to_document(self)
    }
}

/// Deserialize a field that distinguishes "absent" from "explicitly null".
///
/// Pair with `#[serde(default)]`: a missing field stays `None`, `null`
/// becomes `Some(None)`, and a value becomes `Some(Some(value))`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
