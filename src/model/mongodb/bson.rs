use mongodb::bson::{doc, Document};

/// Filter matching the document with the given numeric `_id`.
pub fn id_filter(id: u32) -> Document {
    doc! { "_id": id }
}

/// Filter matching every document whose `_id` is one of `ids`.
pub fn ids_filter(ids: impl IntoIterator<Item = u32>) -> Document {
    let ids = ids.into_iter().collect::<Vec<_>>();
    doc! { "_id": { "$in": ids } }
}
