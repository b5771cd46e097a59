//! Read side of the log store.

use crate::error_handling::StoreError;
use crate::models::CollectionId;
use crate::storage::keys::{collection_log, parse_hits_field, KNOWN_COLLECTIONS};
use crate::storage::Store;

/// Returns every stored line of `collection`, oldest first.
///
/// Order comes from the line timestamps, not from arrival order. An unknown
/// collection yields an empty list. Store failures are returned as-is.
pub async fn get_logs<S: Store + ?Sized>(
    store: &S,
    collection: &CollectionId,
) -> Result<Vec<String>, StoreError> {
    store.ordered_range_all(&collection_log(collection)).await
}

/// Lists the collections seen by ingest with their hit counts, sorted by id.
///
/// Fields of the known-collections table that are not `hits:<id>` are ignored.
pub async fn known_collections<S: Store + ?Sized>(
    store: &S,
) -> Result<Vec<(CollectionId, i64)>, StoreError> {
    let fields = store.hash_get_all(KNOWN_COLLECTIONS).await?;

    let mut collections = Vec::with_capacity(fields.len());
    for (field, value) in fields {
        let Some(id) = parse_hits_field(&field) else {
            log::debug!("Ignoring unexpected field {:?} in {}", field, KNOWN_COLLECTIONS);
            continue;
        };
        let hits = value.parse::<i64>().map_err(|_| StoreError::NotAnInteger {
            key: KNOWN_COLLECTIONS.to_string(),
            field: field.clone(),
        })?;
        collections.push((id, hits));
    }
    collections.sort();
    Ok(collections)
}
