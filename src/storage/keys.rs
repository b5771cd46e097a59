//! Logical key layout.
//!
//! Every structure name the application writes is produced here, so the layout
//! can be read in one place:
//!
//! | Key                 | Kind        | Contents                              |
//! |---------------------|-------------|---------------------------------------|
//! | `geo:index`         | ordered set | range start score -> city block id    |
//! | `geo:cities`        | hash        | city id -> `[city, region, country]`  |
//! | `known`             | hash        | `hits:<id>` -> hit count              |
//! | `logs:<id>`         | ordered set | epoch timestamp -> raw log line       |
//! | `locations:<id>`    | hash        | `country-region-city` -> count        |
//! | `countries`         | hash        | country -> count                      |
//! | `countries:<id>`    | hash        | country -> count                      |

use crate::models::CollectionId;

pub const GEO_INDEX: &str = "geo:index";
pub const CITY_METADATA: &str = "geo:cities";
pub const KNOWN_COLLECTIONS: &str = "known";
pub const COUNTRY_COUNTS: &str = "countries";

const HITS_PREFIX: &str = "hits:";

pub fn collection_log(id: &CollectionId) -> String {
    format!("logs:{id}")
}

pub fn location_counts(id: &CollectionId) -> String {
    format!("locations:{id}")
}

pub fn collection_country_counts(id: &CollectionId) -> String {
    format!("{COUNTRY_COUNTS}:{id}")
}

/// Field of [`KNOWN_COLLECTIONS`] holding the hit count of `id`.
pub fn hits_field(id: &CollectionId) -> String {
    format!("{HITS_PREFIX}{id}")
}

/// Inverse of [`hits_field`]; `None` for fields this crate did not write.
pub fn parse_hits_field(field: &str) -> Option<CollectionId> {
    field.strip_prefix(HITS_PREFIX)?.parse().ok()
}
