//! IP address lookup.
//!
//! Resolution is a floor query: the range with the greatest start score not above
//! the address's score wins. The matched [`CityBlockId`] is then reduced to its
//! city id and dereferenced in the city metadata table.
//!
//! Range end addresses are not indexed, so an address past the end of the last
//! range below it still resolves to that range.

use crate::error_handling::{LookupError, StoreError};
use crate::storage::keys::{CITY_METADATA, GEO_INDEX};
use crate::storage::Store;

use super::score::{ip_to_score, IpScore};
use super::types::{parse_digits, CityBlockId, CityLocation};

/// What to resolve: an address in text form, or an already computed score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpQuery<'a> {
    Address(&'a str),
    Score(IpScore),
}

impl<'a> IpQuery<'a> {
    /// Interprets bare digits as a score and anything else as an address.
    pub fn from_input(input: &'a str) -> Self {
        match parse_digits(input).and_then(|n| IpScore::try_from(n).ok()) {
            Some(score) => IpQuery::Score(score),
            None => IpQuery::Address(input),
        }
    }

    fn score(&self) -> Result<IpScore, LookupError> {
        match *self {
            IpQuery::Address(ip) => Ok(ip_to_score(ip)?),
            IpQuery::Score(score) => Ok(score),
        }
    }
}

impl<'a> From<&'a str> for IpQuery<'a> {
    fn from(ip: &'a str) -> Self {
        IpQuery::Address(ip)
    }
}

impl From<IpScore> for IpQuery<'_> {
    fn from(score: IpScore) -> Self {
        IpQuery::Score(score)
    }
}

/// Finds the city block whose range starts at or below `score`.
pub async fn find_city_block<S: Store + ?Sized>(
    store: &S,
    score: IpScore,
) -> Result<Option<CityBlockId>, StoreError> {
    let members = store
        .ordered_range_by_score_desc(GEO_INDEX, f64::from(score), 0.0, 1)
        .await?;

    let Some(member) = members.into_iter().next() else {
        return Ok(None);
    };
    member
        .parse::<CityBlockId>()
        .map(Some)
        .map_err(|e| StoreError::Corrupt {
            key: GEO_INDEX.to_string(),
            reason: e.to_string(),
        })
}

/// Fetches the metadata stored for `city_id`.
pub async fn find_city<S: Store + ?Sized>(
    store: &S,
    city_id: u64,
) -> Result<Option<CityLocation>, StoreError> {
    let Some(json) = store.hash_get(CITY_METADATA, &city_id.to_string()).await? else {
        return Ok(None);
    };
    serde_json::from_str::<CityLocation>(&json)
        .map(Some)
        .map_err(|e| StoreError::Corrupt {
            key: CITY_METADATA.to_string(),
            reason: format!("city {city_id}: {e}"),
        })
}

/// Resolves an IP address (or score) to its city, region and country.
///
/// Returns `Ok(None)` when no range starts at or below the address, or when the
/// matched city has no metadata. A malformed address is a [`LookupError::Parse`].
pub async fn find_city_by_ip<'a, S: Store + ?Sized>(
    store: &S,
    query: impl Into<IpQuery<'a>>,
) -> Result<Option<CityLocation>, LookupError> {
    let score = query.into().score()?;

    let Some(block) = find_city_block(store, score).await? else {
        log::trace!("No IP range at or below score {}", score);
        return Ok(None);
    };
    Ok(find_city(store, block.city_id).await?)
}
