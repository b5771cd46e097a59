//! IP-to-location range index.
//!
//! This module builds and queries a sorted numeric index from IPv4 block records
//! to city identifiers:
//! - [`ip_to_score`] turns an address into its 32-bit ordering key
//! - [`import_blocks`] / [`import_cities`] load the offline block and city data
//! - [`find_city_by_ip`] resolves an address with a floor query over the index

mod import;
mod lookup;
mod score;
mod types;

// Re-export public API
pub use import::{
    import_blocks, import_blocks_csv, import_cities, import_cities_csv, parse_block_row,
    parse_city_row,
};
pub use lookup::{find_city, find_city_block, find_city_by_ip, IpQuery};
pub use score::{ip_to_score, IpScore};
pub use types::{CityBlockId, CityLocation, ImportSummary, LocationKey};
