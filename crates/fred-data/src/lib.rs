//! FRED data access
//!
//! - [`FredClient`]: rate-limited HTTP client for `series/observations`
//! - [`DataSource`]: the trait the agent depends on, so tests can swap in fakes
//! - [`CachingSource`]: TTL cache decorator for any data source
//! - [`MetadataCatalog`]: series id to indicator name and reporting frequency

pub mod cache;
pub mod client;
pub mod error;
pub mod metadata;
pub mod observation;
pub mod source;

pub use cache::{CachingSource, DEFAULT_CACHE_CAPACITY};
pub use client::{FRED_BASE_URL, FredClient, FredConfig};
pub use error::{DataError, Result};
pub use metadata::{IndicatorMetadata, MetadataCatalog};
pub use observation::{Frequency, Observation, ObservationQuery, ObservationsResponse};
pub use source::DataSource;

#[cfg(test)]
pub use source::MockDataSource;
