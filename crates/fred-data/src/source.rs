//! The data source seam

use crate::{Observation, ObservationQuery, Result};
use async_trait::async_trait;

/// Anything that can answer an observations query
///
/// An empty vector is a valid answer and means the range held no data.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn get_observations(&self, query: &ObservationQuery) -> Result<Vec<Observation>>;
}
