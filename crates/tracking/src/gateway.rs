use async_trait::async_trait;
use model::DriverRecord;

use crate::FetchError;

/// Source of the initial roster.
#[async_trait]
pub trait FetchGateway: Send + Sync + 'static {
    async fn fetch_roster(&self) -> Result<Vec<DriverRecord>, FetchError>;
}
