use async_trait::async_trait;
use model::DriverRecord;
use tracking::{FetchError, FetchGateway};

/// Fetches the roster as a JSON array of `{id, name, image}` records with a
/// single GET against `url`.
#[derive(Clone)]
pub struct SheetDbGateway {
    client: reqwest::Client,
    url: String,
}

impl SheetDbGateway {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

pub fn parse_roster(body: &str) -> Result<Vec<DriverRecord>, FetchError> {
    Ok(serde_json::from_str(body)?)
}

#[async_trait]
impl FetchGateway for SheetDbGateway {
    async fn fetch_roster(&self) -> Result<Vec<DriverRecord>, FetchError> {
        log::info!("Requesting roster '{}'.", self.url);
        let response = self
            .client
            .get(&self.url)
            .header("accept", "application/json")
            .send()
            .await
            .map_err(FetchError::request)?;

        match response.status() {
            reqwest::StatusCode::OK => {
                let body = response.text().await.map_err(FetchError::request)?;
                let records = parse_roster(&body)?;
                log::debug!("roster lists {} drivers", records.len());
                Ok(records)
            }
            other => Err(FetchError::InvalidResponse {
                status_code: other.as_u16(),
                url: self.url.clone(),
                response: response.text().await.ok(),
            }),
        }
    }
}
