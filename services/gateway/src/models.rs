use serde::{Deserialize, Serialize};
use types::numeric::Price;
use types::request::Location;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRequestBody {
    pub service_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub location: Option<Location>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOfferBody {
    pub price: Price,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterProviderBody {
    pub name: String,
    pub service_type: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenRequestsQuery {
    pub service_type: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}
