use geoloc_core::{
    entities::Coordinates,
    gateways::geocode::{GatewayError, GeoCodingGateway},
};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_API_URL: &str = "https://api.opencagedata.com/geocode/v1/json";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Forward geocoding with the OpenCage API.
pub struct OpenCage {
    api_key: String,
    api_url: String,
    client: Client,
}

impl OpenCage {
    pub fn try_new<K: Into<String>>(api_key: K, timeout: Duration) -> Result<Self, GatewayError> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(GatewayError::MissingApiKey);
        }
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("geolocator/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(anyhow::Error::from)?;
        Ok(Self {
            api_key,
            api_url: DEFAULT_API_URL.to_string(),
            client,
        })
    }

    pub fn with_api_url<U: Into<String>>(mut self, api_url: U) -> Self {
        self.api_url = api_url.into();
        self
    }
}

impl GeoCodingGateway for OpenCage {
    fn resolve_address_lat_lng(&self, address: &str) -> Result<Option<Coordinates>, GatewayError> {
        let res = self
            .client
            .get(&self.api_url)
            .query(&[
                ("q", address),
                ("key", self.api_key.as_str()),
                ("limit", "1"),
                ("no_annotations", "1"),
            ])
            .send()
            .map_err(anyhow::Error::from)?;
        let status = res.status().as_u16();
        let body = res.text().map_err(anyhow::Error::from)?;
        let location = parse_response(status, &body)?;
        log::debug!("OpenCage response for '{address}': {location:?}");
        Ok(location)
    }
}

#[derive(Debug, Deserialize)]
struct Response {
    #[serde(default)]
    results: Vec<Match>,
    status: Option<Status>,
}

#[derive(Debug, Deserialize)]
struct Match {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct Status {
    code: u16,
    message: String,
}

fn parse_response(status: u16, body: &str) -> Result<Option<Coordinates>, GatewayError> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<Response>(body)
            .ok()
            .and_then(|r| r.status)
            .map(|s| s.message)
            .unwrap_or_else(|| body.trim().to_string());
        return Err(GatewayError::Provider { status, message });
    }
    let res: Response =
        serde_json::from_str(body).map_err(|err| GatewayError::InvalidResponse(err.to_string()))?;
    if let Some(Status { code, message }) = res.status {
        if code != 200 {
            return Err(GatewayError::Provider {
                status: code,
                message,
            });
        }
    }
    Ok(res
        .results
        .first()
        .map(|m| Coordinates::from_lat_lng_deg(m.geometry.lat, m.geometry.lng)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reject_empty_api_key() {
        assert!(matches!(
            OpenCage::try_new("", DEFAULT_TIMEOUT),
            Err(GatewayError::MissingApiKey)
        ));
        assert!(matches!(
            OpenCage::try_new("  ", DEFAULT_TIMEOUT),
            Err(GatewayError::MissingApiKey)
        ));
    }

    #[test]
    fn parse_best_match() {
        let body = r#"{
            "results": [
                { "confidence": 9, "formatted": "Broadway & W 42nd St", "geometry": { "lat": 40.7567, "lng": -73.9863 } },
                { "geometry": { "lat": 1.0, "lng": 2.0 } }
            ],
            "status": { "code": 200, "message": "OK" },
            "total_results": 2
        }"#;
        let location = parse_response(200, body).unwrap().unwrap();
        assert_eq!(40.7567, location.lat());
        assert_eq!(-73.9863, location.lng());
    }

    #[test]
    fn parse_no_results() {
        let body = r#"{ "results": [], "status": { "code": 200, "message": "OK" }, "total_results": 0 }"#;
        assert!(parse_response(200, body).unwrap().is_none());
    }

    #[test]
    fn parse_provider_error() {
        let body = r#"{ "results": [], "status": { "code": 402, "message": "quota exceeded" } }"#;
        let err = parse_response(402, body).unwrap_err();
        assert!(matches!(
            err,
            GatewayError::Provider { status: 402, ref message } if message == "quota exceeded"
        ));
    }

    #[test]
    fn parse_error_without_json_body() {
        let err = parse_response(503, "Service Unavailable\n").unwrap_err();
        assert!(matches!(
            err,
            GatewayError::Provider { status: 503, ref message } if message == "Service Unavailable"
        ));
    }

    #[test]
    fn parse_invalid_body() {
        assert!(matches!(
            parse_response(200, "<html></html>"),
            Err(GatewayError::InvalidResponse(_))
        ));
    }
}
