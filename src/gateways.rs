use crate::config::{self, GeocodingGateway};
use geoloc_core::gateways::geocode::GatewayError;
use geoloc_gateways::{opencage::OpenCage, quota_file::QuotaFile};

pub fn geocoding_gateway(cfg: &config::Geocoding, api_key: &str) -> Result<OpenCage, GatewayError> {
    match cfg.gateway {
        GeocodingGateway::OpenCage => {
            log::debug!("Use OpenCage gateway (timeout {:?})", cfg.timeout);
            OpenCage::try_new(api_key, cfg.timeout)
        }
    }
}

pub fn quota_repo(cfg: &config::Quota) -> QuotaFile {
    log::debug!("Use quota file {}", cfg.store.display());
    QuotaFile::new(&cfg.store)
}
