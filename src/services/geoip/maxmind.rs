//! Local MaxMind database lookup
//!
//! Works with both GeoLite2-City and GeoLite2-Country files; only the
//! country code (and the English city name when present) is used.

use std::net::IpAddr;

use async_trait::async_trait;
use maxminddb::Reader;
use maxminddb::geoip2::City;
use tracing::trace;

use super::provider::{GeoInfo, GeoIpLookup};
use crate::errors::{LinkhubError, Result};

pub struct MaxMindProvider {
    reader: Reader<Vec<u8>>,
}

impl MaxMindProvider {
    pub fn open(path: &str) -> Result<Self> {
        Reader::open_readfile(path)
            .map(|reader| Self { reader })
            .map_err(|e| {
                LinkhubError::geoip_provider(format!("cannot open MaxMind database {}: {}", path, e))
            })
    }

    fn resolve(&self, addr: IpAddr) -> Option<GeoInfo> {
        let record: City = self.reader.lookup(addr).ok()?.decode().ok()??;
        Some(GeoInfo {
            country: record.country.iso_code.map(str::to_ascii_uppercase),
            city: record.city.names.english.map(String::from),
        })
    }
}

#[async_trait]
impl GeoIpLookup for MaxMindProvider {
    async fn lookup(&self, ip: &str) -> Option<GeoInfo> {
        let addr: IpAddr = ip.parse().ok()?;
        let info = self.resolve(addr);
        trace!("MaxMind {} -> {:?}", ip, info);
        info
    }

    fn name(&self) -> &'static str {
        "MaxMind"
    }
}
