//! Serde model of a public charging-directory record.
//!
//! Only the fields the normaliser reads are modelled. Every field is
//! optional because directory payloads routinely omit or null them;
//! unknown fields are ignored.

use serde::Deserialize;

/// One station as published by the directory.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawStation {
    /// Directory identifier.
    #[serde(rename = "ID")]
    pub id: Option<u64>,
    /// Name, address and position.
    pub address_info: Option<RawAddress>,
    /// Connectors installed at the site.
    pub connections: Option<Vec<RawConnection>>,
    /// Network operator.
    pub operator_info: Option<RawTitled>,
    /// Operational status.
    pub status_type: Option<RawStatus>,
    /// Timestamp of the last status update, kept verbatim.
    pub date_last_status_update: Option<String>,
    /// Upstream provider of the record.
    pub data_provider: Option<RawTitled>,
}

/// Address block of a directory record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawAddress {
    /// Site name.
    pub title: Option<String>,
    /// First address line.
    pub address_line1: Option<String>,
    /// Town.
    pub town: Option<String>,
    /// State or province.
    pub state_or_province: Option<String>,
    /// Country.
    pub country: Option<RawTitled>,
    /// WGS84 latitude.
    pub latitude: Option<f64>,
    /// WGS84 longitude.
    pub longitude: Option<f64>,
}

/// One connector.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawConnection {
    /// Rated power in kW.
    #[serde(rename = "PowerKW")]
    pub power_kw: Option<f64>,
    /// Plug standard.
    pub connection_type: Option<RawTitled>,
}

/// Status block.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawStatus {
    /// Whether the directory considers the site usable.
    pub is_operational: Option<bool>,
    /// Human-readable status.
    pub title: Option<String>,
}

/// Any directory object that only matters for its title.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawTitled {
    /// Display title.
    pub title: Option<String>,
}

impl RawTitled {
    pub(crate) fn title(titled: Option<&Self>) -> Option<&str> {
        titled.and_then(|t| t.title.as_deref())
    }
}
