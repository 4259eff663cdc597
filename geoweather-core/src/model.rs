use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Local timestamp format used by WeatherAPI.com (`localtime`, `last_updated`).
const LOCAL_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// A latitude/longitude pair. `(0, 0)` doubles as the "not set yet" value.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// The `q` query value: `"<latitude>,<longitude>"`.
    pub fn to_query(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// Body of a `current.json` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeolocationInfo {
    pub location: Location,
    pub current: Current,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub region: String,
    pub country: String,
    #[serde(rename = "tz_id")]
    pub timezone_id: String,
    #[serde(rename = "localtime")]
    pub local_time: String,
}

impl Location {
    /// Local wall-clock time at the location, if the provider used its usual format.
    pub fn local_time_at(&self) -> Option<NaiveDateTime> {
        parse_local(&self.local_time)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Current {
    pub last_updated: String,
    #[serde(rename = "temp_c")]
    pub temperature_celsius: f64,
    /// `1` during daytime, `0` at night.
    pub is_day: u8,
    pub condition: Condition,
    pub wind_kph: f64,
    #[serde(rename = "feelslike_c")]
    pub feels_like_celsius: f64,
    #[serde(rename = "humidity")]
    pub humidity_percent: u8,
}

impl Current {
    pub fn is_daytime(&self) -> bool {
        self.is_day != 0
    }

    pub fn last_updated_at(&self) -> Option<NaiveDateTime> {
        parse_local(&self.last_updated)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub text: String,
    #[serde(rename = "icon")]
    pub icon_url: String,
}

impl Condition {
    /// The provider sends protocol-relative icon paths (`//cdn.weatherapi.com/...`).
    pub fn icon_https_url(&self) -> String {
        if self.icon_url.starts_with("//") {
            format!("https:{}", self.icon_url)
        } else {
            self.icon_url.clone()
        }
    }
}

fn parse_local(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, LOCAL_TIME_FORMAT).ok()
}
