use std::fmt;

use tracing::debug;

use crate::{error::WeatherError, model::Coordinates};

/// WeatherAPI.com credential. Never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Result<Self, WeatherError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(WeatherError::MissingApiKey);
        }
        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Where to ask for weather and which credential to ask with.
///
/// Callers own the store and pass it to
/// [`WeatherClient::fetch_current_weather`](crate::WeatherClient::fetch_current_weather),
/// which reads it at call time.
#[derive(Debug, Clone)]
pub struct WeatherStore {
    coordinates: Coordinates,
    api_key: ApiKey,
}

impl WeatherStore {
    pub fn new(api_key: ApiKey) -> Self {
        Self { coordinates: Coordinates::default(), api_key }
    }

    /// Overwrite the stored position. No range checks are applied.
    pub fn set_coordinates(&mut self, latitude: f64, longitude: f64) {
        self.coordinates = Coordinates::new(latitude, longitude);
        debug!(latitude, longitude, "Stored coordinates updated");
    }

    pub fn coordinates(&self) -> Coordinates {
        self.coordinates
    }

    pub fn latitude(&self) -> f64 {
        self.coordinates.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.coordinates.longitude
    }

    pub fn api_key(&self) -> &ApiKey {
        &self.api_key
    }
}
