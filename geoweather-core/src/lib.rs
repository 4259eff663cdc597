//! Core library for the `geoweather` widget.
//!
//! This crate defines:
//! - The coordinate/credential store the widget queries with
//! - A client for WeatherAPI.com's current-weather endpoint
//! - Typed response models mirroring the provider's JSON
//! - Overlay (modal) visibility state
//! - Configuration & credentials handling
//!
//! It is used by `geoweather-cli`, but can also be reused by other binaries or services.

pub mod client;
pub mod config;
pub mod error;
pub mod modal;
pub mod model;
pub mod store;

pub use client::{
    CURRENT_WEATHER_URL, FailureObserver, FetchOptions, TracingObserver, WeatherClient,
    WeatherClientBuilder,
};
pub use config::Config;
pub use error::{FailureKind, WeatherError};
pub use modal::ModalController;
pub use model::{Condition, Coordinates, Current, GeolocationInfo, Location};
pub use store::{ApiKey, WeatherStore};
