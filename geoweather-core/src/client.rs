use std::{fmt::Debug, sync::Arc, time::Duration};

use reqwest::Client;
use tokio_util::sync::CancellationToken;
use tracing::error;

use crate::{
    config::Config,
    error::{FailureKind, WeatherError, truncate_body},
    model::GeolocationInfo,
    store::{ApiKey, WeatherStore},
};

/// WeatherAPI.com "current weather" endpoint.
pub const CURRENT_WEATHER_URL: &str = "https://api.weatherapi.com/v1/current.json";

/// Side channel notified once for every failed fetch.
pub trait FailureObserver: Send + Sync + Debug {
    fn on_failure(&self, kind: FailureKind, error: &WeatherError);
}

/// Default observer: one `error!` line per failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl FailureObserver for TracingObserver {
    fn on_failure(&self, kind: FailureKind, error: &WeatherError) {
        match kind {
            FailureKind::Transport => {
                error!(error = %error, "Transport error fetching weather data")
            }
            FailureKind::Other => error!(error = %error, "Failed to fetch weather data"),
        }
    }
}

/// Per-call limits for [`WeatherClient::fetch_current_weather`].
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Overrides the client's default deadline.
    pub deadline: Option<Duration>,
    pub cancel: Option<CancellationToken>,
}

impl FetchOptions {
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

#[derive(Debug, Clone)]
pub struct WeatherClient {
    http: Client,
    base_url: String,
    default_deadline: Option<Duration>,
    observer: Arc<dyn FailureObserver>,
}

impl Default for WeatherClient {
    fn default() -> Self {
        Self::new()
    }
}

impl WeatherClient {
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> WeatherClientBuilder {
        WeatherClientBuilder::default()
    }

    /// Build a client honouring `base_url` and `timeout_secs` from the config file.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let mut builder = Self::builder();
        if let Some(url) = config.validated_base_url()? {
            builder = builder.base_url(url);
        }
        if let Some(timeout) = config.timeout() {
            builder = builder.deadline(timeout);
        }
        Ok(builder.build())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch current weather for the store's coordinates.
    ///
    /// Coordinates and key are read before this returns; the returned future
    /// owns that snapshot, so later changes to `store` do not affect it.
    /// Failures are reported to the observer once and then returned as-is.
    pub fn fetch_current_weather(
        &self,
        store: &WeatherStore,
        options: FetchOptions,
    ) -> impl Future<Output = Result<GeolocationInfo, WeatherError>> + Send + use<> {
        let client = self.clone();
        let key = store.api_key().clone();
        let position = store.coordinates().to_query();
        let deadline = options.deadline.or(self.default_deadline);
        let cancel = options.cancel;

        async move {
            let result = client.execute(&key, &position, deadline, cancel).await;
            if let Err(err) = &result {
                client.observer.on_failure(err.kind(), err);
            }
            result
        }
    }

    async fn execute(
        &self,
        key: &ApiKey,
        position: &str,
        deadline: Option<Duration>,
        cancel: Option<CancellationToken>,
    ) -> Result<GeolocationInfo, WeatherError> {
        let bounded = async {
            let exchange = self.exchange(key, position);
            match deadline {
                Some(limit) => tokio::time::timeout(limit, exchange)
                    .await
                    .unwrap_or_else(|_| Err(WeatherError::Timeout(limit))),
                None => exchange.await,
            }
        };

        match cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => Err(WeatherError::Cancelled),
                result = bounded => result,
            },
            None => bounded.await,
        }
    }

    async fn exchange(
        &self,
        key: &ApiKey,
        position: &str,
    ) -> Result<GeolocationInfo, WeatherError> {
        let res = self
            .http
            .get(&self.base_url)
            .query(&[("key", key.as_str()), ("q", position), ("aqi", "no")])
            .send()
            .await
            .map_err(WeatherError::Transport)?;

        let status = res.status();
        let body = res.text().await.map_err(WeatherError::Transport)?;

        if !status.is_success() {
            return Err(WeatherError::Status { status, body: truncate_body(&body) });
        }

        serde_json::from_str(&body).map_err(WeatherError::Decode)
    }
}

#[derive(Debug)]
pub struct WeatherClientBuilder {
    http: Option<Client>,
    base_url: String,
    deadline: Option<Duration>,
    observer: Arc<dyn FailureObserver>,
}

impl Default for WeatherClientBuilder {
    fn default() -> Self {
        Self {
            http: None,
            base_url: CURRENT_WEATHER_URL.to_string(),
            deadline: None,
            observer: Arc::new(TracingObserver),
        }
    }
}

impl WeatherClientBuilder {
    /// Reuse an existing connection pool.
    pub fn http_client(mut self, http: Client) -> Self {
        self.http = Some(http);
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Deadline applied when a call does not set its own.
    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn observer(mut self, observer: Arc<dyn FailureObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn build(self) -> WeatherClient {
        WeatherClient {
            http: self.http.unwrap_or_default(),
            base_url: self.base_url,
            default_deadline: self.deadline,
            observer: self.observer,
        }
    }
}
