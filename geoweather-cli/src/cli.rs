use std::{fmt::Write as _, time::Duration};

use anyhow::Context;
use clap::{Parser, Subcommand};
use geoweather_core::{
    ApiKey, Config, FetchOptions, GeolocationInfo, ModalController, WeatherClient,
};
use inquire::{Password, PasswordDisplayMode};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "geoweather", version, about = "Current weather for a coordinate pair")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the WeatherAPI.com API key.
    Configure {
        /// Key to store; prompted for when omitted.
        #[arg(long)]
        api_key: Option<String>,
    },

    /// Show current weather at a position.
    Show {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Give up after this many seconds (overrides `timeout_secs` from config).
        #[arg(long)]
        timeout: Option<u64>,

        /// Print the provider response as JSON.
        #[arg(long, conflicts_with = "details")]
        json: bool,

        /// Also show the details panel.
        #[arg(long)]
        details: bool,
    },

    /// Print where the config file lives.
    ConfigPath,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { api_key } => configure(api_key),
            Command::Show { lat, lon, timeout, json, details } => {
                show(lat, lon, timeout, json, details).await
            }
            Command::ConfigPath => {
                println!("{}", Config::config_file_path()?.display());
                Ok(())
            }
        }
    }
}

fn configure(api_key: Option<String>) -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let key = match api_key {
        Some(key) => key,
        None => Password::new("WeatherAPI.com API key:")
            .without_confirmation()
            .with_display_mode(PasswordDisplayMode::Masked)
            .prompt()?,
    };
    ApiKey::new(key.as_str())?;

    config.set_api_key(key);
    let path = config.save()?;
    println!("Saved API key to {}", path.display());
    Ok(())
}

async fn show(
    lat: f64,
    lon: f64,
    timeout: Option<u64>,
    json: bool,
    details: bool,
) -> anyhow::Result<()> {
    let config = Config::load()?;
    let mut store = config.store()?;
    store.set_coordinates(lat, lon);
    let client = WeatherClient::from_config(&config)?;

    let token = CancellationToken::new();
    let mut options = FetchOptions::default().with_cancel(token.clone());
    if let Some(secs) = timeout {
        options = options.with_deadline(Duration::from_secs(secs));
    }

    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("Interrupted, cancelling request");
            token.cancel();
        }
    });
    let result = client.fetch_current_weather(&store, options).await;
    interrupt.abort();

    let info = result.context("Failed to fetch current weather")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    let mut panel = ModalController::new();
    if details {
        panel.open();
    }
    print!("{}", render(&info, &panel));
    Ok(())
}

fn render(info: &GeolocationInfo, panel: &ModalController) -> String {
    let loc = &info.location;
    let cur = &info.current;
    let mut out = String::new();

    let _ = writeln!(out, "{}, {} ({})", loc.name, loc.region, loc.country);
    let _ = writeln!(
        out,
        "{:.1}°C (feels like {:.1}°C), {}",
        cur.temperature_celsius,
        cur.feels_like_celsius,
        cur.condition.text
    );
    let _ = writeln!(out, "Wind {:.1} km/h, humidity {}%", cur.wind_kph, cur.humidity_percent);

    if panel.is_visible() {
        let local = loc
            .local_time_at()
            .map(|t| t.format("%a %d %b %Y, %H:%M").to_string())
            .unwrap_or_else(|| loc.local_time.clone());
        let _ = writeln!(out, "---");
        let _ = writeln!(out, "Local time:   {local} ({})", loc.timezone_id);
        let _ = writeln!(out, "Daylight:     {}", if cur.is_daytime() { "day" } else { "night" });
        let _ = writeln!(out, "Last updated: {}", cur.last_updated);
        let _ = writeln!(out, "Icon:         {}", cur.condition.icon_https_url());
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoweather_core::{Condition, Current, Location};

    fn info() -> GeolocationInfo {
        GeolocationInfo {
            location: Location {
                name: "Paris".into(),
                region: "Ile-de-France".into(),
                country: "France".into(),
                timezone_id: "Europe/Paris".into(),
                local_time: "2024-05-01 21:10".into(),
            },
            current: Current {
                last_updated: "2024-05-01 21:00".into(),
                temperature_celsius: 12.0,
                is_day: 0,
                condition: Condition {
                    text: "Clear".into(),
                    icon_url: "//cdn.weatherapi.com/weather/64x64/night/113.png".into(),
                },
                wind_kph: 7.2,
                feels_like_celsius: 11.4,
                humidity_percent: 81,
            },
        }
    }

    #[test]
    fn summary_without_panel() {
        let out = render(&info(), &ModalController::new());

        assert!(out.starts_with("Paris, Ile-de-France (France)\n"));
        assert!(out.contains("12.0°C (feels like 11.4°C), Clear"));
        assert!(out.contains("humidity 81%"));
        assert!(!out.contains("Local time"));
    }

    #[test]
    fn panel_adds_details() {
        let mut panel = ModalController::new();
        panel.open();
        let out = render(&info(), &panel);

        assert!(out.contains("Local time:   Wed 01 May 2024, 21:10 (Europe/Paris)"));
        assert!(out.contains("Daylight:     night"));
        assert!(out.contains("https://cdn.weatherapi.com/weather/64x64/night/113.png"));
    }

    #[test]
    fn parses_negative_coordinates() {
        let cli = Cli::try_parse_from(["geoweather", "show", "--lat", "51.5", "--lon", "-0.12"])
            .expect("args should parse");

        match cli.command {
            Command::Show { lat, lon, json, details, timeout } => {
                assert_eq!((lat, lon), (51.5, -0.12));
                assert!(!json && !details);
                assert_eq!(timeout, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn json_and_details_conflict() {
        let res = Cli::try_parse_from([
            "geoweather", "show", "--lat", "1", "--lon", "2", "--json", "--details",
        ]);
        assert!(res.is_err());
    }
}
