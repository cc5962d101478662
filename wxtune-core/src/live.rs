//! Current weather readings from the Hong Kong Observatory open data API.
//!
//! The `rhrread` (regional weather in Hong Kong, current) endpoint returns a
//! JSON document with per-place rainfall, temperature and humidity lists.
//! One place is picked per reading. Parsing is always available; the HTTP
//! fetch needs the `api` feature.

use log::debug;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

/// Current weather report endpoint.
pub const RHRREAD_URL: &str =
    "https://data.weather.gov.hk/weatherAPI/opendata/weather.php?dataType=rhrread&lang=en";

/// Default bound on the whole request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur when fetching or interpreting live weather.
#[derive(Debug, PartialEq, Clone)]
pub enum LiveWeatherError {
    /// The request could not be sent or timed out.
    HttpRequestError(String),
    /// The server answered with a non-success status.
    HttpStatus(u16),
    /// The body was not the expected JSON document.
    HttpResponseParseError(String),
    /// The report did not carry the named reading.
    MissingReading(&'static str),
}

impl fmt::Display for LiveWeatherError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiveWeatherError::HttpRequestError(e) => {
                write!(f, "live weather request failed: {}", e)
            }
            LiveWeatherError::HttpStatus(code) => {
                write!(f, "live weather source returned HTTP {}", code)
            }
            LiveWeatherError::HttpResponseParseError(e) => {
                write!(f, "live weather response could not be parsed: {}", e)
            }
            LiveWeatherError::MissingReading(field) => {
                write!(f, "live weather report has no {} reading", field)
            }
        }
    }
}

impl std::error::Error for LiveWeatherError {}

/// Where to fetch from and which stations to read.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveWeatherConfig {
    pub url: String,
    pub timeout: Duration,
    pub rainfall_place: String,
    pub temperature_place: String,
    pub humidity_place: String,
}

impl Default for LiveWeatherConfig {
    fn default() -> Self {
        LiveWeatherConfig {
            url: RHRREAD_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            rainfall_place: "Yau Tsim Mong".to_string(),
            temperature_place: "King's Park".to_string(),
            humidity_place: "Hong Kong Observatory".to_string(),
        }
    }
}

/// The current readings. Any of them may be absent from a report.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LiveWeather {
    /// Air temperature in °C
    pub temperature: Option<f64>,
    /// Rainfall over the past hour in mm
    pub rainfall: Option<f64>,
    /// Relative humidity in %
    pub humidity: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
struct Report {
    #[serde(default)]
    rainfall: Section<RainfallEntry>,
    #[serde(default)]
    temperature: Section<ValueEntry>,
    #[serde(default)]
    humidity: Section<ValueEntry>,
}

#[derive(Debug, Deserialize)]
struct Section<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

impl<T> Default for Section<T> {
    fn default() -> Self {
        Section { data: Vec::new() }
    }
}

#[derive(Debug, Deserialize)]
struct RainfallEntry {
    place: String,
    max: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ValueEntry {
    place: String,
    value: Option<f64>,
}

impl LiveWeather {
    /// Pull the configured places out of an `rhrread` JSON document.
    pub fn from_rhrread_json(
        body: &str,
        config: &LiveWeatherConfig,
    ) -> Result<LiveWeather, LiveWeatherError> {
        let report: Report = serde_json::from_str(body)
            .map_err(|e| LiveWeatherError::HttpResponseParseError(e.to_string()))?;
        let rainfall = report
            .rainfall
            .data
            .iter()
            .find(|e| e.place == config.rainfall_place)
            .and_then(|e| e.max);
        let temperature = report
            .temperature
            .data
            .iter()
            .find(|e| e.place == config.temperature_place)
            .and_then(|e| e.value);
        let humidity = report
            .humidity
            .data
            .iter()
            .find(|e| e.place == config.humidity_place)
            .and_then(|e| e.value);
        debug!(
            "[wxtune] live: {}={:?} {}={:?} {}={:?}",
            config.temperature_place,
            temperature,
            config.rainfall_place,
            rainfall,
            config.humidity_place,
            humidity
        );
        Ok(LiveWeather {
            temperature,
            rainfall,
            humidity,
        })
    }

    /// All three readings, or the name of the first one that is missing.
    pub fn complete(&self) -> Result<(f64, f64, f64), LiveWeatherError> {
        let temperature = self
            .temperature
            .ok_or(LiveWeatherError::MissingReading("temperature"))?;
        let rainfall = self
            .rainfall
            .ok_or(LiveWeatherError::MissingReading("rainfall"))?;
        let humidity = self
            .humidity
            .ok_or(LiveWeatherError::MissingReading("humidity"))?;
        Ok((temperature, rainfall, humidity))
    }
}

/// Fetch the current readings. The whole exchange is bounded by
/// `config.timeout`; on expiry the source is reported as unavailable.
#[cfg(feature = "api")]
pub async fn fetch_live_weather(
    client: &reqwest::Client,
    config: &LiveWeatherConfig,
) -> Result<LiveWeather, LiveWeatherError> {
    use log::{info, warn};

    let exchange = async {
        let response = client
            .get(&config.url)
            .send()
            .await
            .map_err(|e| LiveWeatherError::HttpRequestError(e.to_string()))?;
        if !response.status().is_success() {
            return Err(LiveWeatherError::HttpStatus(response.status().as_u16()));
        }
        response
            .text()
            .await
            .map_err(|e| LiveWeatherError::HttpRequestError(e.to_string()))
    };

    let body = match tokio::time::timeout(config.timeout, exchange).await {
        Ok(result) => result?,
        Err(_) => {
            warn!("[wxtune] live: request to {} timed out after {:?}", config.url, config.timeout);
            return Err(LiveWeatherError::HttpRequestError(format!(
                "timed out after {:?}",
                config.timeout
            )));
        }
    };
    let weather = LiveWeather::from_rhrread_json(&body, config)?;
    info!(
        "[wxtune] live: temperature={:?} rainfall={:?} humidity={:?}",
        weather.temperature, weather.rainfall, weather.humidity
    );
    Ok(weather)
}


#[cfg(all(test, feature = "api"))]
mod fetch_tests {
    use super::*;
    use std::time::Instant;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn config_for(url: String, timeout: Duration) -> LiveWeatherConfig {
        LiveWeatherConfig {
            url,
            timeout,
            ..LiveWeatherConfig::default()
        }
    }

    /// Serve one canned HTTP response to the first connection.
    async fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{}/", addr)
    }

    #[tokio::test]
    async fn test_silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            // accept and never answer
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let config = config_for(format!("http://{}/", addr), Duration::from_millis(300));
        let started = Instant::now();
        let result = fetch_live_weather(&reqwest::Client::new(), &config).await;
        assert!(matches!(result, Err(LiveWeatherError::HttpRequestError(_))));
        assert!(started.elapsed() < Duration::from_secs(5));
        server.abort();
    }

    #[tokio::test]
    async fn test_refused_connection_is_request_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let config = config_for(format!("http://{}/", addr), Duration::from_secs(2));
        let result = fetch_live_weather(&reqwest::Client::new(), &config).await;
        assert!(matches!(result, Err(LiveWeatherError::HttpRequestError(_))));
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let url = serve_once(
            "HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        )
        .await;
        let config = config_for(url, Duration::from_secs(2));
        let result = fetch_live_weather(&reqwest::Client::new(), &config).await;
        assert_eq!(result, Err(LiveWeatherError::HttpStatus(503)));
    }

    #[tokio::test]
    async fn test_fetch_parses_report() {
        let url = serve_once(concat!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n",
            "Content-Length: 184\r\nConnection: close\r\n\r\n",
            r#"{"rainfall":{"data":[{"place":"Yau Tsim Mong","max":2}]},"#,
            r#""temperature":{"data":[{"place":"King's Park","value":27}]},"#,
            r#""humidity":{"data":[{"place":"Hong Kong Observatory","value":90}]}}"#,
        ))
        .await;
        let config = config_for(url, Duration::from_secs(2));
        let weather = fetch_live_weather(&reqwest::Client::new(), &config)
            .await
            .unwrap();
        assert_eq!(weather.complete(), Ok((27.0, 2.0, 90.0)));
    }
}
