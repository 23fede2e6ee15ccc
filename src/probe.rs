use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{AppError, AppResult};

const PROBE_TIMEOUT_SECS: u64 = 10;

pub const RECOGNIZED_PROVIDERS: &[&str] = &["openweathermap", "pihole"];

/// One outbound validation request: a provider name, whatever credentials
/// that provider needs, and the optional tuning parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeRequest {
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
}

/// Single-shot reachability/credential check against an external
/// integration. No retries, no caching; the upstream outcome is surfaced
/// verbatim.
pub struct ProbeAdapter {
    client: reqwest::Client,
}

impl Default for ProbeAdapter {
    fn default() -> Self {
        Self::new()
    }
}

fn missing(provider: &str, parameter: &str) -> AppError {
    AppError::new(
        AppError::MISSING_PARAMETER,
        "Probe request is missing a required parameter",
    )
    .with_context("provider", provider.to_string())
    .with_context("parameter", parameter.to_string())
}

fn build_url(request: &ProbeRequest) -> AppResult<String> {
    match request.provider.as_str() {
        "openweathermap" => {
            let api_key = request
                .api_key
                .as_deref()
                .filter(|s| !s.is_empty())
                .ok_or_else(|| missing("openweathermap", "apiKey"))?;
            let lat = request
                .lat
                .ok_or_else(|| missing("openweathermap", "lat"))?;
            let lon = request
                .lon
                .ok_or_else(|| missing("openweathermap", "lon"))?;
            let units = request.units.as_deref().unwrap_or("metric");
            Ok(format!(
                "https://api.openweathermap.org/data/2.5/weather?lat={lat}&lon={lon}&appid={api_key}&units={units}"
            ))
        }
        "pihole" => {
            let base = request
                .url
                .as_deref()
                .filter(|s| !s.is_empty())
                .ok_or_else(|| missing("pihole", "url"))?;
            let token = request
                .token
                .as_deref()
                .filter(|s| !s.is_empty())
                .ok_or_else(|| missing("pihole", "token"))?;
            let base = base.trim_end_matches('/');
            Ok(format!("{base}/admin/api.php?summary&auth={token}"))
        }
        other => Err(AppError::new(
            AppError::UNSUPPORTED_PROVIDER,
            "Probe provider is not recognized",
        )
        .with_context("provider", other.to_string())),
    }
}

impl ProbeAdapter {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(PROBE_TIMEOUT_SECS))
                .build()
                .unwrap_or_default(),
        }
    }

    /// One best-effort round trip. Parameter problems fail before any
    /// network IO; remote failures (including timeout) come back as
    /// `PROBE/UPSTREAM` with the status and body untouched.
    pub async fn probe(&self, request: &ProbeRequest) -> AppResult<Value> {
        let url = build_url(request)?;

        tracing::info!(
            target = "homedash",
            event = "probe_request",
            provider = %request.provider
        );

        let response = self.client.get(&url).send().await.map_err(|err| {
            AppError::new(AppError::UPSTREAM, "Probe request failed to complete")
                .with_context("provider", request.provider.clone())
                .with_cause(AppError::from(err))
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|err| {
            AppError::new(AppError::UPSTREAM, "Probe response body could not be read")
                .with_context("provider", request.provider.clone())
                .with_context("status", status.as_u16().to_string())
                .with_cause(AppError::from(err))
        })?;

        if !status.is_success() {
            tracing::warn!(
                target = "homedash",
                event = "probe_upstream_error",
                provider = %request.provider,
                status = status.as_u16()
            );
            return Err(
                AppError::new(AppError::UPSTREAM, "Probe target reported a failure")
                    .with_context("provider", request.provider.clone())
                    .with_context("status", status.as_u16().to_string())
                    .with_context("body", body),
            );
        }

        // Pass the payload through verbatim; a non-JSON body stays a string.
        Ok(serde_json::from_str(&body).unwrap_or(Value::String(body)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weather_request() -> ProbeRequest {
        ProbeRequest {
            provider: "openweathermap".into(),
            api_key: Some("k123".into()),
            url: None,
            token: None,
            lat: Some(53.16),
            lon: Some(-6.15),
            units: Some("metric".into()),
        }
    }

    #[test]
    fn builds_weather_url_with_units() {
        let url = build_url(&weather_request()).unwrap();
        assert_eq!(
            url,
            "https://api.openweathermap.org/data/2.5/weather?lat=53.16&lon=-6.15&appid=k123&units=metric"
        );
    }

    #[test]
    fn units_default_to_metric() {
        let mut request = weather_request();
        request.units = None;
        let url = build_url(&request).unwrap();
        assert!(url.ends_with("&units=metric"));
    }

    #[test]
    fn missing_api_key_is_a_parameter_error() {
        let mut request = weather_request();
        request.api_key = None;
        let err = build_url(&request).unwrap_err();
        assert_eq!(err.code(), AppError::MISSING_PARAMETER);
        assert_eq!(err.context().get("parameter"), Some(&"apiKey".to_string()));
    }

    #[test]
    fn empty_api_key_counts_as_missing() {
        let mut request = weather_request();
        request.api_key = Some(String::new());
        let err = build_url(&request).unwrap_err();
        assert_eq!(err.code(), AppError::MISSING_PARAMETER);
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let mut request = weather_request();
        request.provider = "acmeweather".into();
        let err = build_url(&request).unwrap_err();
        assert_eq!(err.code(), AppError::UNSUPPORTED_PROVIDER);
        assert_eq!(
            err.context().get("provider"),
            Some(&"acmeweather".to_string())
        );
    }

    #[test]
    fn pihole_url_strips_trailing_slash() {
        let request = ProbeRequest {
            provider: "pihole".into(),
            api_key: None,
            url: Some("http://pi.hole/".into()),
            token: Some("t0k".into()),
            lat: None,
            lon: None,
            units: None,
        };
        let url = build_url(&request).unwrap();
        assert_eq!(url, "http://pi.hole/admin/api.php?summary&auth=t0k");
    }

    #[test]
    fn pihole_without_token_is_a_parameter_error() {
        let request = ProbeRequest {
            provider: "pihole".into(),
            api_key: None,
            url: Some("http://pi.hole".into()),
            token: None,
            lat: None,
            lon: None,
            units: None,
        };
        let err = build_url(&request).unwrap_err();
        assert_eq!(err.code(), AppError::MISSING_PARAMETER);
        assert_eq!(err.context().get("parameter"), Some(&"token".to_string()));
    }
}
