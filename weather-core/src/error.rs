use thiserror::Error;

/// Failure of a single fetch, lookup or write.
///
/// Every kind is scoped to one sync cycle; none of them is fatal to the process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeatherError {
    #[error("Network unavailable: {0}")]
    NetworkUnavailable(String),

    #[error("Weather request failed: {0}")]
    Transport(String),

    #[error("Malformed weather response: {0}")]
    Parse(String),

    #[error("No cached weather for {0}")]
    CacheMiss(String),

    #[error("Local weather store error: {0}")]
    Storage(String),
}

impl WeatherError {
    /// Cache misses are reported to the view as "DB empty" rather than as a generic error.
    pub fn is_cache_miss(&self) -> bool {
        matches!(self, WeatherError::CacheMiss(_))
    }
}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            WeatherError::NetworkUnavailable(err.to_string())
        } else if err.is_decode() {
            WeatherError::Parse(err.to_string())
        } else if err.is_timeout() {
            WeatherError::Transport(format!("request timed out: {err}"))
        } else {
            WeatherError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for WeatherError {
    fn from(err: serde_json::Error) -> Self {
        WeatherError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_cache_miss_is_cache_miss() {
        assert!(WeatherError::CacheMiss("Ho Chi Minh CityVN".into()).is_cache_miss());
        assert!(!WeatherError::NetworkUnavailable("offline".into()).is_cache_miss());
        assert!(!WeatherError::Storage("disk full".into()).is_cache_miss());
    }

    #[test]
    fn json_errors_become_parse_failures() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err = WeatherError::from(err);

        assert!(matches!(err, WeatherError::Parse(_)));
        assert!(err.to_string().starts_with("Malformed weather response"));
    }
}
