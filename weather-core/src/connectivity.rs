//! Cheap reachability check used to decide the connectivity flag of a cycle.

use reqwest::Url;
use std::time::Duration;
use tokio::net::TcpStream;

use crate::WeatherError;

/// Try a TCP connect to the host of `base_url` within `timeout`.
pub async fn probe(base_url: &str, timeout: Duration) -> Result<(), WeatherError> {
    let url = Url::parse(base_url)
        .map_err(|e| WeatherError::NetworkUnavailable(format!("invalid base url '{base_url}': {e}")))?;

    let host = url
        .host_str()
        .ok_or_else(|| WeatherError::NetworkUnavailable(format!("no host in '{base_url}'")))?;
    let port = url.port_or_known_default().unwrap_or(443);

    match tokio::time::timeout(timeout, TcpStream::connect((host, port))).await {
        Ok(Ok(_)) => {
            tracing::debug!(host, port, "network reachable");
            Ok(())
        }
        Ok(Err(e)) => Err(WeatherError::NetworkUnavailable(format!("{host}:{port}: {e}"))),
        Err(_) => Err(WeatherError::NetworkUnavailable(format!(
            "{host}:{port}: no answer within {}s",
            timeout.as_secs_f32()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn reachable_listener_passes() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let result = probe(&format!("http://{addr}"), Duration::from_secs(2)).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn closed_port_is_network_unavailable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = probe(&format!("http://{addr}"), Duration::from_secs(2)).await.unwrap_err();
        assert!(matches!(err, WeatherError::NetworkUnavailable(_)));
    }

    #[tokio::test]
    async fn garbage_url_is_rejected() {
        let err = probe("not a url", Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, WeatherError::NetworkUnavailable(_)));
    }
}
