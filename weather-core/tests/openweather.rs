//! OpenWeather provider against a wiremock server.

use std::time::Duration;

use weather_core::{OpenWeatherProvider, WeatherError, WeatherProvider};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider(server: &MockServer) -> OpenWeatherProvider {
    OpenWeatherProvider::new("TEST_KEY".into(), &server.uri(), Duration::from_secs(2)).unwrap()
}

fn weather_item(id: i32, main: &str) -> serde_json::Value {
    serde_json::json!([{ "id": id, "main": main, "description": main.to_lowercase(), "icon": "04d" }])
}

fn city() -> serde_json::Value {
    serde_json::json!({
        "id": 1566083,
        "name": "Ho Chi Minh City",
        "country": "VN",
        "coord": { "lat": 10.75, "lon": 106.6667 }
    })
}

#[tokio::test]
async fn fetch_current_parses_payload() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("lat", "10.8"))
        .and(query_param("lon", "106.6"))
        .and(query_param("appid", "TEST_KEY"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "coord": { "lon": 106.6667, "lat": 10.75 },
            "weather": weather_item(803, "Clouds"),
            "main": { "temp": 303.15, "feels_like": 308.2, "humidity": 74, "pressure": 1009 },
            "wind": { "speed": 3.6, "deg": 240 },
            "dt": 1700000000,
            "sys": { "country": "VN", "sunrise": 1699999000, "sunset": 1700040000 },
            "name": "Ho Chi Minh City"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let fragment = provider(&server).fetch_current(10.8, 106.6).await.unwrap();

    assert_eq!(fragment.place.location_key(), "Ho Chi Minh CityVN");
    assert_eq!(fragment.place.latitude, 10.75);
    assert_eq!(fragment.data.timestamp, 1_700_000_000);
    assert_eq!(fragment.data.temperature_k, 303.15);
    assert_eq!(fragment.data.wind_speed_mps, 3.6);
    assert_eq!(fragment.data.humidity_pct, 74);
    assert_eq!(fragment.data.condition_code, 803);
    assert_eq!(fragment.data.condition, "Clouds");
}

#[tokio::test]
async fn fetch_hourly_parses_every_step() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "cod": "200",
            "cnt": 2,
            "list": [
                { "dt": 1700010800, "main": { "temp": 301.0, "humidity": 80 },
                  "weather": weather_item(500, "Rain"), "wind": { "speed": 2.0 } },
                { "dt": 1700021600, "main": { "temp": 299.5, "humidity": 85 },
                  "weather": weather_item(501, "Rain"), "wind": { "speed": 1.5 } }
            ],
            "city": city()
        })))
        .mount(&server)
        .await;

    let fragment = provider(&server).fetch_hourly(10.8, 106.6).await.unwrap();

    assert_eq!(fragment.place.city, "Ho Chi Minh City");
    assert_eq!(fragment.data.len(), 2);
    assert_eq!(fragment.data[1].timestamp, 1_700_021_600);
    assert_eq!(fragment.data[1].humidity_pct, 85);
}

#[tokio::test]
async fn fetch_daily_requests_a_week() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast/daily"))
        .and(query_param("cnt", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "city": city(),
            "list": [
                { "dt": 1700024400, "temp": { "day": 304.0, "min": 298.0, "max": 306.0 },
                  "humidity": 65, "weather": weather_item(800, "Clear"), "speed": 4.2 }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let fragment = provider(&server).fetch_daily(10.8, 106.6).await.unwrap();

    assert_eq!(fragment.data.len(), 1);
    assert_eq!(fragment.data[0].temperature_k, 304.0);
    assert_eq!(fragment.data[0].wind_speed_mps, 4.2);
    assert_eq!(fragment.data[0].condition, "Clear");
}

#[tokio::test]
async fn non_success_status_is_transport_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_string(r#"{"cod":401,"message":"Invalid API key"}"#),
        )
        .mount(&server)
        .await;

    let err = provider(&server).fetch_current(10.8, 106.6).await.unwrap_err();

    match err {
        WeatherError::Transport(msg) => {
            assert!(msg.contains("401"));
            assert!(msg.contains("Invalid API key"));
        }
        other => panic!("expected Transport, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_body_is_parse_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = provider(&server).fetch_hourly(10.8, 106.6).await.unwrap_err();
    assert!(matches!(err, WeatherError::Parse(_)));
}

#[tokio::test]
async fn slow_server_hits_transport_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let provider =
        OpenWeatherProvider::new("TEST_KEY".into(), &server.uri(), Duration::from_millis(200)).unwrap();
    let err = provider.fetch_current(10.8, 106.6).await.unwrap_err();

    assert!(matches!(err, WeatherError::Transport(_)), "got {err:?}");
}
