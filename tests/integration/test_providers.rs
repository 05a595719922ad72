//! HTTP provider tests against a mock server

use crate::TestUtils;
use serde_json::json;
use sports_arbitrage::{
    connectors::{OddsProvider, Provider, RapidApiProvider, TheOddsApiProvider},
    engine::ArbitrageEngine,
    ArbitrageError,
};
use wiremock::{
    matchers::{header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

fn odds_api_body() -> serde_json::Value {
    json!([
        {
            "id": "evt1",
            "sport_key": "basketball_nba",
            "sport_title": "NBA",
            "commence_time": "2024-03-01T00:30:00Z",
            "home_team": "Los Angeles Lakers",
            "away_team": "Boston Celtics",
            "bookmakers": [
                {
                    "key": "fanduel",
                    "title": "FanDuel",
                    "last_update": "2024-02-29T20:00:00Z",
                    "markets": [{"key": "h2h", "outcomes": [
                        {"name": "Los Angeles Lakers", "price": 2.10},
                        {"name": "Boston Celtics", "price": 1.80}
                    ]}]
                },
                {
                    "key": "draftkings",
                    "title": "DraftKings",
                    "last_update": "2024-02-29T20:01:00Z",
                    "markets": [{"key": "h2h", "outcomes": [
                        {"name": "Los Angeles Lakers", "price": 1.90},
                        {"name": "Boston Celtics", "price": 2.05}
                    ]}]
                }
            ]
        }
    ])
}

async fn odds_api_provider(server: &MockServer, sports: &[&str]) -> TheOddsApiProvider {
    let mut config = TestUtils::create_test_config();
    config.providers.the_odds_api.base_url = server.uri();
    config.providers.the_odds_api.api_key = "test-key".to_string();
    config.scan.sports = sports.iter().map(|s| s.to_string()).collect();
    TheOddsApiProvider::new(&config.providers.the_odds_api, &config.scan).unwrap()
}

#[tokio::test]
async fn test_the_odds_api_fetch_and_evaluate() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v4/sports/basketball_nba/odds"))
        .and(query_param("apiKey", "test-key"))
        .and(query_param("markets", "h2h"))
        .and(query_param("oddsFormat", "decimal"))
        .and(query_param("regions", "us"))
        .respond_with(ResponseTemplate::new(200).set_body_json(odds_api_body()))
        .expect(1)
        .mount(&server)
        .await;

    let provider = odds_api_provider(&server, &["basketball_nba"]).await;
    assert_eq!(provider.provider(), Provider::TheOddsApi);

    let events = provider.fetch_events().await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].id, "odds_evt1");

    let opportunity = ArbitrageEngine::new()
        .evaluate(&events[0].to_market(), 1000.0)
        .unwrap()
        .into_opportunity()
        .expect("lines cross between bookmakers");
    assert_eq!(opportunity.bookmakers(), vec!["FanDuel", "DraftKings"]);
    assert!((opportunity.profit - 37.349).abs() < 0.01);
}

#[tokio::test]
async fn test_the_odds_api_partial_sport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v4/sports/basketball_nba/odds"))
        .respond_with(ResponseTemplate::new(200).set_body_json(odds_api_body()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v4/sports/icehockey_nhl/odds"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let provider = odds_api_provider(&server, &["icehockey_nhl", "basketball_nba"]).await;
    let events = provider.fetch_events().await.unwrap();
    assert_eq!(events.len(), 1);
}

#[tokio::test]
async fn test_the_odds_api_quota_exceeded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota"))
        .mount(&server)
        .await;

    let provider = odds_api_provider(&server, &["basketball_nba"]).await;
    let err = provider.fetch_events().await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ArbitrageError>(),
        Some(ArbitrageError::RateLimited(_))
    ));
}

#[tokio::test]
async fn test_the_odds_api_server_error_and_bad_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v4/sports/basketball_nba/odds"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v4/sports/soccer_epl/odds"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let provider = odds_api_provider(&server, &["basketball_nba"]).await;
    let err = provider.fetch_events().await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ArbitrageError>(),
        Some(ArbitrageError::Connection(_))
    ));

    let provider = odds_api_provider(&server, &["soccer_epl"]).await;
    let err = provider.fetch_events().await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ArbitrageError>(),
        Some(ArbitrageError::DataParsing(_))
    ));
}

#[tokio::test]
async fn test_the_odds_api_list_sports() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v4/sports"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"key": "basketball_nba", "group": "Basketball", "title": "NBA", "description": "US Basketball", "active": true, "has_outrights": false},
            {"key": "soccer_epl", "group": "Soccer", "title": "EPL", "description": "Premier League", "active": false, "has_outrights": false}
        ])))
        .mount(&server)
        .await;

    let provider = odds_api_provider(&server, &["basketball_nba"]).await;
    let sports = provider.list_sports().await.unwrap();
    assert_eq!(sports.len(), 2);
    assert!(sports[0].active);
    assert_eq!(sports[1].key, "soccer_epl");
}

fn rapid_event(key: &str, home_price: f64, away_price: f64) -> serde_json::Value {
    json!({
        "key": key,
        "startTime": "2024-03-02T00:30:00Z",
        "homeParticipantKey": "P-HEAT",
        "participants": [
            {"key": "P-KNICKS", "name": "New York Knicks", "sport": "BASKETBALL"},
            {"key": "P-HEAT", "name": "Miami Heat", "sport": "BASKETBALL"}
        ],
        "markets": [{"key": "M1", "type": "MONEYLINE", "segment": "FULL_MATCH", "outcomes": {
            "PINNACLE": [
                {"payout": away_price, "participant": {"key": "P-KNICKS", "name": "New York Knicks"}},
                {"payout": 1.70, "participant": {"key": "P-HEAT", "name": "Miami Heat"}}
            ],
            "BETRIVERS": [
                {"payout": 1.80, "participant": {"key": "P-KNICKS", "name": "New York Knicks"}},
                {"payout": home_price, "participant": {"key": "P-HEAT", "name": "Miami Heat"}}
            ]
        }}]
    })
}

#[tokio::test]
async fn test_rapid_api_batched_fetch() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v0/competitions"))
        .and(header("X-RapidAPI-Key", "rapid-key"))
        .and(header("X-RapidAPI-Host", "sportsbook-api2.p.rapidapi.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "competitions": [{"key": "NBA", "name": "NBA"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v0/competitions/NBA/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "events": [{"key": "E1"}, {"key": "E2"}, {"key": "E3"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v0/events"))
        .and(query_param("eventKeys", "E1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "events": [rapid_event("E1", 2.10, 2.05), rapid_event("E2", 1.85, 1.95)]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v0/events"))
        .and(query_param("eventKeys", "E3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "events": [rapid_event("E3", 1.90, 1.90)]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = TestUtils::create_test_config();
    config.providers.rapid_api.base_url = server.uri();
    config.providers.rapid_api.api_key = "rapid-key".to_string();
    config.providers.rapid_api.batch_size = 2;

    let provider = RapidApiProvider::new(&config.providers.rapid_api).unwrap();
    let events = provider.fetch_events().await.unwrap();

    let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["rapid_E1", "rapid_E2", "rapid_E3"]);

    let engine = ArbitrageEngine::new();
    let opportunities: Vec<_> = events
        .iter()
        .filter_map(|e| engine.evaluate(&e.to_market(), 1000.0).ok()?.into_opportunity())
        .collect();
    assert_eq!(opportunities.len(), 1);
}

#[tokio::test]
async fn test_rapid_api_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let mut config = TestUtils::create_test_config();
    config.providers.rapid_api.base_url = server.uri();
    config.providers.rapid_api.api_key = "bad".to_string();

    let provider = RapidApiProvider::new(&config.providers.rapid_api).unwrap();
    let err = provider.fetch_events().await.unwrap_err();
    assert!(err.to_string().contains("403"));
}
