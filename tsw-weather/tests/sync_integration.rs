//! Integration tests for the full weather sync stack.
//!
//! These tests run the real `FeedClient`, `OpenWeatherClient`, converter,
//! transition engine and controller against an in-memory HTTP world that
//! answers like the simulation and the weather provider:
//! - startup probe, registration and bootstrap fetch
//! - distance-gated refreshes while the train moves
//! - the run loop's shutdown and failure paths
//!
//! Run with: `cargo test --test sync_integration`

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use tsw_weather::app::{AppError, WeatherSyncApp};
use tsw_weather::feed::{FeedClient, IdentityError};
use tsw_weather::geo::{GeoPoint, EARTH_RADIUS_METERS};
use tsw_weather::http::{AsyncHttpClient, RequestError};
use tsw_weather::provider::OpenWeatherClient;
use tsw_weather::retry::RetryPolicy;
use tsw_weather::sync::{ControllerState, SyncConfig, SyncError, TickOutcome};
use tsw_weather::weather::TransitionOutcome;

// ============================================================================
// In-memory world
// ============================================================================

struct WorldState {
    game_name: String,
    position: Option<GeoPoint>,
    temperature_kelvin: f64,
    offline: bool,
    registered: bool,
    deregistrations: u32,
    patches: Vec<(String, f64)>,
    weather_queries: Vec<GeoPoint>,
}

/// Answers simulation and provider requests from shared state.
#[derive(Clone)]
struct World(Arc<Mutex<WorldState>>);

impl World {
    fn new() -> Self {
        Self(Arc::new(Mutex::new(WorldState {
            game_name: "Train Sim World 6®".to_string(),
            position: None,
            temperature_kelvin: 290.15,
            offline: false,
            registered: false,
            deregistrations: 0,
            patches: Vec::new(),
            weather_queries: Vec::new(),
        })))
    }

    fn state(&self) -> std::sync::MutexGuard<'_, WorldState> {
        self.0.lock().unwrap()
    }

    fn move_to(&self, position: GeoPoint) {
        self.state().position = Some(position);
    }

    /// Last value patched into `channel`.
    fn last_patch(&self, channel: &str) -> Option<f64> {
        self.state()
            .patches
            .iter()
            .rev()
            .find(|(name, _)| name == channel)
            .map(|(_, value)| *value)
    }

    fn respond(&self, method: &str, url: &str, body: Option<&str>) -> Result<Vec<u8>, RequestError> {
        let mut state = self.state();
        let unavailable = || RequestError::Status {
            status: 503,
            url: url.to_string(),
        };

        if url.contains("/data/2.5/weather") {
            let point = GeoPoint::new(query_param(url, "lat"), query_param(url, "lon"));
            state.weather_queries.push(point);
            return Ok(weather_body(state.temperature_kelvin).into_bytes());
        }

        if state.offline {
            return Err(unavailable());
        }

        match method {
            "GET" if url.ends_with("/info") => Ok(info_body(&state.game_name).into_bytes()),
            "POST" if url.contains("/subscription/DriverAid.PlayerInfo") => {
                state.registered = true;
                Ok(Vec::new())
            }
            "GET" if url.contains("/subscription?Subscription=") => {
                Ok(position_body(state.position).into_bytes())
            }
            "DELETE" if url.contains("/subscription/?Subscription=") => {
                state.registered = false;
                state.deregistrations += 1;
                Ok(Vec::new())
            }
            "PATCH" if url.contains("/set/WeatherManager.") => {
                let channel = url.rsplit("WeatherManager.").next().unwrap_or_default();
                let value: serde_json::Value =
                    serde_json::from_str(body.unwrap_or("{}")).unwrap();
                state
                    .patches
                    .push((channel.to_string(), value["Value"].as_f64().unwrap()));
                Ok(Vec::new())
            }
            _ => Err(unavailable()),
        }
    }
}

impl AsyncHttpClient for World {
    async fn get(&self, url: &str) -> Result<Vec<u8>, RequestError> {
        self.respond("GET", url, None)
    }

    async fn post(&self, url: &str) -> Result<Vec<u8>, RequestError> {
        self.respond("POST", url, None)
    }

    async fn delete(&self, url: &str) -> Result<Vec<u8>, RequestError> {
        self.respond("DELETE", url, None)
    }

    async fn patch_json(&self, url: &str, json_body: &str) -> Result<Vec<u8>, RequestError> {
        self.respond("PATCH", url, Some(json_body))
    }
}

fn query_param(url: &str, name: &str) -> f64 {
    url.split(['?', '&'])
        .find_map(|pair| pair.strip_prefix(&format!("{}=", name)))
        .and_then(|v| v.parse().ok())
        .unwrap()
}

fn info_body(game_name: &str) -> String {
    serde_json::json!({
        "Meta": {
            "Worker": "DTGCommWorkerRC",
            "GameName": game_name,
            "GameBuildNumber": 1024,
            "APIVersion": 1,
            "GameInstanceID": "test-instance"
        },
        "HttpRoutes": []
    })
    .to_string()
}

fn position_body(position: Option<GeoPoint>) -> String {
    let entries = match position {
        Some(p) => serde_json::json!([{
            "Path": "DriverAid.PlayerInfo",
            "NodeValid": true,
            "Values": {"geoLocation": {"latitude": p.latitude, "longitude": p.longitude}}
        }]),
        None => serde_json::json!([]),
    };
    serde_json::json!({"RequestedSubscriptionID": 1, "Entries": entries}).to_string()
}

fn weather_body(kelvin: f64) -> String {
    serde_json::json!({
        "weather": [{"id": 800, "main": "Clear", "description": "clear sky"}],
        "main": {"temp": kelvin, "humidity": 50},
        "clouds": {"all": 40},
        "visibility": 10000,
        "name": "Testville"
    })
    .to_string()
}

// ============================================================================
// Helper Functions
// ============================================================================

const START: GeoPoint = GeoPoint::new(52.52, 13.40);

/// Point `meters` north of `origin`.
fn north_of(origin: GeoPoint, meters: f64) -> GeoPoint {
    let degrees = (meters / EARTH_RADIUS_METERS).to_degrees();
    GeoPoint::new(origin.latitude + degrees, origin.longitude)
}

fn sync_config() -> SyncConfig {
    SyncConfig {
        update_threshold_km: 10.0,
        tick_interval: Duration::from_secs(10),
        transition_duration: Duration::from_secs(5),
        failed_update_attempts: 3,
        retry: RetryPolicy::none(),
        ..Default::default()
    }
}

type TestApp = WeatherSyncApp<FeedClient<World>, OpenWeatherClient<World>>;

async fn start(world: &World, api_key: &str) -> Result<TestApp, AppError> {
    let feed = FeedClient::new(world.clone(), "http://sim.test", RetryPolicy::none());
    let source = OpenWeatherClient::new(
        world.clone(),
        "http://weather.test",
        api_key,
        RetryPolicy::none(),
    );
    WeatherSyncApp::start_with(feed, source, &sync_config()).await
}

// ============================================================================
// Integration Tests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_journey_refreshes_weather_after_threshold() {
    let world = World::new();
    world.move_to(START);

    let mut app = start(&world, "weather-key").await.unwrap();
    assert_eq!(
        app.identity().map(|m| m.game_instance_id.as_str()),
        Some("test-instance")
    );
    assert!(world.state().registered);
    assert_eq!(world.state().weather_queries, vec![START]);

    // Bootstrap transition settles on the observed weather
    assert_eq!(
        app.controller().engine().join().await,
        Some(TransitionOutcome::Completed)
    );
    assert!((world.last_patch("Temperature").unwrap() - 17.0).abs() < 1e-6);
    assert!((world.last_patch("Cloudiness").unwrap() - 0.4).abs() < 1e-6);
    assert_eq!(world.last_patch("FogDensity"), Some(0.0));

    // 6 km is not enough; 12 km is
    world.state().temperature_kelvin = 275.15;
    let halfway = north_of(START, 6_000.0);
    world.move_to(halfway);
    assert!(matches!(
        app.controller_mut().tick().await,
        TickOutcome::Tracked { .. }
    ));
    assert_eq!(world.state().weather_queries.len(), 1);

    let destination = north_of(halfway, 6_000.0);
    world.move_to(destination);
    assert!(matches!(
        app.controller_mut().tick().await,
        TickOutcome::Refreshed {
            target: Some(_),
            ..
        }
    ));
    assert_eq!(world.state().weather_queries.len(), 2);
    assert_eq!(world.state().weather_queries[1], destination);
    assert_eq!(app.controller().accumulated_km(), 0.0);

    app.controller().engine().join().await;
    assert!((world.last_patch("Temperature").unwrap() - 2.0).abs() < 1e-6);

    app.shutdown().await.unwrap();
    assert!(!world.state().registered);
    assert_eq!(world.state().deregistrations, 1);
}

#[tokio::test(start_paused = true)]
async fn test_run_loop_stops_on_shutdown() {
    let world = World::new();
    world.move_to(START);
    let mut app = start(&world, "weather-key").await.unwrap();

    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(35)).await;
        trigger.cancel();
    });

    app.run(&shutdown).await.unwrap();

    // Stationary train: only the bootstrap fetch
    assert_eq!(world.state().weather_queries.len(), 1);
    assert!(world.state().patches.len() >= 6);

    app.shutdown().await.unwrap();
    assert_eq!(world.state().deregistrations, 1);
}

#[tokio::test(start_paused = true)]
async fn test_run_loop_gives_up_when_simulation_disappears() {
    let world = World::new();
    world.move_to(START);
    let mut app = start(&world, "weather-key").await.unwrap();
    app.controller().engine().join().await;

    world.state().offline = true;
    let result = app.run(&CancellationToken::new()).await;

    assert!(matches!(
        result,
        Err(AppError::Sync(SyncError::FeedLost {
            consecutive_failures: 3
        }))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_missing_provider_key_keeps_running_without_fetching() {
    let world = World::new();
    world.move_to(START);

    let mut app = start(&world, "").await.unwrap();

    assert_eq!(app.controller().state(), ControllerState::Running);
    assert!(world.state().weather_queries.is_empty());
    assert!(!app.controller().engine().is_transitioning());

    world.move_to(north_of(START, 15_000.0));
    assert!(matches!(
        app.controller_mut().tick().await,
        TickOutcome::Refreshed { target: None, .. }
    ));
    assert!(world.state().weather_queries.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_waiting_for_first_position() {
    let world = World::new();
    let mut app = start(&world, "weather-key").await.unwrap();

    assert_eq!(app.controller().last_position(), None);
    assert_eq!(app.controller_mut().tick().await, TickOutcome::NoPosition);

    world.move_to(START);
    assert!(matches!(
        app.controller_mut().tick().await,
        TickOutcome::Refreshed { .. }
    ));
    assert_eq!(world.state().weather_queries, vec![START]);
}

#[tokio::test(start_paused = true)]
async fn test_wrong_game_is_rejected_before_registering() {
    let world = World::new();
    world.state().game_name = "Train Sim World 5".to_string();

    let result = start(&world, "weather-key").await;

    match result {
        Err(AppError::SimulationUnavailable(IdentityError::Mismatch { field, .. })) => {
            assert_eq!(field, "GameName");
        }
        other => panic!("unexpected result: {:?}", other.map(|_| ())),
    }
    assert!(!world.state().registered);
}
