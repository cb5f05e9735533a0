//! Wire models for the simulation's communication API.

use serde::Deserialize;

use crate::geo::GeoPoint;

/// Payload returned when reading a subscription.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SubscriptionData {
    #[serde(rename = "RequestedSubscriptionID", default)]
    pub requested_subscription_id: u32,
    #[serde(default)]
    pub entries: Vec<SubscriptionEntry>,
}

impl SubscriptionData {
    /// Position from the first entry, if the simulation has published one.
    ///
    /// Returns `None` when there are no entries, the first entry is not
    /// valid, or it carries no geo-location.
    pub fn position(&self) -> Option<GeoPoint> {
        let entry = self.entries.first()?;
        if !entry.node_valid {
            return None;
        }
        let location = entry.values.as_ref()?.geo_location.as_ref()?;
        Some(GeoPoint::new(location.latitude, location.longitude))
    }
}

/// One subscribed path and its values.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SubscriptionEntry {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub node_valid: bool,
    #[serde(default)]
    pub values: Option<PlayerInfoValues>,
}

/// Values published under `DriverAid.PlayerInfo`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerInfoValues {
    #[serde(default)]
    pub geo_location: Option<GeoLocation>,
    #[serde(default)]
    pub current_tile: Option<CurrentTile>,
    #[serde(default)]
    pub player_profile_name: String,
    #[serde(default)]
    pub camera_mode: String,
    #[serde(default)]
    pub current_service_name: String,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct CurrentTile {
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
}

/// Response of the `/info` endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ApiInfo {
    #[serde(default)]
    pub meta: Option<ApiMeta>,
    #[serde(default)]
    pub http_routes: Vec<HttpRoute>,
}

/// Identity metadata reported by the simulation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApiMeta {
    #[serde(rename = "Worker", default)]
    pub worker: String,
    #[serde(rename = "GameName", default)]
    pub game_name: String,
    #[serde(rename = "GameBuildNumber", default)]
    pub game_build_number: i64,
    #[serde(rename = "APIVersion", default)]
    pub api_version: i64,
    #[serde(rename = "GameInstanceID", default)]
    pub game_instance_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HttpRoute {
    #[serde(default)]
    pub verb: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAYER_INFO: &str = r#"{
        "RequestedSubscriptionID": 4242,
        "Entries": [{
            "Path": "DriverAid.PlayerInfo",
            "NodeValid": true,
            "Values": {
                "geoLocation": {"longitude": -0.1278, "latitude": 51.5074},
                "currentTile": {"x": 3, "y": -7},
                "playerProfileName": "Driver",
                "cameraMode": "Cab",
                "currentServiceName": "1A23"
            }
        }]
    }"#;

    #[test]
    fn test_position_from_valid_entry() {
        let data: SubscriptionData = serde_json::from_str(PLAYER_INFO).unwrap();
        assert_eq!(data.requested_subscription_id, 4242);
        assert_eq!(data.position(), Some(GeoPoint::new(51.5074, -0.1278)));
    }

    #[test]
    fn test_no_position_when_empty() {
        let data: SubscriptionData =
            serde_json::from_str(r#"{"RequestedSubscriptionID": 1, "Entries": []}"#).unwrap();
        assert_eq!(data.position(), None);
    }

    #[test]
    fn test_no_position_when_node_invalid() {
        let json = PLAYER_INFO.replace("\"NodeValid\": true", "\"NodeValid\": false");
        let data: SubscriptionData = serde_json::from_str(&json).unwrap();
        assert_eq!(data.position(), None);
    }

    #[test]
    fn test_no_position_without_geo_location() {
        let json = r#"{"Entries": [{"Path": "p", "NodeValid": true, "Values": {"cameraMode": "Cab"}}]}"#;
        let data: SubscriptionData = serde_json::from_str(json).unwrap();
        assert_eq!(data.position(), None);
    }

    #[test]
    fn test_api_info_parses_meta() {
        let json = r#"{
            "Meta": {
                "Worker": "DTGCommWorkerRC",
                "GameName": "Train Sim World 6®",
                "GameBuildNumber": 1234,
                "APIVersion": 1,
                "GameInstanceID": "abc-123"
            },
            "HttpRoutes": [{"Verb": "GET", "Path": "/info", "Description": "Info"}]
        }"#;
        let info: ApiInfo = serde_json::from_str(json).unwrap();
        let meta = info.meta.unwrap();
        assert_eq!(meta.worker, "DTGCommWorkerRC");
        assert_eq!(meta.game_build_number, 1234);
        assert_eq!(info.http_routes.len(), 1);
    }
}
