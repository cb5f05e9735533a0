//! Simulation feed client.
//!
//! Talks to the simulation's local communication API: a numbered subscription
//! delivers the player's geographic position, and per-channel patches set the
//! simulation's weather.
//!
//! # Subscription lifecycle
//!
//! ```text
//!               register_subscription() ok
//! Unregistered ──────────────────────────────► Active
//!      ▲    │                                   │
//!      │    └── failure: stays Unregistered     │ read_position()
//!      │                                        │ push_weather()
//!      └──────── deregister_subscription() ◄────┘
//! ```
//!
//! Reading before registration yields [`FeedError::NotRegistered`]; reading
//! while the simulation has nothing to report yields [`FeedError::NoData`].
//! Both are normal conditions, not failures.

mod client;
mod error;
mod model;
mod subscription;

pub use client::{ExpectedIdentity, FeedClient, DEFAULT_FEED_URL, EXPECTED_GAME_NAME, EXPECTED_WORKER};
pub use error::{FeedError, IdentityError};
pub use model::{ApiInfo, ApiMeta, SubscriptionData};
pub use subscription::SubscriptionHandle;

use std::future::Future;

use crate::geo::GeoPoint;
use crate::weather::WeatherVector;

/// The simulation as seen by the synchronization core.
///
/// [`FeedClient`] is the production implementation; tests substitute
/// in-memory feeds.
pub trait SimulationFeed: Send + Sync {
    /// Register (or re-register) the position subscription.
    ///
    /// Returns the subscription id on success.
    fn register_subscription(&self) -> impl Future<Output = Result<u16, FeedError>> + Send;

    /// Read the player's current position.
    fn read_position(&self) -> impl Future<Output = Result<GeoPoint, FeedError>> + Send;

    /// Push every weather channel to the simulation.
    fn push_weather(
        &self,
        weather: &WeatherVector,
    ) -> impl Future<Output = Result<(), FeedError>> + Send;

    /// Remove the subscription. A no-op when none is registered.
    fn deregister_subscription(&self) -> impl Future<Output = Result<(), FeedError>> + Send;
}
