//! Subscription handle.

use rand::Rng;

/// Identifies this client's live feed registration with the simulation.
///
/// A handle is created with a random non-zero id on the first registration
/// attempt and keeps that id until it is deregistered, so retried or repeated
/// registrations reuse the same server-side slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionHandle {
    pub id: u16,
    pub active: bool,
}

impl SubscriptionHandle {
    /// Create an inactive handle with a random id in `1..=u16::MAX`.
    pub fn generate() -> Self {
        Self::with_id(rand::rng().random_range(1..=u16::MAX))
    }

    /// Create an inactive handle with a fixed id.
    pub fn with_id(id: u16) -> Self {
        Self { id, active: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_id_never_zero() {
        for _ in 0..1000 {
            let handle = SubscriptionHandle::generate();
            assert_ne!(handle.id, 0);
            assert!(!handle.active);
        }
    }
}
