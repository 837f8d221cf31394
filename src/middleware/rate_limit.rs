use std::sync::Arc;

use axum::body::Body;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

/// Type alias for the IP-keyed governor layer used on public routes
pub type PublicGovernorLayer = GovernorLayer<
    tower_governor::key_extractor::PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware<governor::clock::QuantaInstant>,
    Body,
>;

/// Rate limiter for the public catalog routes (per IP address):
/// one token every 600ms, burst of 100 (100 requests per minute sustained)
pub fn create_public_governor() -> PublicGovernorLayer {
    let config = Arc::new(
        GovernorConfigBuilder::default()
            .per_millisecond(600)
            .burst_size(100)
            .finish()
            .unwrap(),
    );

    GovernorLayer::new(config)
}
