use crate::config::Config;
use crate::notify::BroadcastSink;
use jsonwebtoken::DecodingKey;
use matching_engine::{EngineConfig, FanoutSink, MarketEvent, MatchingEngine, TracingSink};
use std::sync::Arc;
use tokio::sync::broadcast;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<MatchingEngine>,
    pub jwt_key: Arc<DecodingKey>,
    pub events: broadcast::Sender<MarketEvent>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        let (events, _) = broadcast::channel(config.event_buffer);
        let sink = FanoutSink::new()
            .with(Arc::new(TracingSink))
            .with(Arc::new(BroadcastSink::new(events.clone())));

        let engine = MatchingEngine::new(
            EngineConfig {
                notify_eligible_providers: config.notify_eligible_providers,
            },
            Arc::new(sink),
        );

        Self {
            engine: Arc::new(engine),
            jwt_key: Arc::new(DecodingKey::from_secret(config.jwt_secret.as_bytes())),
            events,
        }
    }
}
