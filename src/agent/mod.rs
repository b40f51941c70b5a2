pub mod http;
pub mod normalize;
pub mod types;

use anyhow::Result;
use futures::stream::BoxStream;

use self::types::{AgentState, ChatPayload};

/// Capability handed to the relay loop: invoking the externally hosted
/// agent yields a finite, ordered stream of intermediate states. The relay
/// polls states one at a time, so rendering of state N happens before state
/// N+1 is even requested.
pub trait Agent {
    fn stream(&self, payload: ChatPayload) -> BoxStream<'_, Result<AgentState>>;
}
