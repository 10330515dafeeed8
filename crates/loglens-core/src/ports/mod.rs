//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces the streaming engine expects from its
//! surroundings: where events go, where platform tools live and which
//! devices exist. They use only domain types.

pub mod device_enumerator;
pub mod event_emitter;
pub mod tool_resolver;

pub use device_enumerator::DeviceEnumerator;
pub use event_emitter::{ChannelEmitter, NoopEmitter, StreamEventEmitter};
pub use tool_resolver::{StaticToolResolver, ToolError, ToolResolver};
