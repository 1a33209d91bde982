//! Utilities for testing `pubprobe` against in-memory pub/sub clients.
//!
//! [`MemoryClient`] behaves like a small publish/history/time service and
//! [`ScriptedClient`] replays exact delivery sequences, including keep-alive
//! sentinels, error payloads, and silent closures. [`logger`] captures the
//! log records emitted by verdicts and suite banners.

pub mod cipher;
pub mod logging;
pub mod memory_client;
pub mod scripted;

pub use cipher::{XorCipher, decode_envelope};
pub use logging::{LoggerHandle, logger};
pub use memory_client::{DEFAULT_MAX_MESSAGE_BYTES, INITIAL_TIMETOKEN, MemoryClient, StoredMessage};
pub use scripted::{Script, ScriptedClient, Step};
