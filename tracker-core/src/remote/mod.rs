//! Talking to calendar providers.

pub mod protocol;
pub mod provider;
pub mod transport;

pub use provider::{Provider, ProviderTransport};
pub use transport::{CalendarTransport, TransportError};
