// ordinal-api: Async Rust client for the router console's rule collection API

pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use client::ConsoleClient;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
