pub mod error;
pub mod udp_client;

pub use error::{FetchError, TransportError};
pub use udp_client::OpenIrisClient;
