//! Remote delivery to Elasticsearch.
//!
//! # Data Flow
//! ```text
//! LogRecord
//!     → serialization (document with @timestamp / message / level)
//!     → DeliveryHook (RetryManager: attempts, backoff, deadline)
//!     → IndexTransport (ElasticsearchClient, blocking reqwest)
//!     → POST <url>/<index>/_doc?refresh=true
//! ```

pub mod blocking;
pub mod client;
pub mod hook;
pub mod serialization;

pub use client::{
    ClientConfig, ClientError, ElasticsearchClient, IndexResponse, IndexTransport, TransportError,
};
pub use hook::DeliveryHook;
