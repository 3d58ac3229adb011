#![warn(
    unused,
    clippy::cognitive_complexity,
    unused_extern_crates,
    clippy::unused_self,
    clippy::useless_let_if_seq,
    missing_debug_implementations,
    rust_2018_idioms
)]
#![allow(clippy::type_complexity)]

//! # Mandi-Data
//! Typed access to the vegetable price-data API used by the Mandi client.
//!
//! * **QueryBuilder**: pure functions in [`query`] turn the current [`Filters`](query::Filters)
//!   into a [`RequestDescriptor`](query::RequestDescriptor).
//! * **DataGateway**: [`DataGateway`](gateway::DataGateway) executes descriptors over a
//!   [`Transport`](transport::Transport), normalises paginated and bare response shapes and
//!   surfaces every failure as a typed [`GatewayError`](error::GatewayError).
//! * **Models**: serde types for every payload the API produces or accepts.

/// API base URL configuration.
pub mod config;

/// All errors generated in `mandi-data`.
pub mod error;

/// [`DataGateway`](gateway::DataGateway) that executes request descriptors and decodes typed
/// results.
pub mod gateway;

/// Serde models for every payload exchanged with the price-data API.
pub mod model;

/// Response-shape normalisation and server error message extraction.
pub mod normalize;

/// Pure request builders (the QueryBuilder) plus the [`Filters`](query::Filters) they consume.
pub mod query;

/// HTTP seam: the [`Transport`](transport::Transport) trait and its reqwest implementation.
pub mod transport;

pub use config::ApiConfig;
pub use error::{GatewayError, ValidationError};
pub use gateway::DataGateway;
pub use query::{Filters, PredictionDays, RequestDescriptor, SortOrder, SubmissionForm};
pub use transport::{HttpTransport, RawResponse, Transport};
