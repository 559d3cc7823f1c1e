//! HTTP client for the CorpCrunch API.

pub mod error;
pub mod http_client;
pub mod models;

pub use error::CorpCrunchClientError;
pub use http_client::HttpClient;
