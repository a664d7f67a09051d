//! # scholarsearch
//!
//! Fetch publications by author from the ScholarSearch service, then filter,
//! sort, paginate and export them.
//!
//! ## Modules
//!
//! - [`client`] - Publication service HTTP client
//! - [`coordinator`] - Runs a fetch against a shared session
//! - [`session`] - Result set, criteria and loading state
//! - [`pipeline`] - Filter → sort → paginate
//! - [`export`] - Excel, BibTeX and Word documents
//! - [`import`] - Author lists from spreadsheets
//! - [`server`] - HTTP API over one session
//! - [`config`] - Service URL and API key
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use scholarsearch::{config::ClientConfig, client::PublicationClient, coordinator::FetchCoordinator};
//! use scholarsearch::session::SearchSession;
//! use tokio::sync::RwLock;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ClientConfig { api_key: "key".into(), ..Default::default() };
//!     let coordinator = FetchCoordinator::new(PublicationClient::new(&config)?);
//!     let session = RwLock::new(SearchSession::new());
//!     coordinator.fetch(&session, "Yann LeCun, Andrew Ng").await?;
//!     println!("Found {} publications", session.read().await.view().total_count);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod export;
pub mod import;
pub mod models;
pub mod pipeline;
pub mod server;
pub mod session;

pub use error::{Result, ScholarSearchError};
