//! # EVE Online XML API Client
//!
//! An async Rust client core for the EVE Online XML API.
//!
//! Every call runs through one pipeline: the call is fingerprinted, the raw
//! XML is fetched (from the API with retries, or from a local file), server
//! reported errors are translated into typed errors, the raw text is
//! optionally saved to disk, and `<rowset><row/></rowset>` data is mapped
//! into typed records.
//!
//! ## Features
//!
//! - **Fingerprints**: Deterministic call identity for caching, computable without I/O
//! - **Retries**: Transport failures are retried with a fixed delay
//! - **Typed errors**: Every documented API error code maps to an [`ApiErrorKind`]
//! - **Row mapping**: Implement [`FromRow`] to map rows, nested rowsets included
//! - **Persistence**: Raw responses can be saved under their expiry time
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use eveapi_xml::{Credentials, EveApiClient, RequestParams};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = EveApiClient::new(Credentials::key(12345, "verification_code"))?;
//!
//!     // Compute the fingerprint of a call without making it
//!     let output = client.characters(RequestParams::new().just_hash()).await?;
//!     println!("Fingerprint: {:?}", output.fingerprint());
//!
//!     // Make the call
//!     if let Some(result) = client.characters(RequestParams::new()).await?.into_data() {
//!         for character in result.value {
//!             println!("{} ({})", character.name, character.id);
//!         }
//!         println!("Cached until: {:?}", result.cached_until);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod endpoints;
pub mod error;
pub mod fetch;
pub mod fingerprint;
pub mod params;
pub mod persist;
pub mod response;
pub mod rows;
pub mod types;
pub mod xml;

pub use client::{CallResult, EveApiClient, EveApiClientConfig, LastCall, Query, QueryOutput};
pub use error::{ApiError, ApiErrorKind, ErrorCategory, EveApiError, Result};
pub use fetch::Source;
pub use params::{AuthMode, Credentials, RequestParams};
pub use response::Response;
pub use rows::{FromRow, Row, RowSelector};
pub use types::{
    Alliance, Asset, Character, CharacterMedal, CharacterMedals, ErrorDefinition,
    MemberCorporation, ServerStatus,
};

/// Re-export commonly used types from chrono for convenience
pub use chrono::{DateTime, Utc};

/// The default base URL for the EVE XML API
pub const DEFAULT_BASE_URL: &str = "https://api.eveonline.com";

/// Default user agent string for requests
pub const DEFAULT_USER_AGENT: &str = concat!("eveapi-xml-rs/", env!("CARGO_PKG_VERSION"));
