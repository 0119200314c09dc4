//! API client boundary for the VitalStack backend.
//!
//! # Overview
//! Resolves the backend base URL from the runtime environment
//! (`PUBLIC_API_URL`) and exposes a typed request surface generic over an
//! endpoint contract. One `ApiClient` is built at start-up and shared by every
//! page loader that needs backend data.
//!
//! # Design
//! - The base URL is an explicit input read at process start, never a
//!   compile-time constant. Empty means relative requests through a proxy.
//! - Routes are types implementing [`Operation`]; the client never hard-codes
//!   a path. [`nutrition`] holds the backend's current contract.
//! - Every call is `build_request` (pure) → [`Transport`] → `parse_response`
//!   (pure), so contract violations fail before I/O and hosts can drive the
//!   pure halves with their own HTTP stack.
//! - Errors separate contract violations, transport failures, non-2xx
//!   statuses and shape mismatches. Nothing is retried.
//!
//! ```rust,no_run
//! use vital_core::nutrition::{ScanFood, ScanInput};
//! use vital_core::{ApiClient, ClientConfig};
//!
//! # async fn load() -> Result<(), vital_core::ApiError> {
//! let client = ApiClient::from_config(&ClientConfig::from_env());
//! let scan = client
//!     .request::<ScanFood>(None, Some(&ScanInput::new("aGVsbG8=")))
//!     .await?;
//! println!("{} ({} kcal)", scan.food_name, scan.macros.calories);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod contract;
pub mod error;
pub mod http;
pub mod nutrition;
pub mod transport;

pub use client::{create_api_client, ApiClient, REQUEST_ID_HEADER};
pub use config::{resolve_base_url, resolve_base_url_with, ClientConfig, API_URL_VAR};
pub use contract::Operation;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{ReqwestTransport, Transport};
