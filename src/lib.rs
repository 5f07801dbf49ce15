//! Typed async client for knowledge-base dataset endpoints
//!
//! Every dataset operation (listing, creation from inline documents, web
//! pages, Lark folders or QA files, updates, hit tests, re-embedding, exports)
//! is a builder method on [`DatasetClient`]. Each call issues exactly one
//! request and resolves to an [`ApiResponse`]: failures the server reports
//! come back as [`ApiResponse::Failure`], while transport faults are [`Error`]s.
//!
//! ```no_run
//! use dataset_client::{DatasetClient, LoadingFlag, PageRequest};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = DatasetClient::builder()
//!     .base_url("http://127.0.0.1:8080/api")
//!     .build()?;
//!
//! let loading = LoadingFlag::new();
//! let page = client
//!     .list_datasets()
//!     .page(PageRequest::new(1, 20))
//!     .loading(loading.clone())
//!     .call()
//!     .await?
//!     .into_result()?;
//!
//! println!("{} datasets", page.total);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod datasets;
pub mod error;
pub mod export;
pub mod lark;
pub mod loading;
pub mod models;
pub mod response;
pub mod security;
pub mod transport;

pub use client::DatasetClient;
pub use error::{Error, Result};
pub use export::{ExportFormat, ExportedFile};
pub use loading::{Loading, LoadingFlag, LoadingObserver};
pub use models::*;
pub use response::{ApiFailure, ApiResponse};
pub use security::SecretString;
