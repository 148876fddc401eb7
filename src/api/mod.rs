//! API module - HTTP transport, client, query cache integration, endpoints

pub mod auth;
pub mod client;
pub mod envelope;
pub mod error;
pub mod multipart;
pub mod query;
pub mod resources;
pub mod transport;

pub use client::ApiClient;
pub use envelope::{Page, PageMeta};
pub use error::{ApiError, StepError};
pub use multipart::{FileUpload, FormBody};
pub use query::QueryClient;
pub use transport::{HttpRequest, HttpResponse, Method, ReqwestTransport, Transport};
