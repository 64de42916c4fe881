//! Asset services: uploads, retrieval, and administration.

pub mod service;
pub mod upload;

pub use service::{AssetContent, AssetService};
pub use upload::{UploadOutcome, UploadPipeline, UploadRequest, asset_url};
