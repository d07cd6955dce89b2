pub mod alignment;
pub mod archive;
pub mod band_selection;
pub mod cache_key;
pub mod constants;
pub mod conversion;
pub mod eligibility;
pub mod frame;
pub mod parameters;
pub mod pipeline;
pub mod remote_fetcher;
pub mod request;
pub mod settings;
pub mod storage;
pub mod temp_artifacts;
pub mod thumbnail_errors;

pub use pipeline::ThumbnailPipeline;
pub use request::{ThumbnailRequest, ThumbnailResponse};
pub use thumbnail_errors::ThumbnailError;
