mod fetcher;
mod naming;

pub use fetcher::{DownloadError, ensure_artifact};
pub use naming::{ArtifactNaming, filename};
