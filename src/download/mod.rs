//! Download catalog and recommended download selection.
//!
//! The catalog is static data compiled into the site. Detection results pick
//! one architecture variant per visitor, falling back deterministically when
//! the detected architecture has no build.

mod catalog;
mod panel;
mod recommend;

pub use catalog::{
    ArchitectureVariant, ArtifactKind, DownloadArtifact, DownloadCatalog, OperatingSystemEntry,
    RELEASE_NOTES_URL,
};
pub use panel::{DownloadPanel, FALLBACK_VERSION};
pub use recommend::{DetectionResult, Recommendation, build_recommendation};
