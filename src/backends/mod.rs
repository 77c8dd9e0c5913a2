//! External collaborator backends.
//!
//! Each backend is a narrow trait with one network-backed implementation.
//! Workers depend only on the traits, so tests and alternative deployments
//! can swap implementations without touching orchestration code.

pub mod archive;
pub mod geo;
pub mod websearch;

pub use archive::{ArchiveStore, HttpArchiveStore, NullArchive};
pub use geo::{Hotspot, HotspotService, HttpHotspotService};
pub use websearch::{DaedraSearch, SearchHit, WebSearch};
