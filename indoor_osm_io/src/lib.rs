//! Reads the OSM XML 0.6 indoor-mapping dialect into `indoor_paths` domain types, and writes its
//! generated `Way`/`NavGraph` output back out in the same dialect. No geometry or graph synthesis
//! lives here — that's `indoor_paths`; this crate is purely the I/O boundary.

pub mod error;
pub mod extract;
pub mod merge;
pub mod osm_reader;
pub mod writer;

pub use error::IngestError;
pub use extract::{extract, ExtractResult};
pub use merge::merge_document;
pub use osm_reader::{Bounds, Document};
pub use writer::{write_document, write_routes, IdAllocator, PrettyPrint};
