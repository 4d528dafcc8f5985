//! Blueprint parsing and resolution (§4.2): `.bp` documents, companion
//! docker-compose descriptors, and the default/custom source-dir resolver.

pub mod compose;
pub mod error;
pub mod parse;
pub mod resolver;

pub use compose::parse_compose_ports;
pub use error::BlueprintError;
pub use kgsm_core::blueprint::{Blueprint, Runtime};
pub use parse::parse_bp_document;
pub use resolver::BlueprintResolver;
