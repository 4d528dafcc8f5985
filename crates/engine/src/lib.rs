//! kgsm-engine: orchestration on top of `kgsm-core`'s data model,
//! `kgsm-config`'s document store, `kgsm-blueprint`'s resolver, and
//! `kgsm-adapters`' host I/O. This is where the instance lifecycle (§4.3),
//! integration management (§4.4), backups (§4.5), events (§4.6), updates
//! (§4.7), the instance registry (§4.8), and the readiness watcher (§4.9)
//! live.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod backup;
pub mod context;
pub mod error;
pub mod events;
pub mod instance_doc;
pub mod integrations;
pub mod orchestrator;
pub mod registry;
pub mod watcher;

pub use context::Context;
pub use error::EngineError;
pub use integrations::IntegrationManager;
pub use orchestrator::{Integration, ModifyAction, Orchestrator, RealOrchestrator, UpdateOutcome};
pub use registry::{InstanceDescription, InstanceRegistry, InstanceStatus};
