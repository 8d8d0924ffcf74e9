//! Core adaptation pipeline for the fragrelay proxy.
//!
//! Everything in this crate is pure request-scoped logic: normalizing
//! client conversations into the fragment service's message shape,
//! clamping generation parameters against per-model limits, assembling
//! the upstream envelope, and planning the chunk layout used to emulate
//! a token stream from an already-complete answer.
//!
//! No HTTP, no I/O. The axum adapter crate owns transport concerns.

#![deny(unused_crate_dependencies)]

pub mod envelope;
pub mod ids;
pub mod message;
pub mod params;
pub mod registry;
pub mod stream;

// Re-export commonly used types for convenience
pub use envelope::{FragmentRequest, ModelRef, TemplateDescriptor, build_request};
pub use ids::new_id;
pub use message::{ChatTurn, ContentPart, MessageContent, Role, extract_text, normalize};
pub use params::{ConstrainedParams, GenerationParams, constrain};
pub use registry::{ModelRegistry, ModelSpec, ParamLimits};
pub use stream::{ChunkPolicy, chunk_plan};
