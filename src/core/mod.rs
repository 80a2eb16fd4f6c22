//! Core logic - framework-agnostic gate decisions, settings, documents and
//! rendering.

/// Callers, roles and capabilities
pub mod access;
/// Content filter pipeline for document bodies
pub mod content;
/// Landing document store
pub mod documents;
/// Request interception decisions
pub mod gate;
/// First-run activation
pub mod lifecycle;
/// Landing page, fallback page and settings form rendering
pub mod render;
/// Persisted settings and form coercion
pub mod settings;
