//! Application layer for testplan.
//!
//! Use cases here sequence the source traits from `testplan-core` into one
//! composed issue context. Only the primary issue read may fail the request.

pub mod context_usecase;
pub mod development_activity;
pub mod relationship_resolver;

pub use context_usecase::IssueContextUseCase;
pub use development_activity::DevelopmentActivityResolver;
pub use relationship_resolver::RelationshipResolver;
