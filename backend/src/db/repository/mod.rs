//! Repository trait definitions for storage operations.
//!
//! Responsibilities are split across focused traits:
//!
//! - [`SampleRepository`]: upload batches and the samples they produced
//! - [`AlertRepository`]: alert configuration and dispatch history
//!
//! # Convenience Trait Bound
//!
//! Services that need every capability use the [`FullRepository`] bound:
//!
//! ```ignore
//! async fn my_service<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<()> {
//!     let samples = repo.list_samples().await?;
//!     let config = repo.get_alert_config().await?;
//!     Ok(())
//! }
//! ```

pub mod alerts;
pub mod error;
pub mod samples;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

pub use alerts::AlertRepository;
pub use samples::{PoolStats, SampleRepository};

/// Composite trait bound for a complete repository implementation.
///
/// Automatically implemented for any type implementing both repository traits.
pub trait FullRepository: SampleRepository + AlertRepository {}

impl<T> FullRepository for T where T: SampleRepository + AlertRepository {}
