//! # Data Loader Crate
//!
//! Domain types and data access for the repository recommender.
//!
//! ## Main Components
//!
//! - **types**: Users, repositories, swipe interactions and the in-memory [`InteractionIndex`]
//! - **parser**: Parse the `::`-separated `.dat` files
//! - **index**: Load and validate a dataset directory
//! - **store**: The [`InteractionStore`] trait the recommender reads through
//! - **error**: Error types for loading and store queries
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{InteractionIndex, InteractionStore};
//! use std::path::Path;
//!
//! let index = InteractionIndex::load_from_files(Path::new("data/branchout"))?;
//! let rejected = index.get_rejected_items("42")?;
//! ```

pub mod error;
pub mod types;
pub mod parser;
pub mod index;
pub mod store;

pub use error::{DataLoadError, Result, StoreError, StoreResult};
pub use store::InteractionStore;
pub use types::{
    // Type aliases
    UserId,
    RepoId,
    // Core types
    User,
    Repository,
    Interaction,
    InteractionIndex,
    // Enums
    Signal,
};
