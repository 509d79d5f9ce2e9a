//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Dispatch model
//! - A `ReviewEvent` is built by the request layer and handed to a `ReviewPublisher`
//! - The publisher returns a `PendingDispatch` that resolves to exactly one `DispatchOutcome`
//! - Storage of albums and review counts sits behind `AlbumStore`

mod album;
mod config;
mod dispatch;
mod error;
mod review;
mod store;

pub use album::*;
pub use config::*;
pub use dispatch::*;
pub use error::*;
pub use review::*;
pub use store::*;
