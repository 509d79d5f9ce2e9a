//! HTTP handlers
//!
//! - `POST /albums` - upload an album (multipart)
//! - `GET /albums/{album_id}` - album metadata
//! - `POST /review/{likeornot}/{album_id}` - dispatch a review event
//! - `GET /review/{album_id}` - like/dislike counts
//! - `POST /admin/reset` - clear all data
//! - `GET /health` - liveness probe

mod admin;
mod album;
mod health;
mod review;

pub use admin::admin_reset;
pub use album::{create_album, get_album};
pub use health::health;
pub use review::{get_review_stats, post_review};
