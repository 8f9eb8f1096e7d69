//! Typed ID definitions for all domain entities.
//!
//! ```rust
//! use blockly_core::common::{CommentId, ParcelId};
//!
//! let parcel_id = ParcelId::from_i64(1);
//! let comment_id = CommentId::from_i64(1);
//! // let wrong: CommentId = parcel_id; // compile error
//! # let _ = (parcel_id, comment_id);
//! ```

pub use super::id::Id;

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for Parcel entities (mapped vacant lots).
pub struct Parcel;

/// Marker type for Comment entities (resident feedback).
pub struct Comment;

/// Marker type for comment authors. Accounts live outside this service.
pub struct Author;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

/// Typed ID for Parcel entities.
pub type ParcelId = Id<Parcel>;

/// Typed ID for Comment entities.
pub type CommentId = Id<Comment>;

/// Typed ID for comment authors.
pub type AuthorId = Id<Author>;
