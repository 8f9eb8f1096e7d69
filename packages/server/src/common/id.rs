//! Typed integer ids for compile-time type safety.
//!
//! `Id<T>` wraps the `BIGINT` primary key of a table and prevents accidentally
//! passing a `CommentId` where a `ParcelId` was expected.
//!
//! # Example
//!
//! ```rust
//! use blockly_core::common::id::Id;
//!
//! pub struct Parcel;
//! pub struct Comment;
//!
//! let parcel_id: Id<Parcel> = Id::from_i64(7);
//! let comment_id: Id<Comment> = Id::from_i64(7);
//!
//! assert_eq!(parcel_id.as_i64(), comment_id.as_i64());
//! // let wrong: Id<Comment> = parcel_id; // compile error
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt::{self, Debug, Display};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::str::FromStr;
use thiserror::Error;

/// Rejection reasons when parsing an id from user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdParseError {
    #[error("id must be an integer, got {0:?}")]
    NotAnInteger(String),

    #[error("id must be positive, got {0}")]
    NotPositive(i64),
}

/// A typed wrapper around an `i64` primary key.
#[repr(transparent)]
pub struct Id<T>(i64, PhantomData<fn() -> T>);

// ============================================================================
// Core implementations
// ============================================================================

impl<T> Id<T> {
    /// Wraps a raw key loaded from the database.
    #[inline]
    pub const fn from_i64(value: i64) -> Self {
        Self(value, PhantomData)
    }

    /// Returns the raw key.
    #[inline]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }

    /// Parses an id from request input.
    ///
    /// Database keys start at 1, so zero and negative values are malformed.
    pub fn parse(s: &str) -> Result<Self, IdParseError> {
        let value: i64 = s
            .trim()
            .parse()
            .map_err(|_| IdParseError::NotAnInteger(s.to_string()))?;
        Self::checked(value)
    }

    /// Validates an already-numeric id (e.g. from a JSON body).
    pub fn checked(value: i64) -> Result<Self, IdParseError> {
        if value <= 0 {
            return Err(IdParseError::NotPositive(value));
        }
        Ok(Self::from_i64(value))
    }
}

// ============================================================================
// Standard trait implementations
// ============================================================================

impl<T> Clone for Id<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Id<T> {}

impl<T> Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple(&format!("Id<{}>", std::any::type_name::<T>()))
            .field(&self.0)
            .finish()
    }
}

impl<T> Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl<T> PartialEq for Id<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T> Eq for Id<T> {}

impl<T> PartialOrd for Id<T> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Id<T> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl<T> Hash for Id<T> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl<T> From<Id<T>> for i64 {
    #[inline]
    fn from(id: Id<T>) -> Self {
        id.0
    }
}

impl<T> FromStr for Id<T> {
    type Err = IdParseError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ============================================================================
// Serde support
// ============================================================================

impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        i64::deserialize(deserializer).map(Self::from_i64)
    }
}

// ============================================================================
// sqlx support
// ============================================================================

use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::postgres::{PgArgumentBuffer, PgHasArrayType, PgTypeInfo, PgValueRef, Postgres};
use sqlx::{Decode, Encode, Type};

impl<T> Type<Postgres> for Id<T> {
    fn type_info() -> PgTypeInfo {
        <i64 as Type<Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <i64 as Type<Postgres>>::compatible(ty)
    }
}

impl<T> PgHasArrayType for Id<T> {
    fn array_type_info() -> PgTypeInfo {
        <i64 as PgHasArrayType>::array_type_info()
    }
}

impl<T> Encode<'_, Postgres> for Id<T> {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> Result<IsNull, BoxDynError> {
        <i64 as Encode<Postgres>>::encode_by_ref(&self.0, buf)
    }
}

impl<T> Decode<'_, Postgres> for Id<T> {
    fn decode(value: PgValueRef<'_>) -> Result<Self, BoxDynError> {
        <i64 as Decode<Postgres>>::decode(value).map(Self::from_i64)
    }
}
