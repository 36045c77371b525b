//! Request credit counter type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A non-negative count of remaining enhancement requests.
///
/// New accounts start with [`Credits::INITIAL_GRANT`]. The counter only ever
/// moves down, one request at a time, and never below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credits(i32);

impl Credits {
    /// Credits granted to every new account, regardless of entry path.
    pub const INITIAL_GRANT: Self = Self(10);

    /// Zero remaining credits.
    pub const ZERO: Self = Self(0);

    /// Create a credit count, clamping negative inputs to zero.
    #[must_use]
    pub const fn new(count: i32) -> Self {
        if count < 0 { Self(0) } else { Self(count) }
    }

    /// Get the underlying count.
    #[must_use]
    pub const fn as_i32(&self) -> i32 {
        self.0
    }

    /// Whether no credits remain.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.0 == 0
    }

    /// One credit fewer, saturating at zero.
    #[must_use]
    pub const fn consumed(self) -> Self {
        if self.0 == 0 { self } else { Self(self.0 - 1) }
    }
}

impl Default for Credits {
    fn default() -> Self {
        Self::INITIAL_GRANT
    }
}

impl fmt::Display for Credits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for Credits {
    fn from(count: i32) -> Self {
        Self::new(count)
    }
}

impl From<Credits> for i32 {
    fn from(credits: Credits) -> Self {
        credits.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Credits {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i32 as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <i32 as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Credits {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let count = <i32 as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::new(count))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Credits {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i32 as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_clamped_to_zero() {
        assert_eq!(Credits::new(-3), Credits::ZERO);
    }

    #[test]
    fn test_consumed_decrements() {
        assert_eq!(Credits::new(2).consumed(), Credits::new(1));
    }

    #[test]
    fn test_consumed_saturates_at_zero() {
        assert_eq!(Credits::ZERO.consumed(), Credits::ZERO);
        assert!(Credits::ZERO.is_exhausted());
    }

    #[test]
    fn test_initial_grant() {
        assert_eq!(Credits::default(), Credits::INITIAL_GRANT);
        assert_eq!(Credits::INITIAL_GRANT.as_i32(), 10);
    }
}
