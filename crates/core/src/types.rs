//! Type-safe wrappers for domain identifiers
//!
//! These newtypes prevent mixing different ID types at compile time.
//! For example, you cannot pass a UserId where a ClubId is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Club (tenant) identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct ClubId(pub Uuid);

impl ClubId {
    /// Create a new, roughly time-ordered club ID
    pub fn new() -> Self {
        ClubId(Uuid::now_v7())
    }
}

impl Default for ClubId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClubId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for ClubId {
    fn from(id: Uuid) -> Self {
        ClubId(id)
    }
}

impl From<ClubId> for Uuid {
    fn from(id: ClubId) -> Self {
        id.0
    }
}

/// User identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Create a new, roughly time-ordered user ID
    pub fn new() -> Self {
        UserId(Uuid::now_v7())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for UserId {
    fn from(id: Uuid) -> Self {
        UserId(id)
    }
}

impl From<UserId> for Uuid {
    fn from(id: UserId) -> Self {
        id.0
    }
}

/// Boat (rowing shell) identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct BoatId(pub Uuid);

impl BoatId {
    /// Create a new, roughly time-ordered boat ID
    pub fn new() -> Self {
        BoatId(Uuid::now_v7())
    }
}

impl Default for BoatId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BoatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for BoatId {
    fn from(id: Uuid) -> Self {
        BoatId(id)
    }
}

impl From<BoatId> for Uuid {
    fn from(id: BoatId) -> Self {
        id.0
    }
}

/// Booking identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct BookingId(pub Uuid);

impl BookingId {
    /// Create a new, roughly time-ordered booking ID
    pub fn new() -> Self {
        BookingId(Uuid::now_v7())
    }
}

impl Default for BookingId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for BookingId {
    fn from(id: Uuid) -> Self {
        BookingId(id)
    }
}

impl From<BookingId> for Uuid {
    fn from(id: BookingId) -> Self {
        id.0
    }
}

/// Scrape job identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct ScrapeJobId(pub Uuid);

impl ScrapeJobId {
    /// Create a new, roughly time-ordered scrape job ID
    pub fn new() -> Self {
        ScrapeJobId(Uuid::now_v7())
    }
}

impl Default for ScrapeJobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ScrapeJobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for ScrapeJobId {
    fn from(id: Uuid) -> Self {
        ScrapeJobId(id)
    }
}

impl From<ScrapeJobId> for Uuid {
    fn from(id: ScrapeJobId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_club_id_creation() {
        let id1 = ClubId::new();
        let id2 = ClubId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_user_id_from_uuid() {
        let uuid = Uuid::now_v7();
        let user_id = UserId::from(uuid);
        assert_eq!(Uuid::from(user_id), uuid);
    }

    #[test]
    fn test_boat_id_display() {
        let id = BoatId::new();
        let display = format!("{}", id);
        assert!(!display.is_empty());
    }

    #[test]
    fn test_booking_id_serialization() {
        let id = BookingId::new();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: BookingId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }

    #[test]
    fn test_scrape_job_id_creation() {
        let id1 = ScrapeJobId::new();
        let id2 = ScrapeJobId::new();
        assert_ne!(id1, id2);
    }
}
