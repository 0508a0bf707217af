//! Cache tags attached to query results and referenced by mutations

use serde_json::Value;
use std::fmt;

/// Kind of resource a tag refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TagKind {
    User,
    Rider,
    RidersStats,
    Driver,
    DriverStats,
    Reservation,
    ReservationsStats,
    /// Drivers offered for assignment to a reservation
    AvailableDriver,
    Feedback,
    DashboardStats,
    Waitlist,
}

impl TagKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TagKind::User => "User",
            TagKind::Rider => "Rider",
            TagKind::RidersStats => "RidersStats",
            TagKind::Driver => "Driver",
            TagKind::DriverStats => "DriverStats",
            TagKind::Reservation => "Reservation",
            TagKind::ReservationsStats => "ReservationsStats",
            TagKind::AvailableDriver => "AvailableDriver",
            TagKind::Feedback => "Feedback",
            TagKind::DashboardStats => "DashboardStats",
            TagKind::Waitlist => "Waitlist",
        }
    }
}

/// Identifier half of a tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TagId {
    /// Any filtered or unfiltered collection of the kind
    List,
    /// One concrete entity
    Key(String),
}

/// `(kind, id)` pair; a tag without id addresses the whole kind
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag {
    pub kind: TagKind,
    pub id: Option<TagId>,
}

impl Tag {
    /// Tag covering every cached result of `kind`
    pub fn kind(kind: TagKind) -> Self {
        Self { kind, id: None }
    }

    /// Collection tag for `kind`
    pub fn list(kind: TagKind) -> Self {
        Self {
            kind,
            id: Some(TagId::List),
        }
    }

    /// Tag for one entity of `kind`
    pub fn item(kind: TagKind, id: impl ToString) -> Self {
        Self {
            kind,
            id: Some(TagId::Key(id.to_string())),
        }
    }

    /// Item tag for an id read out of a JSON payload
    ///
    /// Numeric and string ids produce the same key (`7` and `"7"`).
    pub fn item_from_json(kind: TagKind, id: &Value) -> Option<Self> {
        match id {
            Value::String(s) => Some(Self::item(kind, s)),
            Value::Number(n) => Some(Self::item(kind, n)),
            _ => None,
        }
    }

    /// Whether invalidating `self` hits a result that provided `provided`
    pub fn matches(&self, provided: &Tag) -> bool {
        if self.kind != provided.kind {
            return false;
        }
        match &self.id {
            None => true,
            Some(id) => provided.id.as_ref() == Some(id),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            None => write!(f, "{}", self.kind.as_str()),
            Some(TagId::List) => write!(f, "{}:LIST", self.kind.as_str()),
            Some(TagId::Key(key)) => write!(f, "{}:{}", self.kind.as_str(), key),
        }
    }
}
