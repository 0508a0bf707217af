//! Declarative tag graph: which tags each query provides and which tags
//! each mutation invalidates.
//!
//! Both tables are plain functions over endpoint values, so the whole
//! invalidation policy can be checked without a server or a cache.

use serde_json::Value;
use std::collections::BTreeSet;

use super::key::QueryKey;
use super::tags::{Tag, TagKind};

/// Every read operation exposed by the domain clients
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryEndpoint {
    GetProfile,
    GetRiders,
    GetRiderById(i64),
    GetRidersStats,
    GetDrivers,
    GetDriverStats,
    GetReservations,
    GetReservationById(String),
    GetReservationsStats,
    GetNearbyDrivers,
    GetAvailableDrivers,
    GetDashboardStats,
    GetAllFeedbacks,
    GetWaitlist,
}

impl QueryEndpoint {
    pub fn name(&self) -> &'static str {
        match self {
            QueryEndpoint::GetProfile => "getProfile",
            QueryEndpoint::GetRiders => "getRiders",
            QueryEndpoint::GetRiderById(_) => "getRiderById",
            QueryEndpoint::GetRidersStats => "getRidersStats",
            QueryEndpoint::GetDrivers => "getDrivers",
            QueryEndpoint::GetDriverStats => "getDriverStats",
            QueryEndpoint::GetReservations => "getReservations",
            QueryEndpoint::GetReservationById(_) => "getReservationById",
            QueryEndpoint::GetReservationsStats => "getReservationsStats",
            QueryEndpoint::GetNearbyDrivers => "getNearbyDrivers",
            QueryEndpoint::GetAvailableDrivers => "getAvailableDrivers",
            QueryEndpoint::GetDashboardStats => "getDashboardStats",
            QueryEndpoint::GetAllFeedbacks => "getAllFeedbacks",
            QueryEndpoint::GetWaitlist => "getWaitlist",
        }
    }

    /// Tags attached to a result; `None` when the request failed
    pub fn provides(&self, result: Option<&Value>) -> Vec<Tag> {
        match self {
            QueryEndpoint::GetProfile => vec![Tag::kind(TagKind::User)],
            QueryEndpoint::GetRiders => {
                let mut tags = list_tags(TagKind::Rider, result, "/riders");
                tags.push(Tag::kind(TagKind::RidersStats));
                tags
            }
            QueryEndpoint::GetRiderById(id) => vec![Tag::item(TagKind::Rider, id)],
            QueryEndpoint::GetRidersStats => vec![Tag::kind(TagKind::RidersStats)],
            QueryEndpoint::GetDrivers => list_tags(TagKind::Driver, result, "/data"),
            QueryEndpoint::GetDriverStats => vec![Tag::kind(TagKind::DriverStats)],
            QueryEndpoint::GetReservations => {
                let mut tags = list_tags(TagKind::Reservation, result, "/reservations");
                tags.push(Tag::kind(TagKind::ReservationsStats));
                tags
            }
            QueryEndpoint::GetReservationById(id) => vec![Tag::item(TagKind::Reservation, id)],
            QueryEndpoint::GetReservationsStats => vec![Tag::kind(TagKind::ReservationsStats)],
            QueryEndpoint::GetNearbyDrivers | QueryEndpoint::GetAvailableDrivers => {
                vec![Tag::kind(TagKind::AvailableDriver)]
            }
            QueryEndpoint::GetDashboardStats => vec![Tag::list(TagKind::DashboardStats)],
            QueryEndpoint::GetAllFeedbacks => list_tags(TagKind::Feedback, result, "/data"),
            QueryEndpoint::GetWaitlist => list_tags(TagKind::Waitlist, result, ""),
        }
    }
}

// One tag per returned item plus the LIST tag. A failed list still
// provides LIST so the next write retries it.
fn list_tags(kind: TagKind, result: Option<&Value>, items_pointer: &str) -> Vec<Tag> {
    let mut tags: Vec<Tag> = result
        .and_then(|value| value.pointer(items_pointer))
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.get("id"))
                .filter_map(|id| Tag::item_from_json(kind, id))
                .collect()
        })
        .unwrap_or_default();
    tags.push(Tag::list(kind));
    tags
}

/// Every write operation exposed by the domain clients
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationEndpoint {
    Login,
    Logout,
    RefreshToken,
    UpdateProfile,
    CreateRider,
    UpdateRider(i64),
    DeleteRider(i64),
    SuspendRider(i64),
    ActivateRider(i64),
    StartBackgroundCheck(i64),
    ApproveDriver(i64),
    RejectDriver(i64),
    CreateReservation,
    UpdateReservation(String),
    DeleteReservation(String),
    CancelReservation(String),
    ConfirmReservation(String),
    AssignDriver(String),
    AddFeedback,
    ReplyToFeedback(String),
    UpdateWaitlistRecord(i64),
    DeleteWaitlistRecord(i64),
}

impl MutationEndpoint {
    pub fn name(&self) -> &'static str {
        match self {
            MutationEndpoint::Login => "login",
            MutationEndpoint::Logout => "logout",
            MutationEndpoint::RefreshToken => "refreshToken",
            MutationEndpoint::UpdateProfile => "updateProfile",
            MutationEndpoint::CreateRider => "createRider",
            MutationEndpoint::UpdateRider(_) => "updateRider",
            MutationEndpoint::DeleteRider(_) => "deleteRider",
            MutationEndpoint::SuspendRider(_) => "suspendRider",
            MutationEndpoint::ActivateRider(_) => "activateRider",
            MutationEndpoint::StartBackgroundCheck(_) => "startBackgroundCheck",
            MutationEndpoint::ApproveDriver(_) => "approveDriver",
            MutationEndpoint::RejectDriver(_) => "rejectDriver",
            MutationEndpoint::CreateReservation => "createReservation",
            MutationEndpoint::UpdateReservation(_) => "updateReservation",
            MutationEndpoint::DeleteReservation(_) => "deleteReservation",
            MutationEndpoint::CancelReservation(_) => "cancelReservation",
            MutationEndpoint::ConfirmReservation(_) => "confirmReservation",
            MutationEndpoint::AssignDriver(_) => "assignDriver",
            MutationEndpoint::AddFeedback => "addFeedback",
            MutationEndpoint::ReplyToFeedback(_) => "replyToFeedback",
            MutationEndpoint::UpdateWaitlistRecord(_) => "updateWaitlistRecord",
            MutationEndpoint::DeleteWaitlistRecord(_) => "deleteWaitlistRecord",
        }
    }

    /// Tags to invalidate once the mutation succeeded
    pub fn invalidates(&self) -> Vec<Tag> {
        use TagKind::*;

        match self {
            MutationEndpoint::Login | MutationEndpoint::Logout | MutationEndpoint::RefreshToken => {
                Vec::new()
            }
            MutationEndpoint::UpdateProfile => vec![Tag::kind(User)],
            MutationEndpoint::CreateRider => vec![
                Tag::list(Rider),
                Tag::kind(RidersStats),
                Tag::kind(DashboardStats),
            ],
            MutationEndpoint::UpdateRider(id)
            | MutationEndpoint::DeleteRider(id)
            | MutationEndpoint::SuspendRider(id)
            | MutationEndpoint::ActivateRider(id) => vec![
                Tag::item(Rider, id),
                Tag::list(Rider),
                Tag::kind(RidersStats),
                Tag::kind(DashboardStats),
            ],
            MutationEndpoint::StartBackgroundCheck(id) => vec![
                Tag::item(Driver, id),
                Tag::list(Driver),
                Tag::kind(DriverStats),
            ],
            MutationEndpoint::ApproveDriver(id) | MutationEndpoint::RejectDriver(id) => vec![
                Tag::item(Driver, id),
                Tag::list(Driver),
                Tag::kind(DriverStats),
                Tag::kind(AvailableDriver),
                Tag::kind(DashboardStats),
            ],
            MutationEndpoint::CreateReservation => vec![
                Tag::list(Reservation),
                Tag::kind(ReservationsStats),
                Tag::kind(DashboardStats),
            ],
            MutationEndpoint::UpdateReservation(id)
            | MutationEndpoint::DeleteReservation(id)
            | MutationEndpoint::CancelReservation(id)
            | MutationEndpoint::ConfirmReservation(id) => vec![
                Tag::item(Reservation, id),
                Tag::list(Reservation),
                Tag::kind(ReservationsStats),
                Tag::kind(DashboardStats),
            ],
            MutationEndpoint::AssignDriver(id) => vec![
                Tag::item(Reservation, id),
                Tag::list(Reservation),
                Tag::kind(ReservationsStats),
                Tag::kind(AvailableDriver),
            ],
            MutationEndpoint::AddFeedback => vec![Tag::list(Feedback)],
            MutationEndpoint::ReplyToFeedback(id) => {
                vec![Tag::item(Feedback, id), Tag::list(Feedback)]
            }
            MutationEndpoint::UpdateWaitlistRecord(id)
            | MutationEndpoint::DeleteWaitlistRecord(id) => {
                vec![Tag::item(Waitlist, id), Tag::list(Waitlist)]
            }
        }
    }
}

/// Keys whose provided tags intersect `invalidated`
pub fn select_invalidated<'a, I>(provided: I, invalidated: &[Tag]) -> BTreeSet<QueryKey>
where
    I: IntoIterator<Item = (&'a QueryKey, &'a [Tag])>,
{
    provided
        .into_iter()
        .filter(|(_, tags)| {
            invalidated
                .iter()
                .any(|inv| tags.iter().any(|tag| inv.matches(tag)))
        })
        .map(|(key, _)| key.clone())
        .collect()
}
