//! Types for the feedback domain

use chrono::{DateTime, Datelike, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use crate::auth::SessionUser;
use crate::cache::Listing;
use crate::error::{Error, Result};

/// Name used on replies when the session has none
pub const DEFAULT_ADMIN_NAME: &str = "Admin";
/// Address used on replies when the session has none
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@karnue.com";

/// Message left through the public feedback form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub message: String,
    pub created_at: String,
}

impl Feedback {
    pub fn created(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.created_at)
            .ok()
            .map(|d| d.with_timezone(&Utc))
    }

    fn matches(&self, term: &str) -> bool {
        self.full_name.to_lowercase().contains(term)
            || self.email.to_lowercase().contains(term)
            || self.message.to_lowercase().contains(term)
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("invalid feedback id {}", other))),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetFeedbacksResponse {
    #[serde(default)]
    pub data: Vec<Feedback>,
}

impl Listing for GetFeedbacksResponse {
    fn item_count(&self) -> usize {
        self.data.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddFeedbackRequest {
    pub full_name: String,
    pub email: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyToFeedbackRequest {
    pub message: String,
    pub admin_name: String,
    pub admin_email: String,
}

impl ReplyToFeedbackRequest {
    /// Reply signed by the signed-in admin, falling back to the defaults
    pub fn from_user(message: &str, user: Option<&SessionUser>) -> Result<Self> {
        let message = message.trim();
        if message.is_empty() {
            return Err(Error::validation("Please enter a reply message"));
        }

        let pick = |value: Option<&str>, fallback: &str| {
            value
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(fallback)
                .to_string()
        };
        Ok(Self {
            message: message.to_string(),
            admin_name: pick(user.map(|u| u.full_name.as_str()), DEFAULT_ADMIN_NAME),
            admin_email: pick(user.map(|u| u.email.as_str()), DEFAULT_ADMIN_EMAIL),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedbackSort {
    #[default]
    Newest,
    Oldest,
}

/// Case-insensitive search over name, email and message, then sort by date
///
/// Entries with an unreadable date sort as the oldest.
pub fn filter_and_sort<'a>(items: &'a [Feedback], term: &str, sort: FeedbackSort) -> Vec<&'a Feedback> {
    let term = term.trim().to_lowercase();
    let mut out: Vec<&Feedback> = items
        .iter()
        .filter(|item| term.is_empty() || item.matches(&term))
        .collect();

    out.sort_by_key(|item| item.created().map(|d| d.timestamp_millis()).unwrap_or(0));
    if sort == FeedbackSort::Newest {
        out.reverse();
    }
    out
}

/// Header counters for the feedback page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedbackSummary {
    pub total: usize,
    pub this_month: usize,
    pub last_7_days: usize,
    pub unique_users: usize,
}

impl FeedbackSummary {
    pub fn compute(items: &[Feedback], now: DateTime<Utc>) -> Self {
        let week_ago = now - Duration::days(7);
        let mut emails = HashSet::new();
        let mut this_month = 0;
        let mut last_7_days = 0;

        for item in items {
            if !item.email.is_empty() {
                emails.insert(item.email.as_str());
            }
            let Some(created) = item.created() else {
                continue;
            };
            if created.month() == now.month() && created.year() == now.year() {
                this_month += 1;
            }
            if created >= week_ago {
                last_7_days += 1;
            }
        }

        Self {
            total: items.len(),
            this_month,
            last_7_days,
            unique_users: emails.len(),
        }
    }
}
