//! Feedback client
//!
//! Feedback lives under `/api/feedback` and is not bearer-authenticated.

mod types;

pub use types::*;

use serde_json::Value;

use crate::cache::{MutationEndpoint, Query, QueryCache, QueryEndpoint};
use crate::error::{Error, Result};
use crate::fetch::{path_id, BaseQuery};

#[derive(Debug, Clone)]
pub struct FeedbackClient {
    base: BaseQuery,
    cache: QueryCache,
}

impl FeedbackClient {
    pub(crate) fn new(base: BaseQuery, cache: QueryCache) -> Self {
        Self { base, cache }
    }

    pub fn get_all_feedbacks(&self) -> Result<Query<GetFeedbacksResponse>> {
        let base = self.base.clone();
        self.cache.query(QueryEndpoint::GetAllFeedbacks, &Value::Null, move || {
            base.get("/get_feedbacks").execute_value()
        })
    }

    pub async fn add_feedback(&self, feedback: &AddFeedbackRequest) -> Result<Value> {
        if feedback.message.trim().is_empty() {
            return Err(Error::validation("feedback message is required"));
        }
        let request = self.base.post("").json(feedback)?.execute_value();
        self.cache.mutate(MutationEndpoint::AddFeedback, request).await
    }

    pub async fn reply_to_feedback(&self, id: &str, reply: &ReplyToFeedbackRequest) -> Result<Value> {
        let id = path_id(id)?;
        if reply.message.trim().is_empty() {
            return Err(Error::validation("Please enter a reply message"));
        }
        let request = self
            .base
            .post(&format!("/{}/reply", id))
            .json(reply)?
            .execute_value();
        self.cache
            .mutate(MutationEndpoint::ReplyToFeedback(id.to_string()), request)
            .await
    }
}
