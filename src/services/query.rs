//! Per-chat cache of remote data.
//!
//! Mirrors how the chat page treats the backend: results land in the cache,
//! local sends are appended optimistically, and any confirmed change bumps
//! `version` so the page refetches the authoritative lists.

use std::future::Future;
use std::rc::Rc;
use yew::prelude::*;

use crate::models::{ChatMessage, MockEndpoint};
use crate::services::api::{ApiError, ApiResult};

#[derive(Clone, Debug, PartialEq)]
pub enum QueryStatus {
    Idle,
    Loading,
    Ready,
    Failed(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Query<T> {
    pub data: Option<T>,
    pub status: QueryStatus,
}

impl<T> Default for Query<T> {
    fn default() -> Self {
        Self { data: None, status: QueryStatus::Idle }
    }
}

impl<T> Query<T> {
    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Loading && self.data.is_none()
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            QueryStatus::Failed(msg) => Some(msg),
            _ => None,
        }
    }

    fn loading(&mut self) {
        self.status = QueryStatus::Loading;
    }

    fn ready(&mut self, data: T) {
        self.data = Some(data);
        self.status = QueryStatus::Ready;
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChatCache {
    pub chat_id: String,
    pub messages: Query<Vec<ChatMessage>>,
    pub endpoints: Query<Vec<MockEndpoint>>,
    /// Bumped on invalidation; the owning page refetches when it changes.
    pub version: u32,
}

pub enum CacheAction {
    Reset(String),
    Fetching(String),
    MessagesLoaded(String, Vec<ChatMessage>),
    MessagesFailed(String, String),
    EndpointsLoaded(String, Vec<MockEndpoint>),
    EndpointsFailed(String, String),
    AppendOptimistic(ChatMessage),
    Invalidate,
}

impl CacheAction {
    fn chat_id(&self) -> Option<&str> {
        match self {
            CacheAction::Fetching(id)
            | CacheAction::MessagesLoaded(id, _)
            | CacheAction::MessagesFailed(id, _)
            | CacheAction::EndpointsLoaded(id, _)
            | CacheAction::EndpointsFailed(id, _) => Some(id),
            CacheAction::AppendOptimistic(msg) => Some(&msg.chat_id),
            CacheAction::Reset(_) | CacheAction::Invalidate => None,
        }
    }
}

impl Reducible for ChatCache {
    type Action = CacheAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        if let Some(id) = action.chat_id() {
            if id != self.chat_id {
                tracing::debug!(stale = id, current = %self.chat_id, "dropping stale cache update");
                return self;
            }
        }

        let mut next = (*self).clone();
        match action {
            CacheAction::Reset(chat_id) => {
                next = ChatCache { chat_id, version: self.version.wrapping_add(1), ..Default::default() };
            }
            CacheAction::Fetching(_) => {
                next.messages.loading();
                next.endpoints.loading();
            }
            CacheAction::MessagesLoaded(_, msgs) => next.messages.ready(msgs),
            CacheAction::MessagesFailed(_, err) => next.messages.status = QueryStatus::Failed(err),
            CacheAction::EndpointsLoaded(_, eps) => next.endpoints.ready(eps),
            CacheAction::EndpointsFailed(_, err) => next.endpoints.status = QueryStatus::Failed(err),
            CacheAction::AppendOptimistic(msg) => match next.messages.data.as_mut() {
                Some(list) => list.push(msg),
                None => return self,
            },
            CacheAction::Invalidate => next.version = next.version.wrapping_add(1),
        }
        Rc::new(next)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: 1 }
    }
}

impl RetryPolicy {
    pub fn should_retry(&self, attempt: u32, err: &ApiError) -> bool {
        attempt < self.max_retries && !matches!(err, ApiError::Unauthorized | ApiError::MissingToken)
    }

    pub async fn run<T, F, Fut>(&self, mut op: F) -> ApiResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ApiResult<T>>,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(v) => return Ok(v),
                Err(e) if self.should_retry(attempt, &e) => {
                    tracing::debug!(attempt, error = %e, "retrying query");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
