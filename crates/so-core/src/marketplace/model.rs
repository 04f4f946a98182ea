use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{CelebrityId, RequestId, UserId};
use crate::session::UserMetadata;

/// Who the signed-in user is in the marketplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Fan,
    Celebrity,
}

impl Role {
    pub fn from_metadata(metadata: &UserMetadata) -> Self {
        if metadata.is_celebrity {
            Role::Celebrity
        } else {
            Role::Fan
        }
    }

    pub fn is_celebrity(&self) -> bool {
        matches!(self, Role::Celebrity)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Fan => f.write_str("fan"),
            Role::Celebrity => f.write_str("celebrity"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Celebrity {
    pub id: CelebrityId,
    pub name: String,
    #[serde(default)]
    pub category: String,
    /// Whole US dollars per video.
    pub price: u32,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
    Completed,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Accepted => "accepted",
            RequestStatus::Rejected => "rejected",
            RequestStatus::Completed => "completed",
        }
    }

    /// `Pending → Accepted | Rejected`, `Accepted → Completed`.
    pub fn can_transition_to(&self, next: RequestStatus) -> bool {
        matches!(
            (self, next),
            (RequestStatus::Pending, RequestStatus::Accepted)
                | (RequestStatus::Pending, RequestStatus::Rejected)
                | (RequestStatus::Accepted, RequestStatus::Completed)
        )
    }

    pub fn transition(self, next: RequestStatus) -> Result<RequestStatus, MarketplaceError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(MarketplaceError::InvalidStatusTransition {
                from: self,
                to: next,
            })
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fan's order for a personalised video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRequest {
    pub id: RequestId,
    pub requester_id: UserId,
    pub celebrity_id: CelebrityId,
    pub recipient_name: String,
    pub occasion: String,
    pub message_details: String,
    pub status: RequestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Insert payload for a new request; the row starts `Pending`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewVideoRequest {
    pub id: RequestId,
    pub requester_id: UserId,
    pub celebrity_id: CelebrityId,
    pub recipient_name: String,
    pub occasion: String,
    pub message_details: String,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

impl NewVideoRequest {
    pub fn pending(
        requester_id: UserId,
        celebrity_id: CelebrityId,
        recipient_name: String,
        occasion: String,
        message_details: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: RequestId::generate(),
            requester_id,
            celebrity_id,
            recipient_name,
            occasion,
            message_details,
            status: RequestStatus::Pending,
            created_at,
        }
    }
}

/// Public link to a recorded message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShareLink(String);

impl ShareLink {
    pub fn new(base_url: &str, token: &str) -> Self {
        Self(format!("{}/watch/{}", base_url.trim_end_matches('/'), token))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShareLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarketplaceError {
    #[error("request cannot move from {from} to {to}")]
    InvalidStatusTransition {
        from: RequestStatus,
        to: RequestStatus,
    },
    #[error("celebrity not found: {0}")]
    CelebrityNotFound(CelebrityId),
    #[error("video request not found: {0}")]
    RequestNotFound(RequestId),
}
