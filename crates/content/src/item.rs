use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use quillgate_core::{ContentId, DomainError, UserId};

pub const REQUIRED_FIELDS_MESSAGE: &str = "Title and body are required.";

/// Publication lifecycle of a content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl ContentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentStatus::Draft => "draft",
            ContentStatus::Published => "published",
            ContentStatus::Archived => "archived",
        }
    }
}

impl core::fmt::Display for ContentStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid status. Must be draft, published, or archived.")]
pub struct StatusParseError;

impl From<StatusParseError> for DomainError {
    fn from(e: StatusParseError) -> Self {
        DomainError::validation(e.to_string())
    }
}

impl FromStr for ContentStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ContentStatus::Draft),
            "published" => Ok(ContentStatus::Published),
            "archived" => Ok(ContentStatus::Archived),
            _ => Err(StatusParseError),
        }
    }
}

/// Stored content item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: ContentId,
    pub title: String,
    pub body: String,
    pub status: ContentStatus,
    pub author_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating a content item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContent {
    pub title: String,
    pub body: String,
    pub status: ContentStatus,
}

impl NewContent {
    /// Validate raw request fields. `status` defaults to draft.
    pub fn parse(
        title: Option<&str>,
        body: Option<&str>,
        status: Option<&str>,
    ) -> Result<Self, DomainError> {
        let title = title.map(str::trim).unwrap_or_default();
        let body = body.map(str::trim).unwrap_or_default();
        if title.is_empty() || body.is_empty() {
            return Err(DomainError::validation(REQUIRED_FIELDS_MESSAGE));
        }
        let status = match status {
            Some(raw) => raw.parse::<ContentStatus>()?,
            None => ContentStatus::default(),
        };
        Ok(Self {
            title: title.to_string(),
            body: body.to_string(),
            status,
        })
    }

    pub fn into_item(self, id: ContentId, author_id: UserId, now: DateTime<Utc>) -> ContentItem {
        ContentItem {
            id,
            title: self.title,
            body: self.body,
            status: self.status,
            author_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentPatch {
    pub title: Option<String>,
    pub body: Option<String>,
    pub status: Option<ContentStatus>,
}

impl ContentPatch {
    pub fn parse(
        title: Option<&str>,
        body: Option<&str>,
        status: Option<&str>,
    ) -> Result<Self, DomainError> {
        let status = status.map(str::parse::<ContentStatus>).transpose()?;
        let title = title.map(str::trim);
        let body = body.map(str::trim);
        if title.is_some_and(str::is_empty) || body.is_some_and(str::is_empty) {
            return Err(DomainError::validation(REQUIRED_FIELDS_MESSAGE));
        }
        Ok(Self {
            title: title.map(str::to_string),
            body: body.map(str::to_string),
            status,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.body.is_none() && self.status.is_none()
    }

    /// Apply onto `item`, bumping `updated_at` when anything changed.
    pub fn apply(self, item: &mut ContentItem, now: DateTime<Utc>) {
        if self.is_empty() {
            return;
        }
        if let Some(title) = self.title {
            item.title = title;
        }
        if let Some(body) = self.body {
            item.body = body;
        }
        if let Some(status) = self.status {
            item.status = status;
        }
        item.updated_at = now;
    }
}
