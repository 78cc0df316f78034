use super::announcement::AnnounceError;
use crate::services::platform::PlatformError;
use std::fmt;
use thiserror::Error;

/// Resources that may be missing while locating a joinable channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Announcement,
    Role,
    Channel,
    ChannelMention,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Announcement => write!(f, "announcement"),
            Resource::Role => write!(f, "role"),
            Resource::Channel => write!(f, "channel"),
            Resource::ChannelMention => write!(f, "channel mention"),
        }
    }
}

#[derive(Debug, Error)]
pub enum JoinableError {
    #[error("channel name must be between 2 and 100 characters, got {0}")]
    InvalidName(usize),
    #[error("channel topic must be between 2 and 100 characters, got {0}")]
    InvalidTopic(usize),
    #[error("a channel named `{0}` already exists")]
    DuplicateName(String),
    #[error("guild has not been set up")]
    NotSetUp,
    #[error("insufficient permissions")]
    Unauthorized,
    #[error("{0} not found")]
    NotFound(Resource),
    #[error(transparent)]
    Announcement(#[from] AnnounceError),
    #[error(transparent)]
    Platform(#[from] PlatformError),
    #[error(transparent)]
    Store(#[from] sea_orm::DbErr),
}

impl JoinableError {
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            JoinableError::InvalidName(_)
                | JoinableError::InvalidTopic(_)
                | JoinableError::DuplicateName(_)
        )
    }
}
