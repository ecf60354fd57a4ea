//! Change-event intake

use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::hosting::RepositoryId;
use crate::service::pipeline::Pipeline;

/// Repository-change notification as delivered by the hosting provider.
///
/// Only the fields needed to identify the repository are read; everything
/// else in the payload is ignored.
#[derive(Debug, Default, Deserialize)]
pub struct ChangeEvent {
    pub repository: Option<RepositoryPayload>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RepositoryPayload {
    pub name: Option<String>,
    pub owner: Option<OwnerPayload>,
}

/// Push events carry `owner.name`, most others carry `owner.login`
#[derive(Debug, Default, Deserialize)]
pub struct OwnerPayload {
    pub login: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("Payload has no repository")]
    MissingRepository,

    #[error("Payload has no repository owner")]
    MissingOwner,

    #[error("Payload has no repository name")]
    MissingName,
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// Identify the repository a change event refers to
pub fn extract_repository(event: &ChangeEvent) -> Result<RepositoryId, PayloadError> {
    let repository = event
        .repository
        .as_ref()
        .ok_or(PayloadError::MissingRepository)?;

    let owner = repository
        .owner
        .as_ref()
        .and_then(|owner| non_empty(owner.login.as_ref()).or(non_empty(owner.name.as_ref())))
        .ok_or(PayloadError::MissingOwner)?;
    let name = non_empty(repository.name.as_ref()).ok_or(PayloadError::MissingName)?;

    RepositoryId::new(owner, name).map_err(|_| PayloadError::MissingName)
}

/// Starts a background resolution for every accepted change event
#[derive(Clone)]
pub struct TriggerHandler {
    pipeline: Arc<Pipeline>,
}

impl TriggerHandler {
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &Arc<Pipeline> {
        &self.pipeline
    }

    /// Validate the event and schedule its resolution.
    ///
    /// Returns as soon as the work is scheduled. Resolution failures are
    /// logged and never reach the caller.
    pub fn on_change_event(&self, event: &ChangeEvent) -> Result<JoinHandle<()>, PayloadError> {
        let repository = extract_repository(event)?;
        info!("Change event accepted for {}", repository);

        let pipeline = self.pipeline.clone();
        Ok(tokio::spawn(async move {
            if let Err(e) = pipeline.resolve(&repository).await {
                error!("Resolution failed for {}: {}", repository, e);
            }
        }))
    }
}
