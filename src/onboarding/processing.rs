//! Processing step — hands the finished onboarding record to the backend.
//!
//! The controller only reaches [`Step::Processing`]; what happens there lives
//! here. Submission is split into [`prepare`] and [`settle`] so a host can
//! release its lock on the controller while the request is in flight.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::controller::OnboardingFlowController;
use super::model::OnboardingData;
use super::notify::Notice;
use super::step::Step;
use crate::error::SubmissionError;

/// Acknowledgment from the backend for an accepted record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub reference: String,
    pub submitted_at: DateTime<Utc>,
}

impl SubmissionReceipt {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            submitted_at: Utc::now(),
        }
    }
}

/// Where the processing step currently stands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProcessingStatus {
    /// Nothing submitted yet.
    #[default]
    Idle,
    /// A record is with the backend; no other attempt may start.
    Submitting,
    Completed {
        receipt: SubmissionReceipt,
    },
    /// The last attempt failed; the user may retry from review.
    Failed {
        message: String,
    },
}

/// Receives the finished onboarding record.
#[async_trait]
pub trait SubmissionBackend: Send + Sync {
    async fn submit(&self, data: &OnboardingData) -> Result<SubmissionReceipt, SubmissionError>;
}

/// Accepts every record without leaving the process.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalSubmissionBackend;

#[async_trait]
impl SubmissionBackend for LocalSubmissionBackend {
    async fn submit(&self, data: &OnboardingData) -> Result<SubmissionReceipt, SubmissionError> {
        let receipt = SubmissionReceipt::new(Uuid::new_v4().to_string());
        info!(
            reference = %receipt.reference,
            school = %data.profile.school_name,
            plan = %data.plan.plan_id,
            "Onboarding record accepted locally"
        );
        Ok(receipt)
    }
}

/// POSTs the record as JSON to a backend endpoint.
///
/// The response body must carry an `id` or `reference` string.
#[derive(Debug, Clone)]
pub struct HttpSubmissionBackend {
    client: reqwest::Client,
    url: String,
}

impl HttpSubmissionBackend {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, SubmissionError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl SubmissionBackend for HttpSubmissionBackend {
    async fn submit(&self, data: &OnboardingData) -> Result<SubmissionReceipt, SubmissionError> {
        let resp = self.client.post(&self.url).json(data).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SubmissionError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| SubmissionError::InvalidResponse(e.to_string()))?;
        let reference = body
            .get("id")
            .or_else(|| body.get("reference"))
            .and_then(|v| match v {
                serde_json::Value::String(s) => Some(s.clone()),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .ok_or_else(|| {
                SubmissionError::InvalidResponse(format!("no id or reference in {body}"))
            })?;

        Ok(SubmissionReceipt::new(reference))
    }
}

/// Take the record to submit. Only valid on the processing step.
pub fn prepare(controller: &OnboardingFlowController) -> Result<OnboardingData, SubmissionError> {
    let step = controller.current_step();
    if step != Step::Processing {
        return Err(SubmissionError::WrongStep {
            step: step.to_string(),
        });
    }
    Ok(controller.submission().clone())
}

/// Apply a submission result to the controller's collaborators.
///
/// Success navigates to `dashboard_route`. Failure notifies the user and
/// leaves the controller on processing so it can retry from review.
pub fn settle(
    controller: &OnboardingFlowController,
    result: Result<SubmissionReceipt, SubmissionError>,
    dashboard_route: &str,
) -> ProcessingStatus {
    match result {
        Ok(receipt) => {
            info!(reference = %receipt.reference, "Onboarding submission completed");
            controller
                .notifier()
                .notify(Notice::success("Your school has been set up"));
            controller.navigator().navigate(dashboard_route);
            ProcessingStatus::Completed { receipt }
        }
        Err(e) => {
            warn!(error = %e, "Onboarding submission failed");
            let message = format!("Setup failed: {e}");
            controller.notifier().notify(Notice::error(message.clone()));
            ProcessingStatus::Failed { message }
        }
    }
}

/// Prepare, submit, and settle in one call, for hosts that own the
/// controller outright.
pub async fn process_submission(
    controller: &OnboardingFlowController,
    backend: &dyn SubmissionBackend,
    dashboard_route: &str,
) -> Result<ProcessingStatus, SubmissionError> {
    let data = prepare(controller)?;
    let result = backend.submit(&data).await;
    Ok(settle(controller, result, dashboard_route))
}
