//! OnboardingFlowController — owns the wizard's step, data, errors, and
//! completed set, and runs step-scoped validation before moving forward.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use super::model::{OnboardingData, PAYMENT_METHOD_NONE, SectionUpdate};
use super::notify::{Navigator, Notice, Notifier};
use super::schema::{SectionSchemas, Violation};
use super::step::{Step, StepInfo, next_step, previous_step};

/// Drives one user's progression through the onboarding steps.
///
/// Every operation is synchronous and runs to completion; validation
/// failures never surface as errors, only as `false` plus the error map.
pub struct OnboardingFlowController {
    current: Step,
    data: OnboardingData,
    errors: BTreeMap<String, String>,
    completed: BTreeSet<Step>,
    schemas: SectionSchemas,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
}

impl OnboardingFlowController {
    pub fn new(notifier: Arc<dyn Notifier>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            current: Step::Profile,
            data: OnboardingData::default(),
            errors: BTreeMap::new(),
            completed: BTreeSet::new(),
            schemas: SectionSchemas::default(),
            notifier,
            navigator,
        }
    }

    /// Replace the default section schemas.
    pub fn with_schemas(mut self, schemas: SectionSchemas) -> Self {
        self.schemas = schemas;
        self
    }

    /// Start from previously collected data (e.g. a draft the host kept).
    pub fn with_data(mut self, data: OnboardingData) -> Self {
        self.data = data;
        self
    }

    pub fn current_step(&self) -> Step {
        self.current
    }

    pub fn data(&self) -> &OnboardingData {
        &self.data
    }

    /// Field path → message for the last failed validation.
    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    pub fn completed_steps(&self) -> &BTreeSet<Step> {
        &self.completed
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    /// The aggregate to hand to the submission backend.
    pub fn submission(&self) -> &OnboardingData {
        &self.data
    }

    /// Whether direct navigation to `step` is allowed from here.
    pub fn is_step_clickable(&self, step: Step) -> bool {
        self.completed.contains(&step) && step < self.current
    }

    /// Shallow-merge a partial update into its section and clear all errors.
    ///
    /// No validation runs until the next advance attempt.
    pub fn update_section(&mut self, update: SectionUpdate) {
        debug!(section = %update.section(), "Section updated");
        self.data.apply(update);
        self.errors.clear();
    }

    /// Validate the data the current step is responsible for.
    ///
    /// On failure the error map holds the first message for each failing
    /// path and the first violation is sent to the notifier.
    pub fn validate_current_step(&mut self) -> bool {
        let result = match self.current {
            Step::Profile => self.schemas.profile.validate(&self.data.profile),
            Step::Plan => self.schemas.plan.validate(&self.data.plan),
            Step::Payment if self.data.plan.is_free() => Ok(()),
            Step::Payment if self.data.payment.payment_method == PAYMENT_METHOD_NONE => Err(vec![
                Violation::new("paymentMethod", "Please select a payment method"),
            ]),
            Step::Payment => self.schemas.payment.validate(&self.data.payment),
            Step::Review | Step::Processing => Ok(()),
        };

        match result {
            Ok(()) => {
                self.errors.clear();
                true
            }
            Err(violations) => {
                let mut errors = BTreeMap::new();
                for violation in &violations {
                    errors
                        .entry(violation.path.clone())
                        .or_insert_with(|| violation.message.clone());
                }
                self.errors = errors;

                debug!(
                    step = %self.current,
                    violations = violations.len(),
                    "Step validation failed"
                );
                if let Some(first) = violations.first() {
                    self.notifier.notify(Notice::error(first.message.clone()));
                }
                false
            }
        }
    }

    /// Validate and move forward.
    ///
    /// Leaving plan or payment on the free plan records the `none` payment
    /// method and lands on review. A paid plan leaving the plan step drops a
    /// stale `none`. Returns `false` without touching state when validation
    /// fails or the step is terminal.
    pub fn advance(&mut self) -> bool {
        if self.current.is_terminal() {
            debug!(step = %self.current, "Advance ignored at terminal step");
            return false;
        }
        if !self.validate_current_step() {
            return false;
        }

        self.completed.insert(self.current);

        let plan = self.data.plan.plan();
        let payment = &mut self.data.payment;
        match (self.current, self.data.plan.is_free()) {
            (Step::Plan | Step::Payment, true) => {
                payment.payment_method = PAYMENT_METHOD_NONE.to_string();
            }
            (Step::Plan, false) if payment.payment_method == PAYMENT_METHOD_NONE => {
                payment.payment_method.clear();
            }
            _ => {}
        }

        if let Some(next) = next_step(self.current, plan) {
            self.move_to(next);
        }
        true
    }

    /// Move back one step, skipping payment on the free plan.
    ///
    /// Processing is left only through [`retry_from_processing`](Self::retry_from_processing).
    pub fn retreat(&mut self) -> bool {
        if self.current.is_terminal() {
            debug!("Retreat ignored at processing step");
            return false;
        }
        match previous_step(self.current, self.data.plan.plan()) {
            Some(previous) => {
                self.move_to(previous);
                true
            }
            None => false,
        }
    }

    /// Revisit an earlier, already-completed step.
    pub fn jump_to_step(&mut self, step: Step) -> bool {
        if !self.is_step_clickable(step) {
            debug!(from = %self.current, to = %step, "Jump rejected");
            return false;
        }
        self.move_to(step);
        true
    }

    /// Confirm the review step and enter processing.
    pub fn finalize_step(&mut self) -> bool {
        if self.current != Step::Review {
            debug!(step = %self.current, "Finalize ignored outside review step");
            return false;
        }
        if !self.validate_current_step() {
            return false;
        }
        self.completed.insert(Step::Review);
        self.move_to(Step::Processing);
        true
    }

    /// Route back from processing to review after a failed submission.
    pub fn retry_from_processing(&mut self) -> bool {
        if self.current != Step::Processing {
            return false;
        }
        self.move_to(Step::Review);
        true
    }

    /// Serializable view of the controller for hosts.
    pub fn snapshot(&self) -> OnboardingSnapshot {
        OnboardingSnapshot {
            current_step: self.current,
            current_step_number: self.current.number(),
            steps: Step::ALL
                .into_iter()
                .map(|step| StepView {
                    info: step.into(),
                    active: step == self.current,
                    completed: self.completed.contains(&step),
                    clickable: self.is_step_clickable(step),
                })
                .collect(),
            completed_steps: self.completed.iter().map(|s| s.number()).collect(),
            data: self.data.clone(),
            errors: self.errors.clone(),
        }
    }

    fn move_to(&mut self, step: Step) {
        info!(from = %self.current, to = %step, "Onboarding step changed");
        self.current = step;
        self.errors.clear();
    }
}

/// One row of the wizard header.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepView {
    #[serde(flatten)]
    pub info: StepInfo,
    pub active: bool,
    pub completed: bool,
    pub clickable: bool,
}

/// Point-in-time view of a controller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingSnapshot {
    pub current_step: Step,
    pub current_step_number: u8,
    pub steps: Vec<StepView>,
    pub completed_steps: Vec<u8>,
    pub data: OnboardingData,
    pub errors: BTreeMap<String, String>,
}
