//! School onboarding wizard.
//!
//! A new school moves through a fixed sequence of steps: profile, plan,
//! payment, review, processing. Each forward move validates the section the
//! current step owns. The free plan skips the payment step in both
//! directions. Hosts drive an [`OnboardingFlowController`] directly, or over
//! HTTP through [`onboarding_routes`].

pub mod controller;
pub mod model;
pub mod notify;
pub mod processing;
pub mod routes;
pub mod schema;
pub mod session;
pub mod step;

pub use controller::{OnboardingFlowController, OnboardingSnapshot};
pub use model::{OnboardingData, PlanId, Section, SectionUpdate};
pub use notify::{Navigator, Notice, Notifier};
pub use processing::{
    HttpSubmissionBackend, LocalSubmissionBackend, ProcessingStatus, SubmissionBackend,
};
pub use routes::{OnboardingRouteState, onboarding_routes};
pub use schema::{Schema, SectionSchemas, Violation};
pub use session::SessionStore;
pub use step::Step;
