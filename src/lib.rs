//! School Onboard — onboarding flow service for new schools.

pub mod config;
pub mod error;
pub mod onboarding;
