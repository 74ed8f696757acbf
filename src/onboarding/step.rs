//! Wizard steps and the guarded transition table between them.

use serde::{Deserialize, Serialize};

use super::model::PlanId;

/// The steps of the onboarding wizard, in display order.
///
/// Forward path: Profile → Plan → (Payment) → Review → Processing.
/// Payment is skipped when the free plan is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Profile,
    Plan,
    Payment,
    Review,
    Processing,
}

impl Step {
    /// Every step, in order.
    pub const ALL: [Step; 5] = [
        Step::Profile,
        Step::Plan,
        Step::Payment,
        Step::Review,
        Step::Processing,
    ];

    /// 1-based position shown to the user.
    pub fn number(self) -> u8 {
        match self {
            Self::Profile => 1,
            Self::Plan => 2,
            Self::Payment => 3,
            Self::Review => 4,
            Self::Processing => 5,
        }
    }

    pub fn from_number(n: u8) -> Option<Step> {
        Self::ALL.into_iter().find(|s| s.number() == n)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Profile => "School Profile",
            Self::Plan => "Choose Plan",
            Self::Payment => "Payment",
            Self::Review => "Review",
            Self::Processing => "Processing",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::Profile => "building",
            Self::Plan => "layers",
            Self::Payment => "credit-card",
            Self::Review => "clipboard-check",
            Self::Processing => "loader",
        }
    }

    /// Processing has no forward transition.
    pub fn is_terminal(self) -> bool {
        self == Step::Processing
    }

    /// Next step in plain sequential order, ignoring plan-dependent skips.
    fn sequential_next(self) -> Option<Step> {
        Step::from_number(self.number() + 1)
    }

    fn sequential_previous(self) -> Option<Step> {
        self.number().checked_sub(1).and_then(Step::from_number)
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Profile => "profile",
            Self::Plan => "plan",
            Self::Payment => "payment",
            Self::Review => "review",
            Self::Processing => "processing",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Step {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "profile" => Ok(Self::Profile),
            "plan" => Ok(Self::Plan),
            "payment" => Ok(Self::Payment),
            "review" => Ok(Self::Review),
            "processing" => Ok(Self::Processing),
            other => other
                .parse::<u8>()
                .ok()
                .and_then(Step::from_number)
                .ok_or_else(|| format!("Unknown step: {}", other)),
        }
    }
}

/// Static description of a step, as rendered in the wizard header.
#[derive(Debug, Clone, Serialize)]
pub struct StepInfo {
    pub id: Step,
    pub number: u8,
    pub label: &'static str,
    pub icon: &'static str,
}

impl From<Step> for StepInfo {
    fn from(step: Step) -> Self {
        Self {
            id: step,
            number: step.number(),
            label: step.label(),
            icon: step.icon(),
        }
    }
}

/// The full step table.
pub fn step_table() -> Vec<StepInfo> {
    Step::ALL.into_iter().map(StepInfo::from).collect()
}

/// Forward transition: `(current step, selected plan) → next step`.
///
/// Returns `None` at the terminal step.
pub fn next_step(current: Step, plan: Option<PlanId>) -> Option<Step> {
    match (current, plan) {
        (Step::Plan, Some(PlanId::Free)) => Some(Step::Review),
        (Step::Processing, _) => None,
        (step, _) => step.sequential_next(),
    }
}

/// Backward transition, mirroring the free-plan skip in [`next_step`].
///
/// Returns `None` at the first step.
pub fn previous_step(current: Step, plan: Option<PlanId>) -> Option<Step> {
    match (current, plan) {
        (Step::Review, Some(PlanId::Free)) => Some(Step::Plan),
        (step, _) => step.sequential_previous(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_are_one_based_and_ordered() {
        let numbers: Vec<u8> = Step::ALL.iter().map(|s| s.number()).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
        for pair in Step::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        assert_eq!(Step::from_number(0), None);
        assert_eq!(Step::from_number(6), None);
    }

    #[test]
    fn forward_table_without_plan_is_sequential() {
        assert_eq!(next_step(Step::Profile, None), Some(Step::Plan));
        assert_eq!(next_step(Step::Plan, None), Some(Step::Payment));
        assert_eq!(next_step(Step::Payment, None), Some(Step::Review));
        assert_eq!(next_step(Step::Review, None), Some(Step::Processing));
        assert_eq!(next_step(Step::Processing, None), None);
    }

    #[test]
    fn free_plan_skips_payment_both_ways() {
        assert_eq!(next_step(Step::Plan, Some(PlanId::Free)), Some(Step::Review));
        assert_eq!(previous_step(Step::Review, Some(PlanId::Free)), Some(Step::Plan));
    }

    #[test]
    fn paid_plans_visit_payment() {
        for plan in [PlanId::Basic, PlanId::Pro, PlanId::Enterprise] {
            assert_eq!(next_step(Step::Plan, Some(plan)), Some(Step::Payment));
            assert_eq!(previous_step(Step::Review, Some(plan)), Some(Step::Payment));
        }
    }

    #[test]
    fn backward_table_stops_at_first_step() {
        assert_eq!(previous_step(Step::Profile, None), None);
        assert_eq!(previous_step(Step::Plan, None), Some(Step::Profile));
        assert_eq!(previous_step(Step::Processing, None), Some(Step::Review));
    }

    #[test]
    fn display_matches_serde_and_from_str() {
        for step in Step::ALL {
            let display = step.to_string();
            let json = serde_json::to_string(&step).unwrap();
            assert_eq!(format!("\"{display}\""), json);
            assert_eq!(display.parse::<Step>().unwrap(), step);
            assert_eq!(step.number().to_string().parse::<Step>().unwrap(), step);
        }
        assert!("billing".parse::<Step>().is_err());
        assert!("9".parse::<Step>().is_err());
    }

    #[test]
    fn step_table_lists_all_steps() {
        let table = step_table();
        assert_eq!(table.len(), 5);
        assert_eq!(table[2].id, Step::Payment);
        assert_eq!(table[2].label, "Payment");
        assert_eq!(table[2].icon, "credit-card");
    }
}
