//! Onboarding data model: the three form sections and their partial updates.
//!
//! Section fields are kept as the raw strings the forms submit. The schemas
//! in [`super::schema`] decide whether they are acceptable; typed views such
//! as [`PlanSelection::plan`] are derived on demand.

use serde::{Deserialize, Serialize};

/// Payment method recorded when the payment step is skipped.
pub const PAYMENT_METHOD_NONE: &str = "none";

/// Subscription plans a school can pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanId {
    Free,
    Basic,
    Pro,
    Enterprise,
}

impl PlanId {
    pub const ALL: [PlanId; 4] = [PlanId::Free, PlanId::Basic, PlanId::Pro, PlanId::Enterprise];

    pub fn is_free(self) -> bool {
        self == PlanId::Free
    }
}

impl std::fmt::Display for PlanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Free => write!(f, "free"),
            Self::Basic => write!(f, "basic"),
            Self::Pro => write!(f, "pro"),
            Self::Enterprise => write!(f, "enterprise"),
        }
    }
}

impl std::str::FromStr for PlanId {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(Self::Free),
            "basic" => Ok(Self::Basic),
            "pro" => Ok(Self::Pro),
            "enterprise" => Ok(Self::Enterprise),
            _ => Err(format!("Unknown plan: {}", s)),
        }
    }
}

/// Billing period for a paid plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingCycle {
    Monthly,
    Yearly,
}

impl std::fmt::Display for BillingCycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Monthly => write!(f, "monthly"),
            Self::Yearly => write!(f, "yearly"),
        }
    }
}

impl std::str::FromStr for BillingCycle {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            _ => Err(format!("Unknown billing cycle: {}", s)),
        }
    }
}

/// The three data groupings of the onboarding record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Profile,
    Plan,
    Payment,
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Profile => write!(f, "profile"),
            Self::Plan => write!(f, "plan"),
            Self::Payment => write!(f, "payment"),
        }
    }
}

/// School profile collected on the first step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchoolProfile {
    pub school_name: String,
    pub email: String,
    pub phone: String,
    pub website: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub zip_code: String,
    pub school_type: String,
    pub student_count: String,
    pub description: String,
}

/// Plan selection collected on the second step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlanSelection {
    pub plan_id: String,
    pub billing_cycle: String,
}

impl Default for PlanSelection {
    fn default() -> Self {
        Self {
            plan_id: String::new(),
            billing_cycle: BillingCycle::Monthly.to_string(),
        }
    }
}

impl PlanSelection {
    /// The selected plan, if the id names a known plan.
    pub fn plan(&self) -> Option<PlanId> {
        self.plan_id.parse().ok()
    }

    pub fn is_free(&self) -> bool {
        self.plan().is_some_and(PlanId::is_free)
    }
}

/// Payment details collected on the third step (card or bank transfer).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentDetails {
    pub payment_method: String,
    pub card_number: String,
    pub card_name: String,
    pub expiry_date: String,
    pub cvv: String,
    pub bank_name: String,
    pub account_name: String,
    pub account_number: String,
    pub routing_number: String,
}

/// The full onboarding record handed to the backend on completion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OnboardingData {
    pub profile: SchoolProfile,
    pub plan: PlanSelection,
    pub payment: PaymentDetails,
}

/// Overwrite every field whose patch value is `Some`.
macro_rules! merge_fields {
    ($target:expr, $patch:expr, [$($field:ident),+ $(,)?]) => {{
        $(
            if let Some(value) = $patch.$field {
                $target.$field = value;
            }
        )+
    }};
}

/// Partial update for [`SchoolProfile`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolProfilePatch {
    pub school_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub zip_code: Option<String>,
    pub school_type: Option<String>,
    pub student_count: Option<String>,
    pub description: Option<String>,
}

/// Partial update for [`PlanSelection`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSelectionPatch {
    pub plan_id: Option<String>,
    pub billing_cycle: Option<String>,
}

/// Partial update for [`PaymentDetails`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetailsPatch {
    pub payment_method: Option<String>,
    pub card_number: Option<String>,
    pub card_name: Option<String>,
    pub expiry_date: Option<String>,
    pub cvv: Option<String>,
    pub bank_name: Option<String>,
    pub account_name: Option<String>,
    pub account_number: Option<String>,
    pub routing_number: Option<String>,
}

/// A partial update addressed to one section.
///
/// JSON form: `{"section": "plan", "data": {"planId": "pro"}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "section", content = "data", rename_all = "snake_case")]
pub enum SectionUpdate {
    Profile(SchoolProfilePatch),
    Plan(PlanSelectionPatch),
    Payment(PaymentDetailsPatch),
}

impl SectionUpdate {
    pub fn section(&self) -> Section {
        match self {
            Self::Profile(_) => Section::Profile,
            Self::Plan(_) => Section::Plan,
            Self::Payment(_) => Section::Payment,
        }
    }
}

impl OnboardingData {
    /// Shallow-merge a partial update into its section.
    pub fn apply(&mut self, update: SectionUpdate) {
        match update {
            SectionUpdate::Profile(patch) => merge_fields!(
                self.profile,
                patch,
                [
                    school_name,
                    email,
                    phone,
                    website,
                    address,
                    city,
                    state,
                    country,
                    zip_code,
                    school_type,
                    student_count,
                    description,
                ]
            ),
            SectionUpdate::Plan(patch) => {
                merge_fields!(self.plan, patch, [plan_id, billing_cycle])
            }
            SectionUpdate::Payment(patch) => merge_fields!(
                self.payment,
                patch,
                [
                    payment_method,
                    card_number,
                    card_name,
                    expiry_date,
                    cvv,
                    bank_name,
                    account_name,
                    account_number,
                    routing_number,
                ]
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_record_is_empty_with_monthly_billing() {
        let data = OnboardingData::default();
        assert!(data.profile.school_name.is_empty());
        assert!(data.plan.plan_id.is_empty());
        assert_eq!(data.plan.billing_cycle, "monthly");
        assert!(data.payment.payment_method.is_empty());
        assert_eq!(data.plan.plan(), None);
        assert!(!data.plan.is_free());
    }

    #[test]
    fn apply_overwrites_only_present_fields() {
        let mut data = OnboardingData::default();
        data.apply(SectionUpdate::Profile(SchoolProfilePatch {
            school_name: Some("Riverside Academy".to_string()),
            city: Some("Portland".to_string()),
            ..Default::default()
        }));
        data.apply(SectionUpdate::Profile(SchoolProfilePatch {
            city: Some("Salem".to_string()),
            ..Default::default()
        }));

        assert_eq!(data.profile.school_name, "Riverside Academy");
        assert_eq!(data.profile.city, "Salem");
        assert!(data.profile.email.is_empty());
    }

    #[test]
    fn apply_leaves_other_sections_alone() {
        let mut data = OnboardingData::default();
        data.apply(SectionUpdate::Payment(PaymentDetailsPatch {
            payment_method: Some("card".to_string()),
            ..Default::default()
        }));
        data.apply(SectionUpdate::Plan(PlanSelectionPatch {
            plan_id: Some("pro".to_string()),
            ..Default::default()
        }));

        assert_eq!(data.payment.payment_method, "card");
        assert_eq!(data.plan.plan(), Some(PlanId::Pro));
        assert_eq!(data.plan.billing_cycle, "monthly");
        assert_eq!(data.profile, SchoolProfile::default());
    }

    #[test]
    fn section_update_wire_format() {
        let update: SectionUpdate = serde_json::from_value(serde_json::json!({
            "section": "plan",
            "data": {"planId": "free", "billingCycle": "yearly"}
        }))
        .unwrap();
        assert_eq!(update.section(), Section::Plan);
        assert_eq!(
            update,
            SectionUpdate::Plan(PlanSelectionPatch {
                plan_id: Some("free".to_string()),
                billing_cycle: Some("yearly".to_string()),
            })
        );
    }

    #[test]
    fn record_serializes_camel_case() {
        let mut data = OnboardingData::default();
        data.profile.zip_code = "97201".to_string();
        data.payment.card_number = "4242".to_string();
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["profile"]["zipCode"], "97201");
        assert_eq!(json["plan"]["billingCycle"], "monthly");
        assert_eq!(json["payment"]["cardNumber"], "4242");
    }

    #[test]
    fn plan_id_parsing() {
        for plan in PlanId::ALL {
            assert_eq!(plan.to_string().parse::<PlanId>().unwrap(), plan);
        }
        assert!("platinum".parse::<PlanId>().is_err());
        assert!(PlanId::Free.is_free());
        assert!(!PlanId::Enterprise.is_free());
        assert_eq!("yearly".parse::<BillingCycle>().unwrap(), BillingCycle::Yearly);
    }
}
