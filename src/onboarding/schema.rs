//! Section schemas — field-level validation for each onboarding section.
//!
//! Each schema reports every rule that fails, in field order. Paths are the
//! camelCase field names relative to the section (`cardNumber`), matching the
//! keys the forms bind errors to.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::model::{
    BillingCycle, PAYMENT_METHOD_NONE, PaymentDetails, PlanId, PlanSelection, SchoolProfile,
};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});
static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^https?://[^\s/$.?#].[^\s]*$").expect("url pattern compiles"));
static EXPIRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(0[1-9]|1[0-2])/\d{2}$").expect("expiry pattern compiles"));
static CVV_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{3,4}$").expect("cvv pattern compiles"));

const DESCRIPTION_MAX_CHARS: usize = 500;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Dotted field path, e.g. `cardNumber` or `address.zipCode`.
    pub path: String,
    pub message: String,
}

impl Violation {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Validation capability over one section type.
///
/// Any validation approach can stand behind this; the controller only sees
/// the list of violations.
pub trait Schema<T: ?Sized>: Send + Sync {
    fn validate(&self, value: &T) -> Result<(), Vec<Violation>>;
}

/// Collects violations while a schema walks its fields.
#[derive(Default)]
struct Checker {
    violations: Vec<Violation>,
}

impl Checker {
    fn check(&mut self, ok: bool, path: &str, message: &str) {
        if !ok {
            self.violations.push(Violation::new(path, message));
        }
    }

    fn finish(self) -> Result<(), Vec<Violation>> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(self.violations)
        }
    }
}

fn char_len(s: &str) -> usize {
    s.trim().chars().count()
}

fn digits(s: &str) -> String {
    s.chars().filter(char::is_ascii_digit).collect()
}

/// Rules for the school profile step.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileSchema;

impl Schema<SchoolProfile> for ProfileSchema {
    fn validate(&self, p: &SchoolProfile) -> Result<(), Vec<Violation>> {
        let mut c = Checker::default();
        c.check(
            char_len(&p.school_name) >= 2,
            "schoolName",
            "School name must be at least 2 characters",
        );
        c.check(
            EMAIL_RE.is_match(p.email.trim()),
            "email",
            "Please enter a valid email address",
        );
        c.check(
            digits(&p.phone).len() >= 10,
            "phone",
            "Phone number must be at least 10 digits",
        );
        c.check(
            p.website.trim().is_empty() || URL_RE.is_match(p.website.trim()),
            "website",
            "Please enter a valid URL",
        );
        c.check(
            char_len(&p.address) >= 5,
            "address",
            "Address must be at least 5 characters",
        );
        c.check(!p.city.trim().is_empty(), "city", "City is required");
        c.check(!p.state.trim().is_empty(), "state", "State is required");
        c.check(!p.country.trim().is_empty(), "country", "Country is required");
        c.check(
            char_len(&p.zip_code) >= 4,
            "zipCode",
            "ZIP code must be at least 4 characters",
        );
        c.check(
            !p.school_type.trim().is_empty(),
            "schoolType",
            "Please select a school type",
        );
        c.check(
            p.student_count.trim().is_empty() || p.student_count.trim().parse::<u32>().is_ok(),
            "studentCount",
            "Student count must be a whole number",
        );
        c.check(
            p.description.chars().count() <= DESCRIPTION_MAX_CHARS,
            "description",
            "Description must be 500 characters or fewer",
        );
        c.finish()
    }
}

/// Rules for the plan selection step.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanSchema;

impl Schema<PlanSelection> for PlanSchema {
    fn validate(&self, p: &PlanSelection) -> Result<(), Vec<Violation>> {
        let mut c = Checker::default();
        c.check(
            p.plan_id.parse::<PlanId>().is_ok(),
            "planId",
            "Please select a plan",
        );
        c.check(
            p.billing_cycle.parse::<BillingCycle>().is_ok(),
            "billingCycle",
            "Please select a billing cycle",
        );
        c.finish()
    }
}

/// Rules for the payment step; which fields apply depends on the method.
#[derive(Debug, Clone, Copy, Default)]
pub struct PaymentSchema;

impl Schema<PaymentDetails> for PaymentSchema {
    fn validate(&self, p: &PaymentDetails) -> Result<(), Vec<Violation>> {
        let mut c = Checker::default();
        match p.payment_method.as_str() {
            "card" => {
                let number = p.card_number.replace(' ', "");
                c.check(
                    number.len() == 16 && number.chars().all(|ch| ch.is_ascii_digit()),
                    "cardNumber",
                    "Card number must be 16 digits",
                );
                c.check(
                    char_len(&p.card_name) >= 2,
                    "cardName",
                    "Name on card is required",
                );
                c.check(
                    EXPIRY_RE.is_match(p.expiry_date.trim()),
                    "expiryDate",
                    "Expiry date must be in MM/YY format",
                );
                c.check(
                    CVV_RE.is_match(p.cvv.trim()),
                    "cvv",
                    "CVV must be 3 or 4 digits",
                );
            }
            "bank" => {
                c.check(
                    !p.bank_name.trim().is_empty(),
                    "bankName",
                    "Bank name is required",
                );
                c.check(
                    char_len(&p.account_name) >= 2,
                    "accountName",
                    "Account holder name is required",
                );
                let account = p.account_number.trim();
                c.check(
                    (8..=17).contains(&account.len()) && account.chars().all(|ch| ch.is_ascii_digit()),
                    "accountNumber",
                    "Account number must be 8 to 17 digits",
                );
                let routing = p.routing_number.trim();
                c.check(
                    routing.len() == 9 && routing.chars().all(|ch| ch.is_ascii_digit()),
                    "routingNumber",
                    "Routing number must be 9 digits",
                );
            }
            PAYMENT_METHOD_NONE => {}
            _ => c.check(false, "paymentMethod", "Please select a payment method"),
        }
        c.finish()
    }
}

/// The schema set used by the controller, one per section.
pub struct SectionSchemas {
    pub profile: Box<dyn Schema<SchoolProfile>>,
    pub plan: Box<dyn Schema<PlanSelection>>,
    pub payment: Box<dyn Schema<PaymentDetails>>,
}

impl Default for SectionSchemas {
    fn default() -> Self {
        Self {
            profile: Box::new(ProfileSchema),
            plan: Box::new(PlanSchema),
            payment: Box::new(PaymentSchema),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_profile() -> SchoolProfile {
        SchoolProfile {
            school_name: "Riverside Academy".to_string(),
            email: "admin@riverside.edu".to_string(),
            phone: "(503) 555-0142".to_string(),
            website: "https://riverside.edu".to_string(),
            address: "1200 River Road".to_string(),
            city: "Portland".to_string(),
            state: "OR".to_string(),
            country: "US".to_string(),
            zip_code: "97201".to_string(),
            school_type: "k12".to_string(),
            student_count: "850".to_string(),
            description: String::new(),
        }
    }

    fn paths(result: Result<(), Vec<Violation>>) -> Vec<String> {
        result
            .err()
            .unwrap_or_default()
            .into_iter()
            .map(|v| v.path)
            .collect()
    }

    #[test]
    fn complete_profile_passes() {
        assert!(ProfileSchema.validate(&valid_profile()).is_ok());
    }

    #[test]
    fn empty_profile_reports_required_fields_in_order() {
        let got = paths(ProfileSchema.validate(&SchoolProfile::default()));
        assert_eq!(
            got,
            vec![
                "schoolName",
                "email",
                "phone",
                "address",
                "city",
                "state",
                "country",
                "zipCode",
                "schoolType",
            ]
        );
    }

    #[test]
    fn optional_profile_fields_are_checked_when_present() {
        let mut profile = valid_profile();
        profile.website = "riverside dot edu".to_string();
        profile.student_count = "lots".to_string();
        profile.description = "x".repeat(501);
        assert_eq!(
            paths(ProfileSchema.validate(&profile)),
            vec!["website", "studentCount", "description"]
        );
    }

    #[test]
    fn plan_requires_known_plan_and_cycle() {
        let ok = PlanSelection {
            plan_id: "pro".to_string(),
            billing_cycle: "yearly".to_string(),
        };
        assert!(PlanSchema.validate(&ok).is_ok());

        let bad = PlanSelection {
            plan_id: "platinum".to_string(),
            billing_cycle: "weekly".to_string(),
        };
        assert_eq!(paths(PlanSchema.validate(&bad)), vec!["planId", "billingCycle"]);
        assert_eq!(paths(PlanSchema.validate(&PlanSelection::default())), vec!["planId"]);
    }

    #[test]
    fn card_payment_rules() {
        let card = PaymentDetails {
            payment_method: "card".to_string(),
            card_number: "4242 4242 4242 4242".to_string(),
            card_name: "Dana Whitfield".to_string(),
            expiry_date: "08/29".to_string(),
            cvv: "123".to_string(),
            ..Default::default()
        };
        assert!(PaymentSchema.validate(&card).is_ok());

        let short = PaymentDetails {
            card_number: "4242 4242".to_string(),
            expiry_date: "13/29".to_string(),
            ..card
        };
        assert_eq!(
            paths(PaymentSchema.validate(&short)),
            vec!["cardNumber", "expiryDate"]
        );
    }

    #[test]
    fn bank_payment_rules() {
        let bank = PaymentDetails {
            payment_method: "bank".to_string(),
            bank_name: "First Federal".to_string(),
            account_name: "Riverside Academy".to_string(),
            account_number: "0012345678".to_string(),
            routing_number: "123456789".to_string(),
            ..Default::default()
        };
        assert!(PaymentSchema.validate(&bank).is_ok());

        let bad = PaymentDetails {
            routing_number: "1234".to_string(),
            ..bank
        };
        assert_eq!(paths(PaymentSchema.validate(&bad)), vec!["routingNumber"]);
    }

    #[test]
    fn none_sentinel_is_valid_and_unknown_method_is_not() {
        let none = PaymentDetails {
            payment_method: PAYMENT_METHOD_NONE.to_string(),
            ..Default::default()
        };
        assert!(PaymentSchema.validate(&none).is_ok());
        assert_eq!(
            paths(PaymentSchema.validate(&PaymentDetails::default())),
            vec!["paymentMethod"]
        );
    }

    #[test]
    fn violation_display() {
        let v = Violation::new("cvv", "CVV must be 3 or 4 digits");
        assert_eq!(v.to_string(), "cvv: CVV must be 3 or 4 digits");
    }
}
