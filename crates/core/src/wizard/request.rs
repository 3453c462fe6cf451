use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::wizard::schema::Route;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BudgetRange {
    Entry,
    Standard,
    Premium,
    Flagship,
}

impl BudgetRange {
    pub const ALL: [BudgetRange; 4] =
        [BudgetRange::Entry, BudgetRange::Standard, BudgetRange::Premium, BudgetRange::Flagship];

    pub fn label(self) -> &'static str {
        match self {
            Self::Entry => "₦200k – ₦500k",
            Self::Standard => "₦500k – ₦1.5M",
            Self::Premium => "₦1.5M – ₦5M",
            Self::Flagship => "₦5M+",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|range| range.label() == label)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Timeline {
    Asap,
    WithinOneMonth,
    ThreePlusMonths,
}

impl Timeline {
    pub const ALL: [Timeline; 3] =
        [Timeline::Asap, Timeline::WithinOneMonth, Timeline::ThreePlusMonths];

    pub fn label(self) -> &'static str {
        match self {
            Self::Asap => "ASAP",
            Self::WithinOneMonth => "Within 1 Month",
            Self::ThreePlusMonths => "3+ Months",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|timeline| timeline.label() == label)
    }
}

/// Everything the wizard has collected so far.
///
/// Budget and timeline hold the selected label verbatim; an empty string means
/// "not chosen yet". None of the gates trim, so a whitespace-only name counts as filled.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub route: Option<Route>,
    #[serde(default)]
    pub specifics: BTreeMap<String, String>,
    #[serde(default)]
    pub budget: String,
    #[serde(default)]
    pub timeline: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

impl QuoteRequest {
    pub fn specific(&self, key: &str) -> Option<&str> {
        self.specifics.get(key).map(String::as_str).filter(|value| !value.is_empty())
    }

    pub fn missing_investment_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.budget.is_empty() {
            missing.push("budget");
        }
        if self.timeline.is_empty() {
            missing.push("timeline");
        }
        missing
    }

    pub fn missing_submission_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.is_empty() {
            missing.push("name");
        }
        if self.email.is_empty() {
            missing.push("email");
        }
        missing.extend(self.missing_investment_fields());
        missing
    }
}

pub fn can_proceed_from_investment(request: &QuoteRequest) -> bool {
    !request.budget.is_empty() && !request.timeline.is_empty()
}

pub fn can_submit(request: &QuoteRequest) -> bool {
    !request.name.is_empty()
        && !request.email.is_empty()
        && !request.budget.is_empty()
        && !request.timeline.is_empty()
}

#[cfg(test)]
mod tests {
    use super::{can_proceed_from_investment, can_submit, BudgetRange, QuoteRequest, Timeline};

    #[test]
    fn investment_gate_opens_for_every_budget_and_timeline_pair() {
        for budget in BudgetRange::ALL {
            for timeline in Timeline::ALL {
                let request = QuoteRequest {
                    budget: budget.label().to_owned(),
                    timeline: timeline.label().to_owned(),
                    ..QuoteRequest::default()
                };
                assert!(can_proceed_from_investment(&request));
            }
        }
    }

    #[test]
    fn investment_gate_stays_closed_when_either_choice_is_missing() {
        let only_budget =
            QuoteRequest { budget: BudgetRange::Entry.label().to_owned(), ..Default::default() };
        let only_timeline =
            QuoteRequest { timeline: Timeline::Asap.label().to_owned(), ..Default::default() };

        assert!(!can_proceed_from_investment(&QuoteRequest::default()));
        assert!(!can_proceed_from_investment(&only_budget));
        assert!(!can_proceed_from_investment(&only_timeline));
        assert_eq!(only_budget.missing_investment_fields(), vec!["timeline"]);
    }

    #[test]
    fn whitespace_only_contact_details_count_as_filled() {
        let request = QuoteRequest {
            budget: BudgetRange::Flagship.label().to_owned(),
            timeline: Timeline::ThreePlusMonths.label().to_owned(),
            name: " ".to_owned(),
            email: "\t".to_owned(),
            ..QuoteRequest::default()
        };
        assert!(can_submit(&request));
    }

    #[test]
    fn submission_gate_reports_every_missing_field() {
        let request = QuoteRequest { name: "Ada Obi".to_owned(), ..QuoteRequest::default() };
        assert!(!can_submit(&request));
        assert_eq!(request.missing_submission_fields(), vec!["email", "budget", "timeline"]);
    }

    #[test]
    fn labels_round_trip_through_lookup() {
        assert_eq!(BudgetRange::from_label("₦500k – ₦1.5M"), Some(BudgetRange::Standard));
        assert_eq!(BudgetRange::from_label("₦500k - ₦1.5M"), None);
        assert_eq!(Timeline::from_label("Within 1 Month"), Some(Timeline::WithinOneMonth));
    }
}
