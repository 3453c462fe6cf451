use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Record, RowId};
use crate::errors::DomainError;
use crate::wizard::{can_submit, QuoteRequest, Route};

pub const NEW_LEAD_STATUS: &str = "new";

/// A submitted quote request, as stored in `leads`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RowId>,
    pub route: Route,
    #[serde(default)]
    pub specifics: BTreeMap<String, String>,
    pub budget: String,
    pub timeline: String,
    pub name: String,
    pub email: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Lead {
    pub fn from_request(request: &QuoteRequest) -> Result<Self, DomainError> {
        let route = request.route.ok_or_else(|| {
            DomainError::InvariantViolation("A project category must be selected".to_owned())
        })?;
        let lead = Self {
            id: None,
            route,
            specifics: request.specifics.clone(),
            budget: request.budget.clone(),
            timeline: request.timeline.clone(),
            name: request.name.clone(),
            email: request.email.clone(),
            status: NEW_LEAD_STATUS.to_owned(),
            created_at: None,
        };
        lead.validate()?;
        Ok(lead)
    }
}

impl Record for Lead {
    const TABLE: &'static str = "leads";

    fn id(&self) -> Option<&RowId> {
        self.id.as_ref()
    }

    fn validate(&self) -> Result<(), DomainError> {
        let request = QuoteRequest {
            route: Some(self.route),
            specifics: BTreeMap::new(),
            budget: self.budget.clone(),
            timeline: self.timeline.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
        };
        if !can_submit(&request) {
            return Err(DomainError::InvariantViolation(format!(
                "Lead is missing {:?}",
                request.missing_submission_fields()
            )));
        }
        Ok(())
    }
}
