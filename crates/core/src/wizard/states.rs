use serde::{Deserialize, Serialize};

use crate::wizard::schema::Route;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Gateway,
    DeepDive,
    Investment,
    Finalize,
    Success,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gateway => "GATEWAY",
            Self::DeepDive => "DEEP_DIVE",
            Self::Investment => "INVESTMENT",
            Self::Finalize => "FINALIZE",
            Self::Success => "SUCCESS",
        }
    }

    /// Position in the progress bar, 1-based.
    pub fn step_number(self) -> u8 {
        match self {
            Self::Gateway => 1,
            Self::DeepDive => 2,
            Self::Investment => 3,
            Self::Finalize => 4,
            Self::Success => 5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WizardEvent {
    SelectRoute { route: Route },
    SetSpecific { key: String, value: String },
    SetBudget { label: String },
    SetTimeline { label: String },
    SetName { value: String },
    SetEmail { value: String },
    Proceed,
    Back,
    Submit,
    Restart,
}

impl WizardEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SelectRoute { .. } => "select_route",
            Self::SetSpecific { .. } => "set_specific",
            Self::SetBudget { .. } => "set_budget",
            Self::SetTimeline { .. } => "set_timeline",
            Self::SetName { .. } => "set_name",
            Self::SetEmail { .. } => "set_email",
            Self::Proceed => "proceed",
            Self::Back => "back",
            Self::Submit => "submit",
            Self::Restart => "restart",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WizardAction {
    RenderFieldSchema { route: Route },
    RequestContactDetails,
    PersistLead,
    ComposeFastTrackMessage,
    ResetRequest,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub from: Phase,
    pub to: Phase,
    pub event: WizardEvent,
    pub actions: Vec<WizardAction>,
}

/// Enabled state of the wizard's navigation controls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Controls {
    pub proceed_enabled: bool,
    pub submit_enabled: bool,
    pub back_enabled: bool,
    pub restart_enabled: bool,
}
