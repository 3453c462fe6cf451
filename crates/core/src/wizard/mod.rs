pub mod engine;
pub mod message;
pub mod request;
pub mod schema;
pub mod states;

pub use engine::{controls_for, transition, QuoteWizard, WizardError};
pub use message::{compose, FastTrackMessage, DEFAULT_WHATSAPP_NUMBER};
pub use request::{can_proceed_from_investment, can_submit, BudgetRange, QuoteRequest, Timeline};
pub use schema::{schema_for, FieldDescriptor, FieldKind, FieldOption, Route, RouteOption, ROUTE_OPTIONS};
pub use states::{Controls, Phase, TransitionOutcome, WizardAction, WizardEvent};
