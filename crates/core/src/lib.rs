pub mod admin;
pub mod audit;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;
pub mod pricing;
pub mod session;
pub mod wizard;

pub use admin::{DashboardStats, RecordPatch, SocialOrderFilter};
pub use catalog::CatalogSnapshot;
pub use domain::gallery::{DeliveryFee, GalleryItem, GalleryOrder};
pub use domain::lead::Lead;
pub use domain::portfolio::{Project, Vault, VaultFilter};
pub use domain::social::{
    Audience, OrderStatus, PackageCategory, PaymentStatus, SocialFeature, SocialOrder,
    SocialPackage,
};
pub use domain::{Record, RowId};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use pricing::gallery::{CheckoutStep, CheckoutSummary, DeliveryMode, GalleryCheckout};
pub use pricing::social::{CustomPlan, GrowthCalculator};
pub use pricing::PricingError;
pub use session::{AdminSession, SessionContext};
pub use wizard::{
    BudgetRange, Controls, Phase, QuoteRequest, QuoteWizard, Route, Timeline, TransitionOutcome,
    WizardAction, WizardError, WizardEvent,
};
