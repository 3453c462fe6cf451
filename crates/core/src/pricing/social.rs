use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::catalog::CatalogSnapshot;
use crate::domain::social::{
    Audience, OrderStatus, PackageCategory, PaymentStatus, SocialFeature, SocialOrder,
    SocialPackage,
};
use crate::domain::RowId;
use crate::pricing::{format_naira, order_total, PricingError};

pub const DEFAULT_PLATFORM: &str = "instagram";
pub const DEFAULT_QUANTITY: u32 = 1_000;
pub const MIN_QUANTITY: u32 = 100;
pub const MAX_QUANTITY: u32 = 10_000;
pub const QUANTITY_STEP: u32 = 100;
pub const CUSTOM_QUANTITIES: [u32; 4] = [5, 10, 15, 20];

/// `followers_count` is shown as `FOLLOWERS COUNT`.
pub fn service_label(service_type: &str) -> String {
    service_type.replace('_', " ").to_uppercase()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GrowthQuote {
    pub platform: String,
    pub service: String,
    pub audience: Audience,
    pub quantity: u32,
    pub services: Vec<String>,
    pub unit_price: Option<Decimal>,
    pub total: Decimal,
    pub total_label: String,
    pub checkout_enabled: bool,
}

/// Pay-per-unit growth order builder over the active package catalogue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrowthCalculator {
    packages: CatalogSnapshot<SocialPackage>,
    platform: String,
    service: String,
    audience: Audience,
    quantity: u32,
    target_link: String,
    customer_email: String,
    tos_accepted: bool,
}

impl GrowthCalculator {
    pub fn new(packages: CatalogSnapshot<SocialPackage>) -> Self {
        let service = packages
            .first_match(|package| {
                package.platform == DEFAULT_PLATFORM
                    && package.category == PackageCategory::GrowthMetric
            })
            .map(|package| package.service_type.clone())
            .unwrap_or_default();
        let mut calculator = Self {
            packages,
            platform: DEFAULT_PLATFORM.to_owned(),
            service,
            audience: Audience::default(),
            quantity: DEFAULT_QUANTITY,
            target_link: String::new(),
            customer_email: String::new(),
            tos_accepted: false,
        };
        calculator.sync_service();
        calculator
    }

    pub fn platform(&self) -> &str {
        &self.platform
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn audience(&self) -> Audience {
        self.audience
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn set_platform(&mut self, platform: impl Into<String>) {
        self.platform = platform.into();
        self.sync_service();
    }

    pub fn set_audience(&mut self, audience: Audience) {
        self.audience = audience;
        self.sync_service();
    }

    pub fn set_service(&mut self, service: impl Into<String>) {
        self.service = service.into();
    }

    /// Follows the slider: clamped to its range and snapped down to a step.
    pub fn set_quantity(&mut self, quantity: u32) {
        let clamped = quantity.clamp(MIN_QUANTITY, MAX_QUANTITY);
        self.quantity = clamped - clamped % QUANTITY_STEP;
    }

    pub fn set_target_link(&mut self, target_link: impl Into<String>) {
        self.target_link = target_link.into();
    }

    pub fn set_customer_email(&mut self, email: impl Into<String>) {
        self.customer_email = email.into();
    }

    pub fn accept_terms(&mut self, accepted: bool) {
        self.tos_accepted = accepted;
    }

    /// Service types offered for the current platform and audience, in fetch order.
    pub fn services(&self) -> Vec<String> {
        let mut services: Vec<String> = Vec::new();
        for package in self.packages.filter(|package| {
            package.platform == self.platform
                && package.audience_type == self.audience
                && package.category == PackageCategory::GrowthMetric
        }) {
            if !services.contains(&package.service_type) {
                services.push(package.service_type.clone());
            }
        }
        services
    }

    /// The current service while it is still offered, else the first offered one.
    pub fn default_service(&self) -> Option<String> {
        let offered = self.services();
        if offered.contains(&self.service) {
            return Some(self.service.clone());
        }
        offered.into_iter().next()
    }

    fn sync_service(&mut self) {
        if let Some(service) = self.default_service() {
            self.service = service;
        }
    }

    pub fn package(&self) -> Option<&SocialPackage> {
        if self.service.is_empty() {
            return None;
        }
        self.packages.first_match(|package| {
            package.platform == self.platform
                && package.service_type == self.service
                && package.audience_type == self.audience
                && package.category == PackageCategory::GrowthMetric
        })
    }

    pub fn unit_price(&self) -> Option<Decimal> {
        self.package().map(|package| package.unit_price)
    }

    pub fn total(&self) -> Decimal {
        self.unit_price()
            .map(|unit_price| order_total(&[(unit_price, self.quantity)]))
            .unwrap_or(Decimal::ZERO)
    }

    pub fn checkout_enabled(&self) -> bool {
        self.tos_accepted && self.total() > Decimal::ZERO
    }

    pub fn quote(&self) -> GrowthQuote {
        let total = self.total();
        GrowthQuote {
            platform: self.platform.clone(),
            service: self.service.clone(),
            audience: self.audience,
            quantity: self.quantity,
            services: self.services(),
            unit_price: self.unit_price(),
            total,
            total_label: format_naira(total),
            checkout_enabled: self.checkout_enabled(),
        }
    }

    pub fn to_order(&self) -> Result<SocialOrder, PricingError> {
        if !self.tos_accepted {
            return Err(PricingError::TermsNotAccepted);
        }
        if self.target_link.is_empty() {
            return Err(PricingError::MissingTargetLink);
        }
        let package = self.package().ok_or(PricingError::ServiceUnavailable)?;
        let total = self.total();
        if total <= Decimal::ZERO {
            return Err(PricingError::EmptySelection);
        }
        Ok(SocialOrder {
            id: None,
            package_id: package.id.clone(),
            customer_email: self.customer_email.clone(),
            target_link: self.target_link.clone(),
            quantity: self.quantity,
            total_price: total,
            status: OrderStatus::Uncomplete,
            payment_status: PaymentStatus::Unpaid,
            created_at: None,
            package: None,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CustomRow {
    pub row_id: String,
    pub feature_id: Option<RowId>,
    pub quantity: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CustomPlanQuote {
    pub items: Vec<String>,
    pub total: Decimal,
    pub total_label: String,
    pub checkout_enabled: bool,
}

/// Build-your-own management plan: one row per feature, each with a fixed size.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CustomPlan {
    features: CatalogSnapshot<SocialFeature>,
    packages: CatalogSnapshot<SocialPackage>,
    rows: Vec<CustomRow>,
    brief: String,
    tos_accepted: bool,
}

impl CustomPlan {
    pub fn new(
        features: CatalogSnapshot<SocialFeature>,
        packages: CatalogSnapshot<SocialPackage>,
    ) -> Self {
        Self { features, packages, rows: Vec::new(), brief: String::new(), tos_accepted: false }
    }

    pub fn rows(&self) -> &[CustomRow] {
        &self.rows
    }

    pub fn add_row(&mut self) -> String {
        let row_id: String = Uuid::new_v4().simple().to_string().chars().take(9).collect();
        self.rows.push(CustomRow {
            row_id: row_id.clone(),
            feature_id: None,
            quantity: CUSTOM_QUANTITIES[0],
        });
        row_id
    }

    fn row_mut(&mut self, row_id: &str) -> Result<&mut CustomRow, PricingError> {
        self.rows
            .iter_mut()
            .find(|row| row.row_id == row_id)
            .ok_or_else(|| PricingError::UnknownRow(row_id.to_owned()))
    }

    pub fn select_feature(
        &mut self,
        row_id: &str,
        feature_id: Option<RowId>,
    ) -> Result<(), PricingError> {
        self.row_mut(row_id)?.feature_id = feature_id;
        Ok(())
    }

    pub fn set_row_quantity(&mut self, row_id: &str, quantity: u32) -> Result<(), PricingError> {
        if !CUSTOM_QUANTITIES.contains(&quantity) {
            return Err(PricingError::QuantityNotOffered(quantity));
        }
        self.row_mut(row_id)?.quantity = quantity;
        Ok(())
    }

    pub fn remove_row(&mut self, row_id: &str) -> Result<(), PricingError> {
        let before = self.rows.len();
        self.rows.retain(|row| row.row_id != row_id);
        if self.rows.len() == before {
            return Err(PricingError::UnknownRow(row_id.to_owned()));
        }
        Ok(())
    }

    pub fn set_brief(&mut self, brief: impl Into<String>) {
        self.brief = brief.into();
    }

    pub fn accept_terms(&mut self, accepted: bool) {
        self.tos_accepted = accepted;
    }

    /// Name and unit price for `id`, checking features before bundle packages.
    fn priced(&self, id: &RowId) -> Option<(&str, Decimal)> {
        self.features
            .first_match(|feature| feature.id.as_ref() == Some(id))
            .map(|feature| (feature.name.as_str(), feature.unit_price))
            .or_else(|| {
                self.packages
                    .first_match(|package| {
                        package.category == PackageCategory::Bundle
                            && package.id.as_ref() == Some(id)
                    })
                    .map(|package| (package.name.as_str(), package.unit_price))
            })
    }

    pub fn total(&self) -> Decimal {
        let lines: Vec<(Decimal, u32)> = self
            .rows
            .iter()
            .filter_map(|row| {
                let id = row.feature_id.as_ref()?;
                self.priced(id).map(|(_, unit_price)| (unit_price, row.quantity))
            })
            .collect();
        order_total(&lines)
    }

    pub fn summary_lines(&self) -> Vec<String> {
        self.rows
            .iter()
            .filter_map(|row| {
                let id = row.feature_id.as_ref()?;
                self.priced(id).map(|(name, _)| format!("{name} (x{})", row.quantity))
            })
            .collect()
    }

    pub fn checkout_enabled(&self) -> bool {
        self.tos_accepted && self.total() > Decimal::ZERO
    }

    pub fn quote(&self) -> CustomPlanQuote {
        let total = self.total();
        CustomPlanQuote {
            items: self.summary_lines(),
            total,
            total_label: format_naira(total),
            checkout_enabled: self.checkout_enabled(),
        }
    }

    pub fn checkout(&self) -> Result<CustomPlanQuote, PricingError> {
        if !self.tos_accepted {
            return Err(PricingError::TermsNotAccepted);
        }
        if self.brief.is_empty() {
            return Err(PricingError::MissingBrief);
        }
        if self.total() <= Decimal::ZERO {
            return Err(PricingError::EmptySelection);
        }
        Ok(self.quote())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ManagementTier {
    pub package: SocialPackage,
    pub most_popular: bool,
}

/// Management packages cheapest first; the second tier carries the badge.
pub fn management_tiers(packages: &CatalogSnapshot<SocialPackage>) -> Vec<ManagementTier> {
    let mut tiers: Vec<&SocialPackage> =
        packages.filter(|package| package.category == PackageCategory::Management);
    tiers.sort_by(|a, b| a.unit_price.cmp(&b.unit_price));
    tiers
        .into_iter()
        .enumerate()
        .map(|(index, package)| ManagementTier { package: package.clone(), most_popular: index == 1 })
        .collect()
}
