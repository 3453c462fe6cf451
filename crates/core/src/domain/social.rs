use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{require_non_empty, Record, RowId};
use crate::errors::DomainError;

pub const PLATFORMS: [&str; 7] =
    ["instagram", "youtube", "tiktok", "facebook", "x", "linkedin", "spotify"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageCategory {
    Management,
    GrowthMetric,
    Bundle,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    #[default]
    Nigeria,
    Worldwide,
    Mixed,
}

impl Audience {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "nigeria" => Some(Self::Nigeria),
            "worldwide" => Some(Self::Worldwide),
            "mixed" => Some(Self::Mixed),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialPackage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RowId>,
    pub name: String,
    pub category: PackageCategory,
    pub platform: String,
    #[serde(default)]
    pub service_type: String,
    pub audience_type: Audience,
    pub unit_price: Decimal,
    #[serde(default)]
    pub min_quantity: u32,
    #[serde(default)]
    pub max_quantity: u32,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
}

impl Record for SocialPackage {
    const TABLE: &'static str = "social_packages";

    fn id(&self) -> Option<&RowId> {
        self.id.as_ref()
    }

    fn validate(&self) -> Result<(), DomainError> {
        require_non_empty(&self.name, "Package name is required")?;
        require_non_empty(&self.platform, "Package platform is required")?;
        if self.unit_price.is_sign_negative() {
            return Err(DomainError::InvariantViolation(
                "Unit price cannot be negative".to_owned(),
            ));
        }
        if self.max_quantity < self.min_quantity {
            return Err(DomainError::InvariantViolation(
                "Maximum quantity must not be below the minimum".to_owned(),
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialFeature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RowId>,
    pub name: String,
    pub unit_price: Decimal,
    #[serde(default = "one")]
    pub min_qty: u32,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
}

impl Record for SocialFeature {
    const TABLE: &'static str = "social_features";

    fn id(&self) -> Option<&RowId> {
        self.id.as_ref()
    }

    fn validate(&self) -> Result<(), DomainError> {
        require_non_empty(&self.name, "Feature name is required")?;
        if self.unit_price.is_sign_negative() {
            return Err(DomainError::InvariantViolation("Please enter a valid price".to_owned()));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    #[default]
    #[serde(rename = "uncomplete")]
    Uncomplete,
    #[serde(rename = "in progress")]
    InProgress,
    #[serde(rename = "processing")]
    Processing,
    #[serde(rename = "completed")]
    Completed,
    #[serde(rename = "failed")]
    Failed,
    #[serde(rename = "pending")]
    Pending,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Uncomplete,
        OrderStatus::InProgress,
        OrderStatus::Processing,
        OrderStatus::Completed,
        OrderStatus::Failed,
        OrderStatus::Pending,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uncomplete => "uncomplete",
            Self::InProgress => "in progress",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Pending => "pending",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL.into_iter().find(|status| status.as_str().eq_ignore_ascii_case(value))
    }

    /// Width of the tracking progress bar.
    pub fn progress_pct(self) -> u8 {
        match self {
            Self::Completed => 100,
            Self::Processing => 65,
            _ => 15,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Paid,
    Refunded,
}

impl PaymentStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "unpaid" => Some(Self::Unpaid),
            "paid" => Some(Self::Paid),
            "refunded" => Some(Self::Refunded),
            _ => None,
        }
    }
}

/// Package columns embedded alongside an order by the gateway.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSummary {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub service_type: Option<String>,
    #[serde(default)]
    pub category: Option<PackageCategory>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialOrder {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RowId>,
    pub package_id: Option<RowId>,
    pub customer_email: String,
    pub target_link: String,
    pub quantity: u32,
    pub total_price: Decimal,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, rename = "social_packages", skip_serializing)]
    pub package: Option<PackageSummary>,
}

impl Record for SocialOrder {
    const TABLE: &'static str = "social_orders";

    fn id(&self) -> Option<&RowId> {
        self.id.as_ref()
    }

    fn validate(&self) -> Result<(), DomainError> {
        require_non_empty(&self.target_link, "Please provide a link to your profile or post.")?;
        if self.quantity == 0 {
            return Err(DomainError::InvariantViolation("Quantity must be at least 1".to_owned()));
        }
        Ok(())
    }
}

fn active_by_default() -> bool {
    true
}

fn one() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::{OrderStatus, PaymentStatus, SocialOrder};

    #[test]
    fn statuses_use_the_stored_spelling() {
        assert_eq!(serde_json::to_value(OrderStatus::InProgress).expect("json"), "in progress");
        assert_eq!(OrderStatus::parse("Completed"), Some(OrderStatus::Completed));
        assert_eq!(PaymentStatus::parse("PAID"), Some(PaymentStatus::Paid));
        assert_eq!(OrderStatus::parse("shipped"), None);
    }

    #[test]
    fn tracking_progress_follows_status() {
        assert_eq!(OrderStatus::Completed.progress_pct(), 100);
        assert_eq!(OrderStatus::Processing.progress_pct(), 65);
        assert_eq!(OrderStatus::InProgress.progress_pct(), 15);
        assert_eq!(OrderStatus::Failed.progress_pct(), 15);
    }

    #[test]
    fn embedded_package_is_read_but_never_written() {
        let order: SocialOrder = serde_json::from_value(serde_json::json!({
            "id": "7f3c2a10-0000-4000-8000-000000000001",
            "package_id": "pkg-1",
            "customer_email": "ada@example.com",
            "target_link": "https://instagram.com/ada",
            "quantity": 1000,
            "total_price": 50000,
            "status": "processing",
            "payment_status": "paid",
            "social_packages": { "name": "Nigerian Followers", "platform": "instagram" }
        }))
        .expect("decode");

        assert_eq!(order.package.as_ref().map(|p| p.name.as_str()), Some("Nigerian Followers"));
        let written = serde_json::to_value(&order).expect("encode");
        assert!(written.get("social_packages").is_none());
        assert_eq!(written["status"], "processing");
    }
}
