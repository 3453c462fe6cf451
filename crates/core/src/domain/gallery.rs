use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{require_non_empty, Record, RowId};
use crate::errors::DomainError;
use crate::pricing::parse_price_label;

const LOW_STOCK_THRESHOLD: u32 = 5;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RowId>,
    pub name: String,
    pub price: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub stock_count: u32,
    #[serde(default)]
    pub is_sold_out: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl GalleryItem {
    pub fn unit_price(&self) -> Decimal {
        parse_price_label(&self.price)
    }

    /// Shown as an "Only N Left" badge.
    pub fn low_stock(&self) -> Option<u32> {
        (!self.is_sold_out && (1..=LOW_STOCK_THRESHOLD).contains(&self.stock_count))
            .then_some(self.stock_count)
    }
}

impl Record for GalleryItem {
    const TABLE: &'static str = "gallery_items";

    fn id(&self) -> Option<&RowId> {
        self.id.as_ref()
    }

    fn validate(&self) -> Result<(), DomainError> {
        require_non_empty(&self.name, "Item name is required")?;
        if !self.price.chars().any(|c| c.is_ascii_digit()) {
            return Err(DomainError::InvariantViolation(
                "Item price must contain an amount".to_owned(),
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryFee {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RowId>,
    pub state: String,
    pub park_name: String,
    pub fee: Decimal,
}

impl Record for DeliveryFee {
    const TABLE: &'static str = "delivery_fees";

    fn id(&self) -> Option<&RowId> {
        self.id.as_ref()
    }

    fn validate(&self) -> Result<(), DomainError> {
        require_non_empty(&self.state, "Delivery state is required")?;
        require_non_empty(&self.park_name, "Park name is required")?;
        if self.fee.is_sign_negative() {
            return Err(DomainError::InvariantViolation(
                "Delivery fee cannot be negative".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Row written to `orders` when a gallery checkout is placed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryOrder {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RowId>,
    pub item_id: Option<RowId>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub quantity: u32,
    pub delivery_type: String,
    #[serde(default)]
    pub house_number: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub landmark: String,
    #[serde(default)]
    pub landmark_description: String,
    #[serde(default)]
    pub park_name: String,
    pub delivery_fee: Decimal,
    pub total_price: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Record for GalleryOrder {
    const TABLE: &'static str = "orders";

    fn id(&self) -> Option<&RowId> {
        self.id.as_ref()
    }

    fn validate(&self) -> Result<(), DomainError> {
        require_non_empty(&self.customer_name, "Customer name is required")?;
        require_non_empty(&self.customer_email, "Customer email is required")?;
        if self.quantity == 0 {
            return Err(DomainError::InvariantViolation("Quantity must be at least 1".to_owned()));
        }
        Ok(())
    }
}
