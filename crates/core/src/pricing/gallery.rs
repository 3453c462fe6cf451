use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::CatalogSnapshot;
use crate::domain::gallery::{DeliveryFee, GalleryItem, GalleryOrder};
use crate::pricing::{format_naira, PricingError};

pub const ORDER_PENDING: &str = "pending";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMode {
    #[default]
    Doorstep,
    BusPark,
}

impl DeliveryMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Doorstep => "doorstep",
            Self::BusPark => "bus_park",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    #[default]
    Contact,
    Delivery,
    Review,
    Placed,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoorstepAddress {
    #[serde(default)]
    pub house_number: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub landmark: String,
    #[serde(default)]
    pub landmark_description: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CheckoutSummary {
    pub item_total: Decimal,
    pub delivery_fee: Decimal,
    pub total: Decimal,
    pub total_label: String,
    pub fee_to_be_quoted: bool,
    pub call_to_action: &'static str,
}

/// In-progress purchase of a single gallery item.
///
/// `state` is shared by both delivery modes. Changing it drops the chosen park
/// and its fee so a fee from another state can never survive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GalleryCheckout {
    item: GalleryItem,
    fees: CatalogSnapshot<DeliveryFee>,
    step: CheckoutStep,
    quantity: u32,
    customer: CustomerDetails,
    mode: DeliveryMode,
    address: DoorstepAddress,
    state: String,
    park_name: String,
    delivery_fee: Decimal,
}

impl GalleryCheckout {
    pub fn start(item: GalleryItem, fees: CatalogSnapshot<DeliveryFee>) -> Result<Self, PricingError> {
        if item.is_sold_out {
            return Err(PricingError::SoldOut { item: item.name });
        }
        Ok(Self {
            item,
            fees,
            step: CheckoutStep::Contact,
            quantity: 1,
            customer: CustomerDetails::default(),
            mode: DeliveryMode::Doorstep,
            address: DoorstepAddress::default(),
            state: String::new(),
            park_name: String::new(),
            delivery_fee: Decimal::ZERO,
        })
    }

    pub fn item(&self) -> &GalleryItem {
        &self.item
    }

    pub fn step(&self) -> CheckoutStep {
        self.step
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn mode(&self) -> DeliveryMode {
        self.mode
    }

    pub fn delivery_fee(&self) -> Decimal {
        self.delivery_fee
    }

    pub fn max_quantity(&self) -> u32 {
        self.item.stock_count.max(1)
    }

    pub fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity.clamp(1, self.max_quantity());
    }

    pub fn increment(&mut self) {
        self.set_quantity(self.quantity.saturating_add(1));
    }

    pub fn decrement(&mut self) {
        self.set_quantity(self.quantity.saturating_sub(1));
    }

    pub fn set_customer(&mut self, customer: CustomerDetails) {
        self.customer = customer;
    }

    pub fn set_address(&mut self, address: DoorstepAddress) {
        self.address = address;
    }

    pub fn set_mode(&mut self, mode: DeliveryMode) {
        self.mode = mode;
        self.delivery_fee = match mode {
            DeliveryMode::Doorstep => Decimal::ZERO,
            DeliveryMode::BusPark => self.lookup_fee(),
        };
    }

    pub fn set_state(&mut self, state: impl Into<String>) {
        self.state = state.into();
        self.park_name.clear();
        self.delivery_fee = Decimal::ZERO;
    }

    pub fn set_park(&mut self, park_name: impl Into<String>) {
        self.park_name = park_name.into();
        if self.mode == DeliveryMode::BusPark {
            self.delivery_fee = self.lookup_fee();
        }
    }

    /// States with at least one park, in fetch order.
    pub fn park_states(&self) -> Vec<&str> {
        let mut states: Vec<&str> = Vec::new();
        for fee in self.fees.rows() {
            if !states.contains(&fee.state.as_str()) {
                states.push(fee.state.as_str());
            }
        }
        states
    }

    pub fn parks_in_state(&self) -> Vec<&DeliveryFee> {
        self.fees.filter(|fee| fee.state == self.state)
    }

    fn lookup_fee(&self) -> Decimal {
        self.fees
            .first_match(|fee| fee.state == self.state && fee.park_name == self.park_name)
            .map(|fee| fee.fee)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn missing_contact_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.customer.name.is_empty() {
            missing.push("name");
        }
        if self.customer.email.is_empty() {
            missing.push("email");
        }
        if self.customer.phone.is_empty() {
            missing.push("phone");
        }
        missing
    }

    pub fn missing_delivery_fields(&self) -> Vec<&'static str> {
        let required: Vec<(&'static str, &str)> = match self.mode {
            DeliveryMode::Doorstep => vec![
                ("house_number", self.address.house_number.as_str()),
                ("street", self.address.street.as_str()),
                ("city", self.address.city.as_str()),
                ("state", self.state.as_str()),
                ("landmark", self.address.landmark.as_str()),
            ],
            DeliveryMode::BusPark => {
                vec![("state", self.state.as_str()), ("park_name", self.park_name.as_str())]
            }
        };
        required.into_iter().filter(|(_, value)| value.is_empty()).map(|(key, _)| key).collect()
    }

    pub fn can_proceed(&self) -> bool {
        match self.step {
            CheckoutStep::Contact => self.missing_contact_fields().is_empty(),
            CheckoutStep::Delivery => self.missing_delivery_fields().is_empty(),
            CheckoutStep::Review | CheckoutStep::Placed => false,
        }
    }

    pub fn proceed(&mut self) -> Result<CheckoutStep, PricingError> {
        let (missing, next) = match self.step {
            CheckoutStep::Contact => (self.missing_contact_fields(), CheckoutStep::Delivery),
            CheckoutStep::Delivery => (self.missing_delivery_fields(), CheckoutStep::Review),
            step => {
                return Err(PricingError::WrongStep { step, expected: CheckoutStep::Delivery })
            }
        };
        if !missing.is_empty() {
            return Err(PricingError::Gated { step: self.step, missing });
        }
        self.step = next;
        Ok(next)
    }

    pub fn back(&mut self) -> CheckoutStep {
        self.step = match self.step {
            CheckoutStep::Delivery => CheckoutStep::Contact,
            CheckoutStep::Review => CheckoutStep::Delivery,
            other => other,
        };
        self.step
    }

    pub fn item_total(&self) -> Decimal {
        self.item.unit_price() * Decimal::from(self.quantity)
    }

    pub fn summary(&self) -> CheckoutSummary {
        let item_total = self.item_total();
        let (delivery_fee, fee_to_be_quoted, call_to_action) = match self.mode {
            DeliveryMode::BusPark => (self.delivery_fee, false, "PROCEED TO PAYMENT"),
            DeliveryMode::Doorstep => (Decimal::ZERO, true, "REQUEST QUOTE"),
        };
        let total = item_total + delivery_fee;
        CheckoutSummary {
            item_total,
            delivery_fee,
            total,
            total_label: format_naira(total),
            fee_to_be_quoted,
            call_to_action,
        }
    }

    /// Builds the `orders` row; only valid once the buyer is reviewing.
    pub fn to_order(&self) -> Result<GalleryOrder, PricingError> {
        if self.step != CheckoutStep::Review {
            return Err(PricingError::WrongStep { step: self.step, expected: CheckoutStep::Review });
        }
        let summary = self.summary();
        Ok(GalleryOrder {
            id: None,
            item_id: self.item.id.clone(),
            customer_name: self.customer.name.clone(),
            customer_email: self.customer.email.clone(),
            customer_phone: self.customer.phone.clone(),
            quantity: self.quantity,
            delivery_type: self.mode.as_str().to_owned(),
            house_number: self.address.house_number.clone(),
            street: self.address.street.clone(),
            city: self.address.city.clone(),
            state: self.state.clone(),
            landmark: self.address.landmark.clone(),
            landmark_description: self.address.landmark_description.clone(),
            park_name: self.park_name.clone(),
            delivery_fee: summary.delivery_fee,
            total_price: summary.total_label,
            status: ORDER_PENDING.to_owned(),
            created_at: None,
        })
    }

    /// Called after the gateway accepted the order row.
    pub fn mark_placed(&mut self) {
        if self.step == CheckoutStep::Review {
            self.step = CheckoutStep::Placed;
        }
    }
}
