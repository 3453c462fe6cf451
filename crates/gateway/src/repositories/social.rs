use std::sync::Arc;

use jesprec_core::{
    admin::{RecordPatch, SocialOrderFilter},
    domain::{
        social::{OrderStatus, PaymentStatus, SocialOrder},
        Record, RowId,
    },
};

use crate::{
    error::GatewayError,
    filter::{Filter, Order, Query},
    gateway::Gateway,
    repositories::TableRepository,
};

pub const ORDER_NOT_FOUND: &str = "Order not found. Please check your ID.";

const TRACKING_SELECT: &str = "*, social_packages(name, platform)";
const ADMIN_SELECT: &str = "*, social_packages(name, platform, service_type, category)";

#[derive(Clone)]
pub struct SocialOrderRepository {
    orders: TableRepository<SocialOrder>,
}

impl SocialOrderRepository {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { orders: TableRepository::new(gateway) }
    }

    pub async fn place(&self, order: &SocialOrder) -> Result<SocialOrder, GatewayError> {
        self.orders.insert(order).await
    }

    /// Looks an order up by full id or id prefix. Anything other than exactly
    /// one match is `NotFound`, and so is input that could not be part of a
    /// UUID.
    pub async fn track(&self, partial_id: &str) -> Result<SocialOrder, GatewayError> {
        let partial_id = partial_id.trim();
        if !is_id_fragment(partial_id) {
            return Err(GatewayError::NotFound(ORDER_NOT_FOUND.to_owned()));
        }
        let query = Query::new()
            .select(TRACKING_SELECT)
            .filter(Filter::or(vec![
                Filter::eq("id", partial_id),
                Filter::ilike_prefix("id", partial_id),
            ]))
            .limit(2);
        let mut matches = self.orders.list_where(&query).await?;
        match matches.len() {
            1 => Ok(matches.remove(0)),
            _ => Err(GatewayError::NotFound(ORDER_NOT_FOUND.to_owned())),
        }
    }

    /// Newest first, with the package embedded so search can see its name.
    pub async fn list(&self, filter: &SocialOrderFilter) -> Result<Vec<SocialOrder>, GatewayError> {
        let mut query = Query::new().select(ADMIN_SELECT).order(Order::desc("created_at"));
        if let Some(status) = filter.status {
            query = query.filter(Filter::eq("status", status.as_str()));
        }
        let orders = self.orders.list_where(&query).await?;
        Ok(filter.apply(orders))
    }

    pub async fn set_status(
        &self,
        id: &RowId,
        status: OrderStatus,
    ) -> Result<SocialOrder, GatewayError> {
        self.orders.patch(id, &RecordPatch::SocialOrderStatus { status }).await
    }

    pub async fn set_payment(
        &self,
        id: &RowId,
        payment_status: PaymentStatus,
    ) -> Result<SocialOrder, GatewayError> {
        self.orders.patch(id, &RecordPatch::SocialOrderPayment { payment_status }).await
    }

    pub fn table(&self) -> &'static str {
        SocialOrder::TABLE
    }
}

fn is_id_fragment(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|ch| ch.is_ascii_hexdigit() || ch == '-')
}
