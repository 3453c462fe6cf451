use std::sync::Arc;

use jesprec_core::{
    admin::DashboardStats,
    catalog::CatalogSnapshot,
    domain::{
        gallery::{DeliveryFee, GalleryItem},
        lead::Lead,
        portfolio::Project,
        social::{SocialFeature, SocialPackage},
        Record,
    },
};

use crate::{
    error::GatewayError,
    filter::{Filter, Order, Query},
    gateway::Gateway,
    repositories::decode_rows,
};

/// Read models for the public storefront and the admin lists.
#[derive(Clone)]
pub struct CatalogRepository {
    gateway: Arc<dyn Gateway>,
}

impl CatalogRepository {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    async fn snapshot<T: Record>(&self, query: Query) -> Result<CatalogSnapshot<T>, GatewayError> {
        let rows = self.gateway.select(T::TABLE, &query).await?;
        Ok(CatalogSnapshot::loaded(decode_rows(rows)?))
    }

    pub async fn portfolio(&self) -> Result<CatalogSnapshot<Project>, GatewayError> {
        self.snapshot(Query::new().order(Order::desc("created_at"))).await
    }

    pub async fn gallery(&self) -> Result<CatalogSnapshot<GalleryItem>, GatewayError> {
        self.snapshot(Query::new().order(Order::desc("created_at"))).await
    }

    pub async fn delivery_fees(&self) -> Result<CatalogSnapshot<DeliveryFee>, GatewayError> {
        self.snapshot(Query::new().order(Order::asc("state"))).await
    }

    pub async fn active_packages(&self) -> Result<CatalogSnapshot<SocialPackage>, GatewayError> {
        self.snapshot(Query::new().filter(Filter::eq("is_active", true))).await
    }

    pub async fn active_features(&self) -> Result<CatalogSnapshot<SocialFeature>, GatewayError> {
        self.snapshot(Query::new().filter(Filter::eq("is_active", true)).order(Order::asc("category")))
            .await
    }

    /// Admin package list, inactive rows included.
    pub async fn all_packages(&self) -> Result<CatalogSnapshot<SocialPackage>, GatewayError> {
        self.snapshot(Query::new().order(Order::asc("platform"))).await
    }

    pub async fn all_features(&self) -> Result<CatalogSnapshot<SocialFeature>, GatewayError> {
        self.snapshot(Query::new().order(Order::asc("category"))).await
    }

    pub async fn dashboard_stats(&self) -> Result<DashboardStats, GatewayError> {
        let everything = Query::new();
        let (projects, gallery_items, leads) = tokio::try_join!(
            self.gateway.count(Project::TABLE, &everything),
            self.gateway.count(GalleryItem::TABLE, &everything),
            self.gateway.count(Lead::TABLE, &everything),
        )?;
        Ok(DashboardStats { projects, gallery_items, leads })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::CatalogRepository;
    use crate::{error::GatewayError, gateway::Gateway, memory::InMemoryGateway};

    #[tokio::test]
    async fn inactive_packages_are_hidden_from_the_storefront() -> Result<(), GatewayError> {
        let gateway = InMemoryGateway::new();
        gateway
            .insert(
                "social_packages",
                vec![
                    json!({ "name": "IG Followers", "category": "growth_metric", "platform": "instagram",
                            "service_type": "followers", "audience_type": "nigeria", "unit_price": 2.5,
                            "is_active": true }),
                    json!({ "name": "Retired", "category": "growth_metric", "platform": "instagram",
                            "service_type": "likes", "audience_type": "nigeria", "unit_price": 1,
                            "is_active": false }),
                ],
            )
            .await?;
        let catalog = CatalogRepository::new(Arc::new(gateway));

        let active = catalog.active_packages().await?;
        assert!(active.is_loaded());
        assert_eq!(active.len(), 1);
        assert_eq!(catalog.all_packages().await?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn dashboard_counts_three_tables() -> Result<(), GatewayError> {
        let gateway = InMemoryGateway::new();
        gateway.insert("projects", vec![json!({ "title": "A", "vault": "Visual Vault" })]).await?;
        gateway.insert("leads", vec![json!({}), json!({})]).await?;
        let catalog = CatalogRepository::new(Arc::new(gateway));

        let stats = catalog.dashboard_stats().await?;
        assert_eq!((stats.projects, stats.gallery_items, stats.leads), (1, 0, 2));
        Ok(())
    }

    #[tokio::test]
    async fn delivery_fees_are_sorted_by_state() -> Result<(), GatewayError> {
        let gateway = InMemoryGateway::new();
        gateway
            .insert(
                "delivery_fees",
                vec![
                    json!({ "state": "Lagos", "park_name": "Jibowu", "fee": 3000 }),
                    json!({ "state": "Abuja", "park_name": "Utako", "fee": 5000 }),
                ],
            )
            .await?;
        let fees = CatalogRepository::new(Arc::new(gateway)).delivery_fees().await?;
        assert_eq!(fees.rows()[0].state, "Abuja");
        Ok(())
    }
}
