//! Public storefront: portfolio, services, gallery checkout and social growth.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use jesprec_core::{
    catalog::CatalogSnapshot,
    domain::{
        gallery::{DeliveryFee, GalleryItem, GalleryOrder},
        portfolio::{Project, StudioService, VaultFilter, CREATIVE_SERVICES, DIGITAL_SERVICES},
        social::{Audience, PackageSummary, SocialFeature, SocialOrder, SocialPackage},
        RowId,
    },
    errors::DomainError,
    pricing::{
        gallery::{CheckoutSummary, CustomerDetails, DeliveryMode, DoorstepAddress, GalleryCheckout},
        social::{
            management_tiers, CustomPlan, CustomPlanQuote, GrowthCalculator, GrowthQuote,
            ManagementTier,
        },
        PricingError,
    },
};
use jesprec_gateway::{CatalogRepository, SocialOrderRepository, TableRepository};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    api::{correlation_id, failure, not_found, ApiFailure, ApiResult},
    state::AppState,
};

const ITEM_NOT_FOUND: &str = "gallery item not found";

fn pricing_failure(error: PricingError, correlation_id: &str) -> ApiFailure {
    failure(DomainError::from(error), correlation_id)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/portfolio", get(portfolio))
        .route("/api/v1/services", get(services))
        .route("/api/v1/gallery", get(gallery))
        .route("/api/v1/gallery/delivery-fees", get(delivery_fees))
        .route("/api/v1/gallery/checkout/summary", post(gallery_summary))
        .route("/api/v1/gallery/orders", post(place_gallery_order))
        .route("/api/v1/social/packages", get(social_packages))
        .route("/api/v1/social/features", get(social_features))
        .route("/api/v1/social/growth/quote", post(growth_quote))
        .route("/api/v1/social/growth/orders", post(place_growth_order))
        .route("/api/v1/social/custom/quote", post(custom_quote))
        .route("/api/v1/social/custom/checkout", post(custom_checkout))
        .route("/api/v1/social/orders/track/{id}", get(track_order))
}

// ---------------------------------------------------------------------------
// Portfolio & services
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct PortfolioQuery {
    pub vault: Option<String>,
}

pub async fn portfolio(
    State(state): State<AppState>,
    Query(query): Query<PortfolioQuery>,
) -> ApiResult<Vec<Project>> {
    let correlation_id = correlation_id();
    let raw = query.vault.unwrap_or_default();
    let filter = VaultFilter::parse(&raw).ok_or_else(|| {
        failure(DomainError::InvariantViolation(format!("unknown vault `{raw}`")), &correlation_id)
    })?;
    let projects = CatalogRepository::new(state.gateway.clone())
        .portfolio()
        .await
        .map_err(|error| failure(error, &correlation_id))?;
    Ok(Json(filter.apply(projects.rows())))
}

#[derive(Debug, Serialize)]
pub struct ServicesResponse {
    pub creative: &'static [StudioService],
    pub digital: &'static [StudioService],
}

pub async fn services() -> Json<ServicesResponse> {
    Json(ServicesResponse { creative: &CREATIVE_SERVICES, digital: &DIGITAL_SERVICES })
}

// ---------------------------------------------------------------------------
// Gallery
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct GalleryItemView {
    #[serde(flatten)]
    pub item: GalleryItem,
    pub unit_price: rust_decimal::Decimal,
    pub low_stock: Option<u32>,
}

pub async fn gallery(State(state): State<AppState>) -> ApiResult<Vec<GalleryItemView>> {
    let correlation_id = correlation_id();
    let items = CatalogRepository::new(state.gateway.clone())
        .gallery()
        .await
        .map_err(|error| failure(error, &correlation_id))?;
    Ok(Json(
        items
            .rows()
            .iter()
            .map(|item| GalleryItemView {
                unit_price: item.unit_price(),
                low_stock: item.low_stock(),
                item: item.clone(),
            })
            .collect(),
    ))
}

pub async fn delivery_fees(State(state): State<AppState>) -> ApiResult<Vec<DeliveryFee>> {
    let correlation_id = correlation_id();
    let fees = CatalogRepository::new(state.gateway.clone())
        .delivery_fees()
        .await
        .map_err(|error| failure(error, &correlation_id))?;
    Ok(Json(fees.rows().to_vec()))
}

fn one() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct GalleryCheckoutRequest {
    pub item_id: RowId,
    #[serde(default = "one")]
    pub quantity: u32,
    #[serde(default)]
    pub customer: CustomerDetails,
    #[serde(default)]
    pub delivery_mode: DeliveryMode,
    #[serde(default)]
    pub address: DoorstepAddress,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub park_name: String,
}

#[derive(Debug, Serialize)]
pub struct CheckoutPreview {
    pub quantity: u32,
    pub max_quantity: u32,
    pub summary: CheckoutSummary,
    pub missing_fields: Vec<&'static str>,
    pub park_states: Vec<String>,
    pub ready: bool,
}

#[derive(Debug, Serialize)]
pub struct PlacedGalleryOrder {
    pub order: GalleryOrder,
    pub summary: CheckoutSummary,
}

async fn start_checkout(
    state: &AppState,
    request: &GalleryCheckoutRequest,
    correlation_id: &str,
) -> Result<GalleryCheckout, ApiFailure> {
    let item = TableRepository::<GalleryItem>::new(state.gateway.clone())
        .find(&request.item_id)
        .await
        .map_err(|error| failure(error, correlation_id))?
        .ok_or_else(|| not_found(ITEM_NOT_FOUND, correlation_id))?;
    let fees = CatalogRepository::new(state.gateway.clone())
        .delivery_fees()
        .await
        .map_err(|error| failure(error, correlation_id))?;

    let mut checkout = GalleryCheckout::start(item, fees)
        .map_err(|error| pricing_failure(error, correlation_id))?;
    checkout.set_quantity(request.quantity);
    checkout.set_customer(request.customer.clone());
    checkout.set_mode(request.delivery_mode);
    checkout.set_address(request.address.clone());
    checkout.set_state(request.state.clone());
    if request.delivery_mode == DeliveryMode::BusPark && !request.park_name.is_empty() {
        checkout.set_park(request.park_name.clone());
    }
    Ok(checkout)
}

pub async fn gallery_summary(
    State(state): State<AppState>,
    Json(request): Json<GalleryCheckoutRequest>,
) -> ApiResult<CheckoutPreview> {
    let correlation_id = correlation_id();
    let checkout = start_checkout(&state, &request, &correlation_id).await?;
    let mut missing_fields = checkout.missing_contact_fields();
    missing_fields.extend(checkout.missing_delivery_fields());
    Ok(Json(CheckoutPreview {
        quantity: checkout.quantity(),
        max_quantity: checkout.max_quantity(),
        summary: checkout.summary(),
        ready: missing_fields.is_empty(),
        missing_fields,
        park_states: checkout.park_states().into_iter().map(str::to_owned).collect(),
    }))
}

pub async fn place_gallery_order(
    State(state): State<AppState>,
    Json(request): Json<GalleryCheckoutRequest>,
) -> Result<(StatusCode, Json<PlacedGalleryOrder>), ApiFailure> {
    let correlation_id = correlation_id();
    let mut checkout = start_checkout(&state, &request, &correlation_id).await?;
    checkout.proceed().map_err(|error| pricing_failure(error, &correlation_id))?;
    checkout.proceed().map_err(|error| pricing_failure(error, &correlation_id))?;
    let order = checkout.to_order().map_err(|error| pricing_failure(error, &correlation_id))?;

    let stored = TableRepository::<GalleryOrder>::new(state.gateway.clone())
        .insert(&order)
        .await
        .map_err(|error| failure(error, &correlation_id))?;
    checkout.mark_placed();

    info!(
        event_name = "gallery.order.placed",
        correlation_id = %correlation_id,
        item_id = %request.item_id,
        delivery_type = stored.delivery_type.as_str(),
        total = stored.total_price.as_str(),
        "gallery order placed"
    );
    Ok((StatusCode::CREATED, Json(PlacedGalleryOrder { order: stored, summary: checkout.summary() })))
}

// ---------------------------------------------------------------------------
// Social growth
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct PackagesResponse {
    pub packages: Vec<SocialPackage>,
    pub management_tiers: Vec<ManagementTier>,
}

pub async fn social_packages(State(state): State<AppState>) -> ApiResult<PackagesResponse> {
    let correlation_id = correlation_id();
    let packages = CatalogRepository::new(state.gateway.clone())
        .active_packages()
        .await
        .map_err(|error| failure(error, &correlation_id))?;
    Ok(Json(PackagesResponse {
        management_tiers: management_tiers(&packages),
        packages: packages.rows().to_vec(),
    }))
}

pub async fn social_features(State(state): State<AppState>) -> ApiResult<Vec<SocialFeature>> {
    let correlation_id = correlation_id();
    let features = CatalogRepository::new(state.gateway.clone())
        .active_features()
        .await
        .map_err(|error| failure(error, &correlation_id))?;
    Ok(Json(features.rows().to_vec()))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GrowthRequest {
    pub platform: Option<String>,
    pub service: Option<String>,
    pub audience: Option<Audience>,
    pub quantity: Option<u32>,
    pub target_link: String,
    pub customer_email: String,
    pub tos_accepted: bool,
}

impl GrowthRequest {
    fn calculator(&self, packages: CatalogSnapshot<SocialPackage>) -> GrowthCalculator {
        let mut calculator = GrowthCalculator::new(packages);
        if let Some(platform) = &self.platform {
            calculator.set_platform(platform.clone());
        }
        if let Some(audience) = self.audience {
            calculator.set_audience(audience);
        }
        if let Some(service) = &self.service {
            calculator.set_service(service.clone());
        }
        if let Some(quantity) = self.quantity {
            calculator.set_quantity(quantity);
        }
        calculator.set_target_link(self.target_link.clone());
        calculator.set_customer_email(self.customer_email.clone());
        calculator.accept_terms(self.tos_accepted);
        calculator
    }
}

async fn active_packages(
    state: &AppState,
    correlation_id: &str,
) -> Result<CatalogSnapshot<SocialPackage>, ApiFailure> {
    CatalogRepository::new(state.gateway.clone())
        .active_packages()
        .await
        .map_err(|error| failure(error, correlation_id))
}

pub async fn growth_quote(
    State(state): State<AppState>,
    Json(request): Json<GrowthRequest>,
) -> ApiResult<GrowthQuote> {
    let correlation_id = correlation_id();
    let packages = active_packages(&state, &correlation_id).await?;
    Ok(Json(request.calculator(packages).quote()))
}

#[derive(Debug, Serialize)]
pub struct PlacedSocialOrder {
    pub order: SocialOrder,
    pub quote: GrowthQuote,
}

pub async fn place_growth_order(
    State(state): State<AppState>,
    Json(request): Json<GrowthRequest>,
) -> Result<(StatusCode, Json<PlacedSocialOrder>), ApiFailure> {
    let correlation_id = correlation_id();
    let packages = active_packages(&state, &correlation_id).await?;
    let calculator = request.calculator(packages);
    let order = calculator.to_order().map_err(|error| pricing_failure(error, &correlation_id))?;
    let stored = SocialOrderRepository::new(state.gateway.clone())
        .place(&order)
        .await
        .map_err(|error| failure(error, &correlation_id))?;

    info!(
        event_name = "social.order.placed",
        correlation_id = %correlation_id,
        platform = calculator.platform(),
        service = calculator.service(),
        quantity = stored.quantity,
        "social growth order placed"
    );
    Ok((StatusCode::CREATED, Json(PlacedSocialOrder { order: stored, quote: calculator.quote() })))
}

#[derive(Debug, Deserialize)]
pub struct CustomRowRequest {
    #[serde(default)]
    pub feature_id: Option<RowId>,
    #[serde(default)]
    pub quantity: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CustomPlanRequest {
    pub rows: Vec<CustomRowRequest>,
    pub brief: String,
    pub tos_accepted: bool,
}

async fn custom_plan(
    state: &AppState,
    request: &CustomPlanRequest,
    correlation_id: &str,
) -> Result<CustomPlan, ApiFailure> {
    let catalog = CatalogRepository::new(state.gateway.clone());
    let features =
        catalog.active_features().await.map_err(|error| failure(error, correlation_id))?;
    let packages =
        catalog.active_packages().await.map_err(|error| failure(error, correlation_id))?;

    let mut plan = CustomPlan::new(features, packages);
    for row in &request.rows {
        let row_id = plan.add_row();
        plan.select_feature(&row_id, row.feature_id.clone())
            .map_err(|error| pricing_failure(error, correlation_id))?;
        if let Some(quantity) = row.quantity {
            plan.set_row_quantity(&row_id, quantity)
                .map_err(|error| pricing_failure(error, correlation_id))?;
        }
    }
    plan.set_brief(request.brief.clone());
    plan.accept_terms(request.tos_accepted);
    Ok(plan)
}

pub async fn custom_quote(
    State(state): State<AppState>,
    Json(request): Json<CustomPlanRequest>,
) -> ApiResult<CustomPlanQuote> {
    let correlation_id = correlation_id();
    Ok(Json(custom_plan(&state, &request, &correlation_id).await?.quote()))
}

pub async fn custom_checkout(
    State(state): State<AppState>,
    Json(request): Json<CustomPlanRequest>,
) -> ApiResult<CustomPlanQuote> {
    let correlation_id = correlation_id();
    let plan = custom_plan(&state, &request, &correlation_id).await?;
    let quote = plan.checkout().map_err(|error| pricing_failure(error, &correlation_id))?;
    info!(
        event_name = "social.custom_plan.checkout",
        correlation_id = %correlation_id,
        items = quote.items.len(),
        total = quote.total_label.as_str(),
        "custom plan ready for payment"
    );
    Ok(Json(quote))
}

#[derive(Debug, Serialize)]
pub struct TrackingView {
    pub order: SocialOrder,
    pub package: Option<PackageSummary>,
    pub progress_pct: u8,
}

pub async fn track_order(
    Path(partial_id): Path<String>,
    State(state): State<AppState>,
) -> ApiResult<TrackingView> {
    let correlation_id = correlation_id();
    let order = SocialOrderRepository::new(state.gateway.clone())
        .track(&partial_id)
        .await
        .map_err(|error| failure(error, &correlation_id))?;
    Ok(Json(TrackingView {
        progress_pct: order.status.progress_pct(),
        package: order.package.clone(),
        order,
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        extract::{Path, Query, State},
        http::StatusCode,
        Json,
    };
    use jesprec_core::{
        domain::{social::Audience, RowId},
        pricing::gallery::{CustomerDetails, DeliveryMode, DoorstepAddress},
    };
    use jesprec_gateway::{fixtures::StudioSeedDataset, Gateway, InMemoryGateway};
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::*;
    use crate::state::AppState;

    async fn seeded() -> (InMemoryGateway, AppState) {
        let gateway = InMemoryGateway::new();
        StudioSeedDataset::load(&gateway).await.expect("seed");
        let state = AppState::new(Arc::new(gateway.clone()), "2348000000000");
        (gateway, state)
    }

    async fn item_id(gateway: &InMemoryGateway, name: &str) -> RowId {
        let rows = gateway
            .select("gallery_items", &jesprec_gateway::Query::new().filter(jesprec_gateway::Filter::eq("name", name)))
            .await
            .expect("items");
        RowId(rows[0]["id"].as_str().expect("id").to_owned())
    }

    fn checkout_request(item_id: RowId, mode: DeliveryMode) -> GalleryCheckoutRequest {
        GalleryCheckoutRequest {
            item_id,
            quantity: 2,
            customer: CustomerDetails {
                name: "Ada Obi".to_owned(),
                email: "ada@example.com".to_owned(),
                phone: "08030000000".to_owned(),
            },
            delivery_mode: mode,
            address: DoorstepAddress {
                house_number: "12".to_owned(),
                street: "Allen Avenue".to_owned(),
                city: "Ikeja".to_owned(),
                landmark: "Opposite the bank".to_owned(),
                landmark_description: String::new(),
            },
            state: "Lagos".to_owned(),
            park_name: "Jibowu Park".to_owned(),
        }
    }

    #[tokio::test]
    async fn portfolio_filters_by_vault() {
        let (_, state) = seeded().await;
        let Json(digital) = portfolio(
            State(state.clone()),
            Query(PortfolioQuery { vault: Some("Digital Vault".to_owned()) }),
        )
        .await
        .expect("portfolio");
        assert_eq!(digital.len(), 2);

        let Json(all) =
            portfolio(State(state.clone()), Query(PortfolioQuery::default())).await.expect("all");
        assert_eq!(all.len(), 3);

        let result = portfolio(State(state), Query(PortfolioQuery { vault: Some("audio".to_owned()) })).await;
        assert_eq!(result.err().map(|(status, _)| status), Some(StatusCode::BAD_REQUEST));
    }

    #[tokio::test]
    async fn bus_park_summary_adds_the_park_fee() {
        let (gateway, state) = seeded().await;
        let id = item_id(&gateway, "Cyberpunk Skyline").await;

        let Json(preview) =
            gallery_summary(State(state), Json(checkout_request(id, DeliveryMode::BusPark)))
                .await
                .expect("summary");
        assert_eq!(preview.summary.total, Decimal::from(503_000));
        assert_eq!(preview.summary.total_label, "₦503,000");
        assert!(preview.ready);
    }

    #[tokio::test]
    async fn doorstep_order_is_stored_with_fee_to_be_quoted() {
        let (gateway, state) = seeded().await;
        let id = item_id(&gateway, "Cyberpunk Skyline").await;

        let (status, Json(placed)) = place_gallery_order(
            State(state),
            Json(checkout_request(id, DeliveryMode::Doorstep)),
        )
        .await
        .expect("order placed");
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(placed.summary.total, Decimal::from(500_000));
        assert!(placed.summary.fee_to_be_quoted);
        assert_eq!(placed.order.status, "pending");

        let orders = gateway.select("orders", &jesprec_gateway::Query::new()).await.expect("orders");
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0]["delivery_type"], "doorstep");
    }

    #[tokio::test]
    async fn incomplete_contact_details_block_the_order() {
        let (gateway, state) = seeded().await;
        let id = item_id(&gateway, "Neural Abstract").await;
        let mut request = checkout_request(id, DeliveryMode::BusPark);
        request.customer.phone.clear();

        let result = place_gallery_order(State(state), Json(request)).await;
        assert_eq!(result.err().map(|(status, _)| status), Some(StatusCode::BAD_REQUEST));
    }

    #[tokio::test]
    async fn sold_out_items_cannot_be_checked_out() {
        let (gateway, state) = seeded().await;
        let id = item_id(&gateway, "Neural Abstract").await;
        gateway
            .update("gallery_items", json!({ "is_sold_out": true }), &jesprec_gateway::Query::by_id(&id))
            .await
            .expect("sold out");

        let result = gallery_summary(State(state), Json(checkout_request(id, DeliveryMode::BusPark))).await;
        assert_eq!(result.err().map(|(status, _)| status), Some(StatusCode::BAD_REQUEST));
    }

    #[tokio::test]
    async fn growth_quote_prices_the_matching_package() {
        let (_, state) = seeded().await;
        let Json(quote) = growth_quote(
            State(state),
            Json(GrowthRequest {
                platform: Some("instagram".to_owned()),
                service: Some("followers".to_owned()),
                audience: Some(Audience::Nigeria),
                quantity: Some(1000),
                ..GrowthRequest::default()
            }),
        )
        .await
        .expect("quote");
        assert_eq!(quote.total, Decimal::from(2500));
        assert!(!quote.checkout_enabled);
    }

    #[tokio::test]
    async fn growth_order_requires_terms_then_is_trackable() {
        let (_, state) = seeded().await;
        let base = GrowthRequest {
            target_link: "https://instagram.com/adaobi".to_owned(),
            customer_email: "ada@example.com".to_owned(),
            ..GrowthRequest::default()
        };
        let rejected = place_growth_order(State(state.clone()), Json(base)).await;
        let (status, Json(body)) = rejected.err().expect("terms gate");
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "You must accept the Terms of Service.");

        let (_, Json(placed)) = place_growth_order(
            State(state.clone()),
            Json(GrowthRequest {
                target_link: "https://instagram.com/adaobi".to_owned(),
                tos_accepted: true,
                ..GrowthRequest::default()
            }),
        )
        .await
        .expect("placed");
        let id = placed.order.id.clone().expect("stored id");

        let Json(tracked) = track_order(Path(id.as_str()[..8].to_owned()), State(state))
            .await
            .expect("tracked by prefix");
        assert_eq!(tracked.order.id, Some(id));
        assert_eq!(tracked.progress_pct, 15);
        assert_eq!(tracked.package.map(|package| package.name), Some("Instagram Followers".to_owned()));
    }

    #[tokio::test]
    async fn unknown_tracking_ids_are_404() {
        let (_, state) = seeded().await;
        let result = track_order(Path("zzzz".to_owned()), State(state)).await;
        let (status, Json(body)) = result.err().expect("not found");
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error, "Order not found. Please check your ID.");
    }

    #[tokio::test]
    async fn custom_plan_sums_features_and_bundles() {
        let (gateway, state) = seeded().await;
        let features = gateway.select("social_features", &jesprec_gateway::Query::new()).await.expect("features");
        let reels = features
            .iter()
            .find(|row| row["name"] == "Reels Editing")
            .and_then(|row| row["id"].as_str())
            .map(|id| RowId(id.to_owned()));

        let request = CustomPlanRequest {
            rows: vec![
                CustomRowRequest { feature_id: reels, quantity: Some(10) },
                CustomRowRequest { feature_id: None, quantity: None },
            ],
            brief: String::new(),
            tos_accepted: true,
        };
        let Json(quote) = custom_quote(State(state.clone()), Json(request)).await.expect("quote");
        assert_eq!(quote.total, Decimal::from(150_000));
        assert_eq!(quote.items, vec!["Reels Editing (x10)".to_owned()]);
        assert!(quote.checkout_enabled);

        let checkout = custom_checkout(
            State(state),
            Json(CustomPlanRequest { rows: Vec::new(), brief: String::new(), tos_accepted: true }),
        )
        .await;
        let (status, Json(body)) = checkout.err().expect("brief gate");
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "Please provide a link/context.");
    }
}
