//! Admin dashboard API. Every route except login needs `Authorization: Bearer <token>`.
//!
//! - `POST /api/v1/admin/login`, `POST /api/v1/admin/logout`
//! - `GET  /api/v1/admin/dashboard`
//! - `GET|POST /api/v1/admin/{projects|gallery|packages|features}`
//! - `PUT|DELETE /api/v1/admin/{projects|gallery|packages|features}/{id}`
//! - `POST /api/v1/admin/gallery/{id}/toggle-sold-out`
//! - `GET  /api/v1/admin/social-orders?status=&search=`
//! - `POST /api/v1/admin/social-orders/{id}/status`, `POST /api/v1/admin/social-orders/{id}/payment`

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use jesprec_core::{
    admin::{
        welcome_name, DashboardStats, GalleryItemForm, ProjectForm, RecordPatch, SocialFeatureForm,
        SocialOrderFilter, SocialPackageForm,
    },
    domain::{
        gallery::GalleryItem,
        portfolio::Project,
        social::{OrderStatus, PackageSummary, PaymentStatus, SocialFeature, SocialOrder, SocialPackage},
        Record, RowId,
    },
    errors::DomainError,
    session::AdminSession,
};
use jesprec_gateway::{CatalogRepository, GatewayError, Order, SocialOrderRepository, TableRepository};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    api::{correlation_id, failure, not_found, require_admin, ApiError, ApiFailure, ApiResult},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/admin/login", post(login))
        .route("/api/v1/admin/logout", post(logout))
        .route("/api/v1/admin/dashboard", get(dashboard))
        .route(
            "/api/v1/admin/projects",
            get(list_records::<ProjectForm>).post(create_record::<ProjectForm>),
        )
        .route(
            "/api/v1/admin/projects/{id}",
            put(update_record::<ProjectForm>).delete(delete_record::<ProjectForm>),
        )
        .route(
            "/api/v1/admin/gallery",
            get(list_records::<GalleryItemForm>).post(create_record::<GalleryItemForm>),
        )
        .route(
            "/api/v1/admin/gallery/{id}",
            put(update_record::<GalleryItemForm>).delete(delete_record::<GalleryItemForm>),
        )
        .route("/api/v1/admin/gallery/{id}/toggle-sold-out", post(toggle_sold_out))
        .route(
            "/api/v1/admin/packages",
            get(list_records::<SocialPackageForm>).post(create_record::<SocialPackageForm>),
        )
        .route(
            "/api/v1/admin/packages/{id}",
            put(update_record::<SocialPackageForm>).delete(delete_record::<SocialPackageForm>),
        )
        .route(
            "/api/v1/admin/features",
            get(list_records::<SocialFeatureForm>).post(create_record::<SocialFeatureForm>),
        )
        .route(
            "/api/v1/admin/features/{id}",
            put(update_record::<SocialFeatureForm>).delete(delete_record::<SocialFeatureForm>),
        )
        .route("/api/v1/admin/social-orders", get(list_social_orders))
        .route("/api/v1/admin/social-orders/{id}/status", post(set_order_status))
        .route("/api/v1/admin/social-orders/{id}/payment", post(set_order_payment))
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub user_id: String,
    pub email: String,
    pub expires_at: Option<DateTime<Utc>>,
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let correlation_id = correlation_id();
    match state.gateway.sign_in(request.email.trim(), &request.password).await {
        Ok(session) => {
            info!(
                event_name = "admin.session.started",
                correlation_id = %correlation_id,
                user_id = %session.user_id,
                "admin signed in"
            );
            Ok(Json(LoginResponse {
                access_token: session.bearer_token().to_owned(),
                user_id: session.user_id,
                email: session.email,
                expires_at: session.expires_at,
            }))
        }
        // The auth endpoint answers bad credentials with 400; surface its text as a 401.
        Err(GatewayError::Api { status: 400 | 401, message }) => {
            warn!(
                event_name = "admin.session.rejected",
                correlation_id = %correlation_id,
                "admin sign-in rejected"
            );
            Err((StatusCode::UNAUTHORIZED, Json(ApiError { error: message, correlation_id })))
        }
        Err(error) => Err(failure(error, &correlation_id)),
    }
}

pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiFailure> {
    let correlation_id = correlation_id();
    let session = require_admin(&state, &headers, &correlation_id).await?;
    state.gateway.sign_out(&session).await.map_err(|error| failure(error, &correlation_id))?;
    info!(
        event_name = "admin.session.ended",
        correlation_id = %correlation_id,
        user_id = %session.user_id,
        "admin signed out"
    );
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub welcome_name: String,
    pub stats: DashboardStats,
}

pub async fn dashboard(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<DashboardView> {
    let correlation_id = correlation_id();
    let session = require_admin(&state, &headers, &correlation_id).await?;
    let stats = CatalogRepository::new(state.gateway.authorized(&session))
        .dashboard_stats()
        .await
        .map_err(|error| failure(error, &correlation_id))?;
    Ok(Json(DashboardView { welcome_name: welcome_name(&session.email).to_owned(), stats }))
}

// ---------------------------------------------------------------------------
// Editors
// ---------------------------------------------------------------------------

/// An editor payload and the table row it produces.
pub trait EditorForm: DeserializeOwned + Send + 'static {
    type Row: Record;

    fn list_order() -> Order;

    fn into_row(self) -> Result<Self::Row, DomainError>;
}

impl EditorForm for ProjectForm {
    type Row = Project;

    fn list_order() -> Order {
        Order::desc("created_at")
    }

    fn into_row(self) -> Result<Project, DomainError> {
        self.into_record()
    }
}

impl EditorForm for GalleryItemForm {
    type Row = GalleryItem;

    fn list_order() -> Order {
        Order::desc("created_at")
    }

    fn into_row(self) -> Result<GalleryItem, DomainError> {
        self.into_record()
    }
}

impl EditorForm for SocialPackageForm {
    type Row = SocialPackage;

    fn list_order() -> Order {
        Order::asc("platform")
    }

    fn into_row(self) -> Result<SocialPackage, DomainError> {
        self.into_record()
    }
}

impl EditorForm for SocialFeatureForm {
    type Row = SocialFeature;

    fn list_order() -> Order {
        Order::asc("category")
    }

    fn into_row(self) -> Result<SocialFeature, DomainError> {
        self.into_record()
    }
}

async fn admin_repository<F: EditorForm>(
    state: &AppState,
    headers: &HeaderMap,
    correlation_id: &str,
) -> Result<(AdminSession, TableRepository<F::Row>), ApiFailure> {
    let session = require_admin(state, headers, correlation_id).await?;
    let repository = TableRepository::new(state.gateway.authorized(&session));
    Ok((session, repository))
}

pub async fn list_records<F: EditorForm>(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Vec<F::Row>> {
    let correlation_id = correlation_id();
    let (_, repository) = admin_repository::<F>(&state, &headers, &correlation_id).await?;
    let rows = repository
        .list(Some(F::list_order()))
        .await
        .map_err(|error| failure(error, &correlation_id))?;
    Ok(Json(rows))
}

pub async fn create_record<F: EditorForm>(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(form): Json<F>,
) -> Result<(StatusCode, Json<F::Row>), ApiFailure> {
    let correlation_id = correlation_id();
    let (session, repository) = admin_repository::<F>(&state, &headers, &correlation_id).await?;
    let row = form.into_row().map_err(|error| failure(error, &correlation_id))?;
    let stored = repository.insert(&row).await.map_err(|error| failure(error, &correlation_id))?;
    info!(
        event_name = "admin.record.created",
        correlation_id = %correlation_id,
        table = <F::Row as Record>::TABLE,
        user_id = %session.user_id,
        "record created"
    );
    Ok((StatusCode::CREATED, Json(stored)))
}

pub async fn update_record<F: EditorForm>(
    Path(id): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(form): Json<F>,
) -> ApiResult<F::Row> {
    let correlation_id = correlation_id();
    let (session, repository) = admin_repository::<F>(&state, &headers, &correlation_id).await?;
    let row = form.into_row().map_err(|error| failure(error, &correlation_id))?;
    let stored = repository
        .update(&RowId(id.clone()), &row)
        .await
        .map_err(|error| failure(error, &correlation_id))?;
    info!(
        event_name = "admin.record.updated",
        correlation_id = %correlation_id,
        table = <F::Row as Record>::TABLE,
        row_id = %id,
        user_id = %session.user_id,
        "record updated"
    );
    Ok(Json(stored))
}

pub async fn delete_record<F: EditorForm>(
    Path(id): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiFailure> {
    let correlation_id = correlation_id();
    let (session, repository) = admin_repository::<F>(&state, &headers, &correlation_id).await?;
    let removed = repository
        .delete(&RowId(id.clone()))
        .await
        .map_err(|error| failure(error, &correlation_id))?;
    if removed == 0 {
        return Err(not_found(
            format!("no `{}` row with id {id}", <F::Row as Record>::TABLE),
            &correlation_id,
        ));
    }
    info!(
        event_name = "admin.record.deleted",
        correlation_id = %correlation_id,
        table = <F::Row as Record>::TABLE,
        row_id = %id,
        user_id = %session.user_id,
        "record deleted"
    );
    Ok(StatusCode::NO_CONTENT)
}

pub async fn toggle_sold_out(
    Path(id): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<GalleryItem> {
    let correlation_id = correlation_id();
    let (_, repository) =
        admin_repository::<GalleryItemForm>(&state, &headers, &correlation_id).await?;
    let id = RowId(id);
    let item = repository
        .find(&id)
        .await
        .map_err(|error| failure(error, &correlation_id))?
        .ok_or_else(|| not_found("gallery item not found", &correlation_id))?;
    let updated = repository
        .patch(&id, &RecordPatch::GallerySoldOut { is_sold_out: !item.is_sold_out })
        .await
        .map_err(|error| failure(error, &correlation_id))?;
    Ok(Json(updated))
}

// ---------------------------------------------------------------------------
// Social orders
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OrderListQuery {
    pub status: String,
    pub search: String,
}

#[derive(Debug, Serialize)]
pub struct AdminOrderView {
    #[serde(flatten)]
    pub order: SocialOrder,
    pub package: Option<PackageSummary>,
}

impl From<SocialOrder> for AdminOrderView {
    fn from(order: SocialOrder) -> Self {
        Self { package: order.package.clone(), order }
    }
}

pub async fn list_social_orders(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<OrderListQuery>,
) -> ApiResult<Vec<AdminOrderView>> {
    let correlation_id = correlation_id();
    let session = require_admin(&state, &headers, &correlation_id).await?;
    let filter = SocialOrderFilter::new(&query.status, query.search)
        .map_err(|error| failure(error, &correlation_id))?;
    let orders = SocialOrderRepository::new(state.gateway.authorized(&session))
        .list(&filter)
        .await
        .map_err(|error| failure(error, &correlation_id))?;
    Ok(Json(orders.into_iter().map(AdminOrderView::from).collect()))
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize)]
pub struct PaymentUpdate {
    pub payment_status: PaymentStatus,
}

pub async fn set_order_status(
    Path(id): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(update): Json<StatusUpdate>,
) -> ApiResult<AdminOrderView> {
    let correlation_id = correlation_id();
    let session = require_admin(&state, &headers, &correlation_id).await?;
    let order = SocialOrderRepository::new(state.gateway.authorized(&session))
        .set_status(&RowId(id), update.status)
        .await
        .map_err(|error| failure(error, &correlation_id))?;
    info!(
        event_name = "admin.social_order.status_changed",
        correlation_id = %correlation_id,
        status = update.status.as_str(),
        "social order status changed"
    );
    Ok(Json(order.into()))
}

pub async fn set_order_payment(
    Path(id): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(update): Json<PaymentUpdate>,
) -> ApiResult<AdminOrderView> {
    let correlation_id = correlation_id();
    let session = require_admin(&state, &headers, &correlation_id).await?;
    let order = SocialOrderRepository::new(state.gateway.authorized(&session))
        .set_payment(&RowId(id), update.payment_status)
        .await
        .map_err(|error| failure(error, &correlation_id))?;
    Ok(Json(order.into()))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        extract::{Path, Query, State},
        http::{HeaderMap, HeaderValue, StatusCode},
        Json,
    };
    use jesprec_core::{
        admin::{GalleryItemForm, ProjectForm, SocialFeatureForm},
        domain::{
            portfolio::Vault,
            social::{OrderStatus, PaymentStatus},
        },
    };
    use jesprec_gateway::{fixtures::StudioSeedDataset, Gateway, InMemoryGateway};
    use serde_json::json;

    use super::*;
    use crate::state::AppState;

    const ADMIN_EMAIL: &str = "studio@jesprec.com";
    const ADMIN_PASSWORD: &str = "correct horse";

    async fn seeded() -> (InMemoryGateway, AppState) {
        let gateway = InMemoryGateway::new();
        gateway.register_user(ADMIN_EMAIL, ADMIN_PASSWORD).await;
        StudioSeedDataset::load(&gateway).await.expect("seed");
        let state = AppState::new(Arc::new(gateway.clone()), "2348000000000");
        (gateway, state)
    }

    async fn signed_in(state: &AppState) -> HeaderMap {
        let Json(login) = login(
            State(state.clone()),
            Json(LoginRequest { email: ADMIN_EMAIL.to_owned(), password: ADMIN_PASSWORD.to_owned() }),
        )
        .await
        .expect("login");
        let mut headers = HeaderMap::new();
        let value = format!("Bearer {}", login.access_token);
        headers.insert("authorization", HeaderValue::from_str(&value).expect("header"));
        headers
    }

    #[tokio::test]
    async fn wrong_password_is_401_with_the_auth_message() {
        let (_, state) = seeded().await;
        let result = login(
            State(state),
            Json(LoginRequest { email: ADMIN_EMAIL.to_owned(), password: "nope".to_owned() }),
        )
        .await;
        let (status, Json(body)) = result.err().expect("rejected");
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body.error, "Invalid login credentials");
    }

    #[tokio::test]
    async fn dashboard_requires_a_session() {
        let (_, state) = seeded().await;
        let result = dashboard(State(state.clone()), HeaderMap::new()).await;
        assert_eq!(result.err().map(|(status, _)| status), Some(StatusCode::UNAUTHORIZED));

        let headers = signed_in(&state).await;
        let Json(view) = dashboard(State(state), headers).await.expect("dashboard");
        assert_eq!(view.welcome_name, "studio");
        assert_eq!(view.stats.projects, 3);
        assert_eq!(view.stats.gallery_items, 2);
        assert_eq!(view.stats.leads, 0);
    }

    #[tokio::test]
    async fn logout_invalidates_the_token() {
        let (_, state) = seeded().await;
        let headers = signed_in(&state).await;
        let status = logout(State(state.clone()), headers.clone()).await.expect("logout");
        assert_eq!(status, StatusCode::NO_CONTENT);

        let result = dashboard(State(state), headers).await;
        assert_eq!(result.err().map(|(status, _)| status), Some(StatusCode::UNAUTHORIZED));
    }

    #[tokio::test]
    async fn project_editor_round_trip() {
        let (gateway, state) = seeded().await;
        let headers = signed_in(&state).await;

        let form = ProjectForm {
            title: "Harbour Lights".to_owned(),
            vault: Vault::Visual,
            tags: "Film, Night".to_owned(),
            ..ProjectForm::default()
        };
        let (status, Json(created)) =
            create_record::<ProjectForm>(State(state.clone()), headers.clone(), Json(form))
                .await
                .expect("created");
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created.tags, vec!["Film", "Night"]);
        let id = created.id.clone().expect("id");

        let edit = ProjectForm { title: "Harbour Lights II".to_owned(), ..ProjectForm::from_record(&created) };
        let Json(updated) = update_record::<ProjectForm>(
            Path(id.0.clone()),
            State(state.clone()),
            headers.clone(),
            Json(edit),
        )
        .await
        .expect("updated");
        assert_eq!(updated.title, "Harbour Lights II");

        let status =
            delete_record::<ProjectForm>(Path(id.0.clone()), State(state.clone()), headers.clone())
                .await
                .expect("deleted");
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(gateway.rows("projects").await.len(), 3);

        let missing = delete_record::<ProjectForm>(Path(id.0), State(state), headers).await;
        assert_eq!(missing.err().map(|(status, _)| status), Some(StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn invalid_feature_price_is_rejected_before_the_gateway() {
        let (gateway, state) = seeded().await;
        let headers = signed_in(&state).await;
        let form = SocialFeatureForm {
            name: "Voiceover".to_owned(),
            unit_price: "ten".to_owned(),
            ..SocialFeatureForm::default()
        };
        let result = create_record::<SocialFeatureForm>(State(state), headers, Json(form)).await;
        let (status, Json(body)) = result.err().expect("rejected");
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "Please enter a valid price");
        assert_eq!(gateway.rows("social_features").await.len(), 3);
    }

    #[tokio::test]
    async fn gateway_rejections_surface_as_502() {
        let (gateway, state) = seeded().await;
        let headers = signed_in(&state).await;
        gateway.fail_writes_to("gallery_items", "permission denied for table gallery_items").await;

        let form = GalleryItemForm {
            name: "Lagos Dusk".to_owned(),
            price: "₦90,000".to_owned(),
            ..GalleryItemForm::default()
        };
        let result = create_record::<GalleryItemForm>(State(state), headers, Json(form)).await;
        let (status, Json(body)) = result.err().expect("rejected");
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body.error, "permission denied for table gallery_items");
    }

    #[tokio::test]
    async fn sold_out_flag_toggles() {
        let (gateway, state) = seeded().await;
        let headers = signed_in(&state).await;
        let id = gateway.rows("gallery_items").await[0]["id"].as_str().expect("id").to_owned();

        let Json(item) = toggle_sold_out(Path(id.clone()), State(state.clone()), headers.clone())
            .await
            .expect("toggled");
        assert!(item.is_sold_out);
        let Json(item) = toggle_sold_out(Path(id), State(state), headers).await.expect("toggled back");
        assert!(!item.is_sold_out);
    }

    #[tokio::test]
    async fn social_orders_filter_and_update() {
        let (gateway, state) = seeded().await;
        let headers = signed_in(&state).await;
        let package_id = "5e1d0000-0000-4000-8000-000000000301";
        gateway
            .insert(
                "social_orders",
                vec![
                    json!({
                        "package_id": package_id,
                        "customer_email": "ada@example.com",
                        "target_link": "https://instagram.com/ada",
                        "quantity": 1000,
                        "total_price": 2500,
                        "status": "uncomplete",
                        "payment_status": "unpaid"
                    }),
                    json!({
                        "package_id": package_id,
                        "customer_email": "tunde@example.com",
                        "target_link": "https://instagram.com/tunde",
                        "quantity": 500,
                        "total_price": 1250,
                        "status": "completed",
                        "payment_status": "paid"
                    }),
                ],
            )
            .await
            .expect("orders");

        let Json(found) = list_social_orders(
            State(state.clone()),
            headers.clone(),
            Query(OrderListQuery { status: String::new(), search: "TUNDE".to_owned() }),
        )
        .await
        .expect("search");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].package.as_ref().map(|p| p.name.as_str()), Some("Instagram Followers"));

        let Json(open) = list_social_orders(
            State(state.clone()),
            headers.clone(),
            Query(OrderListQuery { status: "uncomplete".to_owned(), search: String::new() }),
        )
        .await
        .expect("by status");
        assert_eq!(open.len(), 1);
        let id = open[0].order.id.clone().expect("id");

        let Json(updated) = set_order_status(
            Path(id.0.clone()),
            State(state.clone()),
            headers.clone(),
            Json(StatusUpdate { status: OrderStatus::Processing }),
        )
        .await
        .expect("status");
        assert_eq!(updated.order.status, OrderStatus::Processing);

        let Json(paid) = set_order_payment(
            Path(id.0),
            State(state.clone()),
            headers.clone(),
            Json(PaymentUpdate { payment_status: PaymentStatus::Paid }),
        )
        .await
        .expect("payment");
        assert_eq!(paid.order.payment_status, PaymentStatus::Paid);

        let bad = list_social_orders(
            State(state),
            headers,
            Query(OrderListQuery { status: "shipped".to_owned(), search: String::new() }),
        )
        .await;
        assert_eq!(bad.err().map(|(status, _)| status), Some(StatusCode::BAD_REQUEST));
    }
}
