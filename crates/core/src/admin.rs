//! Editor forms and the typed payloads the admin layer sends to the gateway.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::gallery::GalleryItem;
use crate::domain::portfolio::{CaseStudy, Project, Vault};
use crate::domain::social::{
    Audience, OrderStatus, PackageCategory, PaymentStatus, SocialFeature, SocialOrder,
    SocialPackage,
};
use crate::domain::Record;
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectForm {
    pub title: String,
    pub vault: Vault,
    pub image_url: String,
    pub description: String,
    /// Comma-separated, as typed.
    pub tags: String,
    pub challenge: String,
    pub strategy: String,
    pub result: String,
}

impl Default for ProjectForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            vault: Vault::Visual,
            image_url: String::new(),
            description: String::new(),
            tags: String::new(),
            challenge: String::new(),
            strategy: String::new(),
            result: String::new(),
        }
    }
}

impl ProjectForm {
    pub fn from_record(project: &Project) -> Self {
        let case_study = project.case_study.clone().unwrap_or_default();
        Self {
            title: project.title.clone(),
            vault: project.vault,
            image_url: project.image_url.clone(),
            description: project.description.clone(),
            tags: project.tags.join(", "),
            challenge: case_study.challenge,
            strategy: case_study.strategy,
            result: case_study.result,
        }
    }

    pub fn into_record(self) -> Result<Project, DomainError> {
        let project = Project {
            id: None,
            title: self.title,
            vault: self.vault,
            image_url: self.image_url,
            description: self.description,
            tags: split_tags(&self.tags),
            case_study: Some(CaseStudy {
                challenge: self.challenge,
                strategy: self.strategy,
                result: self.result,
                references: Vec::new(),
            }),
            created_at: None,
        };
        project.validate()?;
        Ok(project)
    }
}

pub fn split_tags(tags: &str) -> Vec<String> {
    tags.split(',').map(str::trim).filter(|tag| !tag.is_empty()).map(str::to_owned).collect()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryItemForm {
    pub name: String,
    pub price: String,
    pub image_url: String,
    pub category: String,
    pub stock_count: u32,
    pub is_sold_out: bool,
}

impl Default for GalleryItemForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            price: String::new(),
            image_url: String::new(),
            category: String::new(),
            stock_count: 10,
            is_sold_out: false,
        }
    }
}

impl GalleryItemForm {
    pub fn into_record(self) -> Result<GalleryItem, DomainError> {
        let item = GalleryItem {
            id: None,
            name: self.name,
            price: self.price,
            image_url: self.image_url,
            category: self.category,
            stock_count: self.stock_count,
            is_sold_out: self.is_sold_out,
            created_at: None,
        };
        item.validate()?;
        Ok(item)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialPackageForm {
    pub name: String,
    pub category: PackageCategory,
    pub platform: String,
    pub service_type: String,
    pub audience_type: Audience,
    pub unit_price: Decimal,
    pub min_quantity: u32,
    pub max_quantity: u32,
    pub features: Vec<String>,
    pub is_active: bool,
}

impl Default for SocialPackageForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            category: PackageCategory::GrowthMetric,
            platform: "instagram".to_owned(),
            service_type: "followers".to_owned(),
            audience_type: Audience::Nigeria,
            unit_price: Decimal::from(1_000),
            min_quantity: 100,
            max_quantity: 100_000,
            features: vec![String::new()],
            is_active: true,
        }
    }
}

impl SocialPackageForm {
    pub fn into_record(self) -> Result<SocialPackage, DomainError> {
        let package = SocialPackage {
            id: None,
            name: self.name,
            category: self.category,
            platform: self.platform,
            service_type: self.service_type,
            audience_type: self.audience_type,
            unit_price: self.unit_price,
            min_quantity: self.min_quantity,
            max_quantity: self.max_quantity,
            features: self.features.into_iter().filter(|f| !f.trim().is_empty()).collect(),
            is_active: self.is_active,
        };
        package.validate()?;
        Ok(package)
    }
}

/// Price and minimum arrive as raw text from the editor inputs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialFeatureForm {
    pub name: String,
    pub unit_price: String,
    pub min_qty: String,
    pub category: String,
    pub icon: String,
    pub is_active: bool,
}

impl Default for SocialFeatureForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            unit_price: String::new(),
            min_qty: "1".to_owned(),
            category: "Management".to_owned(),
            icon: "FiStar".to_owned(),
            is_active: true,
        }
    }
}

impl SocialFeatureForm {
    pub fn into_record(self) -> Result<SocialFeature, DomainError> {
        let unit_price = Decimal::from_str(self.unit_price.trim())
            .map_err(|_| DomainError::InvariantViolation("Please enter a valid price".to_owned()))?;
        let min_qty = self.min_qty.trim().parse::<u32>().ok().filter(|qty| *qty > 0).unwrap_or(1);
        let feature = SocialFeature {
            id: None,
            name: self.name,
            unit_price,
            min_qty,
            category: self.category,
            icon: self.icon,
            is_active: self.is_active,
        };
        feature.validate()?;
        Ok(feature)
    }
}

/// One typed write per table. Nothing reaches the gateway as a loose key bag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordPatch {
    Project(Project),
    GalleryItem(GalleryItem),
    SocialPackage(SocialPackage),
    SocialFeature(SocialFeature),
    GallerySoldOut { is_sold_out: bool },
    SocialOrderStatus { status: OrderStatus },
    SocialOrderPayment { payment_status: PaymentStatus },
}

impl RecordPatch {
    pub fn table(&self) -> &'static str {
        match self {
            Self::Project(_) => Project::TABLE,
            Self::GalleryItem(_) | Self::GallerySoldOut { .. } => GalleryItem::TABLE,
            Self::SocialPackage(_) => SocialPackage::TABLE,
            Self::SocialFeature(_) => SocialFeature::TABLE,
            Self::SocialOrderStatus { .. } | Self::SocialOrderPayment { .. } => SocialOrder::TABLE,
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        match self {
            Self::Project(record) => record.validate(),
            Self::GalleryItem(record) => record.validate(),
            Self::SocialPackage(record) => record.validate(),
            Self::SocialFeature(record) => record.validate(),
            Self::GallerySoldOut { .. }
            | Self::SocialOrderStatus { .. }
            | Self::SocialOrderPayment { .. } => Ok(()),
        }
    }

    /// Validated column set for an update; identity columns are never rewritten.
    pub fn to_row(&self) -> Result<Value, DomainError> {
        self.validate()?;
        let encoded = match self {
            Self::Project(record) => serde_json::to_value(record),
            Self::GalleryItem(record) => serde_json::to_value(record),
            Self::SocialPackage(record) => serde_json::to_value(record),
            Self::SocialFeature(record) => serde_json::to_value(record),
            Self::GallerySoldOut { is_sold_out } => {
                Ok(serde_json::json!({ "is_sold_out": is_sold_out }))
            }
            Self::SocialOrderStatus { status } => Ok(serde_json::json!({ "status": status })),
            Self::SocialOrderPayment { payment_status } => {
                Ok(serde_json::json!({ "payment_status": payment_status }))
            }
        };
        let mut row = encoded.map_err(|error| DomainError::InvariantViolation(error.to_string()))?;
        if let Some(columns) = row.as_object_mut() {
            columns.remove("id");
            columns.remove("created_at");
        }
        Ok(row)
    }
}

/// Admin order list filter: status tab plus free-text search.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialOrderFilter {
    pub status: Option<OrderStatus>,
    pub search: String,
}

impl SocialOrderFilter {
    pub fn new(status: &str, search: impl Into<String>) -> Result<Self, DomainError> {
        let status = match status.trim() {
            "" | "all" => None,
            other => Some(OrderStatus::parse(other).ok_or_else(|| {
                DomainError::InvariantViolation(format!("unknown order status `{other}`"))
            })?),
        };
        Ok(Self { status, search: search.into() })
    }

    pub fn matches(&self, order: &SocialOrder) -> bool {
        if self.status.is_some_and(|status| order.status != status) {
            return false;
        }
        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        let package_name = order.package.as_ref().map(|package| package.name.as_str());
        [
            Some(order.customer_email.as_str()),
            package_name,
            Some(order.target_link.as_str()),
            order.id.as_ref().map(|id| id.as_str()),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
    }

    pub fn apply(&self, orders: Vec<SocialOrder>) -> Vec<SocialOrder> {
        orders.into_iter().filter(|order| self.matches(order)).collect()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub projects: u64,
    pub gallery_items: u64,
    pub leads: u64,
}

/// Local part of the admin's email, used in the dashboard greeting.
pub fn welcome_name(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{
        split_tags, welcome_name, GalleryItemForm, ProjectForm, RecordPatch, SocialFeatureForm,
        SocialOrderFilter, SocialPackageForm,
    };
    use crate::domain::social::{OrderStatus, PackageSummary, PaymentStatus, SocialOrder};
    use crate::domain::RowId;
    use crate::errors::DomainError;

    fn order(id: &str, email: &str, status: OrderStatus, package: &str) -> SocialOrder {
        SocialOrder {
            id: Some(RowId(id.to_owned())),
            package_id: None,
            customer_email: email.to_owned(),
            target_link: "https://instagram.com/brand".to_owned(),
            quantity: 1000,
            total_price: Decimal::from(50_000),
            status,
            payment_status: PaymentStatus::Unpaid,
            created_at: None,
            package: Some(PackageSummary { name: package.to_owned(), ..PackageSummary::default() }),
        }
    }

    #[test]
    fn project_tags_are_split_and_trimmed() {
        let form = ProjectForm {
            title: "QuickVend".to_owned(),
            tags: "React Native, NativeWind ,Fintech,".to_owned(),
            challenge: "Paper ledgers".to_owned(),
            ..ProjectForm::default()
        };
        let project = form.into_record().expect("record");
        assert_eq!(project.tags, vec!["React Native", "NativeWind", "Fintech"]);
        assert_eq!(project.case_study.map(|c| c.challenge), Some("Paper ledgers".to_owned()));
        assert!(split_tags("").is_empty());
    }

    #[test]
    fn editor_defaults_match_the_admin_forms() {
        assert_eq!(GalleryItemForm::default().stock_count, 10);
        let package = SocialPackageForm::default();
        assert_eq!(package.unit_price, Decimal::from(1_000));
        assert_eq!((package.min_quantity, package.max_quantity), (100, 100_000));
        assert_eq!(SocialFeatureForm::default().icon, "FiStar");
    }

    #[test]
    fn blank_package_features_are_dropped() {
        let form = SocialPackageForm {
            name: "Starter Growth".to_owned(),
            features: vec!["Weekly report".to_owned(), "  ".to_owned(), String::new()],
            ..SocialPackageForm::default()
        };
        assert_eq!(form.into_record().expect("record").features, vec!["Weekly report"]);
    }

    #[test]
    fn feature_price_must_be_numeric() {
        let form = SocialFeatureForm {
            name: "Reels".to_owned(),
            unit_price: "abc".to_owned(),
            ..SocialFeatureForm::default()
        };
        assert_eq!(
            form.into_record(),
            Err(DomainError::InvariantViolation("Please enter a valid price".to_owned()))
        );
    }

    #[test]
    fn feature_minimum_falls_back_to_one() {
        let form = SocialFeatureForm {
            name: "Reels".to_owned(),
            unit_price: "2500".to_owned(),
            min_qty: "zero".to_owned(),
            ..SocialFeatureForm::default()
        };
        let feature = form.into_record().expect("record");
        assert_eq!(feature.min_qty, 1);
        assert_eq!(feature.unit_price, Decimal::from(2_500));
    }

    #[test]
    fn patch_rows_drop_identity_columns() {
        let mut project = ProjectForm { title: "Lagos Pulse".to_owned(), ..ProjectForm::default() }
            .into_record()
            .expect("record");
        project.id = Some(RowId("p-1".to_owned()));

        let patch = RecordPatch::Project(project);
        assert_eq!(patch.table(), "projects");
        let row = patch.to_row().expect("row");
        assert!(row.get("id").is_none());
        assert_eq!(row["title"], "Lagos Pulse");

        let status = RecordPatch::SocialOrderStatus { status: OrderStatus::InProgress };
        assert_eq!(status.table(), "social_orders");
        assert_eq!(status.to_row().expect("row")["status"], "in progress");
    }

    #[test]
    fn invalid_patch_is_rejected_before_encoding() {
        let mut project = ProjectForm { title: "x".to_owned(), ..ProjectForm::default() }
            .into_record()
            .expect("record");
        project.title = String::new();
        assert!(RecordPatch::Project(project).to_row().is_err());
    }

    #[test]
    fn order_filter_combines_status_and_search() {
        let orders = vec![
            order("a1b2", "ada@example.com", OrderStatus::Completed, "Nigerian Followers"),
            order("c3d4", "chidi@example.com", OrderStatus::InProgress, "TikTok Views"),
            order("e5f6", "emeka@example.com", OrderStatus::Completed, "TikTok Likes"),
        ];

        let completed = SocialOrderFilter::new("completed", "").expect("filter");
        assert_eq!(completed.apply(orders.clone()).len(), 2);

        let tiktok = SocialOrderFilter::new("all", "tiktok").expect("filter");
        assert_eq!(tiktok.apply(orders.clone()).len(), 2);

        let by_id = SocialOrderFilter::new("completed", "E5F6").expect("filter");
        let found = by_id.apply(orders);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].customer_email, "emeka@example.com");

        assert!(SocialOrderFilter::new("shipped", "").is_err());
    }

    #[test]
    fn welcome_name_is_email_local_part() {
        assert_eq!(welcome_name("studio@jesprec.com"), "studio");
        assert_eq!(welcome_name("plain"), "plain");
    }
}
