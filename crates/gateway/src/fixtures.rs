use jesprec_core::domain::{
    gallery::{DeliveryFee, GalleryItem},
    portfolio::{CaseStudy, Project, Vault},
    social::{Audience, PackageCategory, SocialFeature, SocialPackage},
    Record, RowId,
};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use crate::{
    error::GatewayError,
    filter::{Filter, Query},
    gateway::Gateway,
};

const PROJECT_IDS: &[&str] = &[
    "5e1d0000-0000-4000-8000-000000000001",
    "5e1d0000-0000-4000-8000-000000000002",
    "5e1d0000-0000-4000-8000-000000000003",
];
const GALLERY_IDS: &[&str] =
    &["5e1d0000-0000-4000-8000-000000000101", "5e1d0000-0000-4000-8000-000000000102"];
const FEE_IDS: &[&str] = &[
    "5e1d0000-0000-4000-8000-000000000201",
    "5e1d0000-0000-4000-8000-000000000202",
    "5e1d0000-0000-4000-8000-000000000203",
    "5e1d0000-0000-4000-8000-000000000204",
];
const PACKAGE_IDS: &[&str] = &[
    "5e1d0000-0000-4000-8000-000000000301",
    "5e1d0000-0000-4000-8000-000000000302",
    "5e1d0000-0000-4000-8000-000000000303",
    "5e1d0000-0000-4000-8000-000000000304",
    "5e1d0000-0000-4000-8000-000000000305",
    "5e1d0000-0000-4000-8000-000000000306",
    "5e1d0000-0000-4000-8000-000000000307",
];
const FEATURE_IDS: &[&str] = &[
    "5e1d0000-0000-4000-8000-000000000401",
    "5e1d0000-0000-4000-8000-000000000402",
    "5e1d0000-0000-4000-8000-000000000403",
];

/// The studio's starter catalog: portfolio, art drops, delivery parks and social packages.
pub struct StudioSeedDataset;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SeedResult {
    pub projects: usize,
    pub gallery_items: usize,
    pub delivery_fees: usize,
    pub social_packages: usize,
    pub social_features: usize,
}

impl SeedResult {
    pub fn total(&self) -> usize {
        self.projects
            + self.gallery_items
            + self.delivery_fees
            + self.social_packages
            + self.social_features
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct VerificationResult {
    pub missing: Vec<String>,
}

impl VerificationResult {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

impl StudioSeedDataset {
    /// Replaces any previous seed rows, so running it twice is harmless.
    pub async fn load(gateway: &dyn Gateway) -> Result<SeedResult, GatewayError> {
        Self::clean(gateway).await?;
        Ok(SeedResult {
            projects: insert_all(gateway, &projects()).await?,
            gallery_items: insert_all(gateway, &gallery_items()).await?,
            delivery_fees: insert_all(gateway, &delivery_fees()).await?,
            social_packages: insert_all(gateway, &social_packages()).await?,
            social_features: insert_all(gateway, &social_features()).await?,
        })
    }

    pub async fn verify(gateway: &dyn Gateway) -> Result<VerificationResult, GatewayError> {
        let mut missing = Vec::new();
        for (table, ids) in seed_tables() {
            let present = gateway.select(table, &ids_query(ids)).await?;
            for id in ids {
                if !present.iter().any(|row| row.get("id").and_then(Value::as_str) == Some(*id)) {
                    missing.push(format!("{table}/{id}"));
                }
            }
        }
        Ok(VerificationResult { missing })
    }

    pub async fn clean(gateway: &dyn Gateway) -> Result<(), GatewayError> {
        for (table, ids) in seed_tables() {
            gateway.delete(table, &ids_query(ids)).await?;
        }
        Ok(())
    }
}

fn seed_tables() -> [(&'static str, &'static [&'static str]); 5] {
    [
        (Project::TABLE, PROJECT_IDS),
        (GalleryItem::TABLE, GALLERY_IDS),
        (DeliveryFee::TABLE, FEE_IDS),
        (SocialPackage::TABLE, PACKAGE_IDS),
        (SocialFeature::TABLE, FEATURE_IDS),
    ]
}

fn ids_query(ids: &[&str]) -> Query {
    Query::new().filter(Filter::or(ids.iter().map(|id| Filter::eq("id", id)).collect()))
}

async fn insert_all<T: Record>(gateway: &dyn Gateway, records: &[T]) -> Result<usize, GatewayError> {
    let mut rows = Vec::with_capacity(records.len());
    for record in records {
        record.validate()?;
        rows.push(serde_json::to_value(record)?);
    }
    Ok(gateway.insert(T::TABLE, rows).await?.len())
}

fn id(raw: &str) -> Option<RowId> {
    Some(RowId(raw.to_owned()))
}

fn tags(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_owned()).collect()
}

pub fn projects() -> Vec<Project> {
    vec![
        Project {
            id: id(PROJECT_IDS[0]),
            title: "QuickVend".to_owned(),
            vault: Vault::Digital,
            image_url: "https://images.unsplash.com/photo-1556742044-3c52d6e88c62?auto=format&fit=crop&q=80&w=800".to_owned(),
            description: "Empowering Nigerian Local Vendors with Mobile-First Sales Management.".to_owned(),
            tags: tags(&["React Native", "NativeWind", "Fintech"]),
            case_study: Some(CaseStudy {
                challenge: "Local vendors track credit, debt and daily profits on paper ledgers and need a simple offline-capable tool for busy market stalls.".to_owned(),
                strategy: "A React Native app built around a 10-second sale entry flow, styled with NativeWind and tuned for low-end Android devices.".to_owned(),
                result: "Vendors record a sale in under 10 seconds and reconcile the day without ledger errors.".to_owned(),
                references: Vec::new(),
            }),
            created_at: None,
        },
        Project {
            id: id(PROJECT_IDS[1]),
            title: "SkillBridge Africa".to_owned(),
            vault: Vault::Digital,
            image_url: "https://images.unsplash.com/photo-1501504905252-473c47e087f8?auto=format&fit=crop&q=80&w=800".to_owned(),
            description: "Bridging the Gap Between Trainers and Tech Learners Across the Continent.".to_owned(),
            tags: tags(&["Full-Stack", "LMS", "Next.js"]),
            case_study: Some(CaseStudy {
                challenge: "Specialised trainers lack one place to show portfolios, manage learners and verify skills.".to_owned(),
                strategy: "Trainer profiles with linked repositories and deployment tracking behind a mobile-first UI.".to_owned(),
                result: "Trainer-to-learner interactions and verifiable skill badges used by hundreds of learners.".to_owned(),
                references: Vec::new(),
            }),
            created_at: None,
        },
        Project {
            id: id(PROJECT_IDS[2]),
            title: "The Visual Vault: Lagos Pulse".to_owned(),
            vault: Vault::Visual,
            image_url: "https://images.unsplash.com/photo-1514525253361-bee8718a747b?auto=format&fit=crop&q=80&w=800".to_owned(),
            description: "Cinematic storytelling through high-octane event coverage and drone cinematography.".to_owned(),
            tags: tags(&["Drone", "4K Video", "Editing"]),
            case_study: Some(CaseStudy {
                challenge: "Event coverage lacked the cinematic scale of modern Lagos summits.".to_owned(),
                strategy: "High-altitude drone passes synchronised with multi-cam 4K feeds for a live reel.".to_owned(),
                result: "A 60-second sizzle reel that lifted client engagement by 45% on social platforms.".to_owned(),
                references: Vec::new(),
            }),
            created_at: None,
        },
    ]
}

pub fn gallery_items() -> Vec<GalleryItem> {
    vec![
        GalleryItem {
            id: id(GALLERY_IDS[0]),
            name: "Cyberpunk Skyline".to_owned(),
            price: "₦250,000".to_owned(),
            image_url: "https://images.unsplash.com/photo-1541701494587-cb58502866ab?auto=format&fit=crop&q=80&w=600".to_owned(),
            category: "Original Canvas".to_owned(),
            stock_count: 3,
            is_sold_out: false,
            created_at: None,
        },
        GalleryItem {
            id: id(GALLERY_IDS[1]),
            name: "Neural Abstract".to_owned(),
            price: "₦180,000".to_owned(),
            image_url: "https://images.unsplash.com/photo-1614850523296-d8c1af93d400?auto=format&fit=crop&q=80&w=600".to_owned(),
            category: "Framed Print".to_owned(),
            stock_count: 10,
            is_sold_out: false,
            created_at: None,
        },
    ]
}

pub fn delivery_fees() -> Vec<DeliveryFee> {
    [
        (FEE_IDS[0], "Lagos", "Jibowu Park", 3000),
        (FEE_IDS[1], "Lagos", "Ojota Park", 2500),
        (FEE_IDS[2], "FCT Abuja", "Utako Park", 5000),
        (FEE_IDS[3], "Oyo", "Challenge Park", 4000),
    ]
    .into_iter()
    .map(|(raw_id, state, park, fee)| DeliveryFee {
        id: id(raw_id),
        state: state.to_owned(),
        park_name: park.to_owned(),
        fee: Decimal::from(fee),
    })
    .collect()
}

#[allow(clippy::too_many_arguments)]
fn package(
    raw_id: &str,
    name: &str,
    category: PackageCategory,
    platform: &str,
    service_type: &str,
    audience: Audience,
    unit_price: Decimal,
    features: &[&str],
) -> SocialPackage {
    SocialPackage {
        id: id(raw_id),
        name: name.to_owned(),
        category,
        platform: platform.to_owned(),
        service_type: service_type.to_owned(),
        audience_type: audience,
        unit_price,
        min_quantity: 100,
        max_quantity: 10_000,
        features: tags(features),
        is_active: true,
    }
}

pub fn social_packages() -> Vec<SocialPackage> {
    use Audience::{Nigeria, Worldwide};
    use PackageCategory::{Bundle, GrowthMetric, Management};
    vec![
        package(PACKAGE_IDS[0], "Instagram Followers", GrowthMetric, "instagram", "followers", Nigeria, Decimal::new(25, 1), &[]),
        package(PACKAGE_IDS[1], "Instagram Likes", GrowthMetric, "instagram", "likes", Nigeria, Decimal::ONE, &[]),
        package(PACKAGE_IDS[2], "TikTok Views", GrowthMetric, "tiktok", "views", Worldwide, Decimal::new(5, 1), &[]),
        package(PACKAGE_IDS[3], "Starter Management", Management, "instagram", "management", Nigeria, Decimal::from(75_000), &["12 posts per month", "Caption writing", "Monthly report"]),
        package(PACKAGE_IDS[4], "Growth Management", Management, "instagram", "management", Nigeria, Decimal::from(150_000), &["20 posts per month", "Community management", "Bi-weekly report"]),
        package(PACKAGE_IDS[5], "Premium Management", Management, "instagram", "management", Nigeria, Decimal::from(300_000), &["Daily posting", "Paid ads management", "Weekly strategy call"]),
        package(PACKAGE_IDS[6], "Launch Bundle", Bundle, "instagram", "bundle", Nigeria, Decimal::from(20_000), &["Profile audit", "Content calendar"]),
    ]
}

pub fn social_features() -> Vec<SocialFeature> {
    [
        (FEATURE_IDS[0], "Reels Editing", 15_000, "content", "🎬"),
        (FEATURE_IDS[1], "Graphic Design", 10_000, "content", "🎨"),
        (FEATURE_IDS[2], "Ad Campaign Setup", 25_000, "ads", "📣"),
    ]
    .into_iter()
    .map(|(raw_id, name, price, category, icon)| SocialFeature {
        id: id(raw_id),
        name: name.to_owned(),
        unit_price: Decimal::from(price),
        min_qty: 1,
        category: category.to_owned(),
        icon: icon.to_owned(),
        is_active: true,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::{gallery_items, projects, social_packages, StudioSeedDataset};
    use crate::{error::GatewayError, filter::Query, gateway::Gateway, memory::InMemoryGateway};

    #[test]
    fn seed_records_pass_validation() {
        use jesprec_core::domain::Record;
        assert!(projects().iter().all(|project| project.validate().is_ok()));
        assert!(gallery_items().iter().all(|item| item.validate().is_ok()));
        assert!(social_packages().iter().all(|package| package.validate().is_ok()));
    }

    #[tokio::test]
    async fn load_is_repeatable_and_verifiable() -> Result<(), GatewayError> {
        let gateway = InMemoryGateway::new();

        let first = StudioSeedDataset::load(&gateway).await?;
        let second = StudioSeedDataset::load(&gateway).await?;
        assert_eq!(first, second);
        assert_eq!(first.projects, 3);
        assert_eq!(first.total(), 19);
        assert_eq!(gateway.count("projects", &Query::new()).await?, 3);
        assert!(StudioSeedDataset::verify(&gateway).await?.is_complete());

        StudioSeedDataset::clean(&gateway).await?;
        let verification = StudioSeedDataset::verify(&gateway).await?;
        assert_eq!(verification.missing.len(), 19);
        Ok(())
    }
}
