use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{require_non_empty, Record, RowId};
use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Vault {
    #[serde(rename = "Visual Vault")]
    Visual,
    #[serde(rename = "Digital Vault")]
    Digital,
}

impl Vault {
    pub fn label(self) -> &'static str {
        match self {
            Self::Visual => "Visual Vault",
            Self::Digital => "Digital Vault",
        }
    }
}

/// Portfolio tab selection; `All` shows every project.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VaultFilter {
    #[default]
    All,
    Only(Vault),
}

impl VaultFilter {
    pub const ALL: VaultFilter = VaultFilter::All;

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "all" | "all vaults" => Some(Self::All),
            "visual" | "visual vault" => Some(Self::Only(Vault::Visual)),
            "digital" | "digital vault" => Some(Self::Only(Vault::Digital)),
            _ => None,
        }
    }

    pub fn matches(self, project: &Project) -> bool {
        match self {
            Self::All => true,
            Self::Only(vault) => project.vault == vault,
        }
    }

    pub fn apply(self, projects: &[Project]) -> Vec<Project> {
        projects.iter().filter(|project| self.matches(project)).cloned().collect()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseStudy {
    #[serde(default)]
    pub challenge: String,
    #[serde(default)]
    pub strategy: String,
    #[serde(default)]
    pub result: String,
    #[serde(default)]
    pub references: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RowId>,
    pub title: String,
    pub vault: Vault,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub case_study: Option<CaseStudy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Record for Project {
    const TABLE: &'static str = "projects";

    fn id(&self) -> Option<&RowId> {
        self.id.as_ref()
    }

    fn validate(&self) -> Result<(), DomainError> {
        require_non_empty(&self.title, "Project title is required")
    }
}

/// A line on the services page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct StudioService {
    pub id: &'static str,
    pub title: &'static str,
    pub items: &'static [&'static str],
    pub icon: &'static str,
}

pub const CREATIVE_SERVICES: [StudioService; 2] = [
    StudioService {
        id: "cs1",
        title: "Media Production",
        items: &["Cinematic Ads", "Corporate Docs", "Product Photography"],
        icon: "🎥",
    },
    StudioService {
        id: "cs2",
        title: "Innovation Media",
        items: &["Drone Coverage", "Livestreaming", "Event Capture"],
        icon: "🚁",
    },
];

pub const DIGITAL_SERVICES: [StudioService; 2] = [
    StudioService {
        id: "ds1",
        title: "Digital Architecture",
        items: &["Custom Full-Stack Web", "React Native Apps", "UI/UX Design"],
        icon: "💻",
    },
    StudioService {
        id: "ds2",
        title: "Strategic Growth",
        items: &["Brand Identity", "Social Management", "Content Strategy"],
        icon: "📈",
    },
];

#[cfg(test)]
mod tests {
    use super::{Project, Vault, VaultFilter};
    use crate::domain::Record;

    fn project(title: &str, vault: Vault) -> Project {
        Project {
            id: None,
            title: title.to_owned(),
            vault,
            image_url: String::new(),
            description: String::new(),
            tags: Vec::new(),
            case_study: None,
            created_at: None,
        }
    }

    #[test]
    fn vault_filter_selects_matching_projects() {
        let projects = vec![
            project("QuickVend", Vault::Digital),
            project("Lagos Pulse", Vault::Visual),
            project("SkillBridge Africa", Vault::Digital),
        ];

        let digital = VaultFilter::Only(Vault::Digital).apply(&projects);
        assert_eq!(digital.len(), 2);
        assert_eq!(VaultFilter::ALL.apply(&projects).len(), 3);
    }

    #[test]
    fn vault_filter_parses_tab_names() {
        assert_eq!(VaultFilter::parse("All Vaults"), Some(VaultFilter::All));
        assert_eq!(VaultFilter::parse("visual"), Some(VaultFilter::Only(Vault::Visual)));
        assert_eq!(VaultFilter::parse("audio"), None);
    }

    #[test]
    fn vault_serializes_with_display_name() {
        let json = serde_json::to_value(project("QuickVend", Vault::Digital)).expect("json");
        assert_eq!(json["vault"], "Digital Vault");
        assert!(json.get("id").is_none());
    }

    #[test]
    fn untitled_project_fails_validation() {
        assert!(project("  ", Vault::Visual).validate().is_err());
        assert!(project("QuickVend", Vault::Digital).validate().is_ok());
    }
}
