//! Route catalogue and the per-route field schemas rendered during the deep dive.
//!
//! Each route owns a fixed, closed list of field descriptors. Both the renderer and
//! [`accepts_key`] read the same table, so the fields a client can display and the
//! keys the wizard will store never drift apart.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Route {
    Media,
    Digital,
    Social,
    Art,
}

impl Route {
    pub const ALL: [Route; 4] = [Route::Media, Route::Digital, Route::Social, Route::Art];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Media => "MEDIA",
            Self::Digital => "DIGITAL",
            Self::Social => "SOCIAL",
            Self::Art => "ART",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|route| route.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Select,
    Text,
    ChoiceButtons,
    TextArea,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct FieldOption {
    pub value: &'static str,
    pub label: &'static str,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub options: &'static [FieldOption],
    pub placeholder: Option<&'static str>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RouteOption {
    pub route: Route,
    pub label: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
}

const fn same(value: &'static str) -> FieldOption {
    FieldOption { value, label: value }
}

const MEDIA_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor {
        key: "nature",
        label: "Event Nature",
        kind: FieldKind::Select,
        options: &[
            same("Wedding / Milestone Ceremony"),
            same("Corporate Documentary / Promo"),
            same("Music Video Production"),
            same("High-End Product Shoot"),
        ],
        placeholder: Some("Select Project Nature"),
    },
    FieldDescriptor {
        key: "location",
        label: "City / State",
        kind: FieldKind::Text,
        options: &[],
        placeholder: Some("e.g. Lagos, Nigeria"),
    },
    FieldDescriptor {
        key: "guests",
        label: "Guest Count (Est.)",
        kind: FieldKind::Text,
        options: &[],
        placeholder: Some("e.g. 200 - 500"),
    },
];

const DIGITAL_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor {
        key: "tech",
        label: "Core Requirement",
        kind: FieldKind::ChoiceButtons,
        options: &[
            same("Branding Only"),
            same("WordPress CMS"),
            same("Custom React Web"),
            same("React Native App"),
        ],
        placeholder: None,
    },
    FieldDescriptor {
        key: "hosting",
        label: "Domain & Hosting",
        kind: FieldKind::ChoiceButtons,
        options: &[
            FieldOption { value: "Yes", label: "I Have It" },
            FieldOption { value: "No", label: "I Need It" },
        ],
        placeholder: None,
    },
];

const SOCIAL_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor {
        key: "platform",
        label: "Target Platforms",
        kind: FieldKind::ChoiceButtons,
        options: &[same("Instagram"), same("TikTok"), same("LinkedIn")],
        placeholder: None,
    },
    FieldDescriptor {
        key: "goal",
        label: "Primary Goal",
        kind: FieldKind::Select,
        options: &[
            same("Brand Awareness"),
            same("Lead Generation & Sales"),
            same("Pure Content Creation"),
        ],
        placeholder: None,
    },
];

const ART_FIELDS: &[FieldDescriptor] = &[FieldDescriptor {
    key: "art_brief",
    label: "Commission Details",
    kind: FieldKind::TextArea,
    options: &[],
    placeholder: Some("Size, Style, and Theme of your desired art piece..."),
}];

const SCHEMAS: [(Route, &[FieldDescriptor]); 4] = [
    (Route::Media, MEDIA_FIELDS),
    (Route::Digital, DIGITAL_FIELDS),
    (Route::Social, SOCIAL_FIELDS),
    (Route::Art, ART_FIELDS),
];

pub const ROUTE_OPTIONS: [RouteOption; 4] = [
    RouteOption {
        route: Route::Media,
        label: "Media Production",
        icon: "🎥",
        description: "Photo, Video, Drone, Events",
    },
    RouteOption {
        route: Route::Digital,
        label: "Digital Identity",
        icon: "💻",
        description: "Web, UI/UX, Mobile Apps",
    },
    RouteOption {
        route: Route::Social,
        label: "Social & Growth",
        icon: "📈",
        description: "Ads, Management, Strategy",
    },
    RouteOption {
        route: Route::Art,
        label: "Art & Framing",
        icon: "🖼️",
        description: "Custom Canvas, Gallery Pieces",
    },
];

pub fn schema_for(route: Route) -> &'static [FieldDescriptor] {
    SCHEMAS
        .iter()
        .find(|(candidate, _)| *candidate == route)
        .map(|(_, fields)| *fields)
        .unwrap_or(&[])
}

pub fn accepts_key(route: Route, key: &str) -> bool {
    schema_for(route).iter().any(|field| field.key == key)
}

#[cfg(test)]
mod tests {
    use super::{accepts_key, schema_for, FieldKind, Route, ROUTE_OPTIONS};

    fn keys(route: Route) -> Vec<&'static str> {
        schema_for(route).iter().map(|field| field.key).collect()
    }

    #[test]
    fn every_route_has_its_own_closed_field_set() {
        assert_eq!(keys(Route::Media), vec!["nature", "location", "guests"]);
        assert_eq!(keys(Route::Digital), vec!["tech", "hosting"]);
        assert_eq!(keys(Route::Social), vec!["platform", "goal"]);
        assert_eq!(keys(Route::Art), vec!["art_brief"]);
    }

    #[test]
    fn schema_sizes_stay_within_one_to_four_fields() {
        for route in Route::ALL {
            let len = schema_for(route).len();
            assert!((1..=4).contains(&len), "{route} has {len} fields");
        }
    }

    #[test]
    fn hosting_buttons_carry_yes_no_values_with_friendly_labels() {
        let hosting = schema_for(Route::Digital)
            .iter()
            .find(|field| field.key == "hosting")
            .expect("hosting field");
        assert_eq!(hosting.kind, FieldKind::ChoiceButtons);
        let pairs: Vec<_> = hosting.options.iter().map(|o| (o.value, o.label)).collect();
        assert_eq!(pairs, vec![("Yes", "I Have It"), ("No", "I Need It")]);
    }

    #[test]
    fn keys_from_other_routes_are_not_accepted() {
        assert!(accepts_key(Route::Art, "art_brief"));
        assert!(!accepts_key(Route::Art, "tech"));
        assert!(!accepts_key(Route::Media, "goal"));
    }

    #[test]
    fn gateway_grid_lists_four_routes_in_fixed_order() {
        let routes: Vec<_> = ROUTE_OPTIONS.iter().map(|option| option.route).collect();
        assert_eq!(routes, Route::ALL.to_vec());

        let labels: Vec<_> = ROUTE_OPTIONS.iter().map(|option| option.label).collect();
        assert_eq!(labels, vec!["Media Production", "Digital Identity", "Social & Growth", "Art & Framing"]);
        assert_eq!(ROUTE_OPTIONS[0].description, "Photo, Video, Drone, Events");
        assert_eq!(ROUTE_OPTIONS[3].icon, "🖼️");
    }

    #[test]
    fn field_labels_match_the_deep_dive_headings() {
        let labels = |route| schema_for(route).iter().map(|field| field.label).collect::<Vec<_>>();
        assert_eq!(labels(Route::Media), vec!["Event Nature", "City / State", "Guest Count (Est.)"]);
        assert_eq!(labels(Route::Digital), vec!["Core Requirement", "Domain & Hosting"]);
        assert_eq!(labels(Route::Social), vec!["Target Platforms", "Primary Goal"]);
        assert_eq!(labels(Route::Art), vec!["Commission Details"]);
    }

    #[test]
    fn route_parse_is_case_insensitive() {
        assert_eq!(Route::parse("digital"), Some(Route::Digital));
        assert_eq!(Route::parse(" ART "), Some(Route::Art));
        assert_eq!(Route::parse("print"), None);
    }
}
