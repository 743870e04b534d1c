//! Static portfolio content consumed by the effects.
//!
//! Only the pieces the effects read are modelled: skill groups (for the
//! orbit) and timeline items (for the 3D timeline). Everything else in the
//! page's content file is ignored.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::error::FxResult;

/// One named category of skills.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkillGroup {
    pub category: String,
    pub skills: Vec<String>,
}

/// Skill categories in the order the content file declares them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SkillGroups(pub Vec<SkillGroup>);

impl SkillGroups {
    pub fn from_json(json: &str) -> FxResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|g| g.skills.is_empty())
    }

    pub fn groups(&self) -> &[SkillGroup] {
        &self.0
    }

    /// All skills, flattened in category order.
    pub fn all_skills(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .flat_map(|g| g.skills.iter().map(String::as_str))
    }
}

impl<'de> Deserialize<'de> for SkillGroups {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct GroupsVisitor;

        impl<'de> Visitor<'de> for GroupsVisitor {
            type Value = SkillGroups;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of category name to a list of skills")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut groups = Vec::new();
                while let Some((category, skills)) = map.next_entry::<String, Vec<String>>()? {
                    groups.push(SkillGroup { category, skills });
                }
                Ok(SkillGroups(groups))
            }
        }

        deserializer.deserialize_map(GroupsVisitor)
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct TimelineItem {
    pub title: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub period: String,
    #[serde(default)]
    pub highlights: Vec<String>,
}

impl TimelineItem {
    /// Organisation line for the tooltip; falls back to the title.
    pub fn subtitle(&self) -> &str {
        self.company.as_deref().unwrap_or(&self.title)
    }

    /// Native tooltip text used by the static markers.
    pub fn summary(&self) -> String {
        format!("{} - {}", self.title, self.period)
    }

    /// Parse a bare JSON array of items, as one timeline section.
    pub fn list_from_json(json: &str) -> FxResult<Vec<TimelineItem>> {
        Ok(serde_json::from_str(json)?)
    }
}

/// The subset of the page content the effects care about.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct PortfolioContent {
    pub skills: SkillGroups,
    pub experience: Vec<TimelineItem>,
    pub education: Vec<TimelineItem>,
}

impl PortfolioContent {
    pub fn from_json(json: &str) -> FxResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FxError;

    #[test]
    fn groups_keep_declaration_order() {
        let groups = SkillGroups::from_json(
            r#"{ "Langages": ["Rust", "Go", "Java"], "DevOps": ["Docker"], "API": [] }"#,
        )
        .unwrap();
        let names: Vec<_> = groups.groups().iter().map(|g| g.category.as_str()).collect();
        assert_eq!(names, ["Langages", "DevOps", "API"]);
        assert_eq!(
            groups.all_skills().collect::<Vec<_>>(),
            ["Rust", "Go", "Java", "Docker"]
        );
    }

    #[test]
    fn portfolio_ignores_unknown_sections() {
        let content = PortfolioContent::from_json(
            r#"{
                "name": "Jane",
                "skills": { "Frameworks": ["Axum"] },
                "experience": [{ "title": "Engineer", "company": "Acme", "period": "2020-2024" }]
            }"#,
        )
        .unwrap();
        assert_eq!(content.skills.groups().len(), 1);
        assert_eq!(content.experience[0].subtitle(), "Acme");
        assert!(content.education.is_empty());
    }

    #[test]
    fn empty_content_is_valid() {
        let content = PortfolioContent::from_json("{}").unwrap();
        assert!(content.skills.is_empty());
    }

    #[test]
    fn malformed_content_is_an_error() {
        assert!(matches!(
            SkillGroups::from_json(r#"["Rust"]"#),
            Err(FxError::Content(_))
        ));
    }

    #[test]
    fn timeline_section_parses_on_its_own() {
        let items = TimelineItem::list_from_json(
            r#"[{ "title": "MSc", "period": "2018", "highlights": ["Thesis"] }, { "title": "BSc" }]"#,
        )
        .unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].highlights, ["Thesis"]);
        assert_eq!(items[1].summary(), "BSc - ");
    }

    #[test]
    fn subtitle_falls_back_to_title() {
        let item = TimelineItem {
            title: "MSc".into(),
            ..Default::default()
        };
        assert_eq!(item.subtitle(), "MSc");
    }
}
