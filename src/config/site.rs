//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub author: String,
    pub language: String,

    // Landing page
    #[serde(default)]
    pub hero: HeroConfig,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub source_dir: String,
    pub public_dir: String,

    // Writing
    pub new_post_name: String,
    pub render_drafts: bool,
    pub default_category: String,

    /// chrono format used to display parsed post dates
    pub date_format: String,
    pub words_per_minute: usize,
    pub excerpt_length: usize,

    // About page
    #[serde(default)]
    pub profile: ProfileConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Dev Blog".to_string(),
            subtitle: String::new(),
            description: String::new(),
            author: "John Doe".to_string(),
            language: "en".to_string(),

            hero: HeroConfig::default(),

            url: "http://example.com".to_string(),
            root: "/".to_string(),

            source_dir: "source".to_string(),
            public_dir: "public".to_string(),

            new_post_name: ":title.md".to_string(),
            render_drafts: false,
            default_category: "Uncategorized".to_string(),

            date_format: "%b %-d, %Y".to_string(),
            words_per_minute: 200,
            excerpt_length: 160,

            profile: ProfileConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}

/// Landing page banner
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeroConfig {
    pub heading: String,
    pub tagline: String,
    #[serde(default)]
    pub topics: Vec<String>,
}

impl Default for HeroConfig {
    fn default() -> Self {
        Self {
            heading: "Backend Development Insights & Tutorials".to_string(),
            tagline: "Deep dives into system design, API development, databases, and scalable architecture.".to_string(),
            topics: vec![
                "System Design".to_string(),
                "API Development".to_string(),
                "Database Engineering".to_string(),
            ],
        }
    }
}

/// Static profile data shown on the about page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    pub name: String,
    pub headline: String,
    pub bio: String,
    pub location: String,
    pub experience: String,
    #[serde(default)]
    pub links: Vec<ProfileLink>,
    #[serde(default)]
    pub timeline: Vec<TimelineEntry>,
    #[serde(default)]
    pub skills: Vec<SkillGroup>,
}

/// External profile link (GitHub, LinkedIn, mail)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileLink {
    pub label: String,
    pub url: String,
}

/// One position in the career timeline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineEntry {
    pub title: String,
    pub company: String,
    pub period: String,
    pub description: String,
    #[serde(default)]
    pub achievements: Vec<String>,
}

/// A group of skills with proficiency levels
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillGroup {
    pub category: String,
    #[serde(default)]
    pub skills: Vec<Skill>,
}

/// A single skill; `level` is a percentage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    #[serde(deserialize_with = "clamp_level")]
    pub level: u8,
}

fn clamp_level<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let level = u32::deserialize(deserializer)?;
    Ok(level.min(100) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.title, "Dev Blog");
        assert_eq!(config.public_dir, "public");
        assert_eq!(config.words_per_minute, 200);
        assert!(config.profile.timeline.is_empty());
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: My Blog
author: Test User
default_category: Notes
profile:
  name: Jane
  links:
    - label: GitHub
      url: https://github.com
  timeline:
    - title: Backend Engineer
      company: Tech Corp
      period: 2024 - now
      achievements:
        - Cut latency by 60%
  skills:
    - category: Languages
      skills:
        - name: Rust
          level: 150
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "My Blog");
        assert_eq!(config.author, "Test User");
        assert_eq!(config.default_category, "Notes");
        assert_eq!(config.root, "/");
        assert_eq!(config.profile.name, "Jane");
        assert_eq!(config.profile.links[0].label, "GitHub");
        assert_eq!(config.profile.timeline[0].achievements.len(), 1);
        assert_eq!(config.profile.skills[0].skills[0].level, 100);
    }
}
