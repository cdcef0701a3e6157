//! Configuration module

mod site;

pub use site::HeroConfig;
pub use site::ProfileConfig;
pub use site::ProfileLink;
pub use site::SiteConfig;
pub use site::{Skill, SkillGroup, TimelineEntry};
