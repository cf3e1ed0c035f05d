use std::fmt;

use serde::{Deserialize, Serialize};

/// The four item categories a resume is composed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Experience,
    Education,
    Certification,
    Skill,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Experience,
        Category::Education,
        Category::Certification,
        Category::Skill,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Experience => "experience",
            Category::Education => "education",
            Category::Certification => "certification",
            Category::Skill => "skill",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
