use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::models::Category;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExperienceFields {
    pub title: String,
    pub organization: String,
    pub location: Option<String>,
    pub date_start: Option<NaiveDate>,
    pub date_end: Option<NaiveDate>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EducationFields {
    pub institution: String,
    pub degree: String,
    pub field: Option<String>,
    pub date_start: Option<NaiveDate>,
    pub date_end: Option<NaiveDate>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CertificationFields {
    pub name: String,
    pub issuer: String,
    pub date_issued: Option<NaiveDate>,
    pub date_expires: Option<NaiveDate>,
    pub credential_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkillFields {
    pub name: String,
    pub level: Option<String>,
}

/// Category-specific field payload of a source or attached item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum ItemFields {
    Experience(ExperienceFields),
    Education(EducationFields),
    Certification(CertificationFields),
    Skill(SkillFields),
}

impl ItemFields {
    pub fn category(&self) -> Category {
        match self {
            ItemFields::Experience(_) => Category::Experience,
            ItemFields::Education(_) => Category::Education,
            ItemFields::Certification(_) => Category::Certification,
            ItemFields::Skill(_) => Category::Skill,
        }
    }

    /// The fields as a JSON object (includes the `category` tag).
    pub fn to_object(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

/// A partial set of field overrides, keyed by field name.
///
/// Used for pending edits, core-field edits, update payloads, and
/// creation-form drafts. Only the keys present in the patch are sent to the
/// remote store; everything else keeps its stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPatch(pub Map<String, Value>);

impl FieldPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    /// Overlays this patch onto `base`, replacing overlapping keys.
    pub fn merge_over(&self, base: &mut Map<String, Value>) {
        for (field, value) in &self.0 {
            base.insert(field.clone(), value.clone());
        }
    }
}

/// A profile-owned item available for attachment. Immutable from the resume
/// editor's perspective; created/updated/deleted only through
/// profile-management flows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceItem {
    pub id: Uuid,
    #[serde(flatten)]
    pub fields: ItemFields,
    pub updated_at: DateTime<Utc>,
}

impl SourceItem {
    pub fn category(&self) -> Category {
        self.fields.category()
    }
}

/// A resume-owned item: a copy of a source item taken at attach time, or a
/// directly created item with no `source_ref`. Belongs to exactly one resume
/// and at most one source item. Its field values change only through the
/// save flush; detaching destroys it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachedItem {
    pub id: Uuid,
    pub source_ref: Option<Uuid>,
    #[serde(flatten)]
    pub fields: ItemFields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AttachedItem {
    pub fn category(&self) -> Category {
        self.fields.category()
    }

    /// Buffer-over-source read: the stored fields with any pending edits
    /// overlaid, so unsaved edits are visible before save.
    pub fn merged_fields(&self, pending: Option<&FieldPatch>) -> Map<String, Value> {
        let mut object = self.fields.to_object();
        if let Some(patch) = pending {
            patch.merge_over(&mut object);
        }
        object
    }
}
