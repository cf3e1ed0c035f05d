use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{AttachedItem, Category, SourceItem};

/// Core fields owned directly by the resume aggregate: name, contact,
/// summary, and links. Edited through a separate buffered form and flushed
/// as one call alongside the per-item flushes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResumeCoreFields {
    pub full_name: String,
    pub headline: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub summary: Option<String>,
    #[serde(default)]
    pub links: Vec<String>,
}

/// The read-only snapshot of a person's profile-level items available to
/// attach to any resume.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourcePool {
    pub experiences: Vec<SourceItem>,
    pub education: Vec<SourceItem>,
    pub certifications: Vec<SourceItem>,
    pub skills: Vec<SourceItem>,
}

impl SourcePool {
    pub fn items(&self, category: Category) -> &[SourceItem] {
        match category {
            Category::Experience => &self.experiences,
            Category::Education => &self.education,
            Category::Certification => &self.certifications,
            Category::Skill => &self.skills,
        }
    }

    pub fn find(&self, category: Category, source_id: Uuid) -> Option<&SourceItem> {
        self.items(category).iter().find(|item| item.id == source_id)
    }
}

/// The resume's own collection of attached items, one list per category.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttachmentSet {
    pub experiences: Vec<AttachedItem>,
    pub education: Vec<AttachedItem>,
    pub certifications: Vec<AttachedItem>,
    pub skills: Vec<AttachedItem>,
}

impl AttachmentSet {
    pub fn items(&self, category: Category) -> &[AttachedItem] {
        match category {
            Category::Experience => &self.experiences,
            Category::Education => &self.education,
            Category::Certification => &self.certifications,
            Category::Skill => &self.skills,
        }
    }

    fn items_mut(&mut self, category: Category) -> &mut Vec<AttachedItem> {
        match category {
            Category::Experience => &mut self.experiences,
            Category::Education => &mut self.education,
            Category::Certification => &mut self.certifications,
            Category::Skill => &mut self.skills,
        }
    }

    pub fn push(&mut self, item: AttachedItem) {
        self.items_mut(item.category()).push(item);
    }

    pub fn get(&self, category: Category, attachment_id: Uuid) -> Option<&AttachedItem> {
        self.items(category).iter().find(|item| item.id == attachment_id)
    }

    pub fn remove(&mut self, category: Category, attachment_id: Uuid) -> Option<AttachedItem> {
        let items = self.items_mut(category);
        let index = items.iter().position(|item| item.id == attachment_id)?;
        Some(items.remove(index))
    }

    /// The attachment created from `source_id`, if the source is currently
    /// attached. Direct-created items (`source_ref: None`) never match.
    pub fn find_by_source(&self, category: Category, source_id: Uuid) -> Option<&AttachedItem> {
        self.items(category)
            .iter()
            .find(|item| item.source_ref == Some(source_id))
    }

    /// Derived selection set: the source ids with a live attachment.
    /// Reconstructed on every read, never stored.
    pub fn selected_sources(&self, category: Category) -> HashSet<Uuid> {
        self.items(category)
            .iter()
            .filter_map(|item| item.source_ref)
            .collect()
    }

    pub fn contains(&self, category: Category, attachment_id: Uuid) -> bool {
        self.get(category, attachment_id).is_some()
    }
}

/// The authoritative remote state of one resume: its attached items per
/// category plus its core fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResumeSnapshot {
    pub attachments: AttachmentSet,
    pub core: ResumeCoreFields,
}
