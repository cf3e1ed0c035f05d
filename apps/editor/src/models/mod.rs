pub mod category;
pub mod items;
pub mod resume;

pub use category::Category;
pub use items::{
    AttachedItem, CertificationFields, EducationFields, ExperienceFields, FieldPatch, ItemFields,
    SkillFields, SourceItem,
};
pub use resume::{AttachmentSet, ResumeCoreFields, ResumeSnapshot, SourcePool};
