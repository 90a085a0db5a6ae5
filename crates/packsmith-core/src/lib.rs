//! Persistence and workflows on top of `packsmith-model`:
//! - Project files and the per-project package store.
//! - The package editor (open, edit, validate, save).
//! - Publishing through a [`packsmith_model::Transfer`].
//! - Feedback submission.

mod editor;
mod feedback;
mod project;
mod publish;
mod store;

pub use editor::{
    EditorError, PackageDraft, PackageEditor, SaveOutcome, create_package, delete_package,
};
pub use feedback::{FeedbackError, FeedbackMessage, is_valid_mail_address, send_feedback};
pub use project::{
    PackageEntry, ProjectError, TransferSettings, UpdateProject, validate_project_name,
};
pub use publish::{
    CONFIGURATION_REMOTE_NAME, PublishError, publish_configuration, publish_package,
};
pub use store::{PackageStore, StoreError};
