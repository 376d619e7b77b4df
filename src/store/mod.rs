//! Persistence for users, classes and enrollments.
//!
//! Uniqueness of usernames and of (student, class) pairs is enforced inside each
//! implementation's atomic write, never by a read-then-write in the caller.

mod memory;
mod pg;
mod types;

use async_trait::async_trait;
use uuid::Uuid;

pub use memory::MemoryStore;
pub use pg::PgStore;
pub use types::{Class, Role, UnknownRole, User};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("username already taken")]
    DuplicateUsername,
    #[error("student already enrolled in class")]
    AlreadyEnrolled,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn create_user(&self, username: &str, password_hash: &str, role: Role)
        -> StoreResult<User>;

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    async fn create_class(&self, name: &str, instructor_id: Uuid) -> StoreResult<Class>;

    async fn find_class(&self, class_id: Uuid) -> StoreResult<Option<Class>>;

    /// All classes whose id is not in `exclude`.
    async fn list_classes(&self, exclude: &[Uuid]) -> StoreResult<Vec<Class>>;

    async fn list_classes_by_instructor(&self, instructor_id: Uuid) -> StoreResult<Vec<Class>>;

    async fn enroll(&self, student_id: Uuid, class_id: Uuid) -> StoreResult<()>;

    async fn list_enrolled_classes(&self, student_id: Uuid) -> StoreResult<Vec<Class>>;
}
