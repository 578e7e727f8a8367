use async_trait::async_trait;
use school_assist_core::{ChatUser, ClassArm, School, SchoolClass};

use crate::error::StorageError;

/// User accounts and their direct permission grants.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Get user by ID, including direct permissions.
    async fn get_user(&self, id: &str) -> Result<Option<ChatUser>, StorageError>;

    /// Save or replace a user and its direct permissions.
    async fn save_user(&self, user: &ChatUser) -> Result<(), StorageError>;
}

/// Schools and their class/arm catalog.
#[async_trait]
pub trait SchoolStore: Send + Sync {
    /// Get school by ID.
    async fn get_school(&self, id: &str) -> Result<Option<School>, StorageError>;

    /// Save or replace a school.
    async fn save_school(&self, school: &School) -> Result<(), StorageError>;

    /// All classes of a school, ordered by name.
    async fn list_classes(&self, school_id: &str) -> Result<Vec<SchoolClass>, StorageError>;

    /// All arms of all classes of a school, ordered by name.
    async fn list_arms(&self, school_id: &str) -> Result<Vec<ClassArm>, StorageError>;

    /// Save or replace a class.
    async fn save_class(&self, class: &SchoolClass) -> Result<(), StorageError>;

    /// Save or replace an arm.
    async fn save_arm(&self, arm: &ClassArm) -> Result<(), StorageError>;

    /// Delete a class and its arms. Returns `true` if the class existed.
    async fn delete_class(&self, id: &str) -> Result<bool, StorageError>;
}
