use async_trait::async_trait;
use school_assist_core::{NewStudent, Student};

use crate::error::StorageError;

/// Student records.
#[async_trait]
pub trait StudentStore: Send + Sync {
    /// Insert a new student and return the stored row.
    async fn create_student(&self, input: NewStudent) -> Result<Student, StorageError>;

    /// Get student by ID.
    async fn get_student(&self, id: &str) -> Result<Option<Student>, StorageError>;

    /// Students of a school, newest first.
    async fn list_students(
        &self,
        school_id: &str,
        limit: usize,
    ) -> Result<Vec<Student>, StorageError>;
}
