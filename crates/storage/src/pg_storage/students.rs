//! StudentStore implementation for PgStorage.

use async_trait::async_trait;
use chrono::Utc;
use school_assist_core::{Gender, NewStudent, Student};
use sqlx::Row;
use sqlx::postgres::PgRow;

use super::{PgStorage, usize_to_i64};
use crate::error::StorageError;
use crate::traits::StudentStore;

const STUDENT_COLUMNS: &str = "id, school_id, first_name, middle_name, last_name, gender, \
     date_of_birth, current_session_id, current_term_id, school_class_id, class_arm_id, \
     admission_date, status, created_at";

fn row_to_student(row: &PgRow) -> Result<Student, StorageError> {
    let gender: Gender = row.try_get::<String, _>("gender")?.parse()?;
    Ok(Student {
        id: row.try_get("id")?,
        school_id: row.try_get("school_id")?,
        first_name: row.try_get("first_name")?,
        middle_name: row.try_get("middle_name")?,
        last_name: row.try_get("last_name")?,
        gender,
        date_of_birth: row.try_get("date_of_birth")?,
        current_session_id: row.try_get("current_session_id")?,
        current_term_id: row.try_get("current_term_id")?,
        school_class_id: row.try_get("school_class_id")?,
        class_arm_id: row.try_get("class_arm_id")?,
        admission_date: row.try_get("admission_date")?,
        status: row.try_get("status")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl StudentStore for PgStorage {
    async fn create_student(&self, input: NewStudent) -> Result<Student, StorageError> {
        let student = Student::from_new(input, Utc::now());
        sqlx::query(&format!(
            "INSERT INTO students ({STUDENT_COLUMNS})
             VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14)"
        ))
        .bind(&student.id)
        .bind(&student.school_id)
        .bind(&student.first_name)
        .bind(&student.middle_name)
        .bind(&student.last_name)
        .bind(student.gender.as_str())
        .bind(student.date_of_birth)
        .bind(&student.current_session_id)
        .bind(&student.current_term_id)
        .bind(&student.school_class_id)
        .bind(&student.class_arm_id)
        .bind(student.admission_date)
        .bind(&student.status)
        .bind(student.created_at)
        .execute(&self.pool)
        .await?;
        Ok(student)
    }

    async fn get_student(&self, id: &str) -> Result<Option<Student>, StorageError> {
        let row = sqlx::query(&format!("SELECT {STUDENT_COLUMNS} FROM students WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| row_to_student(&r)).transpose()
    }

    async fn list_students(
        &self,
        school_id: &str,
        limit: usize,
    ) -> Result<Vec<Student>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE school_id = $1
             ORDER BY created_at DESC LIMIT $2"
        ))
        .bind(school_id)
        .bind(usize_to_i64(limit))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_student).collect()
    }
}
