//! UserStore and SchoolStore implementations for PgStorage.

use async_trait::async_trait;
use school_assist_core::{ChatUser, ClassArm, Permission, Role, School, SchoolClass};
use sqlx::Row;

use super::PgStorage;
use crate::error::StorageError;
use crate::traits::{SchoolStore, UserStore};

#[async_trait]
impl UserStore for PgStorage {
    async fn get_user(&self, id: &str) -> Result<Option<ChatUser>, StorageError> {
        let Some(row) = sqlx::query("SELECT id, school_id, role FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };
        let role: Role = row.try_get::<String, _>("role")?.parse()?;
        let mut user = ChatUser::new(row.try_get::<String, _>("id")?, row.try_get("school_id")?, role);

        let grants: Vec<String> =
            sqlx::query_scalar("SELECT permission FROM user_permissions WHERE user_id = $1")
                .bind(id)
                .fetch_all(&self.pool)
                .await?;
        for grant in grants {
            match grant.parse::<Permission>() {
                Ok(permission) => {
                    user.permissions.insert(permission);
                },
                Err(_) => {
                    tracing::warn!(user_id = id, permission = %grant, "unknown permission in DB, skipping");
                },
            }
        }
        Ok(Some(user))
    }

    async fn save_user(&self, user: &ChatUser) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO users (id, school_id, role) VALUES ($1, $2, $3)
             ON CONFLICT (id) DO UPDATE SET school_id = EXCLUDED.school_id, role = EXCLUDED.role",
        )
        .bind(&user.id)
        .bind(&user.school_id)
        .bind(user.role.as_str())
        .execute(&mut *tx)
        .await?;
        sqlx::query("DELETE FROM user_permissions WHERE user_id = $1")
            .bind(&user.id)
            .execute(&mut *tx)
            .await?;
        for permission in &user.permissions {
            sqlx::query("INSERT INTO user_permissions (user_id, permission) VALUES ($1, $2)")
                .bind(&user.id)
                .bind(permission.as_str())
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl SchoolStore for PgStorage {
    async fn get_school(&self, id: &str) -> Result<Option<School>, StorageError> {
        let row = sqlx::query(
            "SELECT id, name, current_session_id, current_term_id FROM schools WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(|r| {
            Ok(School {
                id: r.try_get("id")?,
                name: r.try_get("name")?,
                current_session_id: r.try_get("current_session_id")?,
                current_term_id: r.try_get("current_term_id")?,
            })
        })
        .transpose()
    }

    async fn save_school(&self, school: &School) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO schools (id, name, current_session_id, current_term_id)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (id) DO UPDATE SET
               name = EXCLUDED.name,
               current_session_id = EXCLUDED.current_session_id,
               current_term_id = EXCLUDED.current_term_id",
        )
        .bind(&school.id)
        .bind(&school.name)
        .bind(&school.current_session_id)
        .bind(&school.current_term_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_classes(&self, school_id: &str) -> Result<Vec<SchoolClass>, StorageError> {
        let rows = sqlx::query(
            "SELECT id, school_id, name FROM school_classes WHERE school_id = $1 ORDER BY name, id",
        )
        .bind(school_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter()
            .map(|r| {
                Ok(SchoolClass {
                    id: r.try_get("id")?,
                    school_id: r.try_get("school_id")?,
                    name: r.try_get("name")?,
                })
            })
            .collect()
    }

    async fn list_arms(&self, school_id: &str) -> Result<Vec<ClassArm>, StorageError> {
        let rows = sqlx::query(
            "SELECT a.id, a.school_class_id, a.name
               FROM class_arms a
               JOIN school_classes c ON c.id = a.school_class_id
              WHERE c.school_id = $1
              ORDER BY a.name, a.id",
        )
        .bind(school_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter()
            .map(|r| {
                Ok(ClassArm {
                    id: r.try_get("id")?,
                    school_class_id: r.try_get("school_class_id")?,
                    name: r.try_get("name")?,
                })
            })
            .collect()
    }

    async fn save_class(&self, class: &SchoolClass) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO school_classes (id, school_id, name) VALUES ($1, $2, $3)
             ON CONFLICT (id) DO UPDATE SET school_id = EXCLUDED.school_id, name = EXCLUDED.name",
        )
        .bind(&class.id)
        .bind(&class.school_id)
        .bind(&class.name)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn save_arm(&self, arm: &ClassArm) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO class_arms (id, school_class_id, name) VALUES ($1, $2, $3)
             ON CONFLICT (id) DO UPDATE SET
               school_class_id = EXCLUDED.school_class_id, name = EXCLUDED.name",
        )
        .bind(&arm.id)
        .bind(&arm.school_class_id)
        .bind(&arm.name)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_class(&self, id: &str) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM school_classes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
