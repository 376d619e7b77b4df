use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::{Class, CredentialStore, Role, StoreError, StoreResult, User};

const CLASS_COLUMNS: &str = r#"
    c.id, c.name, c.instructor_id, u.username AS instructor, c.created_at
    FROM classes c
    LEFT JOIN users u ON u.id = c.instructor_id
"#;

/// Postgres-backed store.
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        role: Role,
    ) -> StoreResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, password_hash, role, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(password_hash)
        .bind(role.as_str())
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                debug!(%username, "username unique violation");
                StoreError::DuplicateUsername
            } else {
                StoreError::Database(e)
            }
        })
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, role, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn create_class(&self, name: &str, instructor_id: Uuid) -> StoreResult<Class> {
        let id = Uuid::new_v4();
        // CTE so the instructor join happens in the same statement as the insert.
        let class = sqlx::query_as::<_, Class>(
            r#"
            WITH c AS (
                INSERT INTO classes (id, name, instructor_id)
                VALUES ($1, $2, $3)
                RETURNING id, name, instructor_id, created_at
            )
            SELECT c.id, c.name, c.instructor_id, u.username AS instructor, c.created_at
            FROM c
            LEFT JOIN users u ON u.id = c.instructor_id
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(instructor_id)
        .fetch_one(&self.db)
        .await?;
        Ok(class)
    }

    async fn find_class(&self, class_id: Uuid) -> StoreResult<Option<Class>> {
        let sql = format!("SELECT {CLASS_COLUMNS} WHERE c.id = $1");
        let class = sqlx::query_as::<_, Class>(&sql)
            .bind(class_id)
            .fetch_optional(&self.db)
            .await?;
        Ok(class)
    }

    async fn list_classes(&self, exclude: &[Uuid]) -> StoreResult<Vec<Class>> {
        let sql = format!(
            "SELECT {CLASS_COLUMNS} WHERE NOT (c.id = ANY($1)) ORDER BY c.created_at, c.id"
        );
        let rows = sqlx::query_as::<_, Class>(&sql)
            .bind(exclude)
            .fetch_all(&self.db)
            .await?;
        Ok(rows)
    }

    async fn list_classes_by_instructor(&self, instructor_id: Uuid) -> StoreResult<Vec<Class>> {
        let sql = format!(
            "SELECT {CLASS_COLUMNS} WHERE c.instructor_id = $1 ORDER BY c.created_at, c.id"
        );
        let rows = sqlx::query_as::<_, Class>(&sql)
            .bind(instructor_id)
            .fetch_all(&self.db)
            .await?;
        Ok(rows)
    }

    async fn enroll(&self, student_id: Uuid, class_id: Uuid) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO enrollments (user_id, class_id)
            VALUES ($1, $2)
            "#,
        )
        .bind(student_id)
        .bind(class_id)
        .execute(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::AlreadyEnrolled
            } else {
                StoreError::Database(e)
            }
        })?;
        Ok(())
    }

    async fn list_enrolled_classes(&self, student_id: Uuid) -> StoreResult<Vec<Class>> {
        let rows = sqlx::query_as::<_, Class>(
            r#"
            SELECT c.id, c.name, c.instructor_id, u.username AS instructor, c.created_at
            FROM enrollments e
            JOIN classes c ON c.id = e.class_id
            LEFT JOIN users u ON u.id = c.instructor_id
            WHERE e.user_id = $1
            ORDER BY e.created_at, c.id
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}
