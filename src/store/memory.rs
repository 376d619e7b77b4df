use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Class, CredentialStore, Role, StoreError, StoreResult, User};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    by_username: HashMap<String, usize>,
    classes: Vec<ClassRow>,
    enrollments: Vec<(Uuid, Uuid)>,
}

struct ClassRow {
    id: Uuid,
    name: String,
    instructor_id: Uuid,
    created_at: OffsetDateTime,
}

impl Tables {
    fn materialize(&self, row: &ClassRow) -> Class {
        let instructor = self
            .users
            .iter()
            .find(|u| u.id == row.instructor_id)
            .map(|u| u.username.clone());
        Class {
            id: row.id,
            name: row.name.clone(),
            instructor_id: Some(row.instructor_id),
            instructor,
            created_at: row.created_at,
        }
    }
}

/// In-process store. Each write holds the table lock for its whole check-and-insert.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        role: Role,
    ) -> StoreResult<User> {
        let mut t = self.tables.write().await;
        if t.by_username.contains_key(username) {
            return Err(StoreError::DuplicateUsername);
        }
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            role,
            created_at: OffsetDateTime::now_utc(),
        };
        let idx = t.users.len();
        t.users.push(user.clone());
        t.by_username.insert(user.username.clone(), idx);
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.by_username.get(username).map(|&i| t.users[i].clone()))
    }

    async fn create_class(&self, name: &str, instructor_id: Uuid) -> StoreResult<Class> {
        let mut t = self.tables.write().await;
        if !t.users.iter().any(|u| u.id == instructor_id) {
            return Err(anyhow::anyhow!("instructor {instructor_id} does not exist").into());
        }
        let row = ClassRow {
            id: Uuid::new_v4(),
            name: name.to_string(),
            instructor_id,
            created_at: OffsetDateTime::now_utc(),
        };
        let class = t.materialize(&row);
        t.classes.push(row);
        Ok(class)
    }

    async fn find_class(&self, class_id: Uuid) -> StoreResult<Option<Class>> {
        let t = self.tables.read().await;
        Ok(t
            .classes
            .iter()
            .find(|c| c.id == class_id)
            .map(|c| t.materialize(c)))
    }

    async fn list_classes(&self, exclude: &[Uuid]) -> StoreResult<Vec<Class>> {
        let t = self.tables.read().await;
        Ok(t
            .classes
            .iter()
            .filter(|c| !exclude.contains(&c.id))
            .map(|c| t.materialize(c))
            .collect())
    }

    async fn list_classes_by_instructor(&self, instructor_id: Uuid) -> StoreResult<Vec<Class>> {
        let t = self.tables.read().await;
        Ok(t
            .classes
            .iter()
            .filter(|c| c.instructor_id == instructor_id)
            .map(|c| t.materialize(c))
            .collect())
    }

    async fn enroll(&self, student_id: Uuid, class_id: Uuid) -> StoreResult<()> {
        let mut t = self.tables.write().await;
        if !t.classes.iter().any(|c| c.id == class_id) {
            return Err(anyhow::anyhow!("class {class_id} does not exist").into());
        }
        if t.enrollments.contains(&(student_id, class_id)) {
            return Err(StoreError::AlreadyEnrolled);
        }
        t.enrollments.push((student_id, class_id));
        Ok(())
    }

    async fn list_enrolled_classes(&self, student_id: Uuid) -> StoreResult<Vec<Class>> {
        let t = self.tables.read().await;
        Ok(t
            .enrollments
            .iter()
            .filter(|(s, _)| *s == student_id)
            .filter_map(|(_, cid)| t.classes.iter().find(|c| c.id == *cid))
            .map(|c| t.materialize(c))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let store = MemoryStore::new();
        store.create_user("alice", "h1", Role::Teacher).await.unwrap();
        let err = store
            .create_user("alice", "h2", Role::Student)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateUsername));
        let alice = store.find_user_by_username("alice").await.unwrap().unwrap();
        assert_eq!(alice.role, Role::Teacher);
        assert_eq!(alice.password_hash, "h1");
    }

    #[tokio::test]
    async fn concurrent_signups_create_exactly_one_user() {
        let store = Arc::new(MemoryStore::new());
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.create_user("bob", "h", Role::Student).await })
            })
            .collect();
        let mut created = 0;
        for h in handles {
            if h.await.unwrap().is_ok() {
                created += 1;
            }
        }
        assert_eq!(created, 1);
    }

    #[tokio::test]
    async fn enrollment_excludes_class_from_listing() {
        let store = MemoryStore::new();
        let teacher = store.create_user("t", "h", Role::Teacher).await.unwrap();
        let student = store.create_user("s", "h", Role::Student).await.unwrap();
        let algebra = store.create_class("Algebra", teacher.id).await.unwrap();
        let poetry = store.create_class("Poetry", teacher.id).await.unwrap();
        assert_eq!(algebra.instructor.as_deref(), Some("t"));

        store.enroll(student.id, algebra.id).await.unwrap();
        let err = store.enroll(student.id, algebra.id).await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyEnrolled));

        let enrolled = store.list_enrolled_classes(student.id).await.unwrap();
        assert_eq!(enrolled.len(), 1);
        assert_eq!(enrolled[0].id, algebra.id);

        let ids: Vec<Uuid> = enrolled.iter().map(|c| c.id).collect();
        let available = store.list_classes(&ids).await.unwrap();
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].id, poetry.id);
    }

    #[tokio::test]
    async fn classes_by_instructor_only_returns_own() {
        let store = MemoryStore::new();
        let a = store.create_user("a", "h", Role::Teacher).await.unwrap();
        let b = store.create_user("b", "h", Role::Teacher).await.unwrap();
        store.create_class("A1", a.id).await.unwrap();
        store.create_class("B1", b.id).await.unwrap();
        let mine = store.list_classes_by_instructor(a.id).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].name, "A1");
    }
}
