use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::AppError,
    store::{Class, CredentialStore, User},
};

/// Classes the student is not yet enrolled in.
pub async fn list_available_classes(
    store: &dyn CredentialStore,
    student: &User,
) -> Result<Vec<Class>, AppError> {
    let enrolled: Vec<Uuid> = store
        .list_enrolled_classes(student.id)
        .await?
        .into_iter()
        .map(|c| c.id)
        .collect();
    Ok(store.list_classes(&enrolled).await?)
}

/// A repeated enrollment is rejected, not silently accepted.
pub async fn enroll(
    store: &dyn CredentialStore,
    student: &User,
    class_id: Option<Uuid>,
) -> Result<(), AppError> {
    let Some(class_id) = class_id else {
        warn!(username = %student.username, "enroll missing class_id");
        return Err(AppError::bad_request("Missing class_id"));
    };

    let Some(class) = store.find_class(class_id).await? else {
        warn!(%class_id, "enroll unknown class");
        return Err(AppError::NotFound("Class not found".into()));
    };

    store.enroll(student.id, class.id).await.map_err(|e| {
        warn!(username = %student.username, %class_id, error = %e, "enroll rejected");
        AppError::from(e)
    })?;

    info!(username = %student.username, %class_id, class = %class.name, "student enrolled");
    Ok(())
}

pub async fn my_classes(
    store: &dyn CredentialStore,
    student: &User,
) -> Result<Vec<Class>, AppError> {
    Ok(store.list_enrolled_classes(student.id).await?)
}

pub async fn teacher_classes(
    store: &dyn CredentialStore,
    teacher: &User,
) -> Result<Vec<Class>, AppError> {
    Ok(store.list_classes_by_instructor(teacher.id).await?)
}

pub async fn create_class(
    store: &dyn CredentialStore,
    teacher: &User,
    name: Option<&str>,
) -> Result<Class, AppError> {
    let Some(name) = name else {
        warn!(username = %teacher.username, "create class missing name");
        return Err(AppError::bad_request("Missing class name"));
    };
    let class = store.create_class(name, teacher.id).await?;
    info!(class_id = %class.id, name = %class.name, instructor = %teacher.username, "class created");
    Ok(class)
}
