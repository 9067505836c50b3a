// ==================== USER MANAGEMENT ====================
// CRUD, listing, search and export over the `users` collection.
// Handlers call these; persistence goes through UserRepository.

use crate::{
    database::UserRepository,
    models::{PageRequest, Pagination, User, UserForm},
    services::{
        export_service,
        profile_storage::{ProfileStorage, ProfileUpload},
    },
    utils::error::AppError,
};
use mongodb::bson::oid::ObjectId;

fn parse_id(id: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(id).map_err(|_| AppError::InvalidId(id.to_string()))
}

fn not_found() -> AppError {
    AppError::NotFound("User not found".to_string())
}

/// Validates the form, stores the optional image, then persists the record.
/// The stored image is removed again if the insert fails.
pub async fn create_user(
    repo: &dyn UserRepository,
    storage: &ProfileStorage,
    form: UserForm,
    upload: Option<ProfileUpload>,
) -> Result<User, AppError> {
    let mut user = form.into_user()?;

    if let Some(upload) = &upload {
        user.profile = Some(storage.store(upload).await?);
    }

    match repo.insert(user.clone()).await {
        Ok(created) => {
            log::info!("✅ User created: {} ({})", created.id_hex(), created.email);
            Ok(created)
        }
        Err(e) => {
            if let Some(profile) = &user.profile {
                storage.remove(profile).await;
            }
            Err(e)
        }
    }
}

pub async fn list_users(
    repo: &dyn UserRepository,
    page: PageRequest,
) -> Result<(Vec<User>, Pagination), AppError> {
    let users = repo.find_page(page.skip(), page.limit).await?;
    let total_users = repo.count().await?;

    Ok((users, Pagination::new(page, total_users)))
}

pub async fn get_user(repo: &dyn UserRepository, id: &str) -> Result<User, AppError> {
    let object_id = parse_id(id)?;
    repo.find_by_id(object_id).await?.ok_or_else(not_found)
}

/// Applies the supplied fields; a new image replaces the stored one. The
/// previous record comes back from the same atomic write, so the image it
/// referenced is the one removed even under concurrent updates.
pub async fn update_user(
    repo: &dyn UserRepository,
    storage: &ProfileStorage,
    id: &str,
    form: UserForm,
    upload: Option<ProfileUpload>,
) -> Result<User, AppError> {
    let object_id = parse_id(id)?;
    let mut changes = form.into_changes()?;

    if let Some(upload) = &upload {
        changes.profile = Some(storage.store(upload).await?);
    }

    if changes.is_empty() {
        return repo.find_by_id(object_id).await?.ok_or_else(not_found);
    }

    let previous = match repo.update(object_id, &changes).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            if let Some(profile) = &changes.profile {
                storage.remove(profile).await;
            }
            return Err(not_found());
        }
        Err(e) => {
            if let Some(profile) = &changes.profile {
                storage.remove(profile).await;
            }
            return Err(e);
        }
    };

    if let (Some(old), Some(new)) = (&previous.profile, &changes.profile) {
        if old != new {
            storage.remove(old).await;
        }
    }

    // None if the record was deleted right after the write
    let updated = repo.find_by_id(object_id).await?.ok_or_else(not_found)?;

    log::info!("✅ User updated: {}", updated.id_hex());
    Ok(updated)
}

pub async fn delete_user(
    repo: &dyn UserRepository,
    storage: &ProfileStorage,
    id: &str,
) -> Result<(), AppError> {
    let object_id = parse_id(id)?;
    let deleted = repo.delete(object_id).await?.ok_or_else(not_found)?;

    if let Some(profile) = &deleted.profile {
        storage.remove(profile).await;
    }

    log::info!("🗑️  User deleted: {}", id);
    Ok(())
}

pub async fn search_users(repo: &dyn UserRepository, key: &str) -> Result<Vec<User>, AppError> {
    repo.search(key).await
}

pub async fn export_users(repo: &dyn UserRepository) -> Result<Vec<u8>, AppError> {
    let users = repo.find_all().await?;
    log::info!("📤 Exporting {} users to CSV", users.len());
    export_service::users_to_csv(&users)
}
