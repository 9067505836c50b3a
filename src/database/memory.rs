use crate::{
    database::UserRepository,
    models::{User, UserChanges},
    utils::error::AppError,
};
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use std::sync::Mutex;

/// In-process stand-in for the `users` collection, including the unique
/// email index.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn email_taken(users: &[User], email: &str, except: Option<ObjectId>) -> bool {
        users.iter().any(|u| u.email == email && u.id != except)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, mut user: User) -> Result<User, AppError> {
        let mut users = self.users.lock().expect("users lock");
        if Self::email_taken(&users, &user.email, None) {
            return Err(AppError::Validation(format!("Email {} is already in use", user.email)));
        }
        user.id = Some(ObjectId::new());
        users.push(user.clone());
        Ok(user)
    }

    async fn find_page(&self, skip: u64, limit: u64) -> Result<Vec<User>, AppError> {
        let users = self.users.lock().expect("users lock");
        Ok(users
            .iter()
            .skip(usize::try_from(skip).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<u64, AppError> {
        Ok(self.users.lock().expect("users lock").len() as u64)
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<User>, AppError> {
        let users = self.users.lock().expect("users lock");
        Ok(users.iter().find(|u| u.id == Some(id)).cloned())
    }

    async fn update(&self, id: ObjectId, changes: &UserChanges) -> Result<Option<User>, AppError> {
        let mut users = self.users.lock().expect("users lock");
        if let Some(email) = &changes.email {
            if Self::email_taken(&users, email, Some(id)) {
                return Err(AppError::Validation(format!("Email {} is already in use", email)));
            }
        }
        Ok(users.iter_mut().find(|u| u.id == Some(id)).map(|u| {
            let previous = u.clone();
            apply(u, changes);
            previous
        }))
    }

    async fn delete(&self, id: ObjectId) -> Result<Option<User>, AppError> {
        let mut users = self.users.lock().expect("users lock");
        let position = users.iter().position(|u| u.id == Some(id));
        Ok(position.map(|i| users.remove(i)))
    }

    async fn search(&self, key: &str) -> Result<Vec<User>, AppError> {
        let key = key.to_lowercase();
        let users = self.users.lock().expect("users lock");
        Ok(users
            .iter()
            .filter(|u| {
                u.first_name.to_lowercase().contains(&key)
                    || u.last_name.to_lowercase().contains(&key)
                    || u.email.to_lowercase().contains(&key)
            })
            .cloned()
            .collect())
    }

    async fn find_all(&self) -> Result<Vec<User>, AppError> {
        Ok(self.users.lock().expect("users lock").clone())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

/// Overwrites every field present in `changes`, like `$set`.
fn apply(user: &mut User, changes: &UserChanges) {
    if let Some(v) = &changes.first_name {
        user.first_name = v.clone();
    }
    if let Some(v) = &changes.last_name {
        user.last_name = v.clone();
    }
    if let Some(v) = &changes.email {
        user.email = v.clone();
    }
    if let Some(v) = &changes.mobile {
        user.mobile = v.clone();
    }
    if let Some(v) = changes.gender {
        user.gender = v;
    }
    if let Some(v) = changes.status {
        user.status = v;
    }
    if let Some(v) = &changes.location {
        user.location = v.clone();
    }
    if let Some(v) = &changes.profile {
        user.profile = Some(v.clone());
    }
}
