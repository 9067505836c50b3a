// ==================== USER REPOSITORY ====================
// Persistence seam for the `users` collection. MongoUserRepository is the
// production implementation; tests run against database::memory.

use crate::{
    database::{MongoDB, USERS_COLLECTION},
    models::{User, UserChanges},
    utils::error::AppError,
};
use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    error::{ErrorKind, WriteFailure},
    options::ReturnDocument,
    Collection,
};

const DUPLICATE_KEY: i32 = 11000;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persists a new record and returns it with its assigned id.
    async fn insert(&self, user: User) -> Result<User, AppError>;

    /// Records in insertion order, skipping `skip` and returning at most `limit`.
    async fn find_page(&self, skip: u64, limit: u64) -> Result<Vec<User>, AppError>;

    async fn count(&self) -> Result<u64, AppError>;

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<User>, AppError>;

    /// Applies `changes` atomically and returns the record as it was before
    /// the write, or `None` if no record has this id.
    async fn update(&self, id: ObjectId, changes: &UserChanges) -> Result<Option<User>, AppError>;

    /// Removes the record and returns what was deleted.
    async fn delete(&self, id: ObjectId) -> Result<Option<User>, AppError>;

    /// Case-insensitive literal substring match on first name, last name or email.
    async fn search(&self, key: &str) -> Result<Vec<User>, AppError>;

    async fn find_all(&self) -> Result<Vec<User>, AppError>;

    async fn ping(&self) -> Result<(), AppError>;
}

pub struct MongoUserRepository {
    db: MongoDB,
}

impl MongoUserRepository {
    pub fn new(db: MongoDB) -> Self {
        Self { db }
    }

    fn collection(&self) -> Collection<User> {
        self.db.collection::<User>(USERS_COLLECTION)
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn insert(&self, user: User) -> Result<User, AppError> {
        let result = self
            .collection()
            .insert_one(&user)
            .await
            .map_err(|e| map_write_error(e, &user.email))?;

        let mut created = user;
        created.id = result.inserted_id.as_object_id();
        Ok(created)
    }

    async fn find_page(&self, skip: u64, limit: u64) -> Result<Vec<User>, AppError> {
        let cursor = self
            .collection()
            .find(doc! {})
            .sort(doc! { "_id": 1 })
            .skip(skip)
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .await?;

        Ok(cursor.try_collect::<Vec<User>>().await?)
    }

    async fn count(&self) -> Result<u64, AppError> {
        Ok(self.collection().count_documents(doc! {}).await?)
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<User>, AppError> {
        Ok(self.collection().find_one(doc! { "_id": id }).await?)
    }

    async fn update(&self, id: ObjectId, changes: &UserChanges) -> Result<Option<User>, AppError> {
        let set = changes_to_document(changes);
        let email = changes.email.clone().unwrap_or_default();

        let previous = self
            .collection()
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set })
            .return_document(ReturnDocument::Before)
            .await
            .map_err(|e| map_write_error(e, &email))?;

        Ok(previous)
    }

    async fn delete(&self, id: ObjectId) -> Result<Option<User>, AppError> {
        Ok(self.collection().find_one_and_delete(doc! { "_id": id }).await?)
    }

    async fn search(&self, key: &str) -> Result<Vec<User>, AppError> {
        let cursor = self
            .collection()
            .find(search_filter(key))
            .sort(doc! { "_id": 1 })
            .await?;
        Ok(cursor.try_collect::<Vec<User>>().await?)
    }

    async fn find_all(&self) -> Result<Vec<User>, AppError> {
        let cursor = self.collection().find(doc! {}).sort(doc! { "_id": 1 }).await?;
        Ok(cursor.try_collect::<Vec<User>>().await?)
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.db.health_check().await?;
        Ok(())
    }
}

/// Case-insensitive match of `key` as a literal on first name, last name or email.
fn search_filter(key: &str) -> Document {
    let pattern = regex::escape(key);
    doc! {
        "$or": [
            { "firstName": { "$regex": pattern.as_str(), "$options": "i" } },
            { "lastName": { "$regex": pattern.as_str(), "$options": "i" } },
            { "email": { "$regex": pattern.as_str(), "$options": "i" } }
        ]
    }
}

/// `$set` document holding only the supplied fields.
pub fn changes_to_document(changes: &UserChanges) -> Document {
    let mut set = Document::new();

    let fields = [
        ("firstName", changes.first_name.as_deref()),
        ("lastName", changes.last_name.as_deref()),
        ("email", changes.email.as_deref()),
        ("mobile", changes.mobile.as_deref()),
        ("gender", changes.gender.map(|g| g.as_str())),
        ("status", changes.status.map(|s| s.as_str())),
        ("location", changes.location.as_deref()),
        ("profile", changes.profile.as_deref()),
    ];

    for (key, value) in fields {
        if let Some(value) = value {
            set.insert(key, value);
        }
    }

    set
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY,
        ErrorKind::Command(e) => e.code == DUPLICATE_KEY,
        _ => false,
    }
}

fn map_write_error(err: mongodb::error::Error, email: &str) -> AppError {
    if is_duplicate_key(&err) {
        AppError::Validation(format!("Email {} is already in use", email))
    } else {
        AppError::from(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gender, Status};

    #[test]
    fn test_set_document_contains_only_supplied_fields() {
        let changes = UserChanges {
            status: Some(Status::Inactive),
            gender: Some(Gender::Male),
            ..UserChanges::default()
        };
        let set = changes_to_document(&changes);

        assert_eq!(set.len(), 2);
        assert_eq!(set.get_str("status").unwrap(), "Inactive");
        assert_eq!(set.get_str("gender").unwrap(), "Male");
        assert!(set.get("email").is_none());
    }

    #[test]
    fn test_search_key_is_matched_literally() {
        let filter = search_filter("a.b");
        let clauses = filter.get_array("$or").unwrap();
        assert_eq!(clauses.len(), 3);

        let email = clauses[2].as_document().unwrap().get_document("email").unwrap();
        assert_eq!(email.get_str("$options").unwrap(), "i");

        let pattern = email.get_str("$regex").unwrap();
        let re = regex::Regex::new(&format!("(?i){}", pattern)).unwrap();
        assert!(re.is_match("xA.By"));
        assert!(!re.is_match("axb"));
    }

    #[test]
    fn test_set_document_includes_new_profile() {
        let changes = UserChanges {
            profile: Some("/public/uploads/1-a.png".into()),
            ..UserChanges::default()
        };
        let set = changes_to_document(&changes);
        assert_eq!(set.get_str("profile").unwrap(), "/public/uploads/1-a.png");
    }
}
