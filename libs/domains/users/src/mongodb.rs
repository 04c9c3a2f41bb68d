//! MongoDB implementation of UserRepository

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database,
    bson::{Document, doc, oid::ObjectId},
    options::FindOptions,
};
use serde::Deserialize;
use tracing::instrument;

use crate::error::{UserError, UserResult};
use crate::models::{NewUser, User, UserChanges};
use crate::repository::UserRepository;

pub const DEFAULT_COLLECTION: &str = "users";

#[derive(Deserialize)]
struct IdOnly {
    #[serde(rename = "_id")]
    id: ObjectId,
}

/// MongoDB implementation of the UserRepository
#[derive(Clone)]
pub struct MongoUserRepository {
    collection: Collection<User>,
}

impl MongoUserRepository {
    /// Repository over the `users` collection of `db`.
    ///
    /// ```ignore
    /// let client = database::mongodb::connect_from_config(&config).await?;
    /// let repo = MongoUserRepository::new(&client.database("app"));
    /// ```
    pub fn new(db: &Database) -> Self {
        Self::with_collection(db, DEFAULT_COLLECTION)
    }

    pub fn with_collection(db: &Database, collection_name: &str) -> Self {
        Self {
            collection: db.collection::<User>(collection_name),
        }
    }

    pub fn collection(&self) -> &Collection<User> {
        &self.collection
    }

    /// `$set` body for `changes`; only present fields are written.
    fn set_document(changes: &UserChanges) -> Document {
        let mut set = doc! {};
        if let Some(name) = &changes.name {
            set.insert("name", name.as_str());
        }
        if let Some(email) = &changes.email {
            set.insert("email", email.as_str());
        }
        if let Some(password) = &changes.password {
            set.insert("password", password.as_str());
        }
        set
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    #[instrument(skip(self))]
    async fn list_ids(&self) -> UserResult<Vec<ObjectId>> {
        let options = FindOptions::builder().projection(doc! { "_id": 1 }).build();
        let cursor = self
            .collection
            .clone_with_type::<IdOnly>()
            .find(doc! {})
            .with_options(options)
            .await?;
        let ids: Vec<IdOnly> = cursor.try_collect().await?;

        Ok(ids.into_iter().map(|d| d.id).collect())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: ObjectId) -> UserResult<Option<User>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    #[instrument(skip(self))]
    async fn exists_by_name(&self, name: &str) -> UserResult<bool> {
        let count = self
            .collection
            .count_documents(doc! { "name": name })
            .limit(1)
            .await?;
        Ok(count > 0)
    }

    #[instrument(skip(self))]
    async fn exists_by_email(&self, email: &str) -> UserResult<bool> {
        let count = self
            .collection
            .count_documents(doc! { "email": email })
            .limit(1)
            .await?;
        Ok(count > 0)
    }

    #[instrument(skip(self, user), fields(user_name = %user.name))]
    async fn insert(&self, user: NewUser) -> UserResult<ObjectId> {
        let result = self
            .collection
            .clone_with_type::<NewUser>()
            .insert_one(&user)
            .await?;

        let id = result.inserted_id.as_object_id().ok_or_else(|| {
            UserError::Database(format!(
                "store assigned a non-ObjectId id: {}",
                result.inserted_id
            ))
        })?;

        tracing::info!(user_id = %id, "User created successfully");
        Ok(id)
    }

    #[instrument(skip(self, changes))]
    async fn update(&self, id: ObjectId, changes: UserChanges) -> UserResult<()> {
        if changes.is_empty() {
            return Ok(());
        }

        let result = self
            .collection
            .update_one(doc! { "_id": id }, doc! { "$set": Self::set_document(&changes) })
            .await?;

        tracing::info!(
            user_id = %id,
            matched = result.matched_count,
            "User update applied"
        );
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: ObjectId) -> UserResult<()> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;

        tracing::info!(user_id = %id, deleted = result.deleted_count, "User delete applied");
        Ok(())
    }
}
