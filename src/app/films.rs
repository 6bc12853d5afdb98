use anyhow::Result;
use sqlx::postgres::PgRow;
use sqlx::Row;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::film::{Film, FilmListing, ImageUpload};
use crate::infra::storage::{key_from_url, storage_key};
use crate::infra::{db::Db, storage::ObjectStorage};

const FILM_COLUMNS: &str = "id, name, image_url, user_id, created_at";

#[derive(Clone)]
pub struct FilmService {
    db: Db,
    storage: ObjectStorage,
}

impl FilmService {
    pub fn new(db: Db, storage: ObjectStorage) -> Self {
        Self { db, storage }
    }

    pub async fn list(&self, caller_id: &str) -> Result<Vec<FilmListing>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM films ORDER BY created_at DESC, id DESC",
            FILM_COLUMNS
        ))
        .fetch_all(self.db.pool())
        .await?;

        let films: Vec<FilmListing> = rows
            .iter()
            .map(|row| film_from_row(row).listing_for(caller_id))
            .collect();

        Ok(films)
    }

    /// Uploads the image, then inserts the row. An insert failure leaves the
    /// uploaded object behind.
    pub async fn create(&self, caller_id: &str, name: &str, image: ImageUpload) -> Result<Film> {
        let key = storage_key(&image.file_name, OffsetDateTime::now_utc());
        self.storage
            .upload(&key, image.data, &image.content_type)
            .await?;
        let image_url = self.storage.public_url(&key)?;

        let row = sqlx::query(&format!(
            "INSERT INTO films (name, image_url, user_id) VALUES ($1, $2, $3) RETURNING {}",
            FILM_COLUMNS
        ))
        .bind(name)
        .bind(&image_url)
        .bind(caller_id)
        .fetch_one(self.db.pool())
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, key = %key, user_id = %caller_id, "insert failed after upload, object orphaned");
            err
        })?;

        Ok(film_from_row(&row))
    }

    /// Returns `None` when no film with this id belongs to the caller.
    pub async fn update(
        &self,
        film_id: Uuid,
        caller_id: &str,
        name: &str,
        image: Option<ImageUpload>,
    ) -> Result<Option<Film>> {
        let mut new_image_url = None;

        if let Some(image) = image {
            if let Some(existing) = self.find_owned(film_id, caller_id).await? {
                self.remove_image(&existing).await?;
            }

            let key = storage_key(&image.file_name, OffsetDateTime::now_utc());
            self.storage
                .upload(&key, image.data, &image.content_type)
                .await
                .map_err(|err| {
                    tracing::error!(error = ?err, film_id = %film_id, key = %key, "upload of replacement image failed");
                    err
                })?;
            new_image_url = Some(self.storage.public_url(&key)?);
        }

        let row = sqlx::query(&format!(
            "UPDATE films SET name = $3, image_url = COALESCE($4, image_url) \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {}",
            FILM_COLUMNS
        ))
        .bind(film_id)
        .bind(caller_id)
        .bind(name)
        .bind(new_image_url.as_deref())
        .fetch_optional(self.db.pool())
        .await?;

        if row.is_none() {
            if let Some(url) = &new_image_url {
                tracing::warn!(film_id = %film_id, image_url = %url, "film not updated, uploaded image orphaned");
            }
        }

        Ok(row.as_ref().map(film_from_row))
    }

    /// Deletes the row, then its image. Returns `false` when no film with this
    /// id belongs to the caller.
    pub async fn delete(&self, film_id: Uuid, caller_id: &str) -> Result<bool> {
        let Some(film) = self.find_owned(film_id, caller_id).await? else {
            return Ok(false);
        };

        let result = sqlx::query("DELETE FROM films WHERE id = $1 AND user_id = $2")
            .bind(film_id)
            .bind(caller_id)
            .execute(self.db.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        self.remove_image(&film).await?;
        Ok(true)
    }

    async fn find_owned(&self, film_id: Uuid, caller_id: &str) -> Result<Option<Film>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM films WHERE id = $1 AND user_id = $2",
            FILM_COLUMNS
        ))
        .bind(film_id)
        .bind(caller_id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.as_ref().map(film_from_row))
    }

    async fn remove_image(&self, film: &Film) -> Result<()> {
        let Some(key) = key_from_url(&film.image_url) else {
            tracing::warn!(film_id = %film.id, image_url = %film.image_url, "cannot derive object key from image url");
            return Ok(());
        };

        self.storage.remove(&key).await.map_err(|err| {
            tracing::error!(error = ?err, film_id = %film.id, key = %key, "failed to remove film image");
            err
        })
    }
}

fn film_from_row(row: &PgRow) -> Film {
    Film {
        id: row.get("id"),
        name: row.get("name"),
        image_url: row.get("image_url"),
        user_id: row.get("user_id"),
        created_at: row.get("created_at"),
    }
}
