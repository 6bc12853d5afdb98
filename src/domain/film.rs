use bytes::Bytes;
use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Film {
    pub id: Uuid,
    pub name: String,
    pub image_url: String,
    pub user_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// A film as seen by one caller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilmListing {
    pub id: Uuid,
    pub name: String,
    pub image_url: String,
    pub mine: bool,
}

impl Film {
    pub fn listing_for(self, caller_id: &str) -> FilmListing {
        FilmListing {
            mine: self.user_id == caller_id,
            id: self.id,
            name: self.name,
            image_url: self.image_url,
        }
    }
}

/// Image payload received with a create or update request.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}
