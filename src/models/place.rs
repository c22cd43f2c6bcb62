// Place read model.
// Place CRUD lives in the records service; sharing only needs ownership
// checks and the fields projected into the public view.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::places;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = places)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Place {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub photos: Vec<Option<String>>,
    pub location: Option<String>,
    pub rating: Option<i32>,
    pub notes: Option<String>,
    pub price: Option<String>,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Place {
    /// Find place by ID
    pub async fn find_by_id(
        conn: &mut AsyncPgConnection,
        place_id: Uuid,
    ) -> Result<Self, diesel::result::Error> {
        use crate::schema::places::dsl::*;

        places.filter(id.eq(place_id)).first::<Place>(conn).await
    }

    /// Photo paths with the storage-relative entries flattened out of the
    /// nullable array diesel gives us.
    pub fn photo_paths(&self) -> Vec<String> {
        self.photos.iter().filter_map(|p| p.clone()).collect()
    }
}
