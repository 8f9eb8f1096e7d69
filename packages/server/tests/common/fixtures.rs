//! Row factories for database tests.

use blockly_core::common::{AuthorId, ParcelId};
use blockly_core::domains::comments::Comment;
use blockly_core::domains::parcels::models::{NewParcel, Parcel};
use sqlx::PgPool;

pub async fn create_parcel(latitude: f64, longitude: f64, pool: &PgPool) -> Parcel {
    Parcel::create(
        &NewParcel::builder()
            .latitude(latitude)
            .longitude(longitude)
            .address(format!("{:.4}, {:.4}", latitude, longitude))
            .build(),
        pool,
    )
    .await
    .expect("Failed to create parcel")
}

pub async fn create_unlocated_parcel(pool: &PgPool) -> Parcel {
    Parcel::create(&NewParcel::builder().address("No location".to_string()).build(), pool)
        .await
        .expect("Failed to create parcel")
}

pub async fn create_comment(parcel_id: ParcelId, content: &str, pool: &PgPool) -> Comment {
    Comment::create(parcel_id, AuthorId::from_i64(1), content, pool)
        .await
        .expect("Failed to create comment")
}
