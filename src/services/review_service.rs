use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::reviews::{CreateReviewRequest, ReviewList},
    entity::{
        reviews::{ActiveModel as ReviewActive, Column as ReviewCol, Entity as Reviews,
            Model as ReviewModel},
        rooms::{ActiveModel as RoomActive, Entity as Rooms},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Review,
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Fold a new rating into the room's running mean. The read of the current
/// count and average, the review insert and the room update share one
/// transaction with a row lock on the room, so two concurrent submissions
/// cannot both fold against the same stale count.
pub async fn submit_review(
    state: &AppState,
    user: &AuthUser,
    room_id: Uuid,
    payload: CreateReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    if !(1..=5).contains(&payload.rating) {
        return Err(AppError::Validation("rating must be between 1 and 5".into()));
    }
    if payload.comment.trim().len() < 10 {
        return Err(AppError::Validation(
            "comment must be at least 10 characters".into(),
        ));
    }

    let txn = state.orm.begin().await?;

    let room = Rooms::find_by_id(room_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let room = match room {
        Some(r) => r,
        None => return Err(AppError::NotFound),
    };

    let review = ReviewActive {
        id: Set(Uuid::new_v4()),
        room_id: Set(room.id),
        user_id: Set(user.user_id),
        rating: Set(payload.rating),
        comment: Set(payload.comment),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let new_average = next_average(room.average_rating, room.total_reviews, payload.rating);
    let new_total = room.total_reviews + 1;
    let mut active: RoomActive = room.into();
    active.average_rating = Set(new_average);
    active.total_reviews = Set(new_total);
    active.update(&txn).await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "review_create",
        Some("reviews"),
        Some(serde_json::json!({ "review_id": review.id, "room_id": room_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Review submitted",
        review_from_entity(review),
        Some(Meta::empty()),
    ))
}

pub async fn list_reviews(state: &AppState, room_id: Uuid) -> AppResult<ApiResponse<ReviewList>> {
    let items = Reviews::find()
        .filter(ReviewCol::RoomId.eq(room_id))
        .order_by_desc(ReviewCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(review_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Reviews",
        ReviewList { items },
        Some(Meta::empty()),
    ))
}

/// Running mean: `(avg * n + rating) / (n + 1)`.
fn next_average(average: f64, total_reviews: i32, rating: i32) -> f64 {
    (average * total_reviews as f64 + rating as f64) / (total_reviews as f64 + 1.0)
}

fn review_from_entity(model: ReviewModel) -> Review {
    Review {
        id: model.id,
        room_id: model.room_id,
        user_id: model.user_id,
        rating: model.rating,
        comment: model.comment,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_review_becomes_the_average() {
        let avg = next_average(0.0, 0, 4);
        assert!((avg - 4.0).abs() < 1e-9);
    }

    #[test]
    fn rating_folds_into_running_mean() {
        // Two reviews averaging 4.0, a new 5 arrives: (4*2 + 5) / 3.
        let avg = next_average(4.0, 2, 5);
        assert!((avg - 13.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn sequence_of_folds_matches_plain_mean() {
        let ratings = [5, 3, 4, 1, 2, 5, 5, 4];
        let mut avg = 0.0;
        for (n, rating) in ratings.iter().enumerate() {
            avg = next_average(avg, n as i32, *rating);
        }
        let expected = ratings.iter().sum::<i32>() as f64 / ratings.len() as f64;
        assert!((avg - expected).abs() < 1e-9);
    }
}
