use std::collections::HashMap;

use storage::{
    models::{NewRating, Rating},
    repository::DatathonStore,
};
use uuid::Uuid;

use crate::error::{WebError, WebResult};

/// Replace the application's rating: delete the latest one, then insert.
///
/// These are two separate writes. A failure between them leaves the
/// application unrated until the reviewer retries.
pub async fn rate(
    store: &dyn DatathonStore,
    application_id: Uuid,
    score: i32,
    feedback: Option<String>,
    rated_by: Uuid,
) -> WebResult<Rating> {
    if let Some(previous) = store.latest_rating(application_id).await? {
        store.delete_rating(previous.id).await?;
        tracing::info!(
            "Replacing rating {} of application {}",
            previous.id,
            application_id
        );
    }

    let rating = store
        .insert_rating(&NewRating {
            application_id,
            score,
            feedback,
            rated_by,
        })
        .await?;

    Ok(rating)
}

pub async fn latest_rating(
    store: &dyn DatathonStore,
    application_id: Uuid,
) -> WebResult<Option<Rating>> {
    Ok(store.latest_rating(application_id).await?)
}

/// Latest rating per application, fetched in one query and reduced here.
pub async fn latest_ratings(
    store: &dyn DatathonStore,
    application_ids: &[Uuid],
) -> WebResult<HashMap<Uuid, Rating>> {
    if application_ids.is_empty() {
        return Err(WebError::BadRequest(
            "application_ids must not be empty".to_string(),
        ));
    }

    let ratings = store.ratings_for(application_ids).await?;
    Ok(keep_latest(ratings))
}

/// Same order as the single lookup: newest `created_at`, then greatest id.
fn keep_latest(ratings: Vec<Rating>) -> HashMap<Uuid, Rating> {
    let mut latest: HashMap<Uuid, Rating> = HashMap::new();

    for rating in ratings {
        match latest.get(&rating.application_id) {
            Some(current)
                if (current.created_at, current.id) >= (rating.created_at, rating.id) => {}
            _ => {
                latest.insert(rating.application_id, rating);
            }
        }
    }

    latest
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use storage::repository::InMemoryStore;

    use crate::test_support::FaultyStore;

    fn rating_at(application_id: Uuid, score: i32, minutes_ago: i64) -> Rating {
        let at = Utc::now() - Duration::minutes(minutes_ago);
        Rating {
            id: Uuid::new_v4(),
            application_id,
            score,
            feedback: None,
            rated_by: Uuid::new_v4(),
            created_at: at,
            updated_at: at,
        }
    }

    #[tokio::test]
    async fn test_rerating_replaces() {
        let store = InMemoryStore::new();
        let application_id = Uuid::new_v4();
        let admin = Uuid::new_v4();

        rate(&store, application_id, 8, Some("Good".to_string()), admin)
            .await
            .unwrap();
        let first = latest_rating(&store, application_id).await.unwrap().unwrap();
        assert_eq!(first.score, 8);
        assert_eq!(first.feedback.as_deref(), Some("Good"));

        rate(&store, application_id, 3, None, admin).await.unwrap();
        let second = latest_rating(&store, application_id).await.unwrap().unwrap();
        assert_eq!(second.score, 3);
        assert_eq!(second.feedback, None);
        assert_eq!(store.rating_count(application_id).await, 1);
    }

    #[tokio::test]
    async fn test_unrated_application() {
        let store = InMemoryStore::new();
        assert!(latest_rating(&store, Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_batch_lookup() {
        let store = InMemoryStore::new();
        let rated = Uuid::new_v4();
        let unrated = Uuid::new_v4();
        rate(&store, rated, 9, None, Uuid::new_v4()).await.unwrap();

        let ratings = latest_ratings(&store, &[rated, unrated]).await.unwrap();
        assert_eq!(ratings.len(), 1);
        assert_eq!(ratings[&rated].score, 9);

        let empty = latest_ratings(&store, &[]).await;
        assert!(matches!(empty, Err(WebError::BadRequest(_))));
    }

    #[test]
    fn test_most_recent_wins() {
        let app = Uuid::new_v4();
        let other = Uuid::new_v4();
        let reduced = keep_latest(vec![
            rating_at(app, 2, 30),
            rating_at(app, 7, 5),
            rating_at(app, 4, 10),
            rating_at(other, 1, 1),
        ]);

        assert_eq!(reduced.len(), 2);
        assert_eq!(reduced[&app].score, 7);
        assert_eq!(reduced[&other].score, 1);
    }

    #[test]
    fn test_equal_timestamps_pick_greatest_id() {
        let app = Uuid::new_v4();
        let mut first = rating_at(app, 2, 5);
        let mut second = rating_at(app, 9, 5);
        second.created_at = first.created_at;
        if first.id > second.id {
            std::mem::swap(&mut first.id, &mut second.id);
        }

        let forward = keep_latest(vec![first.clone(), second.clone()]);
        let backward = keep_latest(vec![second.clone(), first]);

        assert_eq!(forward[&app].id, second.id);
        assert_eq!(backward[&app].id, second.id);
        assert_eq!(forward[&app].score, 9);
    }

    #[tokio::test]
    async fn test_failed_insert_leaves_application_unrated() {
        let store = FaultyStore::default();
        let application_id = Uuid::new_v4();
        rate(&store, application_id, 8, None, Uuid::new_v4())
            .await
            .unwrap();

        store.fail_rating_inserts();
        let result = rate(&store, application_id, 4, None, Uuid::new_v4()).await;

        assert!(matches!(result, Err(WebError::Storage(_))));
        assert!(latest_rating(&store, application_id).await.unwrap().is_none());
        assert_eq!(store.inner.rating_count(application_id).await, 0);
    }
}
