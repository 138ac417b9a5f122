use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::Rating;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RateRequest {
    #[validate(range(min = 1, max = 10, message = "Score must be between 1 and 10"))]
    pub score: i32,

    #[validate(length(max = 5000, message = "Feedback must be at most 5000 characters"))]
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LatestRatingsRequest {
    #[validate(length(min = 1, message = "At least one application id is required"))]
    pub application_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RatingResponse {
    pub rating: Option<Rating>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RatingsResponse {
    /// Latest rating keyed by application id; unrated applications are absent.
    #[schema(value_type = HashMap<String, Rating>)]
    pub ratings: HashMap<Uuid, Rating>,
}
