//! Product reviews.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::CommerceError;
use crate::ids::{ProductId, ReviewId, UserId};

/// A customer review of a product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub user_id: UserId,
    /// Reviewer username, joined in for display.
    pub username: String,
    /// 1 to 5 stars.
    pub rating: i64,
    pub title: String,
    pub comment: String,
    pub is_approved: bool,
    /// Reviewer bought the product in an order that was not cancelled.
    pub is_verified_purchase: bool,
    pub created_at: i64,
}

/// Input for creating a review.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewReview {
    pub product_id: ProductId,
    pub rating: i64,
    pub title: String,
    pub comment: String,
}

impl NewReview {
    pub fn validate(&self) -> Result<(), CommerceError> {
        if !(1..=5).contains(&self.rating) {
            return Err(CommerceError::ValidationError(
                "rating must be between 1 and 5".to_string(),
            ));
        }
        if self.title.trim().is_empty() {
            return Err(CommerceError::ValidationError("title is required".to_string()));
        }
        if self.comment.trim().is_empty() {
            return Err(CommerceError::ValidationError("comment is required".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(rating: i64) -> NewReview {
        NewReview {
            product_id: ProductId::new(1),
            rating,
            title: "Great".to_string(),
            comment: "Comfortable and sturdy".to_string(),
        }
    }

    #[test]
    fn test_rating_bounds() {
        assert!(review(1).validate().is_ok());
        assert!(review(5).validate().is_ok());
        assert!(review(0).validate().is_err());
        assert!(review(6).validate().is_err());
    }

    #[test]
    fn test_blank_title() {
        let mut r = review(4);
        r.title = " ".to_string();
        assert!(r.validate().is_err());
    }
}
