use serde::{Deserialize, Serialize};

use super::cart::RestaurantId;
use super::comment::Comment;

/// Identifier of a reel (a short dish video). Cart lines reference reels as products.
pub type ReelId = String;

/// Identifier of a signed-in user.
pub type UserId = String;

/// An entry in a reel's `likes` array: the backend sends either bare user ids
/// or populated user documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LikerRef {
    Id(UserId),
    User {
        #[serde(alias = "_id")]
        id: UserId,
        #[serde(default)]
        name: Option<String>,
    },
}

impl LikerRef {
    pub fn user_id(&self) -> &str {
        match self {
            LikerRef::Id(id) => id,
            LikerRef::User { id, .. } => id,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReelRestaurant {
    #[serde(alias = "_id", default)]
    pub id: RestaurantId,
    #[serde(alias = "name", default)]
    pub restaurant_name: Option<String>,
    #[serde(default)]
    pub zomato_link: Option<String>,
    #[serde(default)]
    pub swiggy_link: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReelCreator {
    #[serde(alias = "_id", default)]
    pub id: UserId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub followers_count: u64,
}

/// A reel as returned by the feed endpoint, carrying the initial engagement state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reel {
    #[serde(alias = "_id")]
    pub id: ReelId,
    #[serde(default)]
    pub food_name: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub likes: Vec<LikerRef>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub is_saved: bool,
    #[serde(default)]
    pub is_following: bool,
    #[serde(default)]
    pub restaurant: Option<ReelRestaurant>,
    #[serde(default)]
    pub creator: Option<ReelCreator>,
}

impl Reel {
    pub fn new(id: impl Into<ReelId>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn restaurant_id(&self) -> Option<&str> {
        self.restaurant
            .as_ref()
            .map(|restaurant| restaurant.id.as_str())
            .filter(|id| !id.is_empty())
    }

    pub fn liker_ids(&self) -> Vec<UserId> {
        self.likes.iter().map(|liker| liker.user_id().to_string()).collect()
    }

    pub fn dish_name(&self) -> &str {
        self.food_name.as_deref().unwrap_or("Tasty Dish")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_feed_reel_with_mixed_likes() -> testresult::TestResult {
        let json = r#"{
            "_id": "reel_1",
            "foodName": "Biryani",
            "likes": ["u1", {"_id": "u2", "name": "Asha"}],
            "isSaved": true,
            "restaurant": {"_id": "rest_1", "name": "Paradise", "zomatoLink": "zomato.com/paradise"},
            "comments": [{"_id": "c1", "text": "yum", "username": "ravi"}]
        }"#;

        let reel: Reel = serde_json::from_str(json)?;

        assert_eq!(reel.id, "reel_1");
        assert_eq!(reel.liker_ids(), vec!["u1".to_string(), "u2".to_string()]);
        assert!(reel.is_saved);
        assert!(!reel.is_following);
        assert_eq!(reel.restaurant_id(), Some("rest_1"));
        assert_eq!(reel.comments.len(), 1);
        Ok(())
    }

    #[test]
    fn dish_name_falls_back() {
        assert_eq!(Reel::new("x").dish_name(), "Tasty Dish");
    }
}
