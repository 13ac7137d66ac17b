use serde::{Deserialize, Serialize};

pub type CommentId = String;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    #[serde(alias = "_id", default)]
    pub id: CommentId,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub username: Option<String>,
}

/// A comment on a reel together with its replies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(alias = "_id", default)]
    pub id: CommentId,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub replies: Vec<Reply>,
}

impl Comment {
    pub fn new(id: impl Into<CommentId>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_reply(mut self, id: impl Into<CommentId>, text: impl Into<String>) -> Self {
        self.replies.push(Reply {
            id: id.into(),
            text: text.into(),
            username: None,
        });
        self
    }
}
