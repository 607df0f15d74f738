use serde::{Deserialize, Serialize};

pub type UserId = i64;
pub type PostId = i64;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Creator {
    pub user_id: UserId,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Media {
    pub media_id: i64,
    pub media_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Url {
    pub shortened_url: String,
    pub expanded_url: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum PostType {
    #[default]
    Post,
    Repost,
    Reply,
    Dm,
}

/// A post as stored by the post storage service.
///
/// The home timeline never looks inside it; it only indexes `post_id` and
/// hands back whatever the post store returns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Post {
    pub post_id: PostId,
    pub creator: Creator,
    #[serde(default)]
    pub req_id: i64,
    pub text: String,
    #[serde(default)]
    pub user_mentions: Vec<UserId>,
    #[serde(default)]
    pub media: Vec<Media>,
    #[serde(default)]
    pub urls: Vec<Url>,
    pub timestamp: i64,
    #[serde(default)]
    pub post_type: PostType,
}
