use async_trait::async_trait;
use std::fmt;

/// Platform-assigned post identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PostId(String);

impl PostId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A post about to be published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub text: String,
    /// Parent post when this one continues a thread.
    pub in_reply_to: Option<PostId>,
}

/// What the platform returned for a published post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostReceipt {
    pub id: PostId,
}

/// A post that is live on the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadPost {
    pub ordinal: u32,
    pub id: PostId,
    pub parent: Option<PostId>,
    pub text: String,
}

/// A fully published thread: post 1 has no parent, post i+1 replies to
/// post i.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedThread {
    pub posts: Vec<ThreadPost>,
}

impl PublishedThread {
    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Id of the thread's first post.
    pub fn root_id(&self) -> Option<&PostId> {
        self.posts.first().map(|post| &post.id)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PostError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Post request timeout")]
    Timeout,

    #[error("Failed to decode post reply: {0}")]
    Decode(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ThreadPublishError {
    #[error("Refusing to publish an empty thread")]
    EmptyThread,

    #[error("Segment {ordinal} is {chars} characters, over the {limit} limit")]
    SegmentTooLong {
        ordinal: u32,
        chars: usize,
        limit: usize,
    },

    /// The chain broke partway. `posted` is the prefix that is already live
    /// on the platform; nothing deletes it.
    #[error("Post {ordinal} failed after {} live posts: {source}", posted.len())]
    PostFailed {
        ordinal: u32,
        posted: Vec<ThreadPost>,
        source: PostError,
    },
}

/// One platform-level publish call.
#[async_trait]
pub trait PostGateway: Send + Sync {
    fn name(&self) -> &str;

    async fn publish(&self, post: &NewPost) -> Result<PostReceipt, PostError>;
}
