//! Mock post gateway for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::publisher::{NewPost, PostError, PostGateway, PostId, PostReceipt};

/// A post the mock accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockPost {
    pub id: PostId,
    pub text: String,
    pub in_reply_to: Option<PostId>,
}

/// Mock implementation of the `PostGateway` trait.
///
/// Assigns sequential ids (`post-1`, `post-2`, ...). `fail_on_call(n)`
/// makes the nth publish attempt fail, counted across the gateway's whole
/// lifetime, so a retry on a later sweep sees fresh calls.
pub struct MockPostGateway {
    calls: Arc<RwLock<Vec<NewPost>>>,
    posts: Arc<RwLock<Vec<MockPost>>>,
    fail_calls: Arc<RwLock<HashSet<usize>>>,
    next_id: AtomicU64,
}

impl Default for MockPostGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPostGateway {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(RwLock::new(Vec::new())),
            posts: Arc::new(RwLock::new(Vec::new())),
            fail_calls: Arc::new(RwLock::new(HashSet::new())),
            next_id: AtomicU64::new(1),
        }
    }

    /// Fails the nth publish call (1-based).
    pub async fn fail_on_call(&self, n: usize) {
        self.fail_calls.write().await.insert(n);
    }

    /// Every publish attempt, failed ones included, in call order.
    pub async fn calls(&self) -> Vec<NewPost> {
        self.calls.read().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }

    /// Posts that went live, in publish order.
    pub async fn posts(&self) -> Vec<MockPost> {
        self.posts.read().await.clone()
    }
}

#[async_trait]
impl PostGateway for MockPostGateway {
    fn name(&self) -> &str {
        "mock"
    }

    async fn publish(&self, post: &NewPost) -> Result<PostReceipt, PostError> {
        let call_number = {
            let mut calls = self.calls.write().await;
            calls.push(post.clone());
            calls.len()
        };

        if self.fail_calls.read().await.contains(&call_number) {
            return Err(PostError::Api {
                status: 500,
                message: format!("scripted failure on call {call_number}"),
            });
        }

        let id = PostId::new(format!("post-{}", self.next_id.fetch_add(1, Ordering::Relaxed)));
        self.posts.write().await.push(MockPost {
            id: id.clone(),
            text: post.text.clone(),
            in_reply_to: post.in_reply_to.clone(),
        });
        Ok(PostReceipt { id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(text: &str, parent: Option<&PostId>) -> NewPost {
        NewPost {
            text: text.to_string(),
            in_reply_to: parent.cloned(),
        }
    }

    #[tokio::test]
    async fn test_sequential_ids() {
        let gateway = MockPostGateway::new();
        let first = gateway.publish(&post("a", None)).await.unwrap();
        let second = gateway.publish(&post("b", Some(&first.id))).await.unwrap();

        assert_eq!(first.id.as_str(), "post-1");
        assert_eq!(second.id.as_str(), "post-2");

        let posts = gateway.posts().await;
        assert_eq!(posts[1].in_reply_to, Some(first.id));
    }

    #[tokio::test]
    async fn test_scripted_failure_counts_attempts() {
        let gateway = MockPostGateway::new();
        gateway.fail_on_call(2).await;

        assert!(gateway.publish(&post("a", None)).await.is_ok());
        assert!(gateway.publish(&post("b", None)).await.is_err());
        assert!(gateway.publish(&post("c", None)).await.is_ok());

        assert_eq!(gateway.call_count().await, 3);
        assert_eq!(gateway.posts().await.len(), 2);
    }
}
