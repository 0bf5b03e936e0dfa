use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use super::types::{
    NewPost, PostGateway, PublishedThread, ThreadPost, ThreadPublishError,
};
use crate::config::PublisherConfig;
use crate::summarizer::SummarySegment;

/// Publishes a summary as a causally ordered reply chain.
///
/// Publication is not atomic: a mid-thread failure leaves the already
/// published prefix live on the platform. The error reports that prefix and
/// the caller decides whether the whole thread is retried later.
pub struct ThreadPublisher {
    gateway: Arc<dyn PostGateway>,
    max_post_chars: usize,
    post_delay: Duration,
}

impl ThreadPublisher {
    pub fn new(gateway: Arc<dyn PostGateway>, config: &PublisherConfig) -> Self {
        Self {
            gateway,
            max_post_chars: config.max_post_chars,
            post_delay: Duration::from_millis(config.post_delay_ms),
        }
    }

    /// Checks every segment before the first post goes out, so a thread that
    /// cannot complete is rejected with zero side effects.
    fn preflight(&self, segments: &[SummarySegment]) -> Result<(), ThreadPublishError> {
        if segments.is_empty() {
            return Err(ThreadPublishError::EmptyThread);
        }
        for segment in segments {
            let chars = segment.text.chars().count();
            if chars > self.max_post_chars {
                return Err(ThreadPublishError::SegmentTooLong {
                    ordinal: segment.ordinal,
                    chars,
                    limit: self.max_post_chars,
                });
            }
        }
        Ok(())
    }

    pub async fn publish_thread(
        &self,
        segments: &[SummarySegment],
    ) -> Result<PublishedThread, ThreadPublishError> {
        self.preflight(segments)?;

        let mut posts: Vec<ThreadPost> = Vec::with_capacity(segments.len());
        let mut parent = None;
        for (i, segment) in segments.iter().enumerate() {
            let new_post = NewPost {
                text: segment.text.clone(),
                in_reply_to: parent,
            };
            let receipt = match self.gateway.publish(&new_post).await {
                Ok(receipt) => receipt,
                Err(source) => {
                    return Err(ThreadPublishError::PostFailed {
                        ordinal: segment.ordinal,
                        posted: posts,
                        source,
                    });
                }
            };
            debug!(
                ordinal = segment.ordinal,
                id = %receipt.id,
                "published thread post"
            );
            posts.push(ThreadPost {
                ordinal: segment.ordinal,
                id: receipt.id.clone(),
                parent: new_post.in_reply_to,
                text: new_post.text,
            });
            parent = Some(receipt.id);
            if i + 1 < segments.len() && !self.post_delay.is_zero() {
                tokio::time::sleep(self.post_delay).await;
            }
        }

        let thread = PublishedThread { posts };
        info!(
            gateway = self.gateway.name(),
            posts = thread.len(),
            "published summary thread"
        );
        Ok(thread)
    }
}
