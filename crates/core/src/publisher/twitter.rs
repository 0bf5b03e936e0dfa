use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::types::{NewPost, PostError, PostGateway, PostId, PostReceipt};
use crate::config::PublisherConfig;

/// Posting client for the v2 tweets endpoint.
pub struct TwitterGateway {
    client: reqwest::Client,
    config: PublisherConfig,
}

impl TwitterGateway {
    pub fn new(config: PublisherConfig) -> Result<Self, PostError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| PostError::Http(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn tweets_url(&self) -> String {
        format!("{}/2/tweets", self.config.api_base.trim_end_matches('/'))
    }
}

#[derive(Debug, Serialize)]
struct TweetRequest {
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply: Option<TweetReply>,
}

#[derive(Debug, Serialize)]
struct TweetReply {
    in_reply_to_tweet_id: String,
}

#[derive(Debug, Deserialize)]
struct TweetResponse {
    data: TweetData,
}

#[derive(Debug, Deserialize)]
struct TweetData {
    id: String,
}

#[derive(Debug, Deserialize)]
struct TweetError {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

impl TweetError {
    fn message(self, fallback: String) -> String {
        self.detail.or(self.title).unwrap_or(fallback)
    }
}

#[async_trait]
impl PostGateway for TwitterGateway {
    fn name(&self) -> &str {
        "twitter"
    }

    async fn publish(&self, post: &NewPost) -> Result<PostReceipt, PostError> {
        let request = TweetRequest {
            text: post.text.clone(),
            reply: post.in_reply_to.as_ref().map(|parent| TweetReply {
                in_reply_to_tweet_id: parent.as_str().to_string(),
            }),
        };

        let response = self
            .client
            .post(self.tweets_url())
            .header(
                "authorization",
                format!("Bearer {}", self.config.bearer_token),
            )
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PostError::Timeout
                } else {
                    PostError::Http(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status != 201 {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<TweetError>(&error_text)
                .map(|e| e.message(error_text.clone()))
                .unwrap_or(error_text);
            return Err(PostError::Api { status, message });
        }

        let reply: TweetResponse = response
            .json()
            .await
            .map_err(|e| PostError::Decode(e.to_string()))?;
        Ok(PostReceipt {
            id: PostId::new(reply.data.id),
        })
    }
}
