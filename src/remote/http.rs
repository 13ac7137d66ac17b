use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

use super::{RemoteCheckoutGroup, RemoteStore};
use crate::domain::{CartLineItem, Comment, CommentId, LikerRef, Platform, ProductRef, Reel, ReelId, RestaurantId, UserId};
use crate::error::RemoteError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Standard response wrapper: `{ success, message, data }`. The like endpoint
/// returns the liker list at top level as `likes`.
///
/// Missing fields decode to `None`.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: Option<bool>,
    message: Option<String>,
    error: Option<String>,
    data: Option<T>,
    likes: Option<Vec<LikerRef>>,
}

impl<T> Envelope<T> {
    fn empty() -> Self {
        Self {
            success: None,
            message: None,
            error: None,
            data: None,
            likes: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct CartPayload {
    #[serde(default)]
    items: Vec<CartLineItem>,
}

/// [`RemoteStore`] over the backend's REST API.
#[derive(Debug, Clone)]
pub struct HttpRemoteStore {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpRemoteStore {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Result<Self, RemoteError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(RemoteError::Setup(format!("API base URL must be http(s): {}", base_url)));
        }
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| RemoteError::Setup(e.to_string()))?;
        Ok(Self { http, base_url, token })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<Envelope<T>, RemoteError> {
        let response = builder.send().await.map_err(classify)?;
        let status = response.status();
        let body = response.text().await.map_err(classify)?;
        debug!(status = status.as_u16(), bytes = body.len(), "Response received");

        if !status.is_success() {
            let message = serde_json::from_str::<Envelope<serde_json::Value>>(&body)
                .ok()
                .and_then(|envelope| envelope.message.or(envelope.error));
            return Err(RemoteError::rejected(Some(status.as_u16()), message));
        }

        let envelope = decode_envelope::<T>(status.as_u16(), &body)?;
        if envelope.success == Some(false) {
            return Err(RemoteError::rejected(Some(status.as_u16()), envelope.message.or(envelope.error)));
        }
        Ok(envelope)
    }

    async fn send_unit(&self, builder: RequestBuilder) -> Result<(), RemoteError> {
        self.send::<serde_json::Value>(builder).await.map(|_| ())
    }

    /// Cart writes count only when the server says `success: true`.
    async fn send_confirmed(&self, builder: RequestBuilder) -> Result<(), RemoteError> {
        let envelope = self.send::<serde_json::Value>(builder).await?;
        require_success(envelope)
    }
}

fn require_success<T>(envelope: Envelope<T>) -> Result<(), RemoteError> {
    if envelope.success == Some(true) {
        Ok(())
    } else {
        Err(RemoteError::rejected(None, envelope.message.or(envelope.error)))
    }
}

/// Decodes a 2xx body. The request already reached the server, so an
/// unreadable answer is a rejection, not a setup error.
fn decode_envelope<T: DeserializeOwned>(status: u16, body: &str) -> Result<Envelope<T>, RemoteError> {
    if body.trim().is_empty() {
        return Ok(Envelope::empty());
    }
    serde_json::from_str(body).map_err(|e| {
        debug!(error = %e, "Undecodable response body");
        RemoteError::rejected(Some(status), None)
    })
}

/// Maps a transport failure onto the three-way taxonomy.
fn classify(err: reqwest::Error) -> RemoteError {
    if err.is_builder() {
        RemoteError::Setup(err.to_string())
    } else if err.is_decode() {
        RemoteError::rejected(None, None)
    } else {
        RemoteError::Network(err.to_string())
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    #[instrument(skip(self))]
    async fn fetch_cart(&self) -> Result<Vec<CartLineItem>, RemoteError> {
        let envelope: Envelope<CartPayload> = self.send(self.request(Method::GET, "/cart")).await?;
        Ok(envelope.data.unwrap_or_default().items)
    }

    #[instrument(skip(self))]
    async fn add_item(&self, product: ProductRef, platform: Platform) -> Result<(), RemoteError> {
        let body = json!({ "reelId": product, "platform": platform });
        self.send_confirmed(self.request(Method::POST, "/cart/add").json(&body)).await
    }

    #[instrument(skip(self))]
    async fn remove_item(&self, product: ProductRef, platform: Platform) -> Result<(), RemoteError> {
        let body = json!({ "reelId": product, "platform": platform });
        self.send_confirmed(self.request(Method::DELETE, "/cart/remove").json(&body)).await
    }

    #[instrument(skip(self))]
    async fn update_quantity(&self, product: ProductRef, platform: Platform, quantity: u32) -> Result<(), RemoteError> {
        let body = json!({ "reelId": product, "platform": platform, "quantity": quantity });
        self.send_confirmed(self.request(Method::PATCH, "/cart/update").json(&body)).await
    }

    #[instrument(skip(self))]
    async fn fetch_checkout_groups(&self) -> Result<Vec<RemoteCheckoutGroup>, RemoteError> {
        let envelope: Envelope<Vec<RemoteCheckoutGroup>> =
            self.send(self.request(Method::GET, "/cart/checkout")).await?;
        Ok(envelope.data.unwrap_or_default())
    }

    #[instrument(skip(self))]
    async fn fetch_reels(&self) -> Result<Vec<Reel>, RemoteError> {
        let envelope: Envelope<Vec<Reel>> = self.send(self.request(Method::GET, "/reels")).await?;
        Ok(envelope.data.unwrap_or_default())
    }

    #[instrument(skip(self))]
    async fn toggle_like(&self, reel: ReelId) -> Result<Vec<UserId>, RemoteError> {
        let path = format!("/reels/{}/like", reel);
        let envelope: Envelope<serde_json::Value> = self.send(self.request(Method::POST, &path)).await?;
        let likes = envelope.likes.unwrap_or_default();
        Ok(likes.iter().map(|liker| liker.user_id().to_string()).collect())
    }

    #[instrument(skip(self))]
    async fn set_saved(&self, reel: ReelId, saved: bool) -> Result<(), RemoteError> {
        let request = if saved {
            self.request(Method::POST, &format!("/reels/{}/save", reel))
        } else {
            self.request(Method::DELETE, &format!("/reels/{}/unsave", reel))
        };
        self.send_unit(request).await
    }

    #[instrument(skip(self))]
    async fn set_follow(&self, restaurant: RestaurantId, follow: bool) -> Result<(), RemoteError> {
        let request = if follow {
            self.request(Method::POST, &format!("/restaurants/{}/follow", restaurant))
        } else {
            self.request(Method::DELETE, &format!("/restaurants/{}/unfollow", restaurant))
        };
        self.send_unit(request).await
    }

    #[instrument(skip(self, text))]
    async fn add_comment(&self, reel: ReelId, text: String, username: Option<String>) -> Result<Vec<Comment>, RemoteError> {
        let body = json!({ "text": text, "username": username });
        let path = format!("/reels/{}/comment", reel);
        let envelope: Envelope<Vec<Comment>> = self.send(self.request(Method::POST, &path).json(&body)).await?;
        Ok(envelope.data.unwrap_or_default())
    }

    #[instrument(skip(self))]
    async fn delete_comment(&self, reel: ReelId, comment: CommentId) -> Result<(), RemoteError> {
        let path = format!("/reels/{}/comment/{}", reel, comment);
        self.send_unit(self.request(Method::DELETE, &path)).await
    }

    #[instrument(skip(self, text))]
    async fn add_reply(&self, reel: ReelId, comment: CommentId, text: String) -> Result<Vec<Comment>, RemoteError> {
        let path = format!("/reels/{}/comment/{}/reply", reel, comment);
        let body = json!({ "text": text });
        let envelope: Envelope<Vec<Comment>> = self.send(self.request(Method::POST, &path).json(&body)).await?;
        Ok(envelope.data.unwrap_or_default())
    }

    #[instrument(skip(self))]
    async fn delete_reply(&self, reel: ReelId, comment: CommentId, reply: CommentId) -> Result<(), RemoteError> {
        let path = format!("/reels/{}/comment/{}/reply/{}", reel, comment, reply);
        self.send_unit(self.request(Method::DELETE, &path)).await
    }
}
