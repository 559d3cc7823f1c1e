use crate::error::CorpCrunchClientError;
use crate::models::{
    ApiError, AuthResponse, Category, CategoryPage, CounterResponse, CreateCategoryRequest,
    CreatePostRequest, LoginRequest, Post, PostListQuery, PostsResponse, RegisterRequest,
    SweepReport, TranslateRequest, TranslatedPost, Translation, TrendingBuckets,
    UpdatePostRequest,
};
use reqwest::{header, Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Header carrying the shared secret for the publish trigger.
pub const CRON_SECRET_HEADER: &str = "x-cron-secret";

#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, CorpCrunchClientError> {
        // Translation of long posts can take a while upstream.
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            token: None,
        })
    }

    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    pub fn get_token(&self) -> Option<&String> {
        self.token.as_ref()
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    fn add_auth_header(&self, mut request: RequestBuilder) -> RequestBuilder {
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        request
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn handle_response<T: DeserializeOwned>(
        response: Response,
    ) -> Result<T, CorpCrunchClientError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let retry_after = response
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());

        let body = response.text().await?;
        let message = serde_json::from_str::<ApiError>(&body)
            .map(|e| e.message)
            .unwrap_or(body);

        tracing::debug!("Request failed with HTTP {}: {}", status, message);

        Err(CorpCrunchClientError::from_status(
            status.as_u16(),
            message,
            retry_after,
        ))
    }

    // ============== Admin auth ==============

    pub async fn register(
        &mut self,
        req: RegisterRequest,
    ) -> Result<AuthResponse, CorpCrunchClientError> {
        let url = self.url("/api/admin/auth/register");
        let response = self.client.post(&url).json(&req).send().await?;

        let auth: AuthResponse = Self::handle_response(response).await?;
        self.set_token(auth.token.clone());
        Ok(auth)
    }

    pub async fn login(&mut self, req: LoginRequest) -> Result<AuthResponse, CorpCrunchClientError> {
        let url = self.url("/api/admin/auth/login");
        let response = self.client.post(&url).json(&req).send().await?;

        let auth: AuthResponse = Self::handle_response(response).await?;
        self.set_token(auth.token.clone());
        Ok(auth)
    }

    // ============== Admin ==============

    pub async fn list_admin_posts(
        &self,
        query: &PostListQuery,
    ) -> Result<PostsResponse, CorpCrunchClientError> {
        let url = self.url("/api/admin/posts");
        let response = self
            .add_auth_header(self.client.get(&url))
            .query(query)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    pub async fn create_post(&self, req: &CreatePostRequest) -> Result<Post, CorpCrunchClientError> {
        let url = self.url("/api/admin/posts");
        let response = self
            .add_auth_header(self.client.post(&url))
            .json(req)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    pub async fn update_post(
        &self,
        id: i64,
        req: &UpdatePostRequest,
    ) -> Result<Post, CorpCrunchClientError> {
        let url = self.url(&format!("/api/admin/posts/{}", id));
        let response = self
            .add_auth_header(self.client.put(&url))
            .json(req)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    pub async fn create_category(
        &self,
        req: &CreateCategoryRequest,
    ) -> Result<Category, CorpCrunchClientError> {
        let url = self.url("/api/admin/categories");
        let response = self
            .add_auth_header(self.client.post(&url))
            .json(req)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    // ============== Cron ==============

    pub async fn publish_scheduled(
        &self,
        cron_secret: Option<&str>,
    ) -> Result<SweepReport, CorpCrunchClientError> {
        let url = self.url("/api/cron/publish-scheduled");
        let mut request = self.client.post(&url);
        if let Some(secret) = cron_secret {
            request = request.header(CRON_SECRET_HEADER, secret);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    // ============== Public ==============

    pub async fn list_categories(&self) -> Result<Vec<Category>, CorpCrunchClientError> {
        let url = self.url("/api/categories");
        let response = self.client.get(&url).send().await?;
        Self::handle_response(response).await
    }

    pub async fn get_category(&self, slug: &str) -> Result<Category, CorpCrunchClientError> {
        let url = self.url(&format!("/api/categories/{}", slug));
        let response = self.client.get(&url).send().await?;
        Self::handle_response(response).await
    }

    pub async fn category_page(&self, slug: &str) -> Result<CategoryPage, CorpCrunchClientError> {
        let url = self.url(&format!("/api/categories/{}/posts", slug));
        let response = self.client.get(&url).send().await?;
        Self::handle_response(response).await
    }

    pub async fn trending(
        &self,
        per_bucket: Option<usize>,
    ) -> Result<TrendingBuckets, CorpCrunchClientError> {
        let url = self.url("/api/posts/trending");
        let mut request = self.client.get(&url);
        if let Some(n) = per_bucket {
            request = request.query(&[("per_bucket", n)]);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    pub async fn get_post(&self, slug: &str) -> Result<Post, CorpCrunchClientError> {
        let url = self.url(&format!("/api/posts/{}", slug));
        let response = self.client.get(&url).send().await?;
        Self::handle_response(response).await
    }

    pub async fn record_view(&self, slug: &str) -> Result<CounterResponse, CorpCrunchClientError> {
        let url = self.url(&format!("/api/posts/{}/view", slug));
        let response = self.client.post(&url).send().await?;
        Self::handle_response(response).await
    }

    pub async fn record_share(&self, slug: &str) -> Result<CounterResponse, CorpCrunchClientError> {
        let url = self.url(&format!("/api/posts/{}/share", slug));
        let response = self.client.post(&url).send().await?;
        Self::handle_response(response).await
    }

    pub async fn translate_post(
        &self,
        slug: &str,
        language: &str,
    ) -> Result<TranslatedPost, CorpCrunchClientError> {
        let url = self.url(&format!("/api/posts/{}/translation/{}", slug, language));
        let response = self.client.get(&url).send().await?;
        Self::handle_response(response).await
    }

    pub async fn translate(
        &self,
        req: &TranslateRequest,
    ) -> Result<Translation, CorpCrunchClientError> {
        let url = self.url("/api/translate");
        let response = self.client.post(&url).json(req).send().await?;
        Self::handle_response(response).await
    }

    pub async fn health(&self) -> Result<serde_json::Value, CorpCrunchClientError> {
        let url = self.url("/api/health");
        let response = self.client.get(&url).send().await?;
        Self::handle_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_double_slashes() {
        let client = HttpClient::new("http://localhost:3000/").unwrap();
        assert_eq!(
            client.url("/api/posts/trending"),
            "http://localhost:3000/api/posts/trending"
        );
        assert_eq!(client.url("api/health"), "http://localhost:3000/api/health");
    }

    #[test]
    fn token_lifecycle() {
        let mut client = HttpClient::new("http://localhost:3000").unwrap();
        assert!(client.get_token().is_none());
        client.set_token("abc".to_string());
        assert_eq!(client.get_token().map(String::as_str), Some("abc"));
        client.clear_token();
        assert!(client.get_token().is_none());
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_error() {
        let client = HttpClient::new("http://127.0.0.1:1").unwrap();
        let err = client.list_categories().await.unwrap_err();
        assert!(matches!(err, CorpCrunchClientError::HttpError(_)));
    }
}
