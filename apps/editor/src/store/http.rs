//! HTTP store — the single point of entry for all remote resume/profile
//! calls. No other module talks to the API directly.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::models::{
    AttachedItem, Category, FieldPatch, ResumeCoreFields, ResumeSnapshot, SourcePool,
};
use crate::store::{ApiError, AttachRequest, ResumeStore};

/// Error body shape returned by the platform API:
/// `{"error": {"code": "...", "message": "..."}}`.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[allow(dead_code)]
    code: Option<String>,
    message: String,
}

/// Typed client for the recruitment platform's resume and profile endpoints.
#[derive(Clone)]
pub struct HttpResumeStore {
    client: Client,
    base_url: String,
    token: String,
    resume_id: Uuid,
    profile_id: Uuid,
}

impl HttpResumeStore {
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token: config.api_token.clone(),
            resume_id: config.resume_id,
            profile_id: config.profile_id,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
    }

    fn item_path(&self, category: Category, attachment_id: Uuid) -> String {
        format!(
            "/api/v1/resumes/{}/items/{}/{}",
            self.resume_id, category, attachment_id
        )
    }

    /// Converts a non-2xx response into `ApiError::Api`, extracting the
    /// platform's error envelope when present.
    async fn check(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|envelope| envelope.error.message)
            .unwrap_or(body);
        warn!("API returned {status}: {message}");

        Err(ApiError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        Ok(Self::check(response).await?.json::<T>().await?)
    }
}

#[async_trait]
impl ResumeStore for HttpResumeStore {
    async fn get_source_pool(&self) -> Result<SourcePool, ApiError> {
        debug!("fetching source pool for profile {}", self.profile_id);
        let response = self
            .request(
                Method::GET,
                &format!("/api/v1/profiles/{}/items", self.profile_id),
            )
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn get_target(&self) -> Result<ResumeSnapshot, ApiError> {
        debug!("fetching resume {}", self.resume_id);
        let response = self
            .request(Method::GET, &format!("/api/v1/resumes/{}", self.resume_id))
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn attach(
        &self,
        category: Category,
        request: AttachRequest,
    ) -> Result<AttachedItem, ApiError> {
        debug!("attaching {category} source {}", request.source_id);
        let response = self
            .request(
                Method::POST,
                &format!("/api/v1/resumes/{}/items/{}", self.resume_id, category),
            )
            .json(&request)
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn detach(&self, category: Category, attachment_id: Uuid) -> Result<(), ApiError> {
        debug!("detaching {category} attachment {attachment_id}");
        let response = self
            .request(Method::DELETE, &self.item_path(category, attachment_id))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn update(
        &self,
        category: Category,
        attachment_id: Uuid,
        patch: &FieldPatch,
    ) -> Result<AttachedItem, ApiError> {
        debug!(
            "updating {category} attachment {attachment_id} ({} fields)",
            patch.len()
        );
        let response = self
            .request(Method::PATCH, &self.item_path(category, attachment_id))
            .json(patch)
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn create_for_target(
        &self,
        category: Category,
        fields: &FieldPatch,
    ) -> Result<AttachedItem, ApiError> {
        debug!("creating {category} item directly on resume {}", self.resume_id);
        let response = self
            .request(
                Method::POST,
                &format!(
                    "/api/v1/resumes/{}/items/{}/direct",
                    self.resume_id, category
                ),
            )
            .json(fields)
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn update_core_fields(&self, patch: &FieldPatch) -> Result<ResumeCoreFields, ApiError> {
        debug!("updating core fields ({} fields)", patch.len());
        let response = self
            .request(
                Method::PATCH,
                &format!("/api/v1/resumes/{}/core", self.resume_id),
            )
            .json(patch)
            .send()
            .await?;
        Self::parse(response).await
    }
}
