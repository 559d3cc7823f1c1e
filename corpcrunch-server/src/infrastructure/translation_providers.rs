use crate::application::translation::TranslationProvider;
use crate::domain::DomainError;
use crate::infrastructure::config::TranslationConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

fn http_client(timeout: Duration) -> Result<Client, DomainError> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(5))
        .build()
        .map_err(|e| DomainError::InternalError(format!("Failed to build HTTP client: {}", e)))
}

fn upstream(provider: &str, err: impl std::fmt::Display) -> DomainError {
    DomainError::UpstreamError(format!("{}: {}", provider, err))
}

/// Builds the provider chain: MyMemory first, LibreTranslate as fallback when configured.
pub fn providers_from_config(
    config: &TranslationConfig,
) -> Result<Vec<Arc<dyn TranslationProvider>>, DomainError> {
    let mut providers: Vec<Arc<dyn TranslationProvider>> = vec![Arc::new(MyMemoryProvider::new(
        config.mymemory_url.clone(),
        config.mymemory_email.clone(),
        config.request_timeout,
    )?)];

    if let Some(url) = &config.libretranslate_url {
        providers.push(Arc::new(LibreTranslateProvider::new(
            url.clone(),
            config.libretranslate_api_key.clone(),
            config.request_timeout,
        )?));
    }

    tracing::info!(
        "Translation providers: {}",
        providers
            .iter()
            .map(|p| p.name().to_string())
            .collect::<Vec<_>>()
            .join(" -> ")
    );

    Ok(providers)
}

pub struct MyMemoryProvider {
    client: Client,
    base_url: String,
    contact_email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MyMemoryResponse {
    #[serde(rename = "responseData")]
    response_data: MyMemoryData,
    // The API sends this as a number or as a string depending on the error path.
    #[serde(rename = "responseStatus")]
    response_status: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct MyMemoryData {
    #[serde(rename = "translatedText")]
    translated_text: Option<String>,
}

impl MyMemoryProvider {
    pub fn new(
        base_url: String,
        contact_email: Option<String>,
        timeout: Duration,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url,
            contact_email,
        })
    }
}

#[async_trait]
impl TranslationProvider for MyMemoryProvider {
    fn name(&self) -> &str {
        "mymemory"
    }

    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, DomainError> {
        let url = format!("{}/get", self.base_url.trim_end_matches('/'));
        let langpair = format!("{}|{}", source, target);

        let mut query = vec![("q", text), ("langpair", langpair.as_str())];
        if let Some(email) = &self.contact_email {
            query.push(("de", email.as_str()));
        }

        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| upstream(self.name(), e))?;

        if !response.status().is_success() {
            return Err(upstream(self.name(), format!("HTTP {}", response.status())));
        }

        let body: MyMemoryResponse = response
            .json()
            .await
            .map_err(|e| upstream(self.name(), e))?;

        let status = match &body.response_status {
            serde_json::Value::Number(n) => n.as_u64(),
            serde_json::Value::String(s) => s.parse().ok(),
            _ => None,
        };
        if status != Some(200) {
            return Err(upstream(
                self.name(),
                format!("response status {}", body.response_status),
            ));
        }

        match body.response_data.translated_text {
            Some(text) if text.starts_with("MYMEMORY WARNING") => {
                Err(upstream(self.name(), "quota exhausted"))
            }
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(upstream(self.name(), "empty translation")),
        }
    }
}

pub struct LibreTranslateProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct LibreTranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct LibreTranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: Option<String>,
    error: Option<String>,
}

impl LibreTranslateProvider {
    pub fn new(
        base_url: String,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url,
            api_key,
        })
    }
}

#[async_trait]
impl TranslationProvider for LibreTranslateProvider {
    fn name(&self) -> &str {
        "libretranslate"
    }

    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, DomainError> {
        let url = format!("{}/translate", self.base_url.trim_end_matches('/'));
        let request = LibreTranslateRequest {
            q: text,
            source,
            target,
            format: "text",
            api_key: self.api_key.as_deref(),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| upstream(self.name(), e))?;

        let status = response.status();
        let body: LibreTranslateResponse = response
            .json()
            .await
            .map_err(|e| upstream(self.name(), e))?;

        if let Some(error) = body.error {
            return Err(upstream(self.name(), format!("HTTP {}: {}", status, error)));
        }

        match body.translated_text {
            Some(text) if status.is_success() && !text.trim().is_empty() => Ok(text),
            _ => Err(upstream(self.name(), format!("HTTP {}: empty translation", status))),
        }
    }
}
