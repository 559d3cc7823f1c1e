//! On-demand translation with provider fallback and a content-addressed cache.

use crate::domain::DomainError;
use async_trait::async_trait;
use serde::Serialize;
use moka::sync::Cache;
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Upstream APIs reject large payloads; longer texts are split first.
pub const MAX_CHUNK_CHARS: usize = 5000;

#[async_trait]
pub trait TranslationProvider: Send + Sync {
    fn name(&self) -> &str;
    async fn translate(&self, text: &str, source: &str, target: &str)
        -> Result<String, DomainError>;
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Translation {
    pub text: String,
    pub provider: Option<String>,
    pub cached: bool,
    /// Every provider failed and `text` is the untranslated input.
    pub degraded: bool,
}

impl Translation {
    fn untouched(text: &str) -> Self {
        Self {
            text: text.to_string(),
            provider: None,
            cached: false,
            degraded: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    source: String,
    target: String,
    digest: String,
}

impl CacheKey {
    fn new(source: &str, target: &str, text: &str) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
            digest: hex::encode(Sha256::digest(text.as_bytes())),
        }
    }
}

#[derive(Debug, Clone)]
struct CachedTranslation {
    text: String,
    provider: String,
}

pub struct TranslationService {
    providers: Vec<Arc<dyn TranslationProvider>>,
    cache: Cache<CacheKey, CachedTranslation>,
}

impl TranslationService {
    /// `providers` are tried in order: the first is primary, the rest fallbacks.
    pub fn new(providers: Vec<Arc<dyn TranslationProvider>>, cache_capacity: u64) -> Self {
        let cache = Cache::builder().max_capacity(cache_capacity).build();
        Self { providers, cache }
    }

    pub fn cached_entries(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }

    pub async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<Translation, DomainError> {
        let source = normalize_language(source)?;
        let target = normalize_language(target)?;

        if text.trim().is_empty() || source == target {
            return Ok(Translation::untouched(text));
        }

        let key = CacheKey::new(&source, &target, text);
        if let Some(hit) = self.cache.get(&key) {
            tracing::debug!(source = %source, target = %target, "Translation cache hit");
            return Ok(Translation {
                text: hit.text,
                provider: Some(hit.provider),
                cached: true,
                degraded: false,
            });
        }

        let chunks = split_into_chunks(text, MAX_CHUNK_CHARS);
        let mut translated = String::with_capacity(text.len());
        let mut used: Vec<String> = Vec::new();

        for chunk in &chunks {
            let (lead, core, trail) = split_whitespace_edges(chunk);
            if core.is_empty() {
                translated.push_str(chunk);
                continue;
            }
            match self.translate_chunk(core, &source, &target).await {
                Some((piece, provider)) => {
                    if !used.contains(&provider) {
                        used.push(provider);
                    }
                    translated.push_str(lead);
                    translated.push_str(piece.trim());
                    translated.push_str(trail);
                }
                None => {
                    tracing::warn!(
                        source = %source,
                        target = %target,
                        chunks = chunks.len(),
                        "All translation providers failed, returning original text"
                    );
                    return Ok(Translation {
                        text: text.to_string(),
                        provider: None,
                        cached: false,
                        degraded: true,
                    });
                }
            }
        }

        let result = CachedTranslation {
            text: translated,
            provider: used.join("+"),
        };
        self.cache.insert(key, result.clone());

        Ok(Translation {
            text: result.text,
            provider: Some(result.provider),
            cached: false,
            degraded: false,
        })
    }

    async fn translate_chunk(
        &self,
        chunk: &str,
        source: &str,
        target: &str,
    ) -> Option<(String, String)> {
        for provider in &self.providers {
            match provider.translate(chunk, source, target).await {
                Ok(text) => return Some((text, provider.name().to_string())),
                Err(e) => {
                    tracing::warn!(provider = provider.name(), error = %e, "Translation provider failed");
                }
            }
        }
        None
    }
}

fn normalize_language(code: &str) -> Result<String, DomainError> {
    let code = code.trim().to_ascii_lowercase();
    let valid = (2..=10).contains(&code.len())
        && code.chars().all(|c| c.is_ascii_alphabetic() || c == '-');
    if valid {
        Ok(code)
    } else {
        Err(DomainError::ValidationError(format!(
            "Invalid language code: '{}'",
            code
        )))
    }
}

// Leading whitespace, trimmed core, trailing whitespace.
fn split_whitespace_edges(chunk: &str) -> (&str, &str, &str) {
    let start = chunk.len() - chunk.trim_start().len();
    let end = chunk.trim_end().len().max(start);
    (&chunk[..start], &chunk[start..end], &chunk[end..])
}

/// Splits `text` into pieces of at most `max_chars` characters, cutting at
/// sentence ends where possible. Concatenating the pieces yields `text`.
pub fn split_into_chunks(text: &str, max_chars: usize) -> Vec<String> {
    if text.chars().count() <= max_chars {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for sentence in sentences(text) {
        let len = sentence.chars().count();

        if len > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            chunks.extend(hard_split(sentence, max_chars));
            continue;
        }

        if current_len + len > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        current.push_str(sentence);
        current_len += len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

// Sentence ends after `.`, `!` or `?` followed by whitespace, or after a newline.
fn sentences(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        let end = idx + ch.len_utf8();
        let boundary = match ch {
            '\n' => true,
            '.' | '!' | '?' => chars.peek().is_some_and(|(_, next)| next.is_whitespace()),
            _ => false,
        };
        if boundary {
            out.push(&text[start..end]);
            start = end;
        }
    }

    if start < text.len() {
        out.push(&text[start..]);
    }
    out
}

fn hard_split(text: &str, max_chars: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(max_chars)
        .map(|piece| piece.iter().collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        name: &'static str,
        fail: bool,
        calls: AtomicUsize,
    }

    impl CountingProvider {
        fn new(name: &'static str, fail: bool) -> Arc<Self> {
            Arc::new(Self {
                name,
                fail,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TranslationProvider for CountingProvider {
        fn name(&self) -> &str {
            self.name
        }

        async fn translate(
            &self,
            text: &str,
            _source: &str,
            target: &str,
        ) -> Result<String, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(DomainError::UpstreamError("service unavailable".to_string()));
            }
            Ok(format!("[{}] {}", target, text))
        }
    }

    fn service(providers: Vec<Arc<CountingProvider>>, capacity: u64) -> TranslationService {
        let providers = providers
            .into_iter()
            .map(|p| p as Arc<dyn TranslationProvider>)
            .collect();
        TranslationService::new(providers, capacity)
    }

    #[tokio::test]
    async fn identical_requests_hit_upstream_once() {
        let primary = CountingProvider::new("primary", false);
        let svc = service(vec![primary.clone()], 10);

        let first = svc.translate("Hello world", "en", "hi").await.unwrap();
        let second = svc.translate("Hello world", "EN", "hi").await.unwrap();

        assert_eq!(primary.calls(), 1);
        assert!(!first.cached);
        assert!(second.cached);
        assert_eq!(first.text, "[hi] Hello world");
        assert_eq!(second.text, first.text);
    }

    #[tokio::test]
    async fn shared_prefix_does_not_collide() {
        let primary = CountingProvider::new("primary", false);
        let svc = service(vec![primary.clone()], 10);
        let prefix = "x".repeat(100);

        let a = svc.translate(&format!("{prefix} first"), "en", "fr").await.unwrap();
        let b = svc.translate(&format!("{prefix} second"), "en", "fr").await.unwrap();

        assert_eq!(primary.calls(), 2);
        assert!(!b.cached);
        assert_ne!(a.text, b.text);
    }

    #[tokio::test]
    async fn fallback_is_used_when_primary_fails() {
        let primary = CountingProvider::new("mymemory", true);
        let fallback = CountingProvider::new("libretranslate", false);
        let svc = service(vec![primary.clone(), fallback.clone()], 10);

        let result = svc.translate("Good morning", "en", "de").await.unwrap();

        assert_eq!(result.provider.as_deref(), Some("libretranslate"));
        assert_eq!(primary.calls(), 1);
        assert_eq!(fallback.calls(), 1);
    }

    #[tokio::test]
    async fn total_failure_degrades_to_original_and_is_not_cached() {
        let primary = CountingProvider::new("primary", true);
        let fallback = CountingProvider::new("fallback", true);
        let svc = service(vec![primary.clone(), fallback.clone()], 10);

        let result = svc.translate("Keep me", "en", "es").await.unwrap();
        assert!(result.degraded);
        assert_eq!(result.text, "Keep me");
        assert_eq!(svc.cached_entries(), 0);

        svc.translate("Keep me", "en", "es").await.unwrap();
        assert_eq!(primary.calls(), 2);
    }

    #[tokio::test]
    async fn same_language_or_blank_text_skips_upstream() {
        let primary = CountingProvider::new("primary", false);
        let svc = service(vec![primary.clone()], 10);

        let same = svc.translate("Hello", "en", "en").await.unwrap();
        let blank = svc.translate("   ", "en", "hi").await.unwrap();

        assert_eq!(same.text, "Hello");
        assert_eq!(blank.text, "   ");
        assert_eq!(primary.calls(), 0);
    }

    #[tokio::test]
    async fn invalid_language_code_is_rejected() {
        let svc = service(vec![CountingProvider::new("primary", false)], 10);
        let err = svc.translate("Hello", "en", "h1!").await.unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));
    }

    #[tokio::test]
    async fn long_text_is_translated_chunk_by_chunk() {
        let primary = CountingProvider::new("primary", false);
        let svc = service(vec![primary.clone()], 10);
        let text = "This sentence is exactly forty chars ok. ".repeat(300);

        let result = svc.translate(&text, "en", "hi").await.unwrap();

        let chunks = split_into_chunks(&text, MAX_CHUNK_CHARS);
        assert!(chunks.len() >= 3);
        assert_eq!(primary.calls(), chunks.len());
        assert!(!result.degraded);
    }

    #[tokio::test]
    async fn cache_stays_within_capacity() {
        let primary = CountingProvider::new("primary", false);
        let svc = service(vec![primary.clone()], 2);

        for text in ["one", "two", "three", "four", "five"] {
            svc.translate(text, "en", "hi").await.unwrap();
        }

        assert_eq!(primary.calls(), 5);
        assert!(svc.cached_entries() <= 2);
    }

    struct EchoProvider;

    #[async_trait]
    impl TranslationProvider for EchoProvider {
        fn name(&self) -> &str {
            "echo"
        }

        async fn translate(
            &self,
            text: &str,
            _source: &str,
            _target: &str,
        ) -> Result<String, DomainError> {
            Ok(text.to_string())
        }
    }

    #[tokio::test]
    async fn long_text_keeps_paragraph_breaks() {
        let echo: Arc<dyn TranslationProvider> = Arc::new(EchoProvider);
        let svc = TranslationService::new(vec![echo], 10);
        let paragraph = "Revenue grew again this quarter. ".repeat(97);
        let text = format!("{p}\n\n{p}\n\n{p}\n\n", p = paragraph.trim_end());
        assert!(split_into_chunks(&text, MAX_CHUNK_CHARS).len() >= 2);

        let result = svc.translate(&text, "en", "de").await.unwrap();

        assert!(!result.degraded);
        assert_eq!(result.text.matches('\n').count(), 6);
        assert_eq!(result.text, text);
    }

    #[test]
    fn whitespace_edges_are_split_off() {
        assert_eq!(split_whitespace_edges("\n Hello. \n"), ("\n ", "Hello.", " \n"));
        assert_eq!(split_whitespace_edges("  "), ("  ", "", ""));
        assert_eq!(split_whitespace_edges("plain"), ("", "plain", ""));
    }

    #[test]
    fn chunks_respect_limit_and_sentence_boundaries() {
        let text = "Short one. Another sentence here! Is this third? Final line\nwith newline.";
        let chunks = split_into_chunks(text, 30);

        assert_eq!(chunks.concat(), text);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 30);
        }
        assert_eq!(chunks[0], "Short one.");
    }

    #[test]
    fn oversized_sentence_is_hard_split_on_char_boundaries() {
        let text = "é".repeat(25);
        let chunks = split_into_chunks(&text, 10);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks.concat(), text);
        assert_eq!(chunks[2].chars().count(), 5);
    }

    #[test]
    fn short_text_is_a_single_chunk() {
        assert_eq!(split_into_chunks("Hi.", MAX_CHUNK_CHARS), vec!["Hi.".to_string()]);
    }
}
