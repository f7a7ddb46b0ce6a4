use crate::{
    codegen,
    error::LinkError,
    models::Link,
    registry::LinkRegistry,
};
use std::sync::Arc;
use url::Url;

/// How many generated codes to try before giving up.
///
/// With 62^6 (about 5.6e10) codes, five straight collisions means the store is
/// nearly full or something is badly wrong; either way it is reported as an
/// internal failure instead of looping.
pub const MAX_GENERATION_ATTEMPTS: usize = 5;

/// Where a new link's code comes from. Each source has its own conflict
/// policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeChoice {
    /// Chosen by the caller. A conflict is reported, never papered over.
    Custom(String),
    /// Produced by the generator. Conflicts are retried.
    Generated,
}

impl CodeChoice {
    /// Empty or whitespace-only codes count as "not supplied". Anything else
    /// is kept verbatim, so surrounding whitespace fails validation.
    pub fn from_optional(code: Option<&str>) -> Self {
        match code.filter(|s| !s.trim().is_empty()) {
            Some(code) => CodeChoice::Custom(code.to_owned()),
            None => CodeChoice::Generated,
        }
    }
}

type Generator = Arc<dyn Fn() -> String + Send + Sync>;

/// Create / list / inspect / delete operations for the presentation layer.
#[derive(Clone)]
pub struct LinkDirectory {
    registry: Arc<dyn LinkRegistry>,
    generator: Generator,
}

impl LinkDirectory {
    pub fn new(registry: Arc<dyn LinkRegistry>) -> Self {
        Self::with_generator(registry, codegen::generate)
    }

    /// Use a custom code source instead of [`codegen::generate`].
    pub fn with_generator(
        registry: Arc<dyn LinkRegistry>,
        generator: impl Fn() -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            registry,
            generator: Arc::new(generator),
        }
    }

    /// Validate input and register a new link.
    pub async fn create_link(&self, target_url: &str, code: CodeChoice) -> Result<Link, LinkError> {
        let target_url = validate_target_url(target_url)?;

        let link = match code {
            CodeChoice::Custom(code) => {
                if !codegen::is_valid_code(&code) {
                    return Err(LinkError::InvalidInput(
                        "Code must be 6-8 alphanumeric characters".into(),
                    ));
                }
                self.registry.create(&code, target_url).await?
            }
            CodeChoice::Generated => self.create_with_generated_code(target_url).await?,
        };

        tracing::info!(code = %link.code, target = %link.target_url, "Link created");
        Ok(link)
    }

    async fn create_with_generated_code(&self, target_url: &str) -> Result<Link, LinkError> {
        for attempt in 1..=MAX_GENERATION_ATTEMPTS {
            let code = (self.generator)();
            match self.registry.create(&code, target_url).await {
                Err(LinkError::CodeConflict) => {
                    tracing::warn!(code = %code, attempt, "Generated short code collided, retrying");
                }
                result => return result,
            }
        }

        Err(LinkError::CodeSpaceExhausted {
            attempts: MAX_GENERATION_ATTEMPTS,
        })
    }

    pub async fn get_link(&self, code: &str) -> Result<Link, LinkError> {
        self.registry.get(code).await
    }

    /// All links, newest first.
    pub async fn list_links(&self) -> Result<Vec<Link>, LinkError> {
        self.registry.list_all().await
    }

    pub async fn delete_link(&self, code: &str) -> Result<(), LinkError> {
        self.registry.delete(code).await?;
        tracing::info!(code, "Link deleted");
        Ok(())
    }
}

/// Trim `raw` and check it parses as an absolute URL.
///
/// Control characters are refused outright: the parser drops embedded tabs
/// and newlines, but the stored string would not fit in a `Location` header.
fn validate_target_url(raw: &str) -> Result<&str, LinkError> {
    let trimmed = raw.trim();
    if trimmed.chars().any(char::is_control) || Url::parse(trimmed).is_err() {
        return Err(LinkError::InvalidInput("Invalid URL format".into()));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::MemoryRegistry;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn directory() -> (Arc<MemoryRegistry>, LinkDirectory) {
        let registry = Arc::new(MemoryRegistry::new());
        (registry.clone(), LinkDirectory::new(registry))
    }

    #[test]
    fn blank_code_means_generated() {
        assert_eq!(CodeChoice::from_optional(None), CodeChoice::Generated);
        assert_eq!(CodeChoice::from_optional(Some("   ")), CodeChoice::Generated);
        assert_eq!(
            CodeChoice::from_optional(Some("abc123")),
            CodeChoice::Custom("abc123".into())
        );
        assert_eq!(
            CodeChoice::from_optional(Some(" abc123 ")),
            CodeChoice::Custom(" abc123 ".into())
        );
    }

    #[tokio::test]
    async fn padded_custom_code_is_rejected() {
        let (registry, directory) = directory();
        let err = directory
            .create_link("https://example.com", CodeChoice::from_optional(Some(" abc123 ")))
            .await
            .unwrap_err();
        assert!(matches!(err, LinkError::InvalidInput(_)));
        assert!(registry.is_empty());
    }

    #[test]
    fn url_validation() {
        assert_eq!(validate_target_url(" https://example.com/page ").unwrap(), "https://example.com/page");
        assert!(validate_target_url("http://localhost:8080/x?y=1#z").is_ok());
        assert!(validate_target_url("not-a-url").is_err());
        assert!(validate_target_url("/relative/path").is_err());
        assert!(validate_target_url("").is_err());
        assert!(validate_target_url("https://").is_err());
    }

    #[test]
    fn url_with_embedded_control_chars_is_rejected() {
        assert!(validate_target_url("https://example.com/a\nb").is_err());
        assert!(validate_target_url("https://example.com/a\tb").is_err());
        assert!(validate_target_url("https://example.com/a\rb").is_err());
        // Surrounding whitespace, newlines included, is still trimmed away.
        assert!(validate_target_url("https://example.com/ab\n").is_ok());
    }

    #[tokio::test]
    async fn generated_codes_are_valid_and_unique() {
        let (_, directory) = directory();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..50 {
            let link = directory
                .create_link("https://example.com", CodeChoice::Generated)
                .await
                .unwrap();
            assert_eq!(link.code.len(), codegen::GENERATED_CODE_LEN);
            assert!(codegen::is_valid_code(&link.code));
            assert!(seen.insert(link.code));
        }
    }

    #[tokio::test]
    async fn custom_code_round_trips() {
        let (_, directory) = directory();
        directory
            .create_link("https://example.com/page", CodeChoice::Custom("abc123".into()))
            .await
            .unwrap();

        let link = directory.get_link("abc123").await.unwrap();
        assert_eq!(link.code, "abc123");
        assert_eq!(link.target_url, "https://example.com/page");
        assert_eq!(link.total_clicks, 0);
        assert!(link.last_clicked.is_none());
    }

    #[tokio::test]
    async fn custom_code_conflict_is_surfaced() {
        let (_, directory) = directory();
        directory
            .create_link("https://one.example", CodeChoice::Custom("abc123".into()))
            .await
            .unwrap();

        let err = directory
            .create_link("https://two.example", CodeChoice::Custom("abc123".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, LinkError::CodeConflict));
        assert_eq!(
            directory.get_link("abc123").await.unwrap().target_url,
            "https://one.example"
        );
    }

    #[tokio::test]
    async fn invalid_input_persists_nothing() {
        let (registry, directory) = directory();

        let err = directory
            .create_link("not-a-url", CodeChoice::Generated)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid URL format");

        let err = directory
            .create_link("https://example.com", CodeChoice::Custom("bad!".into()))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Code must be 6-8 alphanumeric characters");

        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn generated_collision_is_retried() {
        let registry = Arc::new(MemoryRegistry::new());
        registry.create("taken1", "https://example.com").await.unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let directory = LinkDirectory::with_generator(registry.clone(), move || {
            match counter.fetch_add(1, Ordering::SeqCst) {
                0 | 1 => "taken1".to_owned(),
                _ => "fresh1".to_owned(),
            }
        });

        let link = directory
            .create_link("https://other.example", CodeChoice::Generated)
            .await
            .unwrap();
        assert_eq!(link.code, "fresh1");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn generated_collisions_are_bounded() {
        let registry = Arc::new(MemoryRegistry::new());
        registry.create("taken1", "https://example.com").await.unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let directory = LinkDirectory::with_generator(registry.clone(), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            "taken1".to_owned()
        });

        let err = directory
            .create_link("https://other.example", CodeChoice::Generated)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LinkError::CodeSpaceExhausted { attempts: MAX_GENERATION_ATTEMPTS }
        ));
        assert_eq!(calls.load(Ordering::SeqCst), MAX_GENERATION_ATTEMPTS);
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn delete_then_lookup() {
        let (_, directory) = directory();
        directory
            .create_link("https://example.com", CodeChoice::Custom("gone01".into()))
            .await
            .unwrap();

        directory.delete_link("gone01").await.unwrap();
        assert!(matches!(directory.get_link("gone01").await, Err(LinkError::NotFound)));
        assert!(matches!(directory.delete_link("gone01").await, Err(LinkError::NotFound)));
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let (_, directory) = directory();
        for code in ["older1", "newer1"] {
            directory
                .create_link("https://example.com", CodeChoice::Custom(code.into()))
                .await
                .unwrap();
        }
        let codes: Vec<String> = directory
            .list_links()
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.code)
            .collect();
        assert_eq!(codes, ["newer1", "older1"]);
    }
}
