use crate::{error::LinkError, registry::LinkRegistry};
use std::sync::Arc;

/// Turns an inbound short code into a redirect target, counting the visit.
#[derive(Clone)]
pub struct RedirectResolver {
    registry: Arc<dyn LinkRegistry>,
}

impl RedirectResolver {
    pub fn new(registry: Arc<dyn LinkRegistry>) -> Self {
        Self { registry }
    }

    /// Record a visit to `code` and return its target URL.
    ///
    /// The lookup and the counter bump are the same registry call, so a link
    /// deleted concurrently is either counted and followed or reported as
    /// [`LinkError::NotFound`], never half of each.
    pub async fn resolve(&self, code: &str) -> Result<String, LinkError> {
        let link = self.registry.record_visit(code).await?;
        tracing::debug!(code, clicks = link.total_clicks, "Resolved short link");
        Ok(link.target_url)
    }
}
