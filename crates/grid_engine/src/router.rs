use engine_logging::{engine_debug, engine_warn};

use crate::page::{Page, PageError, RouterAttachment};

/// Narrow view of a client-side router found on the page.
pub struct RouterHandle<'a> {
    page: &'a dyn Page,
    attachment: &'a RouterAttachment,
    current_path: Option<String>,
}

impl<'a> RouterHandle<'a> {
    pub fn name(&self) -> &str {
        &self.attachment.name
    }

    /// Route path reported by the router when it was detected.
    pub fn current_path(&self) -> Option<&str> {
        self.current_path.as_deref()
    }

    pub async fn push(&self, path: &str, query: &[(String, String)]) -> Result<(), PageError> {
        self.page.router_push(self.attachment, path, query).await
    }
}

/// Tries each attachment point in order and returns the first router that
/// exposes a push API. `None` means callers must fall back to hard navigation.
pub async fn detect_router<'a>(
    page: &'a dyn Page,
    attachments: &'a [RouterAttachment],
) -> Option<RouterHandle<'a>> {
    for attachment in attachments {
        match page.probe_router(attachment).await {
            Ok(Some(probe)) if probe.has_push => {
                engine_debug!(
                    "router found at {} current={:?}",
                    attachment.name,
                    probe.current_path
                );
                return Some(RouterHandle {
                    page,
                    attachment,
                    current_path: probe.current_path,
                });
            }
            Ok(Some(_)) => {
                engine_debug!("router at {} has no push api", attachment.name);
            }
            Ok(None) => {}
            Err(err) => {
                engine_warn!("router probe at {} failed: {}", attachment.name, err);
            }
        }
    }
    None
}
