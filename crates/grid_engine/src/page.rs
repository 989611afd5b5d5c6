use serde::{Deserialize, Serialize};

/// Addresses one element of the live page: the `index`-th match of `selector`
/// in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementTarget {
    pub selector: String,
    pub index: usize,
}

impl ElementTarget {
    pub fn new(selector: impl Into<String>, index: usize) -> Self {
        Self {
            selector: selector.into(),
            index,
        }
    }
}

/// A place on the page where a client-side router may be attached, expressed
/// as a script expression evaluating to the router object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterAttachment {
    pub name: String,
    pub expression: String,
}

impl RouterAttachment {
    pub fn new(name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expression: expression.into(),
        }
    }

    /// Known attachment points for the host application's router.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new(
                "vue2-instance",
                "document.querySelector('#app')?.__vue__?.$router",
            ),
            Self::new(
                "vue3-global-properties",
                "document.querySelector('#app')?.__vue_app__?.config?.globalProperties?.$router",
            ),
        ]
    }
}

/// What a router probe found at an attachment point.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RouterProbe {
    #[serde(rename = "hasPush")]
    pub has_push: bool,
    #[serde(rename = "current")]
    pub current_path: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("webdriver error {error}: {message}")]
    WebDriver { error: String, message: String },
    #[error("unexpected response: {0}")]
    Protocol(String),
    #[error("script failed: {0}")]
    Script(String),
    #[error("element not found: {selector}[{index}]")]
    ElementMissing { selector: String, index: usize },
    #[error("clipboard write failed: {0}")]
    Clipboard(String),
}

/// The live browser tab the engine drives.
///
/// Implementations must not block the calling thread; every method is a
/// suspend point for the run.
#[async_trait::async_trait]
pub trait Page: Send + Sync {
    async fn current_url(&self) -> Result<String, PageError>;

    async fn title(&self) -> Result<String, PageError>;

    /// Serialized DOM of the whole document as currently rendered.
    async fn snapshot(&self) -> Result<String, PageError>;

    /// Hard navigation: full reload at `url`.
    async fn assign_location(&self, url: &str) -> Result<(), PageError>;

    async fn click(&self, target: &ElementTarget) -> Result<(), PageError>;

    /// `Ok(None)` when nothing is attached at `attachment`.
    async fn probe_router(
        &self,
        attachment: &RouterAttachment,
    ) -> Result<Option<RouterProbe>, PageError>;

    async fn router_push(
        &self,
        attachment: &RouterAttachment,
        path: &str,
        query: &[(String, String)],
    ) -> Result<(), PageError>;

    async fn write_clipboard(&self, text: &str) -> Result<(), PageError>;
}
