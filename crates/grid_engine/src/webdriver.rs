use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use serde_json::{json, Value};

use crate::page::{ElementTarget, Page, PageError, RouterAttachment, RouterProbe};

#[derive(Debug, Clone)]
pub struct WebDriverSettings {
    /// Base URL of the WebDriver server, e.g. `http://127.0.0.1:4444`.
    pub endpoint: String,
    /// Existing session whose current tab is driven.
    pub session_id: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl WebDriverSettings {
    pub fn new(endpoint: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            session_id: session_id.into(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// [`Page`] backed by a W3C WebDriver session.
#[derive(Debug, Clone)]
pub struct WebDriverPage {
    client: reqwest::Client,
    session_url: String,
}

const SNAPSHOT_SCRIPT: &str = "return document.documentElement.outerHTML;";

const CLICK_SCRIPT: &str = "\
const el = document.querySelectorAll(arguments[0])[arguments[1]];
if (!el) return false;
el.click();
return true;";

const ASSIGN_SCRIPT: &str = "window.location.assign(arguments[0]); return null;";

const CLIPBOARD_SCRIPT: &str = "\
const done = arguments[arguments.length - 1];
navigator.clipboard.writeText(arguments[0]).then(() => done(null), (e) => done(String(e)));";

fn probe_script(expression: &str) -> String {
    format!(
        "const r = ({expression});
if (!r) return null;
const cr = r.currentRoute && (r.currentRoute.value || r.currentRoute);
return {{ hasPush: typeof r.push === 'function', current: cr ? (cr.fullPath || cr.path || null) : null }};"
    )
}

/// `arguments[1]` is an array of `[key, value]` pairs; the query object is
/// built in that order so the router serializes keys as given.
fn push_script(expression: &str) -> String {
    format!(
        "const r = ({expression});
r.push({{ path: arguments[0], query: Object.fromEntries(arguments[1]) }});
return null;"
    )
}

impl WebDriverPage {
    pub fn new(settings: WebDriverSettings) -> Result<Self, PageError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| PageError::Transport(err.to_string()))?;
        let session_url = format!(
            "{}/session/{}",
            settings.endpoint.trim_end_matches('/'),
            settings.session_id
        );
        Ok(Self {
            client,
            session_url,
        })
    }

    async fn get(&self, command: &str) -> Result<Value, PageError> {
        let response = self
            .client
            .get(format!("{}/{command}", self.session_url))
            .send()
            .await
            .map_err(|err| PageError::Transport(err.to_string()))?;
        read_value(response).await
    }

    async fn post(&self, command: &str, body: Value) -> Result<Value, PageError> {
        let response = self
            .client
            .post(format!("{}/{command}", self.session_url))
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_string())
            .send()
            .await
            .map_err(|err| PageError::Transport(err.to_string()))?;
        read_value(response).await
    }

    async fn execute(&self, script: &str, args: Vec<Value>) -> Result<Value, PageError> {
        self.post("execute/sync", json!({ "script": script, "args": args }))
            .await
    }

    async fn get_string(&self, command: &str) -> Result<String, PageError> {
        match self.get(command).await? {
            Value::String(text) => Ok(text),
            other => Err(PageError::Protocol(format!("{command}: expected string, got {other}"))),
        }
    }
}

/// Unwraps the `value` member of a WebDriver response, turning error payloads
/// into [`PageError::WebDriver`].
async fn read_value(response: reqwest::Response) -> Result<Value, PageError> {
    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .map_err(|err| PageError::Transport(err.to_string()))?;
    let mut body: Value = serde_json::from_slice(&bytes)
        .map_err(|err| PageError::Protocol(format!("status {status}: {err}")))?;
    let value = body.get_mut("value").map(Value::take).unwrap_or(Value::Null);
    if status.is_success() {
        return Ok(value);
    }
    let field = |name: &str| {
        value
            .get(name)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    Err(PageError::WebDriver {
        error: field("error"),
        message: field("message"),
    })
}

#[async_trait::async_trait]
impl Page for WebDriverPage {
    async fn current_url(&self) -> Result<String, PageError> {
        self.get_string("url").await
    }

    async fn title(&self) -> Result<String, PageError> {
        self.get_string("title").await
    }

    async fn snapshot(&self) -> Result<String, PageError> {
        match self.execute(SNAPSHOT_SCRIPT, Vec::new()).await? {
            Value::String(html) => Ok(html),
            other => Err(PageError::Protocol(format!("snapshot: expected string, got {other}"))),
        }
    }

    async fn assign_location(&self, url: &str) -> Result<(), PageError> {
        self.execute(ASSIGN_SCRIPT, vec![json!(url)]).await?;
        Ok(())
    }

    async fn click(&self, target: &ElementTarget) -> Result<(), PageError> {
        let clicked = self
            .execute(CLICK_SCRIPT, vec![json!(target.selector), json!(target.index)])
            .await?;
        if clicked.as_bool() == Some(true) {
            Ok(())
        } else {
            Err(PageError::ElementMissing {
                selector: target.selector.clone(),
                index: target.index,
            })
        }
    }

    async fn probe_router(
        &self,
        attachment: &RouterAttachment,
    ) -> Result<Option<RouterProbe>, PageError> {
        let value = self
            .execute(&probe_script(&attachment.expression), Vec::new())
            .await?;
        if value.is_null() {
            return Ok(None);
        }
        serde_json::from_value(value)
            .map(Some)
            .map_err(|err| PageError::Protocol(format!("router probe: {err}")))
    }

    async fn router_push(
        &self,
        attachment: &RouterAttachment,
        path: &str,
        query: &[(String, String)],
    ) -> Result<(), PageError> {
        let pairs: Vec<Value> = query.iter().map(|(key, value)| json!([key, value])).collect();
        self.execute(
            &push_script(&attachment.expression),
            vec![json!(path), Value::Array(pairs)],
        )
        .await
        .map_err(|err| match err {
            PageError::WebDriver { message, .. } => PageError::Script(message),
            other => other,
        })?;
        Ok(())
    }

    async fn write_clipboard(&self, text: &str) -> Result<(), PageError> {
        let outcome = self
            .post(
                "execute/async",
                json!({ "script": CLIPBOARD_SCRIPT, "args": [text] }),
            )
            .await
            .map_err(|err| PageError::Clipboard(err.to_string()))?;
        match outcome {
            Value::Null => Ok(()),
            other => Err(PageError::Clipboard(
                other.as_str().map(str::to_string).unwrap_or_else(|| other.to_string()),
            )),
        }
    }
}
