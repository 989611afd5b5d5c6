#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use grid_engine::{
    ElementTarget, EngineConfig, EngineEvent, Page, PageError, PollSettings, ProgressSink,
    RouterAttachment, RouterProbe,
};
use url::Url;

pub const START_URL: &str = "https://app.example.com/stock/about?cid=42&tid=7&ref=abc";
pub const TITLE: &str = "US$12.34 Example Co (EXCO)";
pub const EMPTY_PAGE: &str = "<html><body></body></html>";

/// Scripted single-page app. Views are keyed by the `tab` query parameter;
/// queued snapshots take precedence and the last queued one sticks.
#[derive(Debug, Default)]
pub struct FakeState {
    pub url: String,
    pub title: String,
    pub router_available: bool,
    pub push_fails: bool,
    pub unreachable_tabs: Vec<String>,
    pub views: HashMap<String, String>,
    pub scripted: VecDeque<String>,
    pub missing_click_targets: Vec<ElementTarget>,
    pub clipboard_fails: bool,
    pub clipboard_delay: Duration,
    /// Clicking a target replaces the current view's markup.
    pub click_views: Vec<(ElementTarget, String)>,
    pub title_panics: bool,

    pub pushes: Vec<(String, Vec<(String, String)>)>,
    pub assignments: Vec<String>,
    pub clicks: Vec<ElementTarget>,
    pub clipboard: Option<String>,
    pub snapshots_taken: usize,
}

pub struct FakePage {
    pub state: Mutex<FakeState>,
}

impl FakePage {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState {
                url: START_URL.to_string(),
                title: TITLE.to_string(),
                router_available: true,
                ..FakeState::default()
            }),
        }
    }

    pub fn with(configure: impl FnOnce(&mut FakeState)) -> Self {
        let page = Self::new();
        configure(&mut page.state.lock().unwrap());
        page
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }
}

fn tab_of(address: &str) -> Option<String> {
    Url::parse(address).ok().and_then(|url| {
        url.query_pairs()
            .find(|(k, _)| k == "tab")
            .map(|(_, v)| v.into_owned())
    })
}

fn move_to(state: &mut FakeState, target: Url) {
    let tab = tab_of(target.as_str()).unwrap_or_default();
    if !state.unreachable_tabs.contains(&tab) {
        state.url = target.to_string();
    }
}

/// Serializes a pushed query the way the host router does: keys sorted,
/// spaces as `%20`.
fn router_query(query: &[(String, String)]) -> String {
    let mut pairs = query.to_vec();
    pairs.sort();
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
        .replace('+', "%20")
}

#[async_trait::async_trait]
impl Page for FakePage {
    async fn current_url(&self) -> Result<String, PageError> {
        Ok(self.state().url.clone())
    }

    async fn title(&self) -> Result<String, PageError> {
        let panics = self.state().title_panics;
        if panics {
            panic!("renderer crashed");
        }
        Ok(self.state().title.clone())
    }

    async fn snapshot(&self) -> Result<String, PageError> {
        let mut state = self.state();
        state.snapshots_taken += 1;
        if state.scripted.len() > 1 {
            return Ok(state.scripted.pop_front().unwrap());
        }
        if let Some(last) = state.scripted.front() {
            return Ok(last.clone());
        }
        let html = tab_of(&state.url)
            .and_then(|tab| state.views.get(&tab).cloned())
            .unwrap_or_else(|| EMPTY_PAGE.to_string());
        Ok(html)
    }

    async fn assign_location(&self, url: &str) -> Result<(), PageError> {
        let mut state = self.state();
        state.assignments.push(url.to_string());
        let target = Url::parse(url).map_err(|e| PageError::Script(e.to_string()))?;
        move_to(&mut state, target);
        Ok(())
    }

    async fn click(&self, target: &ElementTarget) -> Result<(), PageError> {
        let mut state = self.state();
        if state.missing_click_targets.contains(target) {
            return Err(PageError::ElementMissing {
                selector: target.selector.clone(),
                index: target.index,
            });
        }
        state.clicks.push(target.clone());
        let swapped = state
            .click_views
            .iter()
            .find(|(clicked, _)| clicked == target)
            .map(|(_, html)| html.clone());
        if let (Some(html), Some(tab)) = (swapped, tab_of(&state.url)) {
            state.views.insert(tab, html);
        }
        Ok(())
    }

    async fn probe_router(
        &self,
        attachment: &RouterAttachment,
    ) -> Result<Option<RouterProbe>, PageError> {
        let state = self.state();
        if !state.router_available || attachment.name != "vue2-instance" {
            return Ok(None);
        }
        let current = Url::parse(&state.url).ok().map(|u| u.path().to_string());
        Ok(Some(RouterProbe {
            has_push: true,
            current_path: current,
        }))
    }

    async fn router_push(
        &self,
        _attachment: &RouterAttachment,
        path: &str,
        query: &[(String, String)],
    ) -> Result<(), PageError> {
        let mut state = self.state();
        state.pushes.push((path.to_string(), query.to_vec()));
        if state.push_fails {
            return Err(PageError::Script("NavigationDuplicated".to_string()));
        }
        let mut target = Url::parse(&state.url).map_err(|e| PageError::Script(e.to_string()))?;
        target.set_fragment(None);
        target.set_path(path);
        target.set_query(Some(&router_query(query)));
        move_to(&mut state, target);
        Ok(())
    }

    async fn write_clipboard(&self, text: &str) -> Result<(), PageError> {
        let delay = self.state().clipboard_delay;
        tokio::time::sleep(delay).await;
        let mut state = self.state();
        if state.clipboard_fails {
            return Err(PageError::Clipboard("document is not focused".to_string()));
        }
        state.clipboard = Some(text.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub events: Arc<Mutex<Vec<EngineEvent>>>,
}

impl RecordingSink {
    pub fn take(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl ProgressSink for RecordingSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

/// Millisecond-scale timings so runs finish quickly.
pub fn fast_config() -> EngineConfig {
    let ms = Duration::from_millis;
    EngineConfig {
        navigation_poll: PollSettings::new(ms(60), ms(5)),
        table_poll: PollSettings::new(ms(80), ms(5)),
        post_navigation_settle: ms(1),
        post_period_settle: ms(1),
        period_click_settle: ms(1),
        dropdown_settle: ms(1),
        dataset_settle: ms(1),
        clock: Arc::new(|| "2024-01-01T00:00:00.000Z".to_string()),
        ..EngineConfig::default()
    }
}

pub fn table(rows: &[&[&str]]) -> String {
    let body: String = rows
        .iter()
        .map(|row| {
            let cells: String = row.iter().map(|c| format!("<td>{c}</td>")).collect();
            format!("<tr>{cells}</tr>")
        })
        .collect();
    format!("<table>{body}</table>")
}

pub fn page_with(content: &str) -> String {
    format!("<html><body>{content}</body></html>")
}
