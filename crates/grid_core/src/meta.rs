use serde::{Deserialize, Serialize};
use url::Url;

/// The site refuses to route without a non-empty `ref` parameter.
pub const DEFAULT_REFERRAL_CODE: &str = "vx95f7";

/// Identifiers shared by every job of a run, read from the address at run start.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NavigationContext {
    pub entity_id: String,
    pub ticker_internal_id: String,
    pub referral_code: String,
}

impl NavigationContext {
    /// Reads `cid`, `tid` and `ref` from `address`. Missing or empty `ref` falls
    /// back to `fallback_referral`; an unparsable address yields empty ids.
    pub fn from_address(address: &str, fallback_referral: &str) -> Self {
        let mut ctx = Self {
            referral_code: fallback_referral.to_string(),
            ..Self::default()
        };
        let Ok(url) = Url::parse(address) else {
            return ctx;
        };
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "cid" => ctx.entity_id = value.into_owned(),
                "tid" => ctx.ticker_internal_id = value.into_owned(),
                "ref" if !value.is_empty() => ctx.referral_code = value.into_owned(),
                _ => {}
            }
        }
        ctx
    }
}

pub fn read_navigation_context(address: &str) -> NavigationContext {
    NavigationContext::from_address(address, DEFAULT_REFERRAL_CODE)
}

/// Identity of the entity shown on the page, attached to the final report.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EntityMeta {
    pub ticker: String,
    pub name: String,
    pub price: String,
    #[serde(rename = "title")]
    pub raw_title: String,
}

/// Best-effort parse of a `<price> <entity name> (<ticker>)` page title.
///
/// Every part is optional; anything that cannot be recognised comes back empty.
pub fn read_entity_meta(title: &str) -> EntityMeta {
    let (head, ticker) = split_ticker(title.trim());
    let (price, name) = split_price(head);
    EntityMeta {
        ticker: ticker.to_string(),
        name: name.to_string(),
        price: price.to_string(),
        raw_title: title.to_string(),
    }
}

fn split_ticker(title: &str) -> (&str, &str) {
    if let Some(close) = title.rfind(')') {
        if let Some(open) = title[..close].rfind('(') {
            let ticker = title[open + 1..close].trim();
            if open > 0 && !ticker.is_empty() {
                return (&title[..open], ticker);
            }
        }
    }
    (title, "")
}

fn split_price(head: &str) -> (&str, &str) {
    let head = head.trim();
    match head.split_once(char::is_whitespace) {
        Some((first, rest)) if looks_like_price(first) => (first, rest.trim()),
        None if looks_like_price(head) => (head, ""),
        _ => ("", head),
    }
}

/// A price is an optional currency prefix (`US$`, `€`) followed by a number.
fn looks_like_price(token: &str) -> bool {
    let number = token.trim_start_matches(|c: char| !c.is_ascii_digit());
    let number = number.trim_end_matches(|c: char| !c.is_alphanumeric());
    !number.is_empty()
        && number.starts_with(|c: char| c.is_ascii_digit())
        && number.ends_with(|c: char| c.is_ascii_digit())
        && number
            .chars()
            .all(|c| c.is_ascii_digit() || c == '.' || c == ',')
}
