// src/content/sources/linkedin.rs
use std::time::Duration;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{self, HeaderMap, HeaderValue};

use crate::content::normalize_text;
use crate::content::types::{
    ActivityItem, ActivityKind, ContentKind, ContentSource, SourceError, SourcePayload,
};

pub const SOURCE_NAME: &str = "live-api";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

static RE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<(/?)([a-z][a-z0-9]*)\b([^>]*)>").expect("tag regex"));
static RE_CLASS_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(?:^|\s)class\s*=\s*"([^"]*)""#).expect("class attribute regex")
});

const NAME: (&str, &[&str]) = ("h1", &["text-heading-xlarge"]);
const HEADLINE: (&str, &[&str]) = ("div", &["text-body-medium", "break-words"]);
const LOCATION: (&str, &[&str]) = ("span", &["text-body-small", "t-black--light"]);
const POST: (&str, &[&str]) = ("div", &["feed-shared-text"]);

/// Public profile page scrape. Best effort: LinkedIn often answers bots with
/// a login wall or status 999, which surfaces as a `SourceError`.
pub struct LinkedInSource {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

impl LinkedInSource {
    pub fn from_fixture(html: &str) -> Self {
        Self {
            mode: Mode::Fixture(html.to_string()),
        }
    }

    /// `timeout` bounds the whole request; there is no retry.
    pub fn from_url(url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-US,en;q=0.5"),
        );

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            mode: Mode::Http {
                url: url.into(),
                client,
            },
        })
    }

    pub fn parse_profile_html(
        html: &str,
        kind: ContentKind,
        today: NaiveDate,
    ) -> Result<SourcePayload, SourceError> {
        let name = first_text(html, NAME)
            .ok_or_else(|| SourceError::Malformed("no profile name in page".to_string()))?;
        let headline = first_text(html, HEADLINE);
        let location = first_text(html, LOCATION);

        let activity: Vec<ActivityItem> = elements(html, POST)
            .into_iter()
            .map(normalize_text)
            .filter(|t| !t.is_empty())
            .enumerate()
            .map(|(i, content)| ActivityItem {
                id: format!("live-{}", i + 1),
                content,
                kind: ActivityKind::Post,
                date: today,
                has_comment: true,
            })
            .collect();

        // An activity request is only worth answering live if posts were found
        if kind == ContentKind::Activity && activity.is_empty() {
            return Err(SourceError::Empty);
        }

        Ok(SourcePayload {
            name: Some(name),
            headline,
            location,
            activity,
            note: "Live profile data".to_string(),
        })
    }
}

#[async_trait::async_trait]
impl ContentSource for LinkedInSource {
    async fn fetch(
        &self,
        kind: ContentKind,
        today: NaiveDate,
    ) -> Result<SourcePayload, SourceError> {
        match &self.mode {
            Mode::Fixture(html) => Self::parse_profile_html(html, kind, today),
            Mode::Http { url, client } => {
                let resp = client.get(url).send().await?;
                let status = resp.status();
                if !status.is_success() {
                    return Err(SourceError::Status(status.as_u16()));
                }
                let body = resp.text().await?;
                Self::parse_profile_html(&body, kind, today)
            }
        }
    }

    fn name(&self) -> &'static str {
        SOURCE_NAME
    }
}

fn first_text(html: &str, (tag, classes): (&str, &[&str])) -> Option<String> {
    elements(html, (tag, classes))
        .into_iter()
        .map(normalize_text)
        .find(|t| !t.is_empty())
}

/// Inner HTML of every `tag` element whose class list holds all of `classes`
/// as whole tokens. Nested elements of the same tag are kept inside.
fn elements<'a>(html: &'a str, (tag, classes): (&str, &[&str])) -> Vec<&'a str> {
    let mut out = Vec::new();
    for open in RE_TAG.captures_iter(html) {
        if !open[1].is_empty() || !open[2].eq_ignore_ascii_case(tag) {
            continue;
        }
        let class_list = RE_CLASS_ATTR
            .captures(&open[3])
            .and_then(|c| c.get(1))
            .map_or("", |m| m.as_str());
        if !classes
            .iter()
            .all(|want| class_list.split_whitespace().any(|have| have == *want))
        {
            continue;
        }
        if let Some(whole) = open.get(0) {
            if let Some(inner) = inner_html(html, whole.end(), tag) {
                out.push(inner);
            }
        }
    }
    out
}

/// Content from `from` up to the `</tag>` that balances the opening tag.
fn inner_html<'a>(html: &'a str, from: usize, tag: &str) -> Option<&'a str> {
    let rest = html.get(from..)?;
    let mut depth = 1usize;
    for t in RE_TAG.captures_iter(rest) {
        if !t[2].eq_ignore_ascii_case(tag) {
            continue;
        }
        if t[1].is_empty() {
            depth += 1;
        } else {
            depth -= 1;
            if depth == 0 {
                return t.get(0).map(|m| &rest[..m.start()]);
            }
        }
    }
    None
}
