// src/writing.rs
//! Writing section: Markdown posts with a small `---` front matter block.
//!
//! ```text
//! ---
//! title: Why most test automation stalls
//! description: Notes from a year of QA consulting
//! date: 2025-09-10
//! tags: [testing, automation]
//! ---
//! Body...
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static RE_FRONT_MATTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\A---\r?\n(.*?)\r?\n---[ \t]*(?:\r?\n|\z)").expect("front matter regex"));
static RE_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^([A-Za-z_]+):[ \t]*(.*?)[ \t]*$").expect("field regex"));

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub date: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WritingPost {
    #[serde(flatten)]
    pub summary: PostSummary,
    pub content: String,
}

/// Parse one file. `None` when the file has no front matter.
pub fn parse_post(slug: &str, raw: &str) -> Option<WritingPost> {
    let caps = RE_FRONT_MATTER.captures(raw)?;
    let block = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
    let body_start = caps.get(0).map(|m| m.end()).unwrap_or(0);

    let mut title = None;
    let mut description = String::new();
    let mut date = String::new();
    let mut tags = Vec::new();

    for c in RE_FIELD.captures_iter(block) {
        let value = unquote(&c[2]);
        match &c[1] {
            "title" => title = Some(value),
            "description" => description = value,
            "date" => date = value,
            "tags" => tags = parse_tags(&c[2]),
            _ => {}
        }
    }

    Some(WritingPost {
        summary: PostSummary {
            slug: slug.to_string(),
            title: title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "Untitled".to_string()),
            description,
            date,
            tags,
        },
        content: raw[body_start..].to_string(),
    })
}

fn unquote(s: &str) -> String {
    let t = s.trim();
    let stripped = t
        .strip_prefix('"')
        .and_then(|x| x.strip_suffix('"'))
        .or_else(|| t.strip_prefix('\'').and_then(|x| x.strip_suffix('\'')));
    stripped.unwrap_or(t).to_string()
}

fn parse_tags(s: &str) -> Vec<String> {
    let inner = s.trim().trim_start_matches('[').trim_end_matches(']');
    inner
        .split(',')
        .map(unquote)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Undated or unparseable dates sort after dated posts.
fn date_key(date: &str) -> Option<NaiveDate> {
    let head = date.get(..10).unwrap_or(date);
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

/// All posts under `dir`, newest first. A missing directory is an empty list.
pub async fn load_posts(dir: &Path) -> Result<Vec<WritingPost>> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(e) => e,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e).with_context(|| format!("reading {}", dir.display())),
    };

    let mut posts = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let ext = path.extension().and_then(|s| s.to_str()).unwrap_or_default();
        if !matches!(ext, "md" | "mdx") {
            continue;
        }
        let Some(slug) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let raw = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("reading post {}", path.display()))?;
        match parse_post(slug, &raw) {
            Some(p) => posts.push(p),
            None => tracing::debug!(path = %path.display(), "post without front matter skipped"),
        }
    }

    posts.sort_by(|a, b| {
        let (ka, kb) = (date_key(&a.summary.date), date_key(&b.summary.date));
        kb.cmp(&ka).then_with(|| a.summary.slug.cmp(&b.summary.slug))
    });
    Ok(posts)
}

pub async fn find_post(dir: &Path, slug: &str) -> Result<Option<WritingPost>> {
    Ok(load_posts(dir)
        .await?
        .into_iter()
        .find(|p| p.summary.slug == slug))
}
