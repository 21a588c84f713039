// src/config/site.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path, path::PathBuf};

pub const ENV_SITE_CONFIG_PATH: &str = "SITE_CONFIG_PATH";
pub const DEFAULT_SITE_CONFIG_PATH: &str = "config/site.toml";

fn default_name() -> String {
    "Jai Bhatia".to_string()
}
fn default_headline() -> String {
    "Sales Engineer & AI Solutions Architect | Building the future, one line of code at a time"
        .to_string()
}
fn default_location() -> String {
    "Los Angeles, CA".to_string()
}
fn default_linkedin_url() -> String {
    "https://www.linkedin.com/in/jaibhatia19/".to_string()
}
fn default_posts_path() -> PathBuf {
    PathBuf::from("data/linkedin-posts.json")
}
fn default_profile_path() -> PathBuf {
    PathBuf::from("data/profile.json")
}
fn default_writing_dir() -> PathBuf {
    PathBuf::from("content/posts")
}
fn default_live_timeout_secs() -> u64 {
    15
}
fn default_cache_ttl_secs() -> u64 {
    300
}
fn default_truncate_chars() -> usize {
    250
}
fn default_max_items() -> usize {
    3
}
fn default_true() -> bool {
    true
}
fn default_cooldown_secs() -> u64 {
    60
}
fn default_to_email() -> String {
    "jaibhatia1906@gmail.com".to_string()
}
fn default_from_email() -> String {
    "Jai Bhatia <noreply@jaibhatia.dev>".to_string()
}
fn default_resend_api_url() -> String {
    "https://api.resend.com/emails".to_string()
}

/// Identity used whenever a source cannot supply one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfileIdentity {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_headline")]
    pub headline: String,
    #[serde(default = "default_location")]
    pub location: String,
    #[serde(default = "default_linkedin_url")]
    pub linkedin_url: String,
}

impl Default for ProfileIdentity {
    fn default() -> Self {
        Self {
            name: default_name(),
            headline: default_headline(),
            location: default_location(),
            linkedin_url: default_linkedin_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentSettings {
    #[serde(default = "default_posts_path")]
    pub posts_path: PathBuf,
    #[serde(default = "default_profile_path")]
    pub profile_path: PathBuf,
    #[serde(default = "default_writing_dir")]
    pub writing_dir: PathBuf,
    /// Set to false to skip the live fetch entirely (e.g. offline dev).
    #[serde(default = "default_true")]
    pub live_enabled: bool,
    #[serde(default = "default_live_timeout_secs")]
    pub live_timeout_secs: u64,
    /// 0 disables reuse of resolved payloads.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    #[serde(default = "default_truncate_chars")]
    pub truncate_chars: usize,
    /// 1..=3; anything else is reset to 3.
    #[serde(default = "default_max_items")]
    pub max_items: usize,
}

impl Default for ContentSettings {
    fn default() -> Self {
        Self {
            posts_path: default_posts_path(),
            profile_path: default_profile_path(),
            writing_dir: default_writing_dir(),
            live_enabled: true,
            live_timeout_secs: default_live_timeout_secs(),
            cache_ttl_secs: default_cache_ttl_secs(),
            truncate_chars: default_truncate_chars(),
            max_items: default_max_items(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContactSettings {
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
    #[serde(default = "default_to_email")]
    pub to_email: String,
    #[serde(default = "default_from_email")]
    pub from_email: String,
    #[serde(default = "default_resend_api_url")]
    pub resend_api_url: String,
}

impl Default for ContactSettings {
    fn default() -> Self {
        Self {
            cooldown_secs: default_cooldown_secs(),
            to_email: default_to_email(),
            from_email: default_from_email(),
            resend_api_url: default_resend_api_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SiteConfig {
    #[serde(default)]
    pub profile: ProfileIdentity,
    #[serde(default)]
    pub content: ContentSettings,
    #[serde(default)]
    pub contact: ContactSettings,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            profile: ProfileIdentity::default(),
            content: ContentSettings::default(),
            contact: ContactSettings::default(),
        }
    }
}

impl SiteConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading site config from {}", path.display()))?;
        let mut cfg: SiteConfig = toml::from_str(&data)
            .with_context(|| format!("parsing site config {}", path.display()))?;
        cfg.sanitize();
        Ok(cfg)
    }

    /// Load config using env var + fallbacks:
    /// 1) $SITE_CONFIG_PATH (must exist)
    /// 2) config/site.toml
    /// 3) built-in defaults
    ///
    /// Environment overrides are applied on top in every case.
    pub fn load_default() -> Result<Self> {
        let mut cfg = if let Ok(p) = env::var(ENV_SITE_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("SITE_CONFIG_PATH points to non-existent path"));
            }
            Self::load_from_file(&pb)?
        } else {
            let default_p = PathBuf::from(DEFAULT_SITE_CONFIG_PATH);
            if default_p.exists() {
                Self::load_from_file(&default_p)?
            } else {
                Self::default()
            }
        };
        cfg.apply_env_overrides()?;
        Ok(cfg)
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(url) = env::var("LINKEDIN_PROFILE_URL") {
            self.profile.linkedin_url = url;
        }
        if let Some(v) = parse_env::<u64>("LIVE_FETCH_TIMEOUT_SECS")? {
            self.content.live_timeout_secs = v;
        }
        if let Some(v) = parse_env::<u64>("CONTENT_CACHE_TTL_SECS")? {
            self.content.cache_ttl_secs = v;
        }
        if let Some(v) = parse_env::<bool>("LIVE_FETCH_ENABLED")? {
            self.content.live_enabled = v;
        }
        if let Some(v) = parse_env::<u64>("CONTACT_COOLDOWN_SECS")? {
            self.contact.cooldown_secs = v;
        }
        if let Ok(v) = env::var("CONTACT_TO_EMAIL") {
            self.contact.to_email = v;
        }
        if let Ok(v) = env::var("CONTACT_FROM_EMAIL") {
            self.contact.from_email = v;
        }
        self.sanitize();
        Ok(())
    }

    fn sanitize(&mut self) {
        if self.content.live_timeout_secs == 0 {
            self.content.live_timeout_secs = default_live_timeout_secs();
        }
        if self.content.truncate_chars == 0 {
            self.content.truncate_chars = default_truncate_chars();
        }
        if self.content.max_items == 0 || self.content.max_items > default_max_items() {
            self.content.max_items = default_max_items();
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| anyhow!("{key} has an invalid value: {raw:?}")),
        Err(_) => Ok(None),
    }
}
