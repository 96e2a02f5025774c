use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::Error;
use crate::cache::TtlCache;
use crate::http::HttpClient;

/// How long a successful lookup is served from memory.
pub const IDENTITY_TTL: Duration = Duration::from_secs(15 * 60);

const PROFILE_API_BASE: &str = "https://api.mojang.com/users/profiles/minecraft";
const SESSION_API_BASE: &str = "https://sessionserver.mojang.com/session/minecraft/profile";

#[derive(Debug, Deserialize)]
struct ProfileResponse {
    id: String,
    name: String,
}

/// Resolves player names to identifiers and back through the remote
/// identity service. Only successful lookups are cached; each direction
/// has its own cache.
pub struct IdentityResolver {
    http: Arc<dyn HttpClient>,
    name_to_id: TtlCache<String, String>,
    id_to_name: TtlCache<String, String>,
    profile_base: String,
    session_base: String,
}

impl IdentityResolver {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self::with_endpoints(http, PROFILE_API_BASE, SESSION_API_BASE)
    }

    pub fn with_endpoints(http: Arc<dyn HttpClient>, profile_base: &str, session_base: &str) -> Self {
        Self {
            http,
            name_to_id: TtlCache::new(IDENTITY_TTL),
            id_to_name: TtlCache::new(IDENTITY_TTL),
            profile_base: profile_base.trim_end_matches('/').to_string(),
            session_base: session_base.trim_end_matches('/').to_string(),
        }
    }

    /// Name to dashed identifier. `None` when the service does not know the
    /// name or cannot be reached.
    pub async fn resolve_id(&self, name: &str) -> Option<String> {
        let key = name.to_string();
        if let Some(hit) = self.name_to_id.get(&key) {
            return Some(hit);
        }

        let url = format!("{}/{}", self.profile_base, urlencoding::encode(name));
        let profile = self.fetch_profile(url).await?;
        let Some(id) = canonicalize_id(&profile.id) else {
            warn!("Identity service returned malformed id '{}' for '{}'", profile.id, name);
            return None;
        };

        self.name_to_id.insert(key, id.clone());
        Some(id)
    }

    /// Identifier (dashed or not) to current player name. Both spellings of
    /// an identifier share one cache entry.
    pub async fn resolve_name(&self, id: &str) -> Option<String> {
        let key = canonicalize_id(id).unwrap_or_else(|| id.to_string());
        if let Some(hit) = self.id_to_name.get(&key) {
            return Some(hit);
        }

        let url = format!("{}/{}", self.session_base, key.replace('-', ""));
        let profile = self.fetch_profile(url).await?;

        self.id_to_name.insert(key, profile.name.clone());
        Some(profile.name)
    }

    async fn fetch_profile(&self, url: String) -> Option<ProfileResponse> {
        let response = match self.http.get(url.clone(), HashMap::new()).await {
            Ok(resp) => resp,
            Err(e) => {
                warn!("Identity lookup to {} failed: {:?}", url, e);
                return None;
            }
        };
        if !response.is_success() {
            debug!("Identity lookup to {} returned status {}", url, response.status);
            return None;
        }
        match serde_json::from_str::<ProfileResponse>(&response.body) {
            Ok(profile) => Some(profile),
            Err(e) => {
                warn!("Identity lookup to {} returned an unreadable body: {}", url, Error::from(e));
                None
            }
        }
    }
}

/// Formats a 32 hex digit identifier as lowercase 8-4-4-4-12. Dashed input
/// is accepted and re-formatted.
pub fn canonicalize_id(raw: &str) -> Option<String> {
    let hex: String = raw
        .chars()
        .filter(|c| *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect();
    if hex.len() != 32 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Some(format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    ))
}
