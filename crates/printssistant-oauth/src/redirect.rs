//! Callback URL selection.
//!
//! The redirect URI sent at authorize time must be repeated verbatim in the
//! token exchange, so both steps resolve it through the same resolver.

use std::fmt;
use std::str::FromStr;

/// Host substrings that mark a production request in [`DeploymentTier::Auto`].
pub const DEFAULT_PRODUCTION_MARKERS: &[&str] = &["vercel.app", "printssistant"];

/// Deployment tier chosen at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeploymentTier {
    /// Always use the local/dev callback.
    #[default]
    Local,
    /// Always use the production callback.
    Production,
    /// Infer from the request host (legacy behaviour).
    Auto,
}

impl FromStr for DeploymentTier {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" | "dev" | "development" => Ok(Self::Local),
            "production" | "prod" => Ok(Self::Production),
            "auto" => Ok(Self::Auto),
            other => Err(format!(
                "unknown deployment tier '{}' (expected local, production or auto)",
                other
            )),
        }
    }
}

impl fmt::Display for DeploymentTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Production => write!(f, "production"),
            Self::Auto => write!(f, "auto"),
        }
    }
}

/// Picks the callback URL for a request.
#[derive(Debug, Clone)]
pub struct RedirectResolver {
    tier: DeploymentTier,
    local_uri: String,
    production_uri: String,
    production_markers: Vec<String>,
}

impl RedirectResolver {
    pub fn new(
        tier: DeploymentTier,
        local_uri: impl Into<String>,
        production_uri: impl Into<String>,
    ) -> Self {
        Self {
            tier,
            local_uri: local_uri.into(),
            production_uri: production_uri.into(),
            production_markers: DEFAULT_PRODUCTION_MARKERS
                .iter()
                .map(|m| m.to_string())
                .collect(),
        }
    }

    /// Replace the host markers used by [`DeploymentTier::Auto`].
    pub fn with_production_markers(mut self, markers: Vec<String>) -> Self {
        self.production_markers = markers
            .into_iter()
            .map(|m| m.trim().to_ascii_lowercase())
            .filter(|m| !m.is_empty())
            .collect();
        self
    }

    pub fn tier(&self) -> DeploymentTier {
        self.tier
    }

    /// Resolve the callback URL for a request arriving on `request_host`.
    pub fn resolve(&self, request_host: &str) -> &str {
        match self.tier {
            DeploymentTier::Local => &self.local_uri,
            DeploymentTier::Production => &self.production_uri,
            DeploymentTier::Auto => {
                let host = request_host.to_ascii_lowercase();
                if self
                    .production_markers
                    .iter()
                    .any(|marker| host.contains(marker.as_str()))
                {
                    &self.production_uri
                } else {
                    &self.local_uri
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOCAL: &str = "http://127.0.0.1:4000/callback";
    const PROD: &str = "https://printssistant-canva-backend.vercel.app/callback";

    #[test]
    fn test_explicit_tiers_ignore_host() {
        let local = RedirectResolver::new(DeploymentTier::Local, LOCAL, PROD);
        assert_eq!(local.resolve("printssistant-canva-backend.vercel.app"), LOCAL);

        let prod = RedirectResolver::new(DeploymentTier::Production, LOCAL, PROD);
        assert_eq!(prod.resolve("127.0.0.1:4000"), PROD);
        assert_eq!(prod.resolve(""), PROD);
    }

    #[test]
    fn test_auto_tier_matches_markers() {
        let resolver = RedirectResolver::new(DeploymentTier::Auto, LOCAL, PROD);
        assert_eq!(resolver.resolve("my-app.VERCEL.app"), PROD);
        assert_eq!(resolver.resolve("api.printssistant.io"), PROD);
        assert_eq!(resolver.resolve("127.0.0.1:4000"), LOCAL);
        assert_eq!(resolver.resolve(""), LOCAL);
    }

    #[test]
    fn test_custom_markers() {
        let resolver = RedirectResolver::new(DeploymentTier::Auto, LOCAL, PROD)
            .with_production_markers(vec![" Example.COM ".to_string(), String::new()]);
        assert_eq!(resolver.resolve("www.example.com"), PROD);
        assert_eq!(resolver.resolve("foo.vercel.app"), LOCAL);
    }

    #[test]
    fn test_tier_parsing() {
        assert_eq!("prod".parse::<DeploymentTier>().unwrap(), DeploymentTier::Production);
        assert_eq!(" Local ".parse::<DeploymentTier>().unwrap(), DeploymentTier::Local);
        assert_eq!("auto".parse::<DeploymentTier>().unwrap(), DeploymentTier::Auto);
        assert!("staging".parse::<DeploymentTier>().is_err());
        assert_eq!(DeploymentTier::Production.to_string(), "production");
    }
}
