// src/github/repository.rs
// =============================================================================
// Turns the URL a human pastes into the contents-API listing endpoint.
//
// Supported formats:
//   - https://github.com/owner/repo
//   - https://github.com/owner/repo.git
//   - https://github.com/owner/repo/
//   - github.com/owner/repo
//
// Only the last two non-empty path segments matter, so this is a pure
// string transformation with no network access.
// =============================================================================

use crate::error::FetchError;

/// Public GitHub REST API.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// A validated owner/name pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRef {
    pub owner: String,
    pub name: String,
}

impl RepositoryRef {
    /// Lenient parse: last two segments, `.git` and trailing slashes dropped.
    ///
    /// Example:
    ///   "https://github.com/rust-lang/rust.git" -> ("rust-lang", "rust")
    pub fn parse(url: &str) -> Result<Self, FetchError> {
        // Query strings and fragments are never part of owner/repo
        let path = url
            .trim()
            .split(['?', '#'])
            .next()
            .unwrap_or_default();

        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if segments.len() < 2 {
            return Err(FetchError::InvalidRepositoryUrl(url.to_string()));
        }

        let owner = segments[segments.len() - 2];
        let name = segments[segments.len() - 1];
        let name = name.strip_suffix(".git").unwrap_or(name);

        if !is_url_safe_segment(owner) || !is_url_safe_segment(name) {
            return Err(FetchError::InvalidRepositoryUrl(url.to_string()));
        }

        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    /// Strict form accepted by the review service:
    /// `https://github.com/<owner>/<repo>.git` and nothing else.
    pub fn parse_strict(url: &str) -> Result<Self, FetchError> {
        let rest = url
            .strip_prefix("https://github.com/")
            .and_then(|rest| rest.strip_suffix(".git"))
            .ok_or_else(|| FetchError::InvalidRepositoryUrl(url.to_string()))?;

        let mut parts = rest.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(owner), Some(name), None)
                if is_url_safe_segment(owner) && is_url_safe_segment(name) =>
            {
                Ok(Self {
                    owner: owner.to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(FetchError::InvalidRepositoryUrl(url.to_string())),
        }
    }

    /// `<api-base>/repos/<owner>/<repo>/contents/`
    pub fn listing_url(&self, api_base: &str) -> String {
        format!(
            "{}/repos/{}/{}/contents/",
            api_base.trim_end_matches('/'),
            self.owner,
            self.name
        )
    }
}

/// Converts a human repository URL to its root listing endpoint.
pub fn to_listing_url(human_url: &str, api_base: &str) -> Result<String, FetchError> {
    Ok(RepositoryRef::parse(human_url)?.listing_url(api_base))
}

// GitHub owner and repo names are ASCII alphanumerics plus '-', '_' and '.'
fn is_url_safe_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_url_from_git_url() {
        let url = to_listing_url("https://github.com/acme/widgets.git", DEFAULT_API_BASE).unwrap();
        assert_eq!(url, "https://api.github.com/repos/acme/widgets/contents/");
    }

    #[test]
    fn test_trailing_slash_and_missing_suffix() {
        let a = to_listing_url("https://github.com/acme/widgets/", DEFAULT_API_BASE).unwrap();
        let b = to_listing_url("https://github.com/acme/widgets", DEFAULT_API_BASE).unwrap();
        let c = to_listing_url("github.com/acme/widgets.git/", DEFAULT_API_BASE).unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert!(a.contains("repos/acme/widgets/contents/"));
    }

    #[test]
    fn test_custom_api_base_trailing_slash() {
        let url = to_listing_url("https://github.com/acme/widgets", "http://127.0.0.1:9000/").unwrap();
        assert_eq!(url, "http://127.0.0.1:9000/repos/acme/widgets/contents/");
    }

    #[test]
    fn test_too_few_segments_fails() {
        assert!(RepositoryRef::parse("widgets").is_err());
        assert!(RepositoryRef::parse("https://github.com/").is_err());
        assert!(RepositoryRef::parse("").is_err());
    }

    #[test]
    fn test_unsafe_segment_rejected() {
        assert!(RepositoryRef::parse("https://github.com/ac me/widgets").is_err());
        assert!(RepositoryRef::parse("https://github.com/acme/.git").is_err());
    }

    #[test]
    fn test_strict_accepts_git_urls() {
        let repo = RepositoryRef::parse_strict("https://github.com/some-user/some-repo.git").unwrap();
        assert_eq!(repo.owner, "some-user");
        assert_eq!(repo.name, "some-repo");
    }

    #[test]
    fn test_strict_rejects_everything_else() {
        for url in [
            "https://github.com/user/repo",
            "https://github.com/user/repo/",
            "http://github.com/user/repo.git",
            "https://gitlab.com/user/repo.git",
            "https://github.com/user",
        ] {
            let err = RepositoryRef::parse_strict(url).unwrap_err();
            assert!(err.to_string().contains("Invalid GitHub URL"), "{url}");
        }
    }
}
