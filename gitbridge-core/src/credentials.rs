//! Credential injection and redaction.
//!
//! Only URLs under [`TRUSTED_HOST_PREFIX`] ever receive the token. Anything
//! else, malformed input included, passes through untouched.

use crate::config::SecretToken;

/// The only URL prefix that may carry the token.
pub const TRUSTED_HOST_PREFIX: &str = "https://github.com/";

/// Replacement text for every occurrence of the token in captured output.
pub const REDACTION_MARKER: &str = "***TOKEN***";

/// Embed `token` into `url` as the authentication principal.
///
/// `https://github.com/org/repo.git` becomes
/// `https://<token>@github.com/org/repo.git`.
pub fn inject_token(url: &str, token: Option<&SecretToken>) -> String {
    match (token, url.strip_prefix(TRUSTED_HOST_PREFIX)) {
        (Some(token), Some(rest)) => {
            format!("https://{}@github.com/{rest}", token.expose())
        }
        _ => url.to_string(),
    }
}

/// Replace every occurrence of `token` in `text` with [`REDACTION_MARKER`].
pub fn redact(text: &str, token: Option<&SecretToken>) -> String {
    match token {
        Some(token) if text.contains(token.expose()) => {
            text.replace(token.expose(), REDACTION_MARKER)
        }
        _ => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(value: &str) -> SecretToken {
        SecretToken::new(value).expect("non-empty token")
    }

    #[test]
    fn injects_into_github_https_urls() {
        let t = token("ghp_123");
        assert_eq!(
            inject_token("https://github.com/acme/paper.git", Some(&t)),
            "https://ghp_123@github.com/acme/paper.git"
        );
    }

    #[test]
    fn no_token_is_passthrough() {
        assert_eq!(
            inject_token("https://github.com/acme/paper.git", None),
            "https://github.com/acme/paper.git"
        );
    }

    #[test]
    fn redact_replaces_every_occurrence() {
        let t = token("s3cr3t");
        let out = redact("fatal: s3cr3t rejected (s3cr3t)", Some(&t));
        assert_eq!(out, "fatal: ***TOKEN*** rejected (***TOKEN***)");
    }

    #[test]
    fn redact_without_token_is_identity() {
        assert_eq!(redact("plain text", None), "plain text");
    }
}
