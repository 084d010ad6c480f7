//! GitHub push webhook payload and signature verification.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Verify a GitHub `X-Hub-Signature-256` header against the raw request body.
///
/// The header value is `sha256=<hex digest>`. Comparison happens inside the
/// HMAC verifier, which is constant-time.
pub fn verify_signature(secret: &str, payload: &[u8], signature: &str) -> bool {
    let Some(hex_digest) = signature.strip_prefix("sha256=") else {
        return false;
    };
    let Ok(expected) = hex::decode(hex_digest) else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(payload);
    mac.verify_slice(&expected).is_ok()
}

/// Compute the `sha256=<hex>` signature GitHub would send for a body.
pub fn sign(secret: &str, payload: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(payload);
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}

/// The subset of a GitHub push event we act on.
#[derive(Debug, Deserialize)]
pub struct PushEvent {
    /// Full ref name, e.g. "refs/heads/main".
    #[serde(rename = "ref", default)]
    pub git_ref: String,
    #[serde(default)]
    pub head_commit: Option<HeadCommit>,
    #[serde(default)]
    pub pusher: Option<Pusher>,
}

#[derive(Debug, Deserialize)]
pub struct HeadCommit {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct Pusher {
    #[serde(default)]
    pub name: String,
}

impl PushEvent {
    /// Whether this event is a push to the given branch.
    pub fn is_push_to(&self, branch: &str) -> bool {
        self.git_ref == format!("refs/heads/{branch}")
    }

    /// Short human summary for the deploy log.
    pub fn summary(&self) -> String {
        let pusher = self
            .pusher
            .as_ref()
            .map(|p| p.name.as_str())
            .unwrap_or("unknown");
        let message = self
            .head_commit
            .as_ref()
            .map(|c| c.message.lines().next().unwrap_or(""))
            .unwrap_or("");
        format!("push to {} by {} ({})", self.git_ref, pusher, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_roundtrip() {
        let secret = "topsecret";
        let body = br#"{"ref":"refs/heads/main"}"#;
        let sig = sign(secret, body);
        assert!(verify_signature(secret, body, &sig));
    }

    #[test]
    fn test_signature_wrong_secret() {
        let body = b"payload";
        let sig = sign("secret-a", body);
        assert!(!verify_signature("secret-b", body, &sig));
    }

    #[test]
    fn test_signature_tampered_body() {
        let secret = "topsecret";
        let sig = sign(secret, b"original");
        assert!(!verify_signature(secret, b"tampered", &sig));
    }

    #[test]
    fn test_signature_missing_prefix() {
        let secret = "topsecret";
        let sig = sign(secret, b"body");
        let bare = sig.strip_prefix("sha256=").unwrap();
        assert!(!verify_signature(secret, b"body", bare));
    }

    #[test]
    fn test_signature_invalid_hex() {
        assert!(!verify_signature("s", b"body", "sha256=not-hex"));
    }

    #[test]
    fn test_push_event_parse() {
        let json = r#"{
            "ref": "refs/heads/main",
            "head_commit": {"message": "Fix upload validation\n\ndetails"},
            "pusher": {"name": "octocat"}
        }"#;
        let event: PushEvent = serde_json::from_str(json).unwrap();
        assert!(event.is_push_to("main"));
        assert!(!event.is_push_to("develop"));
        let summary = event.summary();
        assert!(summary.contains("octocat"));
        assert!(summary.contains("Fix upload validation"));
        assert!(!summary.contains("details"));
    }

    #[test]
    fn test_push_event_minimal() {
        let event: PushEvent = serde_json::from_str("{}").unwrap();
        assert!(!event.is_push_to("main"));
        assert!(event.summary().contains("unknown"));
    }
}
