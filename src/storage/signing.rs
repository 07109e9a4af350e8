//! Cloud Storage V4 signed URL construction.
//!
//! Building a signed URL is split into the pure canonicalization below and
//! the RSA signature, which the caller obtains from its credentials.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// Longest lifetime Cloud Storage accepts for a V4 signature (7 days).
pub const MAX_SIGNED_URL_TTL_SECS: u64 = 7 * 24 * 60 * 60;

const ALGORITHM: &str = "GOOG4-RSA-SHA256";

/// Percent-encode an object name, keeping `/` separators.
pub fn encode_object_path(object: &str) -> String {
    object
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// A read-only signed URL for one object, before signing.
#[derive(Debug, Clone)]
pub struct SignedUrlRequest {
    /// `https` or `http`.
    pub scheme: String,
    /// Host (with port when non-default) the URL is issued for.
    pub host: String,
    pub bucket: String,
    pub object: String,
    pub client_email: String,
    pub ttl_secs: u64,
    pub timestamp: DateTime<Utc>,
}

impl SignedUrlRequest {
    fn datestamp(&self) -> String {
        self.timestamp.format("%Y%m%d").to_string()
    }

    fn datetime(&self) -> String {
        self.timestamp.format("%Y%m%dT%H%M%SZ").to_string()
    }

    fn credential_scope(&self) -> String {
        format!("{}/auto/storage/goog4_request", self.datestamp())
    }

    pub fn canonical_uri(&self) -> String {
        format!("/{}/{}", self.bucket, encode_object_path(&self.object))
    }

    /// Query string of the URL, without the signature.
    pub fn canonical_query(&self) -> String {
        let credential = format!("{}/{}", self.client_email, self.credential_scope());
        let expires = self.ttl_secs.min(MAX_SIGNED_URL_TTL_SECS).to_string();
        let params = [
            ("X-Goog-Algorithm", ALGORITHM.to_string()),
            ("X-Goog-Credential", credential),
            ("X-Goog-Date", self.datetime()),
            ("X-Goog-Expires", expires),
            ("X-Goog-SignedHeaders", "host".to_string()),
        ];
        params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    pub fn canonical_request(&self) -> String {
        format!(
            "GET\n{}\n{}\nhost:{}\n\nhost\nUNSIGNED-PAYLOAD",
            self.canonical_uri(),
            self.canonical_query(),
            self.host
        )
    }

    /// The exact bytes that must be RSA-SHA256 signed.
    pub fn string_to_sign(&self) -> String {
        let digest = Sha256::digest(self.canonical_request().as_bytes());
        format!(
            "{}\n{}\n{}\n{}",
            ALGORITHM,
            self.datetime(),
            self.credential_scope(),
            hex::encode(digest)
        )
    }

    /// Assemble the final URL from the signature over [`Self::string_to_sign`].
    pub fn into_url(self, signature: &[u8]) -> String {
        format!(
            "{}://{}{}?{}&X-Goog-Signature={}",
            self.scheme,
            self.host,
            self.canonical_uri(),
            self.canonical_query(),
            hex::encode(signature)
        )
    }
}
