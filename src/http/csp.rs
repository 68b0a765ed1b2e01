//! Content-Security-Policy nonce handling
//!
//! Every index/fallback response gets its own nonce. The nonce is stamped onto
//! `<script` and `<style` tags, substituted for `{{csp-nonce}}` tokens, and
//! placed into the `Content-Security-Policy` header.

use base64::Engine as _;
use rand::rngs::OsRng;
use rand::RngCore;

use super::rewrite::replace_all;
use crate::logger;

/// Token in served markup that is replaced by the nonce
pub const NONCE_PLACEHOLDER: &str = "{{csp-nonce}}";

/// Policy used when `CSP_HEADER` is unset or empty
pub const DEFAULT_TEMPLATE: &str = "default-src 'self'; \
    script-src 'self' 'strict-dynamic' 'nonce-%[1]s'; \
    style-src 'self' 'nonce-%[1]s'; \
    img-src 'self' data:; \
    font-src 'self' data:; ";

/// Template value that turns CSP off entirely
pub const DISABLED_TEMPLATE: &str = "false";

/// Nonce bytes used when the OS random source fails. Not secret; CSP is
/// defense in depth here, not the security boundary.
const FALLBACK_NONCE: &[u8] = b"RaND9mN0nC3";

const NONCE_LEN: usize = 32;

/// Per-request random token, base64 encoded (standard alphabet, padded)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nonce(String);

impl Nonce {
    /// Draw a fresh nonce from the operating system's CSPRNG
    pub fn generate() -> Self {
        Self::generate_with(&mut OsRng)
    }

    /// Draw a nonce from `rng`, falling back to a fixed value if it fails
    pub fn generate_with<R: RngCore + ?Sized>(rng: &mut R) -> Self {
        let mut bytes = [0u8; NONCE_LEN];
        let encoded = match rng.try_fill_bytes(&mut bytes) {
            Ok(()) => base64::engine::general_purpose::STANDARD.encode(bytes),
            Err(e) => {
                logger::log_error(&format!("Could not generate nonce for CSP header: {e}"));
                base64::engine::general_purpose::STANDARD.encode(FALLBACK_NONCE)
            }
        };
        Self(encoded)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// How index and fallback responses are protected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CspPolicy {
    /// No header, no content rewriting
    Disabled,
    /// Header template; `%[1]s` (or `%s`) marks where the nonce goes
    Template(String),
}

impl CspPolicy {
    /// Build the policy from the raw `CSP_HEADER` value
    pub fn from_template(raw: &str) -> Self {
        let template = if raw.is_empty() { DEFAULT_TEMPLATE } else { raw };
        if template == DISABLED_TEMPLATE {
            Self::Disabled
        } else {
            Self::Template(template.to_string())
        }
    }

    /// Header value for this nonce, or `None` when CSP is disabled
    pub fn header_value(&self, nonce: &Nonce) -> Option<String> {
        match self {
            Self::Disabled => None,
            Self::Template(template) => Some(
                template
                    .replace("%[1]s", nonce.as_str())
                    .replace("%s", nonce.as_str()),
            ),
        }
    }
}

/// Stamp `nonce` onto every `<script`/`<style` tag and placeholder token
pub fn inject_nonce(content: &[u8], nonce: &Nonce) -> Vec<u8> {
    let value = nonce.as_str();
    let content = replace_all(
        content,
        b"<script",
        format!(r#"<script nonce="{value}""#).as_bytes(),
    );
    let content = replace_all(
        &content,
        b"<style",
        format!(r#"<style nonce="{value}""#).as_bytes(),
    );
    replace_all(&content, NONCE_PLACEHOLDER.as_bytes(), value.as_bytes())
}
