//! Webhook secret resolution.
//!
//! The webhook URL is stored as base64 KMS ciphertext and decrypted exactly
//! once per process. Any failure here is fatal: the relay never starts
//! without a usable webhook.

use aws_sdk_kms::error::DisplayErrorContext;
use aws_sdk_kms::primitives::Blob;
use relay::{RelayError, WebhookUrl};

/// Environment variable holding the encrypted webhook URL.
pub const ENCRYPTED_WEBHOOK_ENV: &str = "SLACK_WEBHOOK_URL";

/// Decodes the base64 ciphertext.
pub fn decode_ciphertext(encoded: &str) -> Result<Vec<u8>, RelayError> {
    let encoded = encoded.trim();
    if encoded.is_empty() {
        return Err(RelayError::configuration(format!(
            "{ENCRYPTED_WEBHOOK_ENV} is empty"
        )));
    }
    base64::decode(encoded).map_err(|e| {
        RelayError::configuration(format!("{ENCRYPTED_WEBHOOK_ENV} is not valid base64: {e}"))
    })
}

/// Decrypts the webhook URL with KMS.
pub async fn decrypt_webhook_url(
    kms: &aws_sdk_kms::Client,
    encoded: &str,
) -> Result<WebhookUrl, RelayError> {
    let ciphertext = decode_ciphertext(encoded)?;

    let output = kms
        .decrypt()
        .ciphertext_blob(Blob::new(ciphertext))
        .send()
        .await
        .map_err(|e| {
            RelayError::configuration(format!(
                "KMS could not decrypt {ENCRYPTED_WEBHOOK_ENV}: {}",
                DisplayErrorContext(&e)
            ))
        })?;

    let plaintext = output
        .plaintext()
        .ok_or_else(|| RelayError::configuration("KMS returned no plaintext"))?;
    let url = std::str::from_utf8(plaintext.as_ref())
        .map_err(|_| RelayError::configuration("decrypted webhook URL is not UTF-8"))?;

    WebhookUrl::new(url)
}
