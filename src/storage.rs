//! Object-storage adapter for uploaded files.
//!
//! Uploads go to an S3-compatible bucket as a single REST `PUT` signed
//! with AWS Signature V4; the returned value is the deterministic public
//! URL of the stored object. Keys are namespaced per purpose (e.g.
//! `categories`, `instruments/pdfs`) and collision-resistant:
//!
//! `<namespace>/<unix-millis>-<uuid>-<sanitized-original-name>`
//!
//! A single attempt is made per upload; any failure is terminal for the
//! request and no database record may be written after a failed upload.
//! Deleting or replacing a record does not remove previously uploaded
//! objects.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use url::Url;
use uuid::Uuid;

use crate::{config::Config, error::AppError};

type HmacSha256 = Hmac<Sha256>;

/// An uploaded file extracted from a multipart request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub content_type: String,
}

/// S3-compatible object store client.
///
/// Constructed once from [`Config`] at startup. The bucket is optional:
/// when unset the service still starts (with a warning) and uploads fail
/// with [`AppError::StorageUnavailable`] at call time.
#[derive(Clone)]
pub struct ObjectStore {
    client: reqwest::Client,
    bucket: Option<String>,
    region: String,
    access_key_id: String,
    secret_access_key: String,
}

impl ObjectStore {
    pub fn new(config: &Config) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            client,
            bucket: config.aws_s3_bucket.clone(),
            region: config.aws_region.clone(),
            access_key_id: config.aws_access_key_id.clone(),
            secret_access_key: config.aws_secret_access_key.clone(),
        }
    }

    /// Whether a bucket has been configured. Used for a startup warning;
    /// uploads against an unconfigured store fail per call.
    pub fn is_configured(&self) -> bool {
        self.bucket.is_some()
    }

    /// Upload a file and return its public URL.
    ///
    /// # Process
    ///
    /// 1. Build a namespaced, collision-resistant object key
    /// 2. Sign a `PUT` request with AWS Signature V4
    /// 3. Send the bytes with the given content type
    ///
    /// # Errors
    ///
    /// - `Validation` when the payload is empty
    /// - `StorageUnavailable` when the bucket is unset, the request cannot
    ///   be sent, or the backend answers with a non-success status
    pub async fn upload(
        &self,
        file: &UploadedFile,
        namespace: &str,
    ) -> Result<String, AppError> {
        let bucket = self.bucket.as_deref().ok_or_else(|| {
            AppError::StorageUnavailable("bucket not configured (AWS_S3_BUCKET)".to_string())
        })?;

        if file.bytes.is_empty() {
            return Err(AppError::Validation("Uploaded file is empty".to_string()));
        }

        let key = object_key(namespace, &file.file_name);
        let url = Url::parse(&public_object_url(bucket, &self.region, &key)).map_err(|err| {
            AppError::StorageUnavailable(format!("invalid object URL for key {key}: {err}"))
        })?;

        let signed = sign_put_request(
            &url,
            &file.content_type,
            &file.bytes,
            &self.region,
            &self.access_key_id,
            &self.secret_access_key,
            Utc::now(),
        );

        let response = self
            .client
            .put(url.clone())
            .header("Content-Type", &file.content_type)
            .header("x-amz-date", &signed.amz_date)
            .header("x-amz-content-sha256", &signed.payload_hash)
            .header("Authorization", &signed.authorization)
            .body(file.bytes.clone())
            .send()
            .await
            .map_err(|err| AppError::StorageUnavailable(format!("PUT {key} failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::StorageUnavailable(format!(
                "PUT {key} returned {status}: {body}"
            )));
        }

        tracing::info!(key = %key, size = file.bytes.len(), "uploaded object");
        Ok(url.to_string())
    }
}

/// Public URL of an object, a deterministic function of bucket, region
/// and key.
fn public_object_url(bucket: &str, region: &str, key: &str) -> String {
    format!("https://{bucket}.s3.{region}.amazonaws.com/{key}")
}

/// Build a collision-resistant object key under the given namespace.
fn object_key(namespace: &str, original_name: &str) -> String {
    format!(
        "{namespace}/{}-{}-{}",
        Utc::now().timestamp_millis(),
        Uuid::new_v4(),
        sanitize_file_name(original_name)
    )
}

/// Replace every character outside `[A-Za-z0-9._-]` so arbitrary client
/// filenames cannot produce hostile or unencodable keys.
fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// Headers produced by SigV4 signing for a single request.
struct SignedRequest {
    amz_date: String,
    payload_hash: String,
    authorization: String,
}

/// Sign a `PUT` with AWS Signature Version 4.
///
/// Covers the four headers actually sent (`content-type`, `host`,
/// `x-amz-content-sha256`, `x-amz-date`). The object keys this service
/// generates only contain URI-safe characters, so the URL path is used as
/// the canonical URI without further encoding.
fn sign_put_request(
    url: &Url,
    content_type: &str,
    payload: &[u8],
    region: &str,
    access_key_id: &str,
    secret_access_key: &str,
    now: DateTime<Utc>,
) -> SignedRequest {
    let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
    let date = now.format("%Y%m%d").to_string();
    let payload_hash = sha256_hex(payload);
    let host = url.host_str().unwrap_or_default();

    let canonical_headers = format!(
        "content-type:{content_type}\nhost:{host}\nx-amz-content-sha256:{payload_hash}\nx-amz-date:{amz_date}\n"
    );
    let signed_headers = "content-type;host;x-amz-content-sha256;x-amz-date";
    let canonical_request = format!(
        "PUT\n{}\n\n{canonical_headers}\n{signed_headers}\n{payload_hash}",
        url.path()
    );

    let scope = format!("{date}/{region}/s3/aws4_request");
    let string_to_sign = format!(
        "AWS4-HMAC-SHA256\n{amz_date}\n{scope}\n{}",
        sha256_hex(canonical_request.as_bytes())
    );

    // Key derivation chain: date -> region -> service -> request
    let key = hmac_sha256(format!("AWS4{secret_access_key}").as_bytes(), date.as_bytes());
    let key = hmac_sha256(&key, region.as_bytes());
    let key = hmac_sha256(&key, b"s3");
    let key = hmac_sha256(&key, b"aws4_request");
    let signature = hex::encode(hmac_sha256(&key, string_to_sign.as_bytes()));

    let authorization = format!(
        "AWS4-HMAC-SHA256 Credential={access_key_id}/{scope}, SignedHeaders={signed_headers}, Signature={signature}"
    );

    SignedRequest {
        amz_date,
        payload_hash,
        authorization,
    }
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC key length is valid");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn sanitizes_hostile_file_names() {
        assert_eq!(sanitize_file_name("data sheet.pdf"), "data-sheet.pdf");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "..-..-etc-passwd");
        assert_eq!(sanitize_file_name("scope_3000.png"), "scope_3000.png");
        assert_eq!(sanitize_file_name("ü?.jpg"), "--.jpg");
    }

    #[test]
    fn object_keys_are_namespaced_and_keep_the_name() {
        let key = object_key("instruments/pdfs", "manual v2.pdf");
        assert!(key.starts_with("instruments/pdfs/"));
        assert!(key.ends_with("-manual-v2.pdf"));

        // Two keys for the same file never collide
        let other = object_key("instruments/pdfs", "manual v2.pdf");
        assert_ne!(key, other);
    }

    #[test]
    fn public_url_is_a_deterministic_function_of_bucket_region_key() {
        assert_eq!(
            public_object_url("vega-assets", "eu-west-1", "categories/1-2-c.png"),
            "https://vega-assets.s3.eu-west-1.amazonaws.com/categories/1-2-c.png"
        );
    }

    #[test]
    fn signing_is_deterministic_and_shaped_like_sigv4() {
        let url = Url::parse("https://b.s3.us-east-1.amazonaws.com/ns/1-2-f.pdf")
            .expect("valid test URL");
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();

        let first = sign_put_request(&url, "application/pdf", b"bytes", "us-east-1", "AKID", "secret", now);
        let second = sign_put_request(&url, "application/pdf", b"bytes", "us-east-1", "AKID", "secret", now);

        assert_eq!(first.authorization, second.authorization);
        assert_eq!(first.amz_date, "20250301T120000Z");
        assert!(first.authorization.starts_with(
            "AWS4-HMAC-SHA256 Credential=AKID/20250301/us-east-1/s3/aws4_request"
        ));
        // 32-byte HMAC, hex encoded
        let signature = first
            .authorization
            .rsplit("Signature=")
            .next()
            .expect("signature suffix");
        assert_eq!(signature.len(), 64);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn different_secrets_produce_different_signatures() {
        let url = Url::parse("https://b.s3.us-east-1.amazonaws.com/ns/f").expect("valid test URL");
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();

        let a = sign_put_request(&url, "image/png", b"x", "us-east-1", "AKID", "secret-a", now);
        let b = sign_put_request(&url, "image/png", b"x", "us-east-1", "AKID", "secret-b", now);
        assert_ne!(a.authorization, b.authorization);
    }
}
