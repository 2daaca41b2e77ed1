use anyhow::Context;
use aws_sdk_s3::primitives::ByteStream;
use std::path::Path;
use tracing::info;

/// Content type for an artifact, chosen from its file name.
pub fn content_type(path: &Path) -> &'static str {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    if name.ends_with(".gz") {
        "application/gzip"
    } else if name.ends_with(".json") {
        "application/json"
    } else if name.ends_with(".csv") {
        "text/csv"
    } else {
        "text/plain; charset=utf-8"
    }
}

/// Uploads each artifact under `prefix` in `bucket`, keyed by file name.
pub async fn upload_artifacts(
    client: &aws_sdk_s3::Client,
    bucket: &str,
    prefix: &str,
    paths: &[impl AsRef<Path>],
) -> anyhow::Result<usize> {
    let mut upload_count = 0;

    for path in paths {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("artifact path '{}' has no file name", path.display()))?;
        let key = format!("{}/{}", prefix.trim_end_matches('/'), file_name);

        let body = std::fs::read(path)
            .with_context(|| format!("failed to read artifact '{}'", path.display()))?;

        client
            .put_object()
            .bucket(bucket)
            .key(&key)
            .body(ByteStream::from(body))
            .content_type(content_type(path))
            .send()
            .await
            .with_context(|| format!("S3 upload failed for '{key}'"))?;

        info!(key = %key, "Artifact uploaded");
        upload_count += 1;
    }

    Ok(upload_count)
}
