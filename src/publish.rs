//! Publishing of venue documents and the run index to S3.

use anyhow::Result;
use aws_sdk_s3::primitives::ByteStream;
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use std::io::Write;
use tracing::info;

use crate::analyzers::types::{CanonicalVenueDoc, VenueIndex};
use crate::output::venue_file_stem;

/// Gzip-compresses `bytes` at the default level.
pub fn gzip_bytes(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes)?;
    Ok(encoder.finish()?)
}

/// Object key for a JSON payload, with `.gz` appended when compressed.
pub fn object_key(base: &str, gzip: bool) -> String {
    if gzip {
        format!("{base}.gz")
    } else {
        base.to_string()
    }
}

/// Serializes a value to JSON and uploads it with `application/json` content type.
pub async fn write_json_to_s3(
    client: &aws_sdk_s3::Client,
    bucket: &str,
    key: &str,
    value: &impl Serialize,
    gzip: bool,
) -> Result<()> {
    let json = serde_json::to_vec(value)?;
    let body = if gzip { gzip_bytes(&json)? } else { json };

    let mut request = client
        .put_object()
        .bucket(bucket)
        .key(object_key(key, gzip))
        .body(ByteStream::from(body))
        .content_type("application/json");
    if gzip {
        request = request.content_encoding("gzip");
    }
    request.send().await?;

    Ok(())
}

/// S3 key of a venue document; the file name matches its local copy.
pub fn doc_object_key(doc: &CanonicalVenueDoc) -> String {
    format!("venues/{}.json", venue_file_stem(&doc.dedup_key()))
}

/// Uploads every venue document under `venues/` and the index to
/// `venues/index.json`.
#[tracing::instrument(skip(client, docs, index), fields(docs = docs.len()))]
pub async fn publish_venues(
    client: &aws_sdk_s3::Client,
    bucket: &str,
    docs: &[CanonicalVenueDoc],
    index: &VenueIndex,
    gzip: bool,
) -> Result<()> {
    for doc in docs {
        write_json_to_s3(client, bucket, &doc_object_key(doc), doc, gzip).await?;
    }
    write_json_to_s3(client, bucket, "venues/index.json", index, gzip).await?;

    info!(upload_count = docs.len() + 1, "S3 upload complete");
    Ok(())
}
