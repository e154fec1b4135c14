use anyhow::{anyhow, Context};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const MANIFEST_ENTRY: &str = "manifest.json";
const RECORDS_ENTRY: &str = "records.json";
pub const BUNDLE_FORMAT: &str = "portal-export-v1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub format: String,
    pub domain: String,
    pub count: usize,
    pub exported_at: DateTime<Utc>,
    pub sha256: String,
    #[serde(default)]
    pub app_version: String,
}

#[derive(Debug, Clone)]
pub struct Bundle {
    pub manifest: Manifest,
    pub records: serde_json::Value,
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// `<workspace>/exports/<domain>-<timestamp>.zip`
pub fn default_bundle_path(workspace: &Path, domain: &str, at: DateTime<Utc>) -> PathBuf {
    workspace
        .join("exports")
        .join(format!("{domain}-{}.zip", at.format("%Y%m%d%H%M%S")))
}

pub fn export_bundle(
    domain: &str,
    records: &serde_json::Value,
    count: usize,
    out_path: &Path,
) -> anyhow::Result<Manifest> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.to_string_lossy()))?;
    }

    let records_bytes =
        serde_json::to_vec_pretty(records).context("failed to serialize records")?;
    let manifest = Manifest {
        format: BUNDLE_FORMAT.to_string(),
        domain: domain.to_string(),
        count,
        exported_at: Utc::now(),
        sha256: sha256_hex(&records_bytes),
        app_version: env!("CARGO_PKG_VERSION").to_string(),
    };

    let out_file = File::create(out_path).with_context(|| {
        format!(
            "failed to create output file {}",
            out_path.to_string_lossy()
        )
    })?;
    let mut zip = ZipWriter::new(out_file);
    let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file(MANIFEST_ENTRY, opts)
        .context("failed to start manifest entry")?;
    zip.write_all(
        serde_json::to_string_pretty(&manifest)
            .context("failed to serialize manifest")?
            .as_bytes(),
    )
    .context("failed to write manifest entry")?;

    zip.start_file(RECORDS_ENTRY, opts)
        .context("failed to start records entry")?;
    zip.write_all(&records_bytes)
        .context("failed to write records entry")?;

    zip.finish().context("failed to finalize zip bundle")?;
    tracing::info!(domain, count, path = %out_path.display(), "export bundle written");
    Ok(manifest)
}

/// Opens a bundle, checking its format marker and the records checksum.
pub fn read_bundle(in_path: &Path) -> anyhow::Result<Bundle> {
    let in_file = File::open(in_path)
        .with_context(|| format!("failed to open bundle {}", in_path.to_string_lossy()))?;
    let mut archive = ZipArchive::new(in_file).context("invalid zip archive")?;

    let mut manifest_text = String::new();
    archive
        .by_name(MANIFEST_ENTRY)
        .context("bundle missing manifest.json")?
        .read_to_string(&mut manifest_text)
        .context("failed to read manifest.json")?;
    let manifest: Manifest =
        serde_json::from_str(&manifest_text).context("manifest.json is invalid")?;
    if manifest.format != BUNDLE_FORMAT {
        return Err(anyhow!("unsupported bundle format: {}", manifest.format));
    }

    let mut records_bytes = Vec::new();
    archive
        .by_name(RECORDS_ENTRY)
        .context("bundle missing records.json")?
        .read_to_end(&mut records_bytes)
        .context("failed to read records.json")?;
    let actual = sha256_hex(&records_bytes);
    if actual != manifest.sha256 {
        return Err(anyhow!(
            "records checksum mismatch: manifest {} actual {}",
            manifest.sha256,
            actual
        ));
    }
    let records = serde_json::from_slice(&records_bytes).context("records.json is invalid JSON")?;
    Ok(Bundle { manifest, records })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("{}-{}", name, uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn bundle_carries_manifest_and_checksum() {
        let dir = temp_dir("portald-export");
        let path = dir.join("nested").join("awards.zip");
        let records = json!([{ "id": "1", "title": "Best Paper Award" }]);
        let written = export_bundle("awards", &records, 1, &path).unwrap();
        assert_eq!(written.format, BUNDLE_FORMAT);

        let bundle = read_bundle(&path).unwrap();
        assert_eq!(bundle.manifest, written);
        assert_eq!(bundle.manifest.domain, "awards");
        assert_eq!(bundle.records, records);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn tampered_records_are_rejected() {
        let dir = temp_dir("portald-export-tamper");
        let path = dir.join("bad.zip");
        let manifest = json!({
            "format": BUNDLE_FORMAT,
            "domain": "awards",
            "count": 0,
            "exportedAt": "2024-01-15T10:30:00Z",
            "sha256": "0000",
        });
        let mut zip = ZipWriter::new(File::create(&path).unwrap());
        let opts = FileOptions::default();
        zip.start_file(MANIFEST_ENTRY, opts).unwrap();
        zip.write_all(manifest.to_string().as_bytes()).unwrap();
        zip.start_file(RECORDS_ENTRY, opts).unwrap();
        zip.write_all(b"[]").unwrap();
        zip.finish().unwrap();

        let err = read_bundle(&path).unwrap_err();
        assert!(format!("{err:#}").contains("checksum mismatch"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn default_path_lives_under_exports() {
        let at = DateTime::parse_from_rfc3339("2024-01-15T10:30:05Z").unwrap().with_timezone(&Utc);
        let p = default_bundle_path(Path::new("/ws"), "grades", at);
        assert_eq!(p, Path::new("/ws/exports/grades-20240115103005.zip"));
    }
}
