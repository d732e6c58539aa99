//! Dataset Loader: range file to in-memory table.
//!
//! Every call downloads into its own scratch directory, which is removed
//! whether the load succeeds or fails.

use std::path::{Path, PathBuf};

use md5::{Digest, Md5};
use tokio::io::AsyncWriteExt;
use url::Url;

use super::{GapRangeSource, parse};
use crate::config::defaults;
use crate::error::{RangeError, RangeResult};
use crate::models::{FileReference, RangeTable};

/// A parsed table and the number of bytes downloaded for it.
#[derive(Debug)]
pub(crate) struct LoadedFile {
    pub(crate) table: RangeTable,
    pub(crate) bytes: u64,
}

impl GapRangeSource {
    /// Download a range file and parse it into a table without provenance.
    ///
    /// # Errors
    ///
    /// - [`RangeError::Download`] for a bad locator, transport failure,
    ///   non-success status, truncated body or checksum mismatch
    /// - [`RangeError::Parse`] when the file is not a readable range map
    pub async fn load_range_file(&self, file: &FileReference) -> RangeResult<RangeTable> {
        self.load(file).await.map(|loaded| loaded.table)
    }

    /// Download and parse, keeping the byte count for provenance.
    #[tracing::instrument(skip(self, file), fields(file = %file.name))]
    pub(crate) async fn load(&self, file: &FileReference) -> RangeResult<LoadedFile> {
        let url = validate_locator(&file.url)?;
        let scratch = self.scratch_dir().await?;

        let result = self.load_into(file, &url, scratch.path()).await;

        let scratch_path = scratch.path().to_path_buf();
        if let Err(e) = scratch.close() {
            tracing::warn!(path = %scratch_path.display(), error = %e, "Failed to remove scratch directory");
        }
        result
    }

    async fn scratch_dir(&self) -> RangeResult<tempfile::TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(defaults::SCRATCH_PREFIX);

        let dir = match &self.scratch_dir {
            Some(root) => {
                tokio::fs::create_dir_all(root).await?;
                builder.tempdir_in(root)?
            }
            None => builder.tempdir()?,
        };
        tracing::debug!(path = %dir.path().display(), "Created scratch directory");
        Ok(dir)
    }

    async fn load_into(&self, file: &FileReference, url: &Url, scratch: &Path) -> RangeResult<LoadedFile> {
        let target = scratch.join(local_file_name(&file.name));
        let bytes = self.download(file, url, &target).await?;

        let name = file.name.clone();
        let scratch = scratch.to_path_buf();
        let table = tokio::task::spawn_blocking(move || parse::read_range_file(&target, &name, &scratch))
            .await
            .map_err(|e| RangeError::parse(&file.name, format!("parser task failed: {e}")))??;

        Ok(LoadedFile { table, bytes })
    }

    /// Stream the body to `target`, returning the number of bytes written.
    async fn download(&self, file: &FileReference, url: &Url, target: &Path) -> RangeResult<u64> {
        let mut response = self
            .client
            .open_download(url)
            .await
            .map_err(|e| RangeError::download(url.as_str(), e.to_string()))?;
        let expected = response.content_length();

        let mut out = tokio::fs::File::create(target).await?;
        let mut hasher = Md5::new();
        let mut written: u64 = 0;

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| RangeError::download(url.as_str(), format!("transfer interrupted: {e}")))?
        {
            hasher.update(&chunk);
            out.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        out.flush().await?;

        if let Some(expected) = expected.filter(|&n| written < n) {
            return Err(RangeError::download(
                url.as_str(),
                format!("truncated body: got {written} of {expected} bytes"),
            ));
        }
        if let Some(declared) = file.size.filter(|&n| written < n) {
            return Err(RangeError::download(
                url.as_str(),
                format!("truncated body: got {written} bytes, catalog lists {declared}"),
            ));
        }

        if let Some(checksum) = file.checksum.as_ref().filter(|c| c.is_md5()) {
            let digest = format!("{:x}", hasher.finalize());
            if !digest.eq_ignore_ascii_case(checksum.value.trim()) {
                return Err(RangeError::download(
                    url.as_str(),
                    format!("MD5 mismatch: expected {}, got {digest}", checksum.value),
                ));
            }
        }

        tracing::debug!(bytes = written, "Downloaded range file");
        Ok(written)
    }
}

/// Parse a locator and require an http(s) scheme.
fn validate_locator(locator: &str) -> RangeResult<Url> {
    let url = Url::parse(locator)
        .map_err(|e| RangeError::download(locator, format!("invalid locator: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(RangeError::download(locator, format!("unsupported scheme: {scheme}"))),
    }
}

/// The catalog name reduced to a single path component.
fn local_file_name(name: &str) -> PathBuf {
    Path::new(name)
        .file_name()
        .map_or_else(|| PathBuf::from("download"), PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_locator() {
        assert!(validate_locator("https://www.sciencebase.gov/catalog/file/get/abc").is_ok());
        assert!(validate_locator("http://127.0.0.1:8080/files/range.zip").is_ok());

        let err = validate_locator("ftp://example.org/range.zip").unwrap_err();
        assert!(matches!(err, RangeError::Download { ref message, .. } if message.contains("ftp")));

        assert!(matches!(validate_locator("range.zip"), Err(RangeError::Download { .. })));
    }

    #[test]
    fn test_local_file_name_strips_directories() {
        assert_eq!(local_file_name("range.zip"), PathBuf::from("range.zip"));
        assert_eq!(local_file_name("../../etc/range.zip"), PathBuf::from("range.zip"));
        assert_eq!(local_file_name(".."), PathBuf::from("download"));
        assert_eq!(local_file_name(""), PathBuf::from("download"));
    }
}
