//! Download-then-delete loop over a remote folder.

use std::future::Future;
use std::path::Path;

use tracing::info;

use crate::client::DriveClient;
use crate::error::Result;
use crate::models::DriveFile;

/// The remote operations a drain needs.
pub trait RemoteStore {
    fn list_children(&self, parent_id: &str) -> impl Future<Output = Result<Vec<DriveFile>>>;

    fn download(&self, file: &DriveFile, destination: &Path) -> impl Future<Output = Result<u64>>;

    fn delete_file(&self, file_id: &str) -> impl Future<Output = Result<()>>;
}

impl RemoteStore for DriveClient {
    async fn list_children(&self, parent_id: &str) -> Result<Vec<DriveFile>> {
        DriveClient::list_children(self, parent_id).await
    }

    async fn download(&self, file: &DriveFile, destination: &Path) -> Result<u64> {
        DriveClient::download(self, file, destination).await
    }

    async fn delete_file(&self, file_id: &str) -> Result<()> {
        DriveClient::delete_file(self, file_id).await
    }
}

/// Outcome of a completed drain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Number of files downloaded and deleted.
    pub files: usize,
    /// Total bytes written locally.
    pub bytes: u64,
}

/// Local file name for a remote title.
///
/// Every `:` becomes `-`; the title is otherwise used verbatim, so a title
/// containing `/` names a path relative to (or outside) the output directory.
pub fn local_file_name(title: &str) -> String {
    title.replace(':', "-")
}

/// Download every file in `parent_id` into `dest_dir`, deleting each remote
/// file right after its download.
///
/// Files are handled one at a time in listing order. The first error stops
/// the drain; files after it are left untouched.
pub async fn drain_folder<S: RemoteStore>(
    store: &S,
    parent_id: &str,
    dest_dir: &Path,
) -> Result<DrainReport> {
    let files = store.list_children(parent_id).await?;

    println!("Files:");
    if files.is_empty() {
        println!("No files found.");
        return Ok(DrainReport::default());
    }

    let mut report = DrainReport::default();
    for file in &files {
        println!("{}", file);

        let destination = dest_dir.join(local_file_name(&file.title));
        let bytes = store.download(file, &destination).await?;
        store.delete_file(&file.id).await?;

        info!(id = %file.id, path = %destination.display(), bytes, "drained");
        report.files += 1;
        report.bytes += bytes;
    }

    Ok(report)
}
