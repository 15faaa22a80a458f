use pruls_storage::{ObjectStorage, StorageResult};

/// Open `name` for reading and close it again.
///
/// This proves the object exists and the backend serves it. Contents are not
/// compared with the local archive.
pub async fn verify_upload(storage: &dyn ObjectStorage, name: &str) -> StorageResult<()> {
    let stream = storage.reader(name).await?;
    drop(stream);

    tracing::info!(bucket = %storage.bucket(), archive = %name, "Remote archive verified");
    Ok(())
}
