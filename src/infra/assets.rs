//! Output-tree scaffolding and static asset linking.

use std::{
    io,
    path::{Path, PathBuf},
};

use tokio::fs;
use tracing::debug;

/// Create the target directory and the fixed subdirectories of the built
/// site if they don't already exist.
pub async fn create_output_dirs(target_dir: &Path, release: &str) -> io::Result<()> {
    for dir in [
        PathBuf::from("."),
        PathBuf::from("assets"),
        Path::new("assets").join(release),
        PathBuf::from("fonts"),
    ] {
        fs::create_dir_all(target_dir.join(dir)).await?;
    }
    Ok(())
}

/// Link a static directory wholesale into the output tree.
///
/// Absolute paths on both ends avoid symbolic link inception when the link
/// is re-created from inside a previously linked tree.
pub async fn link_directory(source_dir: &Path, dest: &Path) -> io::Result<()> {
    debug!(
        target = "brezza::assets",
        source = %source_dir.display(),
        dest = %dest.display(),
        "Linking static directory"
    );
    let source = std::path::absolute(source_dir)?;
    ensure_symlink(&source, dest).await
}

/// Idempotently point `dest` at `source`: a correct existing link is left
/// alone; a wrong link, plain file, or directory is removed and replaced.
pub async fn ensure_symlink(source: &Path, dest: &Path) -> io::Result<()> {
    match fs::symlink_metadata(dest).await {
        Ok(meta) if meta.file_type().is_symlink() => {
            if fs::read_link(dest).await? == source {
                return Ok(());
            }
            fs::remove_file(dest).await?;
        }
        Ok(meta) if meta.is_dir() => {
            fs::remove_dir_all(dest).await?;
        }
        Ok(_) => {
            fs::remove_file(dest).await?;
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }

    fs::symlink(source, dest).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_missing_symlink() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = dir.path().join("source");
        fs::write(&source, "source").await.expect("write");
        let dest = dir.path().join("symlink-dest");

        ensure_symlink(&source, &dest).await.expect("link");

        assert_eq!(fs::read_link(&dest).await.expect("readlink"), source);
    }

    #[tokio::test]
    async fn existing_correct_symlink_is_a_noop() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = dir.path().join("source");
        fs::write(&source, "source").await.expect("write");
        let dest = dir.path().join("symlink-dest");

        ensure_symlink(&source, &dest).await.expect("first");
        ensure_symlink(&source, &dest).await.expect("second");

        assert_eq!(fs::read_link(&dest).await.expect("readlink"), source);
    }

    #[tokio::test]
    async fn wrong_symlink_is_replaced() {
        let dir = tempfile::tempdir().expect("tempdir");
        let old = dir.path().join("old");
        let new = dir.path().join("new");
        fs::write(&old, "old").await.expect("write");
        fs::write(&new, "new").await.expect("write");
        let dest = dir.path().join("symlink-dest");

        ensure_symlink(&old, &dest).await.expect("first");
        ensure_symlink(&new, &dest).await.expect("second");

        assert_eq!(fs::read_link(&dest).await.expect("readlink"), new);
    }

    #[tokio::test]
    async fn plain_file_at_destination_is_replaced() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = dir.path().join("source");
        fs::write(&source, "source").await.expect("write");
        let dest = dir.path().join("dest");
        fs::write(&dest, "in the way").await.expect("write");

        ensure_symlink(&source, &dest).await.expect("link");

        assert_eq!(fs::read_link(&dest).await.expect("readlink"), source);
    }

    #[tokio::test]
    async fn directory_at_destination_is_replaced() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = dir.path().join("source");
        fs::create_dir(&source).await.expect("mkdir");
        let dest = dir.path().join("dest");
        fs::create_dir(&dest).await.expect("mkdir");
        fs::write(dest.join("stale"), "stale").await.expect("write");

        ensure_symlink(&source, &dest).await.expect("link");

        assert_eq!(fs::read_link(&dest).await.expect("readlink"), source);
    }

    #[tokio::test]
    async fn output_dirs_are_created() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("public");

        create_output_dirs(&target, "1").await.expect("create");

        assert!(target.join("assets/1").is_dir());
        assert!(target.join("fonts").is_dir());
    }
}
