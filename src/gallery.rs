//! Writing generated images to the output directory.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    error::Result,
    fal::{image_client::image_extension, ImageClient},
};

pub fn image_file_name(url: &str, at: DateTime<Utc>) -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!(
        "fluxchat-{}-{}.{}",
        at.format("%Y%m%d-%H%M%S"),
        &id[..8],
        image_extension(url)
    )
}

pub async fn write_image(dir: &Path, url: &str, bytes: &[u8]) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(image_file_name(url, Utc::now()));
    tokio::fs::write(&path, bytes).await?;
    log::info!("Saved {} bytes to {}", bytes.len(), path.display());
    Ok(path)
}

pub async fn save_image(client: &ImageClient, url: &str, dir: &Path) -> Result<PathBuf> {
    let bytes = client.fetch_image(url).await?;
    write_image(dir, url, &bytes).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_file_name() {
        let at = Utc.with_ymd_and_hms(2024, 8, 1, 9, 30, 5).unwrap();
        let name = image_file_name("https://fal.media/files/a.png", at);
        assert!(name.starts_with("fluxchat-20240801-093005-"));
        assert!(name.ends_with(".png"));
    }

    #[tokio::test]
    async fn test_write_image_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested").join("out");
        let path = write_image(&target, "data:image/png;base64,AA==", b"png!")
            .await
            .unwrap();
        assert!(path.starts_with(&target));
        assert_eq!(std::fs::read(&path).unwrap(), b"png!");
    }
}
