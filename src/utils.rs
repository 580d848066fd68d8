use std::path::Path;

use chrono::Utc;
use tokio::fs;
use tracing::warn;

use crate::error::AppError;

/// Uploads are stored as `<unix-millis><original-name>` so repeated uploads
/// of the same file never collide.
pub fn timestamped_filename(original: &str) -> String {
    format!("{}{}", Utc::now().timestamp_millis(), original)
}

/// Minimal shape check, the store has no opinion on email contents.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

pub async fn save_image(upload_dir: &str, filename: &str, bytes: &[u8]) -> Result<(), AppError> {
    fs::create_dir_all(upload_dir).await?;
    fs::write(Path::new(upload_dir).join(filename), bytes).await?;

    Ok(())
}

/// Best effort, a missing file only warrants a log line.
pub async fn delete_image(upload_dir: &str, filename: &str) {
    if let Err(e) = fs::remove_file(Path::new(upload_dir).join(filename)).await {
        warn!("Failed to remove image {filename}: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::{is_valid_email, timestamped_filename};

    #[test]
    fn filename_keeps_original_after_timestamp() {
        let name = timestamped_filename("burger.png");

        assert!(name.ends_with("burger.png"));
        let prefix = &name[..name.len() - "burger.png".len()];
        assert!(!prefix.is_empty());
        assert!(prefix.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("alice@example.com"));
        assert!(!is_valid_email("alice"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("alice@example"));
        assert!(!is_valid_email("alice@.com"));
    }
}
