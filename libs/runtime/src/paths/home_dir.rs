use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HomeDirError {
    #[error("cannot determine the user's home directory")]
    NoHome,
    #[error("failed to create home directory '{path}': {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Resolve the server home directory into an absolute path.
///
/// - `None` → `<user home>/<default_subdir>`
/// - `~` or `~/x` → expanded against the user home
/// - relative paths → joined with the current working directory
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf, HomeDirError> {
    let home = || dirs::home_dir().ok_or(HomeDirError::NoHome);

    let path = match configured.as_deref().map(str::trim) {
        None | Some("") => home()?.join(default_subdir),
        Some("~") => home()?,
        Some(p) if p.starts_with("~/") || p.starts_with("~\\") => home()?.join(&p[2..]),
        Some(p) => {
            let p = PathBuf::from(p);
            if p.is_absolute() {
                p
            } else {
                std::env::current_dir()
                    .map_err(|source| HomeDirError::Create {
                        path: p.clone(),
                        source,
                    })?
                    .join(p)
            }
        }
    };

    if create {
        std::fs::create_dir_all(&path).map_err(|source| HomeDirError::Create {
            path: path.clone(),
            source,
        })?;
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn absolute_path_is_kept_and_created() {
        let tmp = tempdir().unwrap();
        let target = tmp.path().join("nested/home");
        let resolved =
            resolve_home_dir(Some(target.to_string_lossy().to_string()), ".x", true).unwrap();
        assert_eq!(resolved, target);
        assert!(target.exists());
    }

    #[test]
    fn tilde_expands_against_user_home() {
        let resolved = resolve_home_dir(Some("~/.signdesk_tilde".into()), ".x", false).unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with(".signdesk_tilde"));
    }
}
