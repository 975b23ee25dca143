//! On-disk persistence for the OAuth credential record and the inbox cache.
//!
//! Both live as separate JSON files in the config directory and are written
//! with owner-only permissions. Logout removes both.

use log::debug;
use serde::{Deserialize, Serialize};
use std::fs::{DirBuilder, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::constants::{INBOX_CACHE_FILE, TOKEN_FILE};
use crate::error::{Error, Result};
use crate::ticktick::OAuthToken;

#[derive(Debug, Serialize, Deserialize)]
struct InboxCache {
    inbox_id: String,
}

/// File-backed store rooted at a single per-user directory.
#[derive(Debug, Clone)]
pub struct TokenStore {
    dir: PathBuf,
}

impl TokenStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn token_path(&self) -> PathBuf {
        self.dir.join(TOKEN_FILE)
    }

    pub fn inbox_cache_path(&self) -> PathBuf {
        self.dir.join(INBOX_CACHE_FILE)
    }

    /// Write the credential record as indented JSON, replacing any previous one.
    pub fn save(&self, token: &OAuthToken) -> Result<()> {
        self.ensure_dir()?;
        let data = serde_json::to_vec_pretty(token)
            .map_err(|e| Error::io("failed to serialize token", std::io::Error::new(ErrorKind::InvalidData, e)))?;
        let path = self.token_path();
        write_private(&path, &data).map_err(|e| Error::io(format!("failed to write token file {}", path.display()), e))?;
        debug!("Saved token to {}", path.display());
        Ok(())
    }

    /// Read the credential record.
    ///
    /// A missing or unreadable file means `NotAuthenticated`; unparsable content
    /// means `CorruptToken`.
    pub fn load(&self) -> Result<OAuthToken> {
        let path = self.token_path();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            debug!("Cannot read token file {}: {}", path.display(), e);
            Error::NotAuthenticated
        })?;

        serde_json::from_str(&content).map_err(|source| Error::CorruptToken {
            path: path.display().to_string(),
            source,
        })
    }

    /// Remove the token file, then the inbox cache. Absent files are not an error.
    pub fn delete(&self) -> Result<()> {
        remove_if_present(&self.token_path())?;
        remove_if_present(&self.inbox_cache_path())?;
        Ok(())
    }

    pub fn save_inbox_id(&self, id: &str) -> Result<()> {
        self.ensure_dir()?;
        let cache = InboxCache {
            inbox_id: id.to_string(),
        };
        let data = serde_json::to_vec(&cache)
            .map_err(|e| Error::io("failed to serialize inbox cache", std::io::Error::new(ErrorKind::InvalidData, e)))?;
        let path = self.inbox_cache_path();
        write_private(&path, &data).map_err(|e| Error::io(format!("failed to write inbox cache {}", path.display()), e))
    }

    /// Cached inbox id; fails when the cache is absent, unreadable or empty.
    pub fn load_inbox_id(&self) -> Result<String> {
        let path = self.inbox_cache_path();
        let context = || format!("failed to read inbox cache {}", path.display());

        let content = std::fs::read_to_string(&path).map_err(|e| Error::io(context(), e))?;
        let cache: InboxCache = serde_json::from_str(&content)
            .map_err(|e| Error::io(context(), std::io::Error::new(ErrorKind::InvalidData, e)))?;

        if cache.inbox_id.is_empty() {
            return Err(Error::io(context(), std::io::Error::new(ErrorKind::NotFound, "empty inbox id")));
        }
        Ok(cache.inbox_id)
    }

    fn ensure_dir(&self) -> Result<()> {
        let mut builder = DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o700);
        }
        builder
            .create(&self.dir)
            .map_err(|e| Error::io(format!("failed to create token directory {}", self.dir.display()), e))
    }
}

fn write_private(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    // mode() only applies on creation
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(data)?;
    file.flush()
}

fn remove_if_present(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::io(format!("failed to delete {}", path.display()), e)),
    }
}
