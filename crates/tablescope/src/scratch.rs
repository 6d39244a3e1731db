// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Per-request scratch directory for downloaded objects.

use crate::Result;
use diagnostics::*;
use std::path::Path;
use tempfile::{Builder, TempDir};

const PREFIX: &str = "tablescope_";

/// A directory removed when dropped or closed, whatever the request outcome.
pub struct ScratchDir {
    dir: TempDir,
}

impl ScratchDir {
    /// Create under `root`, or under the system temp directory when `None`.
    pub fn create(root: Option<&Path>) -> Result<Self> {
        let mut builder = Builder::new();
        let _ = builder.prefix(PREFIX);
        let dir = match root {
            Some(root) => {
                std::fs::create_dir_all(root)?;
                builder.tempdir_in(root)?
            }
            None => builder.tempdir()?,
        };
        let path = dir.path().display().to_string();
        debug!("Created scratch directory {path}", path: &path);
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Remove the directory now, reporting failures instead of ignoring them.
    pub fn close(self) -> Result<()> {
        self.dir.close()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scratch_removed_on_close_and_drop() {
        let root = tempfile::tempdir().expect("root");
        let scratch = ScratchDir::create(Some(root.path())).expect("scratch");
        let path = scratch.path().to_path_buf();
        assert!(path.starts_with(root.path()));
        assert!(
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(PREFIX))
        );
        std::fs::write(scratch.path().join("x.json"), b"{}").expect("write");
        scratch.close().expect("close");
        assert!(!path.exists());

        let dropped = ScratchDir::create(Some(root.path())).expect("scratch");
        let path = dropped.path().to_path_buf();
        drop(dropped);
        assert!(!path.exists());
    }
}
