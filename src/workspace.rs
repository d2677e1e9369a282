// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::{OUTPUT_ENV, Paths, Settings};
use crate::store::RecordStore;
use anyhow::{Context, Result};
use tracing::{debug, error, warn};

/// Everything a command handler needs: resolved paths, user settings and the
/// live store. The store is owned here and only mutated through its methods.
#[derive(Debug)]
pub struct Workspace {
    pub paths: Paths,
    pub settings: Settings,
    pub store: RecordStore,
}

impl Workspace {
    pub fn open(mut paths: Paths) -> Result<Self> {
        paths.ensure()?;
        let mut settings = Settings::load(&paths.settings_file())?;
        match &settings.output_dir {
            Some(dir) if !paths.output_pinned => paths.output_dir = dir.clone(),
            Some(dir) => {
                debug!(setting = %dir.display(), "output dir pinned by {}", OUTPUT_ENV)
            }
            None => {}
        }
        if let Some(archive) = &settings.active_archive {
            if !archive.exists() {
                warn!(path = %archive.display(), "active archive is gone; no longer mirroring");
                settings.active_archive = None;
            }
        }
        let quotes = paths.quotes_file();
        let store = RecordStore::open(&quotes)
            .with_context(|| format!("Open quotes at {}", quotes.display()))?
            .with_mirror(settings.active_archive.clone());
        Ok(Workspace {
            paths,
            settings,
            store,
        })
    }

    pub fn save_settings(&self) -> Result<()> {
        self.settings.save(&self.paths.settings_file())
    }

    /// Final flush. Only writes when an earlier persist failed.
    pub fn close(&mut self) -> Result<()> {
        if self.store.is_dirty() {
            if let Err(err) = self.store.persist() {
                error!(error = %err, "final save failed; unsaved quotes may be lost");
                return Err(err).context("Save quotes on exit");
            }
        }
        Ok(())
    }
}
