// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::pricing::Rules;
use anyhow::{Context, Result};
use directories::{ProjectDirs, UserDirs};
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Quotebook", "quotebook"));

pub const HOME_ENV: &str = "QUOTEBOOK_HOME";
pub const OUTPUT_ENV: &str = "QUOTEBOOK_OUTPUT";

/// Where the live quotes file and generated artifacts live.
#[derive(Debug, Clone, PartialEq)]
pub struct Paths {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Set when `QUOTEBOOK_OUTPUT` chose `output_dir`; the `output_dir` setting is
    /// then ignored.
    pub output_pinned: bool,
}

impl Paths {
    /// Resolve from the environment, falling back to platform directories.
    pub fn discover() -> Result<Self> {
        let data_dir = match env::var_os(HOME_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => ProjectDirs::from(APP.0, APP.1, APP.2)
                .context("Could not determine platform-specific data dir")?
                .data_dir()
                .to_path_buf(),
        };
        let pinned = env::var_os(OUTPUT_ENV).map(PathBuf::from);
        let output_pinned = pinned.is_some();
        let output_dir = pinned.unwrap_or_else(|| {
            UserDirs::new()
                .and_then(|u| u.desktop_dir().map(|d| d.join(APP.1)))
                .unwrap_or_else(|| data_dir.join("output"))
        });
        Ok(Paths {
            data_dir,
            output_dir,
            output_pinned,
        })
    }

    /// Everything under one root; used by tests and portable installs.
    pub fn at(root: &Path) -> Self {
        Paths {
            data_dir: root.to_path_buf(),
            output_dir: root.join("output"),
            output_pinned: false,
        }
    }

    pub fn quotes_file(&self) -> PathBuf {
        self.data_dir.join("quotes.csv")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.data_dir.join("settings.json")
    }

    pub fn archive_dir(&self) -> PathBuf {
        self.output_dir.join("archives")
    }

    pub fn charts_dir(&self) -> PathBuf {
        self.output_dir.join("charts")
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.output_dir.clone()
    }

    pub fn ensure(&self) -> Result<()> {
        fs::create_dir_all(&self.data_dir).context("Failed to create data dir")?;
        Ok(())
    }
}

/// User settings kept in `settings.json` next to the quotes file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub currency_symbol: String,
    pub require_product: bool,
    pub max_rate: Option<Decimal>,
    pub output_dir: Option<PathBuf>,
    pub active_archive: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            currency_symbol: "R$".to_string(),
            require_product: true,
            max_rate: None,
            output_dir: None,
            active_archive: None,
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Settings::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Read settings {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("Parse settings {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)
            .with_context(|| format!("Write settings {}", path.display()))
    }

    pub fn rules(&self) -> Rules {
        Rules {
            require_product: self.require_product,
            max_rate: self.max_rate,
        }
    }
}
