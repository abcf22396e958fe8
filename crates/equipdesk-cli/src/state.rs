// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use equipdesk_app::ROWS_PER_PAGE_CHOICES;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// What the console remembers between invocations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows_per_page: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
    state: ClientState,
}

impl StateFile {
    pub fn load(path: &Path) -> Result<Self> {
        let state = if path.exists() {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("read state file {}", path.display()))?;
            toml::from_str(&raw).with_context(|| {
                format!(
                    "parse state file {} -- delete it to start a fresh session",
                    path.display()
                )
            })?
        } else {
            ClientState::default()
        };
        Ok(Self {
            path: path.to_path_buf(),
            state,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> &ClientState {
        &self.state
    }

    pub fn token(&self) -> Option<&str> {
        self.state.token.as_deref()
    }

    pub fn set_token(&mut self, token: Option<&str>) -> Result<()> {
        self.state.token = token.map(str::to_owned);
        self.save()
    }

    pub fn clear_token(&mut self) -> Result<()> {
        self.set_token(None)
    }

    pub fn set_rows_per_page(&mut self, rows: usize) -> Result<()> {
        if !ROWS_PER_PAGE_CHOICES.contains(&rows) {
            bail!("rows per page must be one of {ROWS_PER_PAGE_CHOICES:?}, got {rows}");
        }
        self.state.rows_per_page = Some(rows);
        self.save()
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("create state directory {}", parent.display()))?;
        }
        let raw = toml::to_string(&self.state).context("encode client state")?;
        fs::write(&self.path, raw)
            .with_context(|| format!("write state file {}", self.path.display()))
    }
}
