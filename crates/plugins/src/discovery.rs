//! Plugin discovery from the configured directories.
//!
//! Each directory holds one TOML manifest per definition. Files whose stem is
//! `example` are placeholders and never load. Other non-`.toml` entries are
//! ignored. Files are processed in name order, and a directory with any
//! broken manifest fails as a whole, listing every broken file.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use {
    herald_config::DirectoriesConfig,
    herald_registry::{PluginDefinition, Registry},
    serde::Serialize,
    tracing::{debug, info, warn},
};

use crate::{
    catalog::HandlerCatalog,
    error::{Context, Error, PluginFailure, Result},
    manifest::{PluginKind, parse_manifest},
};

const PLACEHOLDER_STEM: &str = "example";
const MANIFEST_EXTENSION: &str = "toml";

/// Load a single manifest file.
pub fn load_file(kind: PluginKind, path: &Path, catalog: &HandlerCatalog) -> Result<PluginDefinition> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_manifest(kind, &content, path, catalog)
}

/// Load every manifest in `dir` as a `kind` definition.
pub fn load_from_directory(
    kind: PluginKind,
    dir: &Path,
    catalog: &HandlerCatalog,
) -> Result<Vec<PluginDefinition>> {
    let mut files = Vec::new();
    let entries = std::fs::read_dir(dir).map_err(|source| Error::ReadDir {
        dir: dir.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| Error::ReadDir {
            dir: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if path.file_stem().is_some_and(|stem| stem == PLACEHOLDER_STEM) {
            debug!(kind = %kind, path = %path.display(), "skipping placeholder plugin");
            #[cfg(feature = "metrics")]
            herald_metrics::counter!(
                herald_metrics::plugins::SKIPPED_TOTAL,
                herald_metrics::labels::KIND => kind.as_str()
            )
            .increment(1);
            continue;
        }
        if path.extension().is_none_or(|ext| ext != MANIFEST_EXTENSION) {
            debug!(kind = %kind, path = %path.display(), "ignoring non-manifest file");
            continue;
        }
        files.push(path);
    }
    files.sort();

    let mut definitions = Vec::with_capacity(files.len());
    let mut failures = Vec::new();
    for path in files {
        match load_file(kind, &path, catalog) {
            Ok(definition) => {
                debug!(kind = %kind, name = definition.name(), path = %path.display(), "plugin loaded");
                definitions.push(definition);
            },
            Err(e) => {
                warn!(kind = %kind, path = %path.display(), error = %e, "plugin failed to load");
                failures.push(PluginFailure {
                    path,
                    reason: e.to_string(),
                });
            },
        }
    }

    #[cfg(feature = "metrics")]
    {
        herald_metrics::counter!(
            herald_metrics::plugins::LOADED_TOTAL,
            herald_metrics::labels::KIND => kind.as_str()
        )
        .increment(definitions.len() as u64);
        herald_metrics::counter!(
            herald_metrics::plugins::LOAD_ERRORS_TOTAL,
            herald_metrics::labels::KIND => kind.as_str()
        )
        .increment(failures.len() as u64);
    }

    if !failures.is_empty() {
        return Err(Error::PluginLoad {
            dir: dir.to_path_buf(),
            failures,
        });
    }
    Ok(definitions)
}

/// Definitions pushed per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub loaded: BTreeMap<PluginKind, usize>,
}

impl LoadReport {
    pub fn total(&self) -> usize {
        self.loaded.values().sum()
    }

    pub fn count(&self, kind: PluginKind) -> usize {
        self.loaded.get(&kind).copied().unwrap_or(0)
    }
}

/// Loads every configured directory into a registry.
#[derive(Debug, Clone, Default)]
pub struct PluginLoader {
    catalog: HandlerCatalog,
}

impl PluginLoader {
    pub fn new(catalog: HandlerCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &HandlerCatalog {
        &self.catalog
    }

    /// Load and push each configured directory in [`PluginKind::ALL`] order.
    /// Unset directories are skipped. The first failing directory or push
    /// aborts the load.
    pub fn load_all(&self, dirs: &DirectoriesConfig, registry: &mut Registry) -> Result<LoadReport> {
        let mut report = LoadReport::default();
        for kind in PluginKind::ALL {
            let Some(dir) = directory_for(dirs, kind) else {
                debug!(kind = %kind, "no directory configured");
                continue;
            };
            let definitions = load_from_directory(kind, dir, &self.catalog)?;
            let count = definitions.len();
            for definition in definitions {
                registry.push(definition)?;
            }
            info!(kind = %kind, dir = %dir.display(), count, "plugins loaded");
            report.loaded.insert(kind, count);
        }
        Ok(report)
    }
}

fn directory_for(dirs: &DirectoriesConfig, kind: PluginKind) -> Option<&PathBuf> {
    match kind {
        PluginKind::Commands => dirs.commands.as_ref(),
        PluginKind::Events => dirs.events.as_ref(),
        PluginKind::Triggers => dirs.triggers.as_ref(),
        PluginKind::Buttons => dirs.buttons.as_ref(),
        PluginKind::ContextMenus => dirs.context_menus.as_ref(),
        PluginKind::SelectMenus => dirs.select_menus.as_ref(),
        PluginKind::Modals => dirs.modals.as_ref(),
        PluginKind::CannedMessages => dirs.canned_messages.as_ref(),
    }
}
