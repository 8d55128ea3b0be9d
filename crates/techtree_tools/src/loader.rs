//! Mod data loading.
//!
//! Reads RON files from a data directory and files their contents into a
//! [`RegistryBuilder`]:
//!
//! ```text
//! <data_dir>/
//!   items/*.ron   lists of ItemData
//!   mods/*.ron    one ModData per file
//! ```
//!
//! Files are processed in file-name order. All item files and mod files are
//! parsed before anything is registered, so stack tables see every item. A
//! failed entry is recorded in the [`LoadReport`] and skipped unless
//! [`LoaderConfig::fail_fast`] is set.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use techtree_core::data::{ItemData, ModData};
use techtree_core::error::CoreError;
use techtree_core::items::ItemCatalog;
use techtree_core::lifecycle::{Registries, RegistryBuilder};
use techtree_core::recipe::RecipeHooks;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Subdirectory holding item lists.
pub const ITEMS_DIR: &str = "items";
/// Subdirectory holding mod bundles.
pub const MODS_DIR: &str = "mods";

/// Loader settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Root data directory.
    pub data_dir: PathBuf,
    /// Abort on the first failed entry instead of skipping it.
    pub fail_fast: bool,
}

impl LoaderConfig {
    /// Config for `data_dir` that skips failed entries.
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            fail_fast: false,
        }
    }

    /// Abort on the first failed entry.
    #[must_use]
    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }
}

/// Errors that abort loading.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Failed to read a file or directory.
    #[error("IO error reading '{path}': {message}")]
    Io {
        /// Path that failed.
        path: String,
        /// Error message.
        message: String,
    },

    /// The data directory does not exist.
    #[error("Directory not found: {0}")]
    DirectoryNotFound(String),

    /// An entry failed while `fail_fast` was set.
    #[error("'{source_file}': {error}")]
    Entry {
        /// File the entry came from.
        source_file: String,
        /// Registration or parse error.
        error: CoreError,
    },
}

/// One skipped entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadFailure {
    /// File the entry came from.
    pub source_file: String,
    /// Entry name, or the file name for parse failures.
    pub entry: String,
    /// What went wrong.
    pub message: String,
}

/// What a load pass registered and what it skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Number of items in the final catalog.
    pub items: usize,
    /// Loaded mod names, in load order.
    pub mods: Vec<String>,
    /// Registered entity types.
    pub entity_types: Vec<String>,
    /// Registered recipes, duplicates included.
    pub recipes: Vec<String>,
    /// Entity types with a stack table.
    pub stack_tables: Vec<String>,
    /// Skipped entries.
    pub failures: Vec<LoadFailure>,
    /// Reference problems found by [`ModData::validate`].
    pub problems: Vec<String>,
}

impl LoadReport {
    /// Check if nothing was skipped and no reference problems were found.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.problems.is_empty()
    }
}

/// Stateful loader that accumulates a [`LoadReport`].
#[derive(Debug)]
pub struct ModLoader {
    config: LoaderConfig,
    hooks: RecipeHooks,
    report: LoadReport,
}

impl ModLoader {
    /// Create a loader with no recipe hooks.
    #[must_use]
    pub fn new(config: LoaderConfig) -> Self {
        Self {
            config,
            hooks: RecipeHooks::new(),
            report: LoadReport::default(),
        }
    }

    /// Run every recipe through `hooks` before registering it.
    #[must_use]
    pub fn with_hooks(mut self, hooks: RecipeHooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Report accumulated so far.
    #[must_use]
    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    /// Load every item list in `dir`.
    ///
    /// A missing directory yields an empty list.
    pub fn load_items(&mut self, dir: &Path) -> Result<Vec<ItemData>, LoadError> {
        let mut items = Vec::new();
        for path in ron_files(dir)? {
            let label = path.display().to_string();
            let parsed = read_file(&path).and_then(|text| {
                ron::from_str::<Vec<ItemData>>(&text).map_err(|e| LoadError::Entry {
                    source_file: label.clone(),
                    error: CoreError::DataParse {
                        path: label.clone(),
                        message: e.to_string(),
                    },
                })
            });
            match parsed {
                Ok(file_items) => {
                    debug!(file = %label, items = file_items.len(), "Loaded item list");
                    items.extend(file_items);
                }
                Err(e) => self.skip(&label, &label, e)?,
            }
        }
        Ok(items)
    }

    /// Parse one mod file.
    pub fn load_mod_file(&mut self, path: &Path) -> Result<Option<ModData>, LoadError> {
        let label = path.display().to_string();
        let parsed = read_file(path).and_then(|text| {
            ModData::from_ron(&text, &label).map_err(|error| LoadError::Entry {
                source_file: label.clone(),
                error,
            })
        });
        match parsed {
            Ok(data) => Ok(Some(data)),
            Err(e) => {
                self.skip(&label, &label, e)?;
                Ok(None)
            }
        }
    }

    /// Parse every mod file in `dir`, in file-name order.
    pub fn load_mods(&mut self, dir: &Path) -> Result<Vec<(String, ModData)>, LoadError> {
        let mut mods = Vec::new();
        for path in ron_files(dir)? {
            if let Some(data) = self.load_mod_file(&path)? {
                mods.push((path.display().to_string(), data));
            }
        }
        Ok(mods)
    }

    /// Register one parsed mod into `builder`.
    ///
    /// The mod's items are added to the builder's snapshot first, then stack
    /// tables are built, then recipes and entity types are registered.
    pub fn register_mod(
        &mut self,
        builder: &mut RegistryBuilder,
        source_file: &str,
        data: &ModData,
    ) -> Result<(), LoadError> {
        builder.add_items(data.items.iter().map(ItemData::to_descriptor));
        self.report.items = builder.items().len();

        for limits in &data.stack_limits {
            let rules = limits.to_rules();
            builder.build_stack_limits(limits.entity_type(), limits.default_cap(), &rules);
            self.report.stack_tables.push(limits.entity_type.clone());
        }

        for recipe in &data.recipes {
            let registered = recipe
                .to_draft()
                .and_then(|draft| builder.register_recipe(recipe.station(), draft, &self.hooks));
            match registered {
                Ok(definition) => self.report.recipes.push(definition.name().to_string()),
                Err(error) => self.skip(
                    source_file,
                    &recipe.name,
                    LoadError::Entry {
                        source_file: source_file.to_string(),
                        error,
                    },
                )?,
            }
        }

        for entity_type in &data.entity_types {
            match builder.register_entity_type(entity_type.to_descriptor()) {
                Ok(()) => self.report.entity_types.push(entity_type.id.clone()),
                Err(error) => self.skip(
                    source_file,
                    &entity_type.id,
                    LoadError::Entry {
                        source_file: source_file.to_string(),
                        error,
                    },
                )?,
            }
        }

        info!(mod_name = %data.name, file = %source_file, "Registered mod");
        self.report.mods.push(data.name.clone());
        Ok(())
    }

    /// Load the whole data directory and close the build phase.
    pub fn load(mut self) -> Result<(Registries, LoadReport), LoadError> {
        let data_dir = self.config.data_dir.clone();
        if !data_dir.is_dir() {
            return Err(LoadError::DirectoryNotFound(data_dir.display().to_string()));
        }

        let items = self.load_items(&data_dir.join(ITEMS_DIR))?;
        let mods = self.load_mods(&data_dir.join(MODS_DIR))?;

        let catalog = ItemCatalog::from_items(
            items
                .iter()
                .chain(mods.iter().flat_map(|(_, data)| data.items.iter()))
                .map(ItemData::to_descriptor),
        );
        self.report.items = catalog.len();

        for (source_file, data) in &mods {
            for problem in data.validate(&catalog) {
                warn!(file = %source_file, "{problem}");
                self.report.problems.push(problem);
            }
        }

        let mut builder = RegistryBuilder::new(catalog);
        for (source_file, data) in &mods {
            self.register_mod(&mut builder, source_file, data)?;
        }

        info!(
            items = self.report.items,
            mods = self.report.mods.len(),
            failures = self.report.failures.len(),
            "Data directory loaded"
        );
        Ok((builder.finish(), self.report))
    }

    fn skip(&mut self, source_file: &str, entry: &str, error: LoadError) -> Result<(), LoadError> {
        if self.config.fail_fast {
            return Err(error);
        }
        warn!(file = %source_file, entry, "Skipping entry: {error}");
        let message = match &error {
            LoadError::Entry { error, .. } => error.to_string(),
            other => other.to_string(),
        };
        self.report.failures.push(LoadFailure {
            source_file: source_file.to_string(),
            entry: entry.to_string(),
            message,
        });
        Ok(())
    }
}

/// Load every item list in `dir`, skipping unreadable files.
pub fn load_items(dir: &Path) -> Result<Vec<ItemData>, LoadError> {
    ModLoader::new(LoaderConfig::new(dir)).load_items(dir)
}

/// Parse one mod file.
pub fn load_mod_file(path: &Path) -> Result<ModData, LoadError> {
    let label = path.display().to_string();
    let text = read_file(path)?;
    ModData::from_ron(&text, &label).map_err(|error| LoadError::Entry {
        source_file: label,
        error,
    })
}

/// Load a data directory with default hooks.
pub fn load_data_directory(config: LoaderConfig) -> Result<(Registries, LoadReport), LoadError> {
    ModLoader::new(config).load()
}

fn read_file(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|e| LoadError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// `.ron` files in `dir`, sorted by name. A missing directory is empty.
fn ron_files(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    if !dir.exists() {
        debug!(dir = %dir.display(), "No data directory, nothing to load");
        return Ok(Vec::new());
    }

    let io_error = |e: std::io::Error| LoadError::Io {
        path: dir.display().to_string(),
        message: e.to_string(),
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if path.extension().is_some_and(|e| e == "ron") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
