//! Emission of generated units.
//!
//! An [`Emitter`] persists a rendered unit together with its [`Dependencies`]:
//! the source files whose change must trigger regeneration.
//!
//! - [`FileEmitter`] writes `<out_dir>/<namespace path>/Magicord<Name>.rs` and,
//!   inside a build script, tells Cargo to rerun when the source changes
//! - [`MemoryEmitter`] keeps rendered units in memory

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use proc_macro2::TokenStream;
use quote::ToTokens;
use tracing::{debug, trace};

use crate::assemble::BotUnit;

/// Source files a generated unit was derived from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dependencies {
    /// Whether the output may depend on sources beyond those listed.
    pub aggregating: bool,
    /// Originating source files.
    pub sources: Vec<PathBuf>,
}

impl Dependencies {
    /// One-to-one dependency on the file a declaration came from.
    pub fn on(origin: Option<&Path>) -> Self {
        Self {
            aggregating: true,
            sources: origin.map(Path::to_path_buf).into_iter().collect(),
        }
    }
}

/// A unit handed to an emitter.
#[derive(Debug, Clone)]
pub struct GeneratedUnit {
    /// Module path, `::`-separated; empty for a crate root.
    pub namespace: String,
    /// Unit (type) name.
    pub name: String,
    /// Rendered items.
    pub tokens: TokenStream,
}

impl GeneratedUnit {
    /// Output file name: `<name>.rs`.
    pub fn file_name(&self) -> String {
        format!("{}.rs", self.name)
    }

    /// Output path relative to the output directory.
    pub fn relative_path(&self) -> PathBuf {
        let mut path: PathBuf = self
            .namespace
            .split("::")
            .filter(|segment| !segment.is_empty())
            .collect();
        path.push(self.file_name());
        path
    }

    /// Source text written to disk.
    pub fn render(&self) -> String {
        format!(
            "// @generated by magicord; do not edit.\n{}\n",
            self.tokens
        )
    }
}

impl From<&BotUnit> for GeneratedUnit {
    fn from(unit: &BotUnit) -> Self {
        Self {
            namespace: unit.namespace.clone(),
            name: unit.name.to_string(),
            tokens: unit.to_token_stream(),
        }
    }
}

/// Persists generated units.
pub trait Emitter {
    /// Writes `unit`, recording that it depends on `dependencies`.
    fn emit(&self, unit: &GeneratedUnit, dependencies: &Dependencies) -> io::Result<()>;
}

impl<E: Emitter + ?Sized> Emitter for &E {
    fn emit(&self, unit: &GeneratedUnit, dependencies: &Dependencies) -> io::Result<()> {
        (**self).emit(unit, dependencies)
    }
}

/// Writes units below an output directory.
///
/// Writing the same path twice in one run is a collision and fails; files
/// left from earlier runs are overwritten, or left alone when unchanged.
#[derive(Debug)]
pub struct FileEmitter {
    out_dir: PathBuf,
    rerun_if_changed: bool,
    written: Mutex<HashSet<PathBuf>>,
}

impl FileEmitter {
    /// Creates an emitter writing below `out_dir`.
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            rerun_if_changed: false,
            written: Mutex::new(HashSet::new()),
        }
    }

    /// Print `cargo:rerun-if-changed` for every dependency.
    pub fn rerun_if_changed(mut self, enabled: bool) -> Self {
        self.rerun_if_changed = enabled;
        self
    }

    /// The output directory.
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Paths written so far in this run.
    pub fn written(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.written.lock().iter().cloned().collect();
        paths.sort();
        paths
    }
}

impl Emitter for FileEmitter {
    fn emit(&self, unit: &GeneratedUnit, dependencies: &Dependencies) -> io::Result<()> {
        let path = self.out_dir.join(unit.relative_path());
        let mut written = self.written.lock();
        if written.contains(&path) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("`{}` was already generated in this run", path.display()),
            ));
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let rendered = unit.render();
        if fs::read_to_string(&path).is_ok_and(|existing| existing == rendered) {
            trace!(path = %path.display(), "Generated unit unchanged");
        } else {
            fs::write(&path, rendered)?;
            debug!(path = %path.display(), "Wrote generated unit");
        }
        written.insert(path);
        drop(written);

        if self.rerun_if_changed {
            for source in &dependencies.sources {
                println!("cargo:rerun-if-changed={}", source.display());
            }
        }
        Ok(())
    }
}

/// A unit kept by [`MemoryEmitter`].
#[derive(Debug, Clone)]
pub struct EmittedUnit {
    /// Module path.
    pub namespace: String,
    /// Unit name.
    pub name: String,
    /// Rendered source text.
    pub source: String,
    /// Recorded dependencies.
    pub dependencies: Dependencies,
}

/// Keeps emitted units in memory.
#[derive(Debug, Default)]
pub struct MemoryEmitter {
    units: Mutex<Vec<EmittedUnit>>,
}

impl MemoryEmitter {
    /// Creates an empty emitter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Units emitted so far, in emission order.
    pub fn units(&self) -> Vec<EmittedUnit> {
        self.units.lock().clone()
    }
}

impl Emitter for MemoryEmitter {
    fn emit(&self, unit: &GeneratedUnit, dependencies: &Dependencies) -> io::Result<()> {
        self.units.lock().push(EmittedUnit {
            namespace: unit.namespace.clone(),
            name: unit.name.clone(),
            source: unit.render(),
            dependencies: dependencies.clone(),
        });
        Ok(())
    }
}
