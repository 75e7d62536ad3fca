//! Generation driver.
//!
//! Runs handler synthesis, dispatch building and assembly for each
//! declaration, then hands the unit to an [`Emitter`].
//!
//! # Build scripts
//!
//! ```rust,ignore
//! // build.rs
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     magicord_processor::build_script(["src/bots/greeter.rs"])?;
//!     Ok(())
//! }
//!
//! // src/bots/greeter.rs
//! #[magicord::declare::bot(token_env = "DISCORD_TOKEN")]
//! impl Greeter { ... }
//!
//! include!(concat!(env!("OUT_DIR"), "/bots/greeter/MagicordGreeter.rs"));
//! ```

use std::fs;
use std::path::Path;

use tracing::{error, info, instrument};

use crate::assemble::{BotUnit, assemble};
use crate::config::{GeneratorConfig, load_config};
use crate::declaration::BotDeclaration;
use crate::dispatch::build_dispatch;
use crate::emit::{Dependencies, Emitter, FileEmitter, GeneratedUnit};
use crate::error::{GenerateError, GenerateResult};
use crate::handler::{HandlerUnit, synthesize};
use crate::logging;
use crate::resolve::{namespace_for_path, resolve_file};

/// Turns one declaration into its bot unit without emitting it.
pub fn generate(decl: &BotDeclaration) -> GenerateResult<BotUnit> {
    let handlers = decl
        .commands
        .iter()
        .map(synthesize)
        .collect::<GenerateResult<Vec<HandlerUnit>>>()?;
    let dispatch = build_dispatch(&handlers);
    assemble(decl, dispatch, handlers)
}

/// Generates and emits bot units.
#[derive(Debug)]
pub struct Generator<E> {
    emitter: E,
}

impl<E: Emitter> Generator<E> {
    /// Creates a generator writing through `emitter`.
    pub fn new(emitter: E) -> Self {
        Self { emitter }
    }

    /// The emitter units are written to.
    pub fn emitter(&self) -> &E {
        &self.emitter
    }

    /// Generates and emits the unit for one declaration.
    ///
    /// Nothing is emitted when generation fails.
    #[instrument(skip_all, fields(bot = %decl.simple_name))]
    pub fn process(&self, decl: &BotDeclaration) -> GenerateResult<GeneratedUnit> {
        let result = self.try_process(decl);
        if let Err(err) = &result {
            error!(
                stage = err.stage().map(|stage| stage.as_str()),
                error = %err,
                "Failed to generate bot unit"
            );
        }
        result
    }

    fn try_process(&self, decl: &BotDeclaration) -> GenerateResult<GeneratedUnit> {
        let unit = generate(decl)?;
        let generated = GeneratedUnit::from(&unit);
        let dependencies = Dependencies::on(unit.origin.as_deref());

        self.emitter
            .emit(&generated, &dependencies)
            .map_err(|source| GenerateError::EmissionFailure {
                declaration: decl.name(),
                unit: generated.name.clone(),
                source,
            })?;

        info!(
            unit = %generated.name,
            namespace = %generated.namespace,
            handlers = unit.handlers.len(),
            "Generated bot unit"
        );
        Ok(generated)
    }

    /// Generates every bot declared in the file at `path`.
    ///
    /// The outer error means the file itself could not be read or parsed.
    /// Otherwise there is one result per declaration, in source order.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn process_file(&self, path: &Path) -> GenerateResult<Vec<GenerateResult<GeneratedUnit>>> {
        let text = fs::read_to_string(path).map_err(|source| GenerateError::SourceUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let file = syn::parse_file(&text).map_err(|source| GenerateError::SourceUnparsable {
            path: path.to_path_buf(),
            source,
        })?;
        let namespace = namespace_for_path(path);

        Ok(resolve_file(&file, &namespace, Some(path))
            .into_iter()
            .map(|resolved| match resolved {
                Ok(decl) => self.process(&decl),
                Err(err) => {
                    error!(
                        bot = err.declaration(),
                        stage = err.stage().map(|stage| stage.as_str()),
                        error = %err,
                        "Failed to resolve bot declaration"
                    );
                    Err(err)
                }
            })
            .collect())
    }
}

impl Generator<FileEmitter> {
    /// Creates a generator writing files as configured.
    pub fn from_config(config: &GeneratorConfig) -> GenerateResult<Self> {
        let out_dir = config.resolve_out_dir()?;
        Ok(Self::new(
            FileEmitter::new(out_dir).rerun_if_changed(config.rerun_if_changed),
        ))
    }
}

/// Entry point for `build.rs`.
///
/// Loads the configuration, initializes logging and generates every bot in
/// `sources`. All files are processed; the first error is returned.
pub fn build_script<I, P>(sources: I) -> GenerateResult<Vec<GeneratedUnit>>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let config = load_config()?;
    logging::init_from_config(&config.logging);
    let generator = Generator::from_config(&config)?;

    let mut units = Vec::new();
    let mut first_error = None;
    for source in sources {
        let path = source.as_ref();
        if config.rerun_if_changed {
            println!("cargo:rerun-if-changed={}", path.display());
        }
        match generator.process_file(path) {
            Ok(results) => {
                for result in results {
                    match result {
                        Ok(unit) => units.push(unit),
                        Err(err) => {
                            first_error.get_or_insert(err);
                        }
                    }
                }
            }
            Err(err) => {
                error!(path = %path.display(), error = %err, "Failed to load bot source");
                first_error.get_or_insert(err);
            }
        }
    }

    match first_error {
        Some(err) => Err(err),
        None => Ok(units),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::MemoryEmitter;
    use crate::error::Stage;
    use crate::resolve::resolve_impl;
    use std::io;
    use syn::{ItemImpl, parse_quote};

    fn declaration(item: ItemImpl) -> BotDeclaration {
        resolve_impl(&item, "", None).unwrap()
    }

    fn greeter() -> BotDeclaration {
        declaration(parse_quote! {
            #[bot(token = "abc123")]
            impl Greeter {
                #[prefix_command]
                fn hello(&self, event: &MessageCreateEvent) -> String { todo!() }

                #[prefix_command]
                fn bye(&self) -> String { todo!() }
            }
        })
    }

    struct FailingEmitter;

    impl Emitter for FailingEmitter {
        fn emit(&self, _unit: &GeneratedUnit, _deps: &Dependencies) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
        }
    }

    #[test]
    fn test_generate_greeter() {
        let unit = generate(&greeter()).unwrap();

        assert_eq!(unit.name, "MagicordGreeter");
        assert_eq!(unit.namespace, "");
        assert_eq!(unit.handlers.len(), 2);
        assert_eq!(unit.dispatch.keys().collect::<Vec<_>>(), ["!hello", "!bye"]);
    }

    #[test]
    fn test_process_emits_one_unit() {
        let generator = Generator::new(MemoryEmitter::new());
        let generated = generator.process(&greeter()).unwrap();
        assert_eq!(generated.name, "MagicordGreeter");

        let units = generator.emitter().units();
        assert_eq!(units.len(), 1);
        let source = &units[0].source;
        assert!(source.contains("pub struct MagicordGreeter"));
        assert!(source.contains("\"abc123\""));
        let hello = source.find("\"!hello\"").unwrap();
        let bye = source.find("\"!bye\"").unwrap();
        assert!(hello < bye);
    }

    #[test]
    fn test_missing_configuration_emits_nothing() {
        let generator = Generator::new(MemoryEmitter::new());
        let decl = declaration(parse_quote! {
            impl Greeter {
                #[prefix_command]
                fn hello(&self) -> String { todo!() }
            }
        });

        let err = generator.process(&decl).unwrap_err();
        assert!(matches!(err, GenerateError::ConfigurationMissing { .. }));
        assert!(generator.emitter().units().is_empty());
    }

    #[test]
    fn test_malformed_command_emits_nothing() {
        let generator = Generator::new(MemoryEmitter::new());
        let decl = declaration(parse_quote! {
            #[bot(token = "abc123")]
            impl Greeter {
                #[prefix_command]
                fn hello(&mut self) -> String { todo!() }
            }
        });

        let err = generator.process(&decl).unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Synthesize));
        assert!(generator.emitter().units().is_empty());
    }

    #[test]
    fn test_emission_failure_names_unit() {
        let err = Generator::new(FailingEmitter).process(&greeter()).unwrap_err();
        match err {
            GenerateError::EmissionFailure {
                declaration, unit, ..
            } => {
                assert_eq!(declaration, "Greeter");
                assert_eq!(unit, "MagicordGreeter");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_commands_generate() {
        let mut decl = declaration(parse_quote! {
            #[bot(token = "abc123")]
            impl Greeter {
                #[prefix_command]
                fn ping(&self) -> String { todo!() }
            }
        });
        decl.commands.push(decl.commands[0].clone());

        let unit = generate(&decl).unwrap();
        assert_eq!(unit.dispatch.arms.len(), 2);
        assert_eq!(unit.dispatch.duplicate_keys(), ["!ping"]);
    }

    #[test]
    fn test_process_file_isolates_failures() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src").join("bots");
        fs::create_dir_all(&src).unwrap();
        let path = src.join("greeter.rs");
        fs::write(
            &path,
            r#"
#[bot(token = "abc123")]
impl Greeter {
    #[prefix_command]
    fn hello(&self) -> String { "hi".into() }
}

impl Forgetful {
    #[prefix_command]
    fn hello(&self) -> String { "hi".into() }
}
"#,
        )
        .unwrap();

        let generator = Generator::new(MemoryEmitter::new());
        let results = generator.process_file(&path).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(
            results[1],
            Err(GenerateError::ConfigurationMissing { .. })
        ));

        let units = generator.emitter().units();
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].namespace, "bots::greeter");
        assert_eq!(units[0].dependencies.sources, [path]);
    }

    #[test]
    fn test_process_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let generator = Generator::new(MemoryEmitter::new());

        let missing = dir.path().join("missing.rs");
        assert!(matches!(
            generator.process_file(&missing),
            Err(GenerateError::SourceUnreadable { .. })
        ));

        let broken = dir.path().join("broken.rs");
        fs::write(&broken, "impl Greeter {").unwrap();
        assert!(matches!(
            generator.process_file(&broken),
            Err(GenerateError::SourceUnparsable { .. })
        ));
    }

    #[test]
    fn test_from_config_uses_out_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = GeneratorConfig {
            out_dir: Some(dir.path().to_path_buf()),
            rerun_if_changed: false,
            ..Default::default()
        };

        let generator = Generator::from_config(&config).unwrap();
        generator.process(&greeter()).unwrap();
        assert!(dir.path().join("MagicordGreeter.rs").exists());
    }
}
