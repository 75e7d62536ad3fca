//! Code generation for Magicord bots.
//!
//! A bot is an inherent impl block marked `#[bot(...)]` whose command methods
//! are marked `#[prefix_command]`. For a bot type `Greeter` the generator
//! produces `MagicordGreeter`, which owns a `Greeter`, logs in with the
//! configured token and answers `!<command>` messages by calling the matching
//! method and sending its result back to the channel.
//!
//! The pipeline, per declaration:
//!
//! 1. [`resolve`] finds declarations in a parsed impl block or file
//! 2. [`handler::synthesize`] turns each command method into a handler
//! 3. [`dispatch::build_dispatch`] builds the `on_message` match
//! 4. [`assemble::assemble`] reads the configuration and builds the unit
//! 5. [`driver::Generator`] hands the unit to an [`emit::Emitter`]
//!
//! The `#[bot]` attribute macro runs steps 1 to 4 and expands inline; build
//! scripts use [`build_script`] to write units to `OUT_DIR`.

pub mod assemble;
pub mod config;
pub mod declaration;
pub mod dispatch;
pub mod driver;
pub mod emit;
pub mod error;
pub mod handler;
pub mod logging;
pub mod resolve;

use proc_macro2::TokenStream;
use quote::quote;

pub use assemble::{BotConfig, BotUnit, TokenSource, assemble};
pub use declaration::{BotDeclaration, CommandDeclaration};
pub use dispatch::{DispatchArm, DispatchUnit, build_dispatch};
pub use driver::{Generator, build_script, generate};
pub use emit::{Dependencies, Emitter, FileEmitter, GeneratedUnit, MemoryEmitter};
pub use error::{GenerateError, GenerateResult, Location, Stage};
pub use handler::{HandlerUnit, synthesize};

/// Path generated code uses to reach the runtime crate.
pub(crate) fn runtime_path() -> TokenStream {
    quote!(::magicord)
}
