//! Procedural macros for Magicord bots.
//!
//! - `#[bot(...)]` - Generates `Magicord<Name>` next to the annotated impl block
//! - `#[prefix_command]` - Marks a method as a `!<name>` command
//! - `#[declare_bot(...)]` - Marks a bot for a build script to generate
//!
//! ```rust,ignore
//! use magicord::prelude::*;
//!
//! #[derive(Default)]
//! struct Greeter;
//!
//! #[bot(token = "abc123")]
//! impl Greeter {
//!     #[prefix_command]
//!     fn hello(&self, event: &MessageCreateEvent) -> String {
//!         format!("Hello, {}!", event.author())
//!     }
//! }
//!
//! // MagicordGreeter::new().run().await?;
//! ```

use proc_macro::TokenStream;
use quote::{ToTokens, quote};
use syn::{ItemImpl, parse_macro_input};

use magicord_processor::generate;
use magicord_processor::resolve::{resolve_attribute, strip_markers};

/// Generates a bot dispatcher for an inherent impl block.
///
/// # Arguments
///
/// - `token = "..."` - Token embedded in the generated `run`
/// - `token_env = "VAR"` - Environment variable read by `run` instead
///
/// Every method marked `#[prefix_command]` answers messages that are exactly
/// `!` followed by the method name. A method takes `&self` or no receiver,
/// optionally one `&MessageCreateEvent` parameter, and returns the reply text.
///
/// The bot type must implement `Default + Send + Sync + 'static`.
///
/// # Generated items
///
/// For `impl Greeter`, a `pub struct MagicordGreeter` with `new()`, `bot()`,
/// `run()`, `run_with(builder)`, `on_message(event)`, one private method per
/// command, and `Default`.
#[proc_macro_attribute]
pub fn bot(args: TokenStream, input: TokenStream) -> TokenStream {
    let mut item = parse_macro_input!(input as ItemImpl);

    let generated = match resolve_attribute(args.into(), &item).and_then(|decl| generate(&decl)) {
        Ok(unit) => unit.into_token_stream(),
        Err(err) => err.to_compile_error(),
    };

    strip_markers(&mut item);
    quote! {
        #item
        #generated
    }
    .into()
}

/// Marks a method of a `#[bot]` impl block as a prefix command.
///
/// The marker is consumed by `#[bot]`; on its own it leaves the method as is.
#[proc_macro_attribute]
pub fn prefix_command(_args: TokenStream, input: TokenStream) -> TokenStream {
    input
}

/// Marks a bot whose dispatcher is generated by a build script.
///
/// Takes the same arguments as `#[bot]` but expands to the impl block only;
/// the build script reads the source file and writes the dispatcher to
/// `OUT_DIR`.
#[proc_macro_attribute]
pub fn declare_bot(_args: TokenStream, input: TokenStream) -> TokenStream {
    let mut item = parse_macro_input!(input as ItemImpl);
    strip_markers(&mut item);
    item.into_token_stream().into()
}
