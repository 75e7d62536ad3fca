//! Source-level declarations handed to the generator.

use std::path::PathBuf;

use proc_macro2::Ident;
use quote::format_ident;
use syn::{Attribute, Signature, Type};

/// Attribute marking an impl block as a bot and carrying its configuration.
pub const BOT_ATTRIBUTE: &str = "bot";

/// Attribute marking a method as a prefix command handler.
pub const COMMAND_ATTRIBUTE: &str = "prefix_command";

/// Prefix prepended to a command name to form its dispatch key.
pub const COMMAND_PREFIX: &str = "!";

/// Prefix prepended to a bot's name to form the generated unit name.
pub const UNIT_PREFIX: &str = "Magicord";

/// One bot: an inherent impl block with its configuration and commands.
#[derive(Debug, Clone)]
pub struct BotDeclaration {
    /// Module path of the declaration, `::`-separated; empty for a crate root.
    pub namespace: String,
    /// The bot type's simple name.
    pub simple_name: Ident,
    /// The bot type as written in the impl header.
    pub self_ty: Type,
    /// Attributes attached to the declaration; the configuration lives here.
    pub attrs: Vec<Attribute>,
    /// Command methods, in declaration order.
    pub commands: Vec<CommandDeclaration>,
    /// File the declaration was read from, when known.
    pub origin: Option<PathBuf>,
}

impl BotDeclaration {
    /// Name of the generated unit: `Magicord` followed by the simple name.
    pub fn unit_name(&self) -> Ident {
        format_ident!("{}{}", UNIT_PREFIX, self.simple_name)
    }

    /// The simple name as a string, for diagnostics.
    pub fn name(&self) -> String {
        self.simple_name.to_string()
    }
}

/// A method marked with `#[prefix_command]`.
///
/// The body is never inspected: generated handlers call back into the method
/// on the bot instance, so only the signature is kept.
#[derive(Debug, Clone)]
pub struct CommandDeclaration {
    /// The bot type the method is defined on.
    pub owner: Type,
    /// The method signature.
    pub sig: Signature,
    /// Doc attributes, copied onto the generated handler.
    pub docs: Vec<Attribute>,
}

impl CommandDeclaration {
    /// The command name, which is the method name.
    pub fn name(&self) -> &Ident {
        &self.sig.ident
    }
}

/// Whether `attr` is `#[name]` or a path ending in `name` (`#[magicord::name]`).
pub fn is_marker(attr: &Attribute, name: &str) -> bool {
    attr.path()
        .segments
        .last()
        .is_some_and(|segment| segment.ident == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_is_marker_accepts_qualified_paths() {
        let plain: Attribute = parse_quote!(#[prefix_command]);
        let qualified: Attribute = parse_quote!(#[magicord::prefix_command]);
        let other: Attribute = parse_quote!(#[inline]);

        assert!(is_marker(&plain, COMMAND_ATTRIBUTE));
        assert!(is_marker(&qualified, COMMAND_ATTRIBUTE));
        assert!(!is_marker(&other, COMMAND_ATTRIBUTE));
    }

    #[test]
    fn test_unit_name() {
        let decl = BotDeclaration {
            namespace: String::new(),
            simple_name: format_ident!("Greeter"),
            self_ty: parse_quote!(Greeter),
            attrs: Vec::new(),
            commands: Vec::new(),
            origin: None,
        };
        assert_eq!(decl.unit_name().to_string(), "MagicordGreeter");
    }
}
