//! Discovery of bot declarations in parsed Rust source.
//!
//! Two entry points feed the generator:
//!
//! - [`resolve_attribute`] for the `#[bot(...)]` attribute macro, which sees
//!   one impl block and its attribute arguments separately
//! - [`resolve_file`] for the build-script driver, which walks a whole file
//!
//! An inherent impl block is a bot declaration when it carries `#[bot]` or
//! contains at least one `#[prefix_command]` method. The latter case lets a
//! forgotten `#[bot]` surface as a configuration error instead of being
//! silently skipped.

use std::path::{Component, Path};

use proc_macro2::{Ident, TokenStream};
use quote::ToTokens;
use syn::spanned::Spanned;
use syn::{Attribute, ImplItem, Item, ItemImpl, Type, parse_quote};
use tracing::{debug, trace};

use crate::declaration::{
    BOT_ATTRIBUTE, BotDeclaration, COMMAND_ATTRIBUTE, CommandDeclaration, is_marker,
};
use crate::error::{GenerateError, GenerateResult, Stage};

/// Builds a declaration from an attribute macro invocation.
///
/// `args` are the tokens inside `#[bot(...)]`; they are re-attached to the
/// declaration as a `#[bot(...)]` attribute so configuration is read the same
/// way for both entry points.
pub fn resolve_attribute(args: TokenStream, item: &ItemImpl) -> GenerateResult<BotDeclaration> {
    if let Some((_, path, _)) = &item.trait_ {
        return Err(GenerateError::malformed(
            type_label(&item.self_ty),
            Stage::Resolve,
            path.span(),
            "#[bot] must be placed on an inherent impl block, not a trait impl",
        ));
    }

    let bot_attr: Attribute = if args.is_empty() {
        parse_quote!(#[bot])
    } else {
        parse_quote!(#[bot(#args)])
    };

    let mut decl = resolve_impl(item, "", None)?;
    decl.attrs.insert(0, bot_attr);
    Ok(decl)
}

/// Finds every bot declaration in `file`, including inside inline modules.
///
/// Each declaration resolves independently; one malformed impl block does not
/// hide the others.
pub fn resolve_file(
    file: &syn::File,
    namespace: &str,
    origin: Option<&Path>,
) -> Vec<GenerateResult<BotDeclaration>> {
    let mut found = Vec::new();
    collect_items(&file.items, namespace, origin, &mut found);
    debug!(namespace, count = found.len(), "Resolved bot declarations");
    found
}

fn collect_items(
    items: &[Item],
    namespace: &str,
    origin: Option<&Path>,
    found: &mut Vec<GenerateResult<BotDeclaration>>,
) {
    for item in items {
        match item {
            Item::Impl(item_impl) if is_candidate(item_impl) => {
                found.push(resolve_impl(item_impl, namespace, origin));
            }
            Item::Mod(module) => {
                if let Some((_, content)) = &module.content {
                    let nested = join_namespace(namespace, &module.ident.to_string());
                    collect_items(content, &nested, origin, found);
                }
            }
            _ => {}
        }
    }
}

fn is_candidate(item: &ItemImpl) -> bool {
    if item.trait_.is_some() {
        return false;
    }
    item.attrs.iter().any(|attr| is_marker(attr, BOT_ATTRIBUTE))
        || item.items.iter().any(|member| match member {
            ImplItem::Fn(method) => method
                .attrs
                .iter()
                .any(|attr| is_marker(attr, COMMAND_ATTRIBUTE)),
            _ => false,
        })
}

/// Builds a declaration from one inherent impl block.
pub fn resolve_impl(
    item: &ItemImpl,
    namespace: &str,
    origin: Option<&Path>,
) -> GenerateResult<BotDeclaration> {
    let simple_name = simple_name(&item.self_ty)?;
    if !item.generics.params.is_empty() {
        return Err(GenerateError::malformed(
            simple_name.to_string(),
            Stage::Resolve,
            item.generics.span(),
            "bot types cannot be generic",
        ));
    }

    let commands: Vec<CommandDeclaration> = item
        .items
        .iter()
        .filter_map(|member| match member {
            ImplItem::Fn(method)
                if method
                    .attrs
                    .iter()
                    .any(|attr| is_marker(attr, COMMAND_ATTRIBUTE)) =>
            {
                Some(CommandDeclaration {
                    owner: (*item.self_ty).clone(),
                    sig: method.sig.clone(),
                    docs: method
                        .attrs
                        .iter()
                        .filter(|attr| attr.path().is_ident("doc"))
                        .cloned()
                        .collect(),
                })
            }
            _ => None,
        })
        .collect();

    trace!(
        bot = %simple_name,
        namespace,
        commands = commands.len(),
        "Resolved bot declaration"
    );

    Ok(BotDeclaration {
        namespace: namespace.to_string(),
        simple_name,
        self_ty: (*item.self_ty).clone(),
        attrs: item.attrs.clone(),
        commands,
        origin: origin.map(Path::to_path_buf),
    })
}

/// Removes `#[bot]` and `#[prefix_command]` markers so the impl block can be
/// emitted again unchanged otherwise.
pub fn strip_markers(item: &mut ItemImpl) {
    item.attrs.retain(|attr| !is_marker(attr, BOT_ATTRIBUTE));
    for member in &mut item.items {
        if let ImplItem::Fn(method) = member {
            method
                .attrs
                .retain(|attr| !is_marker(attr, COMMAND_ATTRIBUTE));
        }
    }
}

/// Derives a module path from a source file path.
///
/// The path is taken relative to its last `src` directory; `lib.rs`,
/// `main.rs`, `mod.rs` and anything under `src/bin` map to their parent module.
///
/// `src/bots/greeter.rs` becomes `bots::greeter`; `src/lib.rs` becomes the
/// empty (crate root) namespace.
pub fn namespace_for_path(path: &Path) -> String {
    let parts: Vec<String> = path
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    let relative = match parts.iter().rposition(|part| part == "src") {
        Some(index) => &parts[index + 1..],
        None => parts.last().map(std::slice::from_ref).unwrap_or_default(),
    };
    if relative.first().is_some_and(|part| part == "bin") {
        return String::new();
    }

    let mut segments: Vec<&str> = relative
        .iter()
        .map(|part| part.strip_suffix(".rs").unwrap_or(part))
        .collect();
    if segments
        .last()
        .is_some_and(|last| matches!(*last, "lib" | "main" | "mod"))
    {
        segments.pop();
    }
    segments.join("::")
}

fn join_namespace(namespace: &str, module: &str) -> String {
    if namespace.is_empty() {
        module.to_string()
    } else {
        format!("{namespace}::{module}")
    }
}

fn simple_name(ty: &Type) -> GenerateResult<Ident> {
    if let Type::Path(type_path) = ty
        && type_path.qself.is_none()
        && let Some(segment) = type_path.path.segments.last()
    {
        if !segment.arguments.is_none() {
            return Err(GenerateError::malformed(
                segment.ident.to_string(),
                Stage::Resolve,
                segment.arguments.span(),
                "bot types cannot take generic arguments",
            ));
        }
        return Ok(segment.ident.clone());
    }
    Err(GenerateError::malformed(
        type_label(ty),
        Stage::Resolve,
        ty.span(),
        "bot must be a named type such as `struct Greeter`",
    ))
}

fn type_label(ty: &Type) -> String {
    ty.to_token_stream().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote::quote;

    fn parse_impl(tokens: TokenStream) -> ItemImpl {
        syn::parse2(tokens).unwrap()
    }

    #[test]
    fn test_resolve_attribute_keeps_command_order() {
        let item = parse_impl(quote! {
            impl Greeter {
                #[prefix_command]
                fn hello(&self) -> String { "hi".into() }

                fn helper(&self) {}

                #[magicord::prefix_command]
                fn bye(&self) -> String { "bye".into() }
            }
        });

        let decl = resolve_attribute(quote!(token = "abc123"), &item).unwrap();

        assert_eq!(decl.simple_name, "Greeter");
        assert_eq!(decl.namespace, "");
        let names: Vec<String> = decl.commands.iter().map(|c| c.name().to_string()).collect();
        assert_eq!(names, ["hello", "bye"]);
        assert!(is_marker(&decl.attrs[0], BOT_ATTRIBUTE));
    }

    #[test]
    fn test_resolve_attribute_rejects_trait_impl() {
        let item = parse_impl(quote! {
            impl Default for Greeter {
                fn default() -> Self { Greeter }
            }
        });

        let err = resolve_attribute(TokenStream::new(), &item).unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Resolve));
        assert!(err.to_string().contains("inherent impl block"));
    }

    #[test]
    fn test_resolve_rejects_generic_bot() {
        let item = parse_impl(quote! {
            impl Greeter<T> {
                #[prefix_command]
                fn hello(&self) -> String { "hi".into() }
            }
        });

        let err = resolve_impl(&item, "", None).unwrap_err();
        assert!(matches!(err, GenerateError::DeclarationMalformed { .. }));
    }

    #[test]
    fn test_resolve_file_finds_candidates_in_modules() {
        let file: syn::File = syn::parse2(quote! {
            #[bot(token = "a")]
            impl Greeter {
                #[prefix_command]
                fn hello(&self) -> String { "hi".into() }
            }

            impl Plain {
                fn helper(&self) {}
            }

            impl Default for Greeter {
                fn default() -> Self { Greeter }
            }

            mod admin {
                impl Moderator {
                    #[prefix_command]
                    fn kick(&self) -> String { "kicked".into() }
                }
            }
        })
        .unwrap();

        let found = resolve_file(&file, "bots", None);
        assert_eq!(found.len(), 2);

        let greeter = found[0].as_ref().unwrap();
        assert_eq!(greeter.simple_name, "Greeter");
        assert_eq!(greeter.namespace, "bots");

        let moderator = found[1].as_ref().unwrap();
        assert_eq!(moderator.simple_name, "Moderator");
        assert_eq!(moderator.namespace, "bots::admin");
        assert!(moderator.attrs.is_empty());
    }

    #[test]
    fn test_strip_markers() {
        let mut item = parse_impl(quote! {
            #[bot(token = "a")]
            impl Greeter {
                /// Says hi.
                #[prefix_command]
                fn hello(&self) -> String { "hi".into() }
            }
        });

        strip_markers(&mut item);
        let rendered = item.to_token_stream().to_string();
        assert!(!rendered.contains("prefix_command"));
        assert!(!rendered.contains("bot"));
        assert!(rendered.contains("Says hi."));
    }

    #[test]
    fn test_namespace_for_path() {
        assert_eq!(namespace_for_path(Path::new("src/lib.rs")), "");
        assert_eq!(namespace_for_path(Path::new("src/main.rs")), "");
        assert_eq!(namespace_for_path(Path::new("src/greeter.rs")), "greeter");
        assert_eq!(
            namespace_for_path(Path::new("/work/app/src/bots/greeter.rs")),
            "bots::greeter"
        );
        assert_eq!(namespace_for_path(Path::new("src/bots/mod.rs")), "bots");
        assert_eq!(namespace_for_path(Path::new("src/bin/tool.rs")), "");
        assert_eq!(namespace_for_path(Path::new("greeter.rs")), "greeter");
    }
}
