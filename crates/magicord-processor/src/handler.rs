//! Command-handler synthesis.
//!
//! Each `#[prefix_command]` method becomes one handler on the generated unit:
//!
//! ```rust,ignore
//! // source
//! #[prefix_command]
//! fn hello(&self, event: &MessageCreateEvent) -> String { ... }
//!
//! // generated
//! fn hello(&self, event: &::magicord::MessageCreateEvent) -> String {
//!     self.bot.hello(event)
//! }
//! ```
//!
//! The handler does not copy the method body; it calls the method on the
//! owned bot instance, so the command logic keeps access to the bot's fields.

use proc_macro2::{Ident, TokenStream};
use quote::{ToTokens, quote};
use syn::spanned::Spanned;
use syn::{Attribute, FnArg, ReturnType, Type};
use tracing::trace;

use crate::declaration::{COMMAND_PREFIX, CommandDeclaration};
use crate::error::{GenerateError, GenerateResult, Stage};
use crate::runtime_path;

/// Member names the generated unit defines itself.
const RESERVED_NAMES: &[&str] = &["new", "bot", "run", "run_with", "on_message", "default"];

/// How a handler reaches the command method.
#[derive(Debug, Clone)]
pub enum Delegate {
    /// `self.bot.name(..)`: the method takes `&self`.
    Instance,
    /// `<Owner>::name(..)`: the method has no receiver.
    Associated(Type),
}

/// A synthesized handler function.
#[derive(Debug, Clone)]
pub struct HandlerUnit {
    /// Function name, identical to the command method name.
    pub name: Ident,
    /// How the command method is invoked.
    pub delegate: Delegate,
    /// Whether the command method takes the inbound event.
    pub forwards_event: bool,
    /// Return type of the command method; its value becomes the reply.
    pub output: ReturnType,
    /// Doc attributes carried over from the command method.
    pub docs: Vec<Attribute>,
}

impl HandlerUnit {
    /// The message content that selects this handler.
    pub fn dispatch_key(&self) -> String {
        format!("{COMMAND_PREFIX}{}", self.name)
    }
}

/// Synthesizes the handler for one command method.
pub fn synthesize(command: &CommandDeclaration) -> GenerateResult<HandlerUnit> {
    let sig = &command.sig;
    let name = command.name();
    let malformed = |span, message: &str| {
        GenerateError::malformed(
            owner_label(&command.owner),
            Stage::Synthesize,
            span,
            format!("command `{name}`: {message}"),
        )
    };

    if RESERVED_NAMES.iter().any(|reserved| name == reserved) {
        return Err(malformed(
            name.span(),
            "this name is reserved for a generated member",
        ));
    }
    if let Some(asyncness) = &sig.asyncness {
        return Err(malformed(
            asyncness.span(),
            "async command handlers are not supported",
        ));
    }
    if !sig.generics.params.is_empty() {
        return Err(malformed(
            sig.generics.span(),
            "command handlers cannot be generic",
        ));
    }
    if let Some(unsafety) = &sig.unsafety {
        return Err(malformed(
            unsafety.span(),
            "command handlers cannot be unsafe",
        ));
    }
    if let Some(abi) = &sig.abi {
        return Err(malformed(abi.span(), "command handlers cannot declare an ABI"));
    }
    if let Some(variadic) = &sig.variadic {
        return Err(malformed(
            variadic.span(),
            "command handlers cannot be variadic",
        ));
    }
    match &sig.output {
        ReturnType::Default => {
            return Err(malformed(
                sig.paren_token.span.close(),
                "command handlers must return the reply text",
            ));
        }
        ReturnType::Type(_, ty) if matches!(&**ty, Type::Tuple(unit) if unit.elems.is_empty()) => {
            return Err(malformed(
                ty.span(),
                "command handlers must return the reply text",
            ));
        }
        ReturnType::Type(..) => {}
    }

    let mut inputs = sig.inputs.iter().peekable();
    let delegate = match inputs.peek() {
        Some(FnArg::Receiver(receiver)) => {
            if receiver.reference.is_none()
                || receiver.mutability.is_some()
                || receiver.colon_token.is_some()
            {
                return Err(malformed(
                    receiver.span(),
                    "command handlers must take `&self`",
                ));
            }
            inputs.next();
            Delegate::Instance
        }
        _ => Delegate::Associated(command.owner.clone()),
    };

    let params: Vec<&FnArg> = inputs.collect();
    if params.len() > 1 {
        return Err(malformed(
            params[1].span(),
            "command handlers take at most one parameter, the inbound message event",
        ));
    }
    if let Some(param) = params.first() {
        let by_shared_ref = match param {
            FnArg::Typed(typed) => {
                matches!(&*typed.ty, Type::Reference(reference) if reference.mutability.is_none())
            }
            FnArg::Receiver(_) => false,
        };
        if !by_shared_ref {
            return Err(malformed(
                param.span(),
                "the parameter must be the inbound message event, `&MessageCreateEvent`",
            ));
        }
    }

    trace!(command = %name, "Synthesized handler");

    Ok(HandlerUnit {
        name: name.clone(),
        delegate,
        forwards_event: !params.is_empty(),
        output: sig.output.clone(),
        docs: command.docs.clone(),
    })
}

impl ToTokens for HandlerUnit {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let rt = runtime_path();
        let HandlerUnit {
            name,
            delegate,
            forwards_event,
            output,
            docs,
        } = self;

        let (param, args) = if *forwards_event {
            (quote!(event), quote!(event))
        } else {
            (quote!(_event), quote!())
        };
        let call = match delegate {
            Delegate::Instance => quote!(self.bot.#name(#args)),
            Delegate::Associated(owner) => quote!(<#owner>::#name(#args)),
        };

        tokens.extend(quote! {
            #(#docs)*
            fn #name(&self, #param: &#rt::MessageCreateEvent) #output {
                #call
            }
        });
    }
}

fn owner_label(owner: &Type) -> String {
    owner.to_token_stream().to_string()
}
