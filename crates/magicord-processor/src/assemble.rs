//! Bot-unit assembly.
//!
//! # Configuration: `#[bot(...)]`
//!
//! | Key | Example | Description |
//! |-----|---------|-------------|
//! | `token` | `"abc123"` | Token embedded in the generated `run` |
//! | `token_env` | `"DISCORD_TOKEN"` | Environment variable read by `run` at startup |
//!
//! Exactly one of `token` and `token_env` is required.
//!
//! # Generated unit
//!
//! ```rust,ignore
//! pub struct MagicordGreeter { bot: Greeter }
//!
//! impl MagicordGreeter {
//!     pub fn new() -> Self;
//!     pub fn bot(&self) -> &Greeter;
//!     pub async fn run(self) -> ClientResult<Client>;
//!     pub async fn run_with(self, builder: ClientBuilder) -> ClientResult<Client>;
//!     fn hello(&self, event: &MessageCreateEvent) -> String;   // one per command
//!     pub fn on_message(&self, event: &MessageCreateEvent);
//! }
//! ```

use std::path::PathBuf;

use proc_macro2::{Ident, Span, TokenStream};
use quote::{ToTokens, quote};
use syn::spanned::Spanned;
use syn::{LitStr, Meta, Type};
use tracing::debug;

use crate::declaration::{BOT_ATTRIBUTE, BotDeclaration, is_marker};
use crate::dispatch::DispatchUnit;
use crate::error::{GenerateError, GenerateResult, Stage};
use crate::handler::HandlerUnit;
use crate::runtime_path;

/// Where the generated `run` gets its token from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    /// A token embedded in the generated code.
    Literal(String),
    /// An environment variable read when the bot starts.
    Env(String),
}

/// Configuration read from `#[bot(...)]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotConfig {
    /// Authentication token source.
    pub token: TokenSource,
}

/// The assembled unit, ready to be rendered.
#[derive(Debug, Clone)]
pub struct BotUnit {
    /// Module path the unit belongs in (same as the declaration).
    pub namespace: String,
    /// Generated type name.
    pub name: Ident,
    /// The bot type's simple name.
    pub source_name: Ident,
    /// The bot type; owned by the unit as its `bot` field.
    pub source_ty: Type,
    /// Startup configuration.
    pub config: BotConfig,
    /// Command handlers, in declaration order.
    pub handlers: Vec<HandlerUnit>,
    /// The dispatch function.
    pub dispatch: DispatchUnit,
    /// File the declaration came from.
    pub origin: Option<PathBuf>,
}

/// Reads the bot configuration from the declaration's attributes.
pub fn read_bot_config(decl: &BotDeclaration) -> GenerateResult<BotConfig> {
    let declaration = decl.name();
    let attr = decl
        .attrs
        .iter()
        .find(|attr| is_marker(attr, BOT_ATTRIBUTE))
        .ok_or_else(|| GenerateError::ConfigurationMissing {
            declaration: declaration.clone(),
            span: decl.simple_name.span().into(),
        })?;

    let mut token: Option<LitStr> = None;
    let mut token_env: Option<LitStr> = None;

    match &attr.meta {
        Meta::Path(_) => {}
        Meta::List(_) => {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("token") {
                    token = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("token_env") {
                    token_env = Some(meta.value()?.parse()?);
                } else {
                    return Err(meta.error("unknown #[bot] argument; expected `token` or `token_env`"));
                }
                Ok(())
            })
            .map_err(|err| {
                GenerateError::malformed(&declaration, Stage::Assemble, err.span(), err.to_string())
            })?;
        }
        Meta::NameValue(name_value) => {
            return Err(GenerateError::malformed(
                &declaration,
                Stage::Assemble,
                name_value.span(),
                "expected #[bot(token = \"...\")]",
            ));
        }
    }

    let token = match (token, token_env) {
        (Some(literal), None) => TokenSource::Literal(literal.value()),
        (None, Some(var)) => TokenSource::Env(var.value()),
        (Some(_), Some(var)) => {
            return Err(GenerateError::malformed(
                &declaration,
                Stage::Assemble,
                var.span(),
                "specify either `token` or `token_env`, not both",
            ));
        }
        (None, None) => {
            return Err(GenerateError::ConfigurationArgumentMissing {
                declaration,
                argument: "token",
                span: attr.span().into(),
            });
        }
    };

    Ok(BotConfig { token })
}

/// Assembles the generated unit for `decl`.
pub fn assemble(
    decl: &BotDeclaration,
    dispatch: DispatchUnit,
    handlers: Vec<HandlerUnit>,
) -> GenerateResult<BotUnit> {
    let config = read_bot_config(decl)?;
    let name = decl.unit_name();
    debug!(unit = %name, handlers = handlers.len(), "Assembled bot unit");

    Ok(BotUnit {
        namespace: decl.namespace.clone(),
        name,
        source_name: decl.simple_name.clone(),
        source_ty: decl.self_ty.clone(),
        config,
        handlers,
        dispatch,
        origin: decl.origin.clone(),
    })
}

impl BotUnit {
    fn token_expr(&self) -> TokenStream {
        let rt = runtime_path();
        match &self.config.token {
            TokenSource::Literal(token) => {
                let literal = LitStr::new(token, Span::call_site());
                quote!(#literal)
            }
            TokenSource::Env(var) => quote! {
                ::std::env::var(#var).map_err(|_| #rt::ClientError::TokenEnv {
                    var: ::std::string::String::from(#var),
                })?
            },
        }
    }
}

impl ToTokens for BotUnit {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let rt = runtime_path();
        let BotUnit {
            name,
            source_name,
            source_ty,
            handlers,
            dispatch,
            ..
        } = self;
        let unit_label = name.to_string();
        let struct_doc = format!(" Dispatcher generated by Magicord for [`{source_name}`].");
        let token = self.token_expr();

        tokens.extend(quote! {
            #[doc = #struct_doc]
            pub struct #name {
                bot: #source_ty,
            }

            impl #name {
                /// Creates the dispatcher around a default-constructed bot.
                pub fn new() -> Self {
                    Self {
                        bot: <#source_ty as ::core::default::Default>::default(),
                    }
                }

                /// The wrapped bot instance.
                pub fn bot(&self) -> &#source_ty {
                    &self.bot
                }

                /// Logs in through the installed gateway and starts dispatching commands.
                pub async fn run(self) -> #rt::ClientResult<#rt::Client> {
                    self.run_with(#rt::ClientBuilder::new()).await
                }

                /// Logs in through `builder` and starts dispatching commands.
                pub async fn run_with(
                    self,
                    builder: #rt::ClientBuilder,
                ) -> #rt::ClientResult<#rt::Client> {
                    #rt::__private::tracing::info!(bot = #unit_label, "Running a bot");
                    let token = #token;
                    let this = ::std::sync::Arc::new(self);
                    builder
                        .set_token(token)
                        .add_message_create_listener(move |event| this.on_message(event))
                        .login()
                        .await
                }

                #(#handlers)*

                #dispatch
            }

            impl ::core::default::Default for #name {
                fn default() -> Self {
                    Self::new()
                }
            }
        });
    }
}
