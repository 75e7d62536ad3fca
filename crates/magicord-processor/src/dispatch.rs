//! Dispatch-table construction.
//!
//! The dispatch unit is one `on_message` function holding a `match` over the
//! message content, with one arm per handler in declaration order:
//!
//! ```rust,ignore
//! pub fn on_message(&self, event: &::magicord::MessageCreateEvent) {
//!     match event.message_content() {
//!         "!hello" => { /* send self.hello(event) on event.channel() */ }
//!         "!bye" => { /* ... */ }
//!         _ => {}
//!     }
//! }
//! ```
//!
//! Content that matches no key sends nothing. Duplicate keys are kept as
//! separate arms; Rust's first-match semantics make only the first reachable.

use std::collections::HashSet;

use proc_macro2::{Ident, Span, TokenStream};
use quote::{ToTokens, quote};
use tracing::{debug, warn};

use crate::handler::HandlerUnit;
use crate::runtime_path;

/// Name of the generated dispatch function.
pub const DISPATCH_FN: &str = "on_message";

/// One `"key" => handler` arm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchArm {
    /// Message content that selects the arm.
    pub key: String,
    /// Handler invoked by the arm.
    pub handler: Ident,
}

/// The synthesized dispatch function.
#[derive(Debug, Clone)]
pub struct DispatchUnit {
    /// Function name.
    pub name: Ident,
    /// Arms in match order.
    pub arms: Vec<DispatchArm>,
}

impl DispatchUnit {
    /// The arm the generated `match` would take for `content`, if any.
    pub fn route(&self, content: &str) -> Option<&DispatchArm> {
        self.arms.iter().find(|arm| arm.key == content)
    }

    /// Dispatch keys in match order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.arms.iter().map(|arm| arm.key.as_str())
    }

    /// Keys that appear more than once, each reported once, in match order.
    pub fn duplicate_keys(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        self.keys()
            .filter(|key| !seen.insert(*key) && reported.insert(*key))
            .collect()
    }
}

/// Builds the dispatch function for `handlers`, preserving their order.
pub fn build_dispatch(handlers: &[HandlerUnit]) -> DispatchUnit {
    let unit = DispatchUnit {
        name: Ident::new(DISPATCH_FN, Span::call_site()),
        arms: handlers
            .iter()
            .map(|handler| DispatchArm {
                key: handler.dispatch_key(),
                handler: handler.name.clone(),
            })
            .collect(),
    };

    for key in unit.duplicate_keys() {
        warn!(key, "Duplicate command key; only the first handler is reachable");
    }
    debug!(arms = unit.arms.len(), "Built dispatch table");

    unit
}

impl ToTokens for DispatchUnit {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let rt = runtime_path();
        let name = &self.name;

        let arms = self.arms.iter().map(|DispatchArm { key, handler }| {
            quote! {
                #key => {
                    if let ::core::result::Result::Err(err) =
                        event.channel().send_message(self.#handler(event))
                    {
                        #rt::__private::tracing::error!(
                            command = #key,
                            error = %err,
                            "Failed to send reply"
                        );
                    }
                }
            }
        });

        let allow_duplicates = if self.duplicate_keys().is_empty() {
            quote!()
        } else {
            quote!(#[allow(unreachable_patterns)])
        };

        tokens.extend(quote! {
            /// Routes an inbound message to the matching command handler.
            #allow_duplicates
            pub fn #name(&self, event: &#rt::MessageCreateEvent) {
                match event.message_content() {
                    #(#arms)*
                    _ => {}
                }
            }
        });
    }
}
