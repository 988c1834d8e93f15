use std::sync::Mutex;

use file_local_ns::{CompilationUnit, Inclusion};
use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::{Attribute, Ident, Item, Meta, Result, Token, Visibility};

/// One unit per compiler invocation: rustc loads the macro once per crate.
static UNIT: Mutex<Option<CompilationUnit>> = Mutex::new(None);

struct NamespaceInput {
    /// `#![no_shorthand]`
    no_shorthand: bool,
    /// `as name;`
    alias: Option<Ident>,
    items: Vec<Item>,
}

impl Parse for NamespaceInput {
    fn parse(input: ParseStream) -> Result<Self> {
        let no_shorthand = parse_inner_attrs(input)?;

        let alias = if input.peek(Token![as]) {
            input.parse::<Token![as]>()?;
            let alias: Ident = input.parse()?;
            input.parse::<Token![;]>()?;
            Some(alias)
        } else {
            None
        };

        let mut items = Vec::new();
        while !input.is_empty() {
            items.push(input.parse()?);
        }

        Ok(Self {
            no_shorthand,
            alias,
            items,
        })
    }
}

/// Accepts only `#![no_shorthand]`.
fn parse_inner_attrs(input: ParseStream) -> Result<bool> {
    let mut no_shorthand = false;
    for attr in input.call(Attribute::parse_inner)? {
        match &attr.meta {
            Meta::Path(path) if path.is_ident("no_shorthand") => no_shorthand = true,
            _ => {
                return Err(syn::Error::new_spanned(
                    attr,
                    "unsupported attribute: expected `#![no_shorthand]`",
                ));
            }
        }
    }
    Ok(no_shorthand)
}

// =============================================================================
// Code generation
// =============================================================================

/// `use` items without a visibility become `pub use` so the alias can reach them.
fn export_items(items: &[Item]) -> Vec<Item> {
    items
        .iter()
        .cloned()
        .map(|item| match item {
            Item::Use(mut item_use) if matches!(item_use.vis, Visibility::Inherited) => {
                item_use.vis = syn::parse_quote!(pub);
                Item::Use(item_use)
            }
            other => other,
        })
        .collect()
}

/// Emit the module for one inclusion.
///
/// ```ignore
/// file_local_namespace! {
///     as fln;
///     use std::time::*;
/// }
///
/// // Generates:
/// #[allow(non_snake_case, unused_imports)]
/// mod File_Local_Namespace_0000001010 {
///     pub use std::time::*;
///
///     #[doc(hidden)]
///     pub fn __fln_len() -> usize { ::std::string::String::new().len() }
///     #[doc(hidden)]
///     pub const fn __fln_counter() -> u64 { 10 }
/// }
/// #[allow(unused_imports)]
/// use File_Local_Namespace_0000001010 as FLN;
/// #[allow(unused_imports)]
/// use File_Local_Namespace_0000001010 as fln;
/// ```
fn generate_namespace(inclusion: &Inclusion, input: &NamespaceInput) -> Result<TokenStream2> {
    let module = Ident::new(inclusion.identifier.as_str(), Span::call_site());
    let items = export_items(&input.items);
    let len_body: syn::Expr = syn::parse_str(inclusion.fallback.source())?;
    let counter = inclusion.base;

    let shorthand = inclusion.shorthand.as_ref().map(|s| s.alias.as_str());
    let shorthand_alias = match shorthand {
        Some(alias) => {
            let alias = Ident::new(alias, Span::call_site());
            quote! {
                #[allow(unused_imports)]
                use #module as #alias;
            }
        }
        None => quote! {},
    };

    let explicit_alias = match &input.alias {
        Some(alias) if Some(alias.to_string().as_str()) != shorthand => quote! {
            #[allow(unused_imports)]
            use #module as #alias;
        },
        _ => quote! {},
    };

    Ok(quote! {
        #[allow(non_snake_case, unused_imports)]
        mod #module {
            #(#items)*

            #[doc(hidden)]
            #[allow(dead_code)]
            pub fn __fln_len() -> usize {
                #len_body
            }

            #[doc(hidden)]
            #[allow(dead_code)]
            pub const fn __fln_counter() -> u64 {
                #counter
            }
        }

        #shorthand_alias
        #explicit_alias
    })
}

fn expand(input: NamespaceInput) -> Result<TokenStream2> {
    let mut guard = UNIT.lock().map_err(|_| {
        syn::Error::new(Span::call_site(), "file-local-ns: counter state is poisoned")
    })?;
    let unit = guard.get_or_insert_with(CompilationUnit::default);

    let to_syn = |err: file_local_ns::Error| {
        syn::Error::new(Span::call_site(), format!("file-local-ns: {}", err))
    };

    if input.no_shorthand {
        unit.set_suppress_shorthand(true).map_err(to_syn)?;
    }
    let inclusion = unit.include().map_err(to_syn)?;

    generate_namespace(&inclusion, &input)
}

// =============================================================================
// Entry point
// =============================================================================

/// Declare a private module under a freshly minted name and alias it.
///
/// Every invocation in a crate gets a different module name, so each module
/// of a crate can carry its own invocation, re-exporting what it needs:
///
/// ```ignore
/// mod timing {
///     file_local_namespace! {
///         use std::time::*;
///     }
///
///     pub fn three_seconds() -> FLN::Duration {
///         FLN::Duration::from_millis(3000)
///     }
/// }
/// ```
///
/// - `use` items without a visibility are re-exported (`pub use`).
/// - Paths are resolved from the generated module: reach siblings with
///   `super::` or `crate::`.
/// - The shorthand `FLN` is bound to the module unless `#![no_shorthand]` is
///   given before the first invocation in the crate.
/// - `as name;` binds an extra alias.
///
/// The shorthand is an ordinary `use` binding, so one module holds at most
/// one invocation that binds it:
///
/// ```compile_fail
/// use file_local_ns_macro::file_local_namespace;
///
/// file_local_namespace! { use std::time::*; }
/// file_local_namespace! { use std::fmt::*; } // `FLN` defined twice
/// # fn main() {}
/// ```
///
/// To put several invocations in one module, suppress the shorthand and give
/// each an alias:
///
/// ```ignore
/// file_local_namespace! {
///     #![no_shorthand]
///     as time;
///     use std::time::*;
/// }
/// file_local_namespace! {
///     as text;
///     use std::fmt::*;
/// }
/// ```
///
/// Up to 102 invocations per crate are collision-free without any
/// re-advance; a collision that cannot be stepped around is a compile error.
#[proc_macro]
pub fn file_local_namespace(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as NamespaceInput);
    match expand(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
