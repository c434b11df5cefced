//! Enum type generation.

use proc_macro2::TokenStream;
use quote::quote;
use vmomi_define::EnumTypeDecl;

use super::CodegenContext;
use crate::naming::{type_ident, variant_ident};

/// Generates an enum for an enum type.
///
/// Each variant is the camel-cased wire value; the wire value itself is the
/// serde and strum name, so `Display` and `FromStr` speak the wire format.
///
/// ## Examples
///
/// ```ignore
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
///          strum::Display, strum::EnumString, strum::AsRefStr, strum::EnumIter)]
/// pub enum VirtualMachinePowerState {
///     #[serde(rename = "poweredOn")]
///     #[strum(serialize = "poweredOn")]
///     PoweredOn,
///     // ...
/// }
/// ```
pub fn generate_enum(decl: &EnumTypeDecl, ctx: &CodegenContext<'_>) -> TokenStream {
    let runtime = &ctx.runtime;
    let ident = type_ident(&decl.wire_name);
    let wire_name = &decl.wire_name;
    let doc = format!(" `{}` (`{}`).", decl.qualified_name, decl.wire_name);

    let variants = decl.values.iter().map(|value| {
        let variant = variant_ident(value);
        quote! {
            #[serde(rename = #value)]
            #[strum(serialize = #value)]
            #variant,
        }
    });

    quote! {
        #[doc = #doc]
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            serde::Serialize,
            serde::Deserialize,
            strum::Display,
            strum::EnumString,
            strum::AsRefStr,
            strum::EnumIter,
        )]
        pub enum #ident {
            #(#variants)*
        }

        impl #runtime::FromDecoded for #ident {
            fn from_decoded(
                _connection: &#runtime::Connection,
                value: #runtime::Decoded,
            ) -> Result<Self, #runtime::VmomiError> {
                #runtime::construct_enum(#wire_name, value)
            }
        }
    }
}
