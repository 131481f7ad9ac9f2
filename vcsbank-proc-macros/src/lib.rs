extern crate proc_macro;

use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::Data::Enum;
use syn::{DeriveInput, Expr, ExprLit, Lit, Meta, Variant};

/// Returns the mnemonic for a variant: the string in `#[mnemonic = "..."]` if present, otherwise
/// the variant name.
fn variant_mnemonic(variant: &Variant) -> String {
    for attr in &variant.attrs {
        if !attr.path().is_ident("mnemonic") {
            continue;
        }

        let Meta::NameValue(name_value) = &attr.meta else {
            panic!("mnemonic attribute must have the form #[mnemonic = \"...\"]");
        };

        let Expr::Lit(ExprLit { lit: Lit::Str(lit_str), .. }) = &name_value.value else {
            panic!("mnemonic attribute value must be a string literal");
        };

        return lit_str.value();
    }

    variant.ident.to_string()
}

/// Implement `std::fmt::Display`, `std::str::FromStr`, `serde::Serialize` and
/// `serde::Deserialize` for a fieldless enum, using each variant's mnemonic as its string form.
///
/// A variant's mnemonic defaults to its name and can be overridden with
/// `#[mnemonic = "0840"]`, which allows names that are not valid Rust identifiers. Parsing is
/// case-insensitive and accepts either the mnemonic or the variant name. An associated constant
/// `ALL` lists every variant in declaration order.
#[proc_macro_derive(SchemeMnemonic, attributes(mnemonic))]
pub fn scheme_mnemonic(input: TokenStream) -> TokenStream {
    let ast: DeriveInput = syn::parse(input).expect("unable to parse input");

    let name = &ast.ident;

    let Enum(data) = &ast.data else {
        panic!("SchemeMnemonic derive macro can only be applied to enums; {name} is not an enum")
    };

    let mut display_arms = Vec::new();
    let mut from_str_arms = Vec::new();
    let mut all_variants = Vec::new();

    for variant in &data.variants {
        let variant_name = &variant.ident;
        if !variant.fields.is_empty() {
            panic!("SchemeMnemonic macro only supports fieldless variants; {name}::{variant_name} has fields");
        }

        let mnemonic = variant_mnemonic(variant);
        let mnemonic_lowercase = mnemonic.to_ascii_lowercase();
        let name_lowercase = variant_name.to_string().to_ascii_lowercase();

        display_arms.push(quote! {
            Self::#variant_name => write!(f, #mnemonic)
        });

        if mnemonic_lowercase == name_lowercase {
            from_str_arms.push(quote! {
                #mnemonic_lowercase => Ok(Self::#variant_name)
            });
        } else {
            from_str_arms.push(quote! {
                #mnemonic_lowercase | #name_lowercase => Ok(Self::#variant_name)
            });
        }

        all_variants.push(quote! { Self::#variant_name });
    }

    let err_fmt_string = format!("invalid {name} mnemonic: '{{}}'");
    let visitor_struct_name = format_ident!("__{}MnemonicVisitor", name);
    let expecting_fmt_string = format!("a string naming a {name}");

    let gen = quote! {
        impl #name {
            pub const ALL: &'static [Self] = &[#(#all_variants,)*];
        }

        impl std::fmt::Display for #name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    #(#display_arms,)*
                }
            }
        }

        impl std::str::FromStr for #name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_ascii_lowercase().as_str() {
                    #(#from_str_arms,)*
                    _ => Err(format!(#err_fmt_string, s))
                }
            }
        }

        impl serde::Serialize for #name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.collect_str(self)
            }
        }

        struct #visitor_struct_name;

        impl<'de> serde::de::Visitor<'de> for #visitor_struct_name {
            type Value = #name;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(formatter, #expecting_fmt_string)
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                v.parse().map_err(serde::de::Error::custom)
            }
        }

        impl<'de> serde::Deserialize<'de> for #name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                deserializer.deserialize_str(#visitor_struct_name)
            }
        }
    };

    gen.into()
}
