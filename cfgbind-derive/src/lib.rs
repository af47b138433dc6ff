//! Derive macro for the cfgbind configuration binder
//!
//! This crate provides `#[derive(ConfigSchema)]`, which generates the field
//! tree that cfgbind walks into flags and decodes settings against.
//!
//! # Usage
//!
//! ```text
//! use cfgbind::DeriveConfigSchema;
//!
//! #[derive(DeriveConfigSchema, Default, Serialize, Deserialize)]
//! struct Database {
//!     #[config(name = "max-conns", description = "Connection pool size", short = 'm')]
//!     max_conns: u32,
//!
//!     #[config(name = "url")]
//!     url: String,
//! }
//! ```

use proc_macro::TokenStream;
use quote::quote;
use syn::{
    Attribute, Data, DeriveInput, Expr, Fields, Lit, Meta, Type, parse_macro_input,
    punctuated::Punctuated,
};

/// Rust integer types bound as `int` flags
const INT_TYPES: &[&str] = &[
    "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32", "u64", "u128", "usize",
];

/// Single-identifier types that are not configuration structs
const SCALAR_TYPES: &[&str] = &[
    "f32",
    "f64",
    "char",
    "str",
    "PathBuf",
    "OsString",
    "Duration",
    "SystemTime",
    "IpAddr",
    "Ipv4Addr",
    "Ipv6Addr",
    "SocketAddr",
];

/// Derive macro for generating `ConfigSchema` implementations.
///
/// # Field attributes (`#[config(...)]`)
/// - `name = "..."` - Configuration name; flags, env vars and file keys are
///   built from it. Fields without a name (or named `"-"`) are not bound;
///   nested structs without a name are flattened into their parent.
/// - `description = "..."` - Flag help text
/// - `short = 'x'` - Single-character flag alias
/// - `skip` - Leave the field out of the schema entirely
///
/// `#[serde(rename = "...")]` on a field and `#[serde(rename_all = "...")]`
/// on the struct are honoured when decoding, so keys match the serialized
/// field names.
///
/// `String`, `bool` and the integer types become flags. Any other plain type
/// name is treated as a nested struct and must implement `ConfigSchema`
/// itself. Everything else (floats, `Vec<T>`, `Option<T>`, ...) is
/// rejected when flags are initialised, unless the field is unnamed.
#[proc_macro_derive(ConfigSchema, attributes(config))]
pub fn derive_config_schema(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "ConfigSchema can only be derived for structs with named fields.\n\nExample:\n  #[derive(ConfigSchema)]\n  struct AppConfig {\n      #[config(name = \"debug\")]\n      debug: bool,\n  }",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "ConfigSchema can only be derived for structs.\n\nTry: #[derive(ConfigSchema)] on a struct, not an enum or union.",
            ));
        }
    };

    let rename_all = parse_rename_all(&input.attrs)?;
    let mut entries = Vec::new();

    for field in fields {
        let attrs = parse_field_attrs(&field.attrs)?;
        if attrs.skip {
            continue;
        }

        let Some(field_ident) = field.ident.as_ref() else {
            continue;
        };
        let key = serde_rename(&field.attrs).unwrap_or_else(|| {
            let ident = field_ident.to_string();
            let ident = ident.trim_start_matches("r#");
            match rename_all {
                Some(rule) => rule.apply_to_field(ident),
                None => ident.to_string(),
            }
        });
        let name = attrs.name.unwrap_or_default();
        let kind = field_kind(&field.ty);

        let description = attrs
            .description
            .map(|desc| quote! { .description(#desc) });
        let short = attrs.short.map(|c| quote! { .short(#c) });

        entries.push(quote! {
            ::cfgbind::Field::new(#key, #name, #kind) #description #short
        });
    }

    Ok(quote! {
        impl #impl_generics ::cfgbind::ConfigSchema for #ident #ty_generics #where_clause {
            fn fields() -> ::std::vec::Vec<::cfgbind::Field> {
                ::std::vec![#(#entries),*]
            }
        }
    })
}

/// Field-level attributes from #[config(...)]
#[derive(Default)]
struct FieldAttrs {
    name: Option<String>,
    description: Option<String>,
    short: Option<char>,
    skip: bool,
}

fn parse_field_attrs(attrs: &[Attribute]) -> syn::Result<FieldAttrs> {
    let mut result = FieldAttrs::default();

    for attr in attrs.iter().filter(|a| a.path().is_ident("config")) {
        let nested = attr.parse_args_with(Punctuated::<Meta, syn::Token![,]>::parse_terminated)?;
        for meta in nested {
            match meta {
                Meta::Path(path) if path.is_ident("skip") => result.skip = true,
                Meta::NameValue(nv) if nv.path.is_ident("name") => {
                    result.name = Some(string_literal(&nv.value, "name = \"max-conns\"")?);
                }
                Meta::NameValue(nv) if nv.path.is_ident("description") => {
                    result.description =
                        Some(string_literal(&nv.value, "description = \"Help text\"")?);
                }
                Meta::NameValue(nv) if nv.path.is_ident("short") => {
                    result.short = Some(short_literal(&nv.value)?);
                }
                other => {
                    return Err(syn::Error::new_spanned(
                        other,
                        "unknown #[config] attribute; expected `name`, `description`, `short` or `skip`",
                    ));
                }
            }
        }
    }

    Ok(result)
}

fn string_literal(value: &Expr, example: &str) -> syn::Result<String> {
    if let Expr::Lit(lit) = value {
        if let Lit::Str(s) = &lit.lit {
            return Ok(s.value());
        }
    }
    Err(syn::Error::new_spanned(
        value,
        format!("expected a string literal.\n\nExample: #[config({example})]"),
    ))
}

fn short_literal(value: &Expr) -> syn::Result<char> {
    let short = match value {
        Expr::Lit(lit) => match &lit.lit {
            Lit::Char(c) => Some(c.value()),
            Lit::Str(s) => {
                let text = s.value();
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(c),
                    _ => None,
                }
            }
            _ => None,
        },
        _ => None,
    };

    short.ok_or_else(|| {
        syn::Error::new_spanned(
            value,
            "#[config(short)] must be a single character.\n\nExample: #[config(short = 'p')]",
        )
    })
}

/// `rename = "..."` from the field's #[serde(...)] attributes
fn serde_rename(attrs: &[Attribute]) -> Option<String> {
    attrs
        .iter()
        .filter(|a| a.path().is_ident("serde"))
        .filter_map(|a| {
            a.parse_args_with(Punctuated::<Meta, syn::Token![,]>::parse_terminated)
                .ok()
        })
        .flatten()
        .find_map(|meta| match meta {
            Meta::NameValue(nv) if nv.path.is_ident("rename") => match &nv.value {
                Expr::Lit(lit) => match &lit.lit {
                    Lit::Str(s) => Some(s.value()),
                    _ => None,
                },
                _ => None,
            },
            _ => None,
        })
}

/// Case conventions accepted by `#[serde(rename_all = "...")]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RenameRule {
    Lower,
    Upper,
    Pascal,
    Camel,
    Snake,
    ScreamingSnake,
    Kebab,
    ScreamingKebab,
}

impl RenameRule {
    fn parse(rule: &str) -> Option<Self> {
        Some(match rule {
            "lowercase" => Self::Lower,
            "UPPERCASE" => Self::Upper,
            "PascalCase" => Self::Pascal,
            "camelCase" => Self::Camel,
            "snake_case" => Self::Snake,
            "SCREAMING_SNAKE_CASE" => Self::ScreamingSnake,
            "kebab-case" => Self::Kebab,
            "SCREAMING-KEBAB-CASE" => Self::ScreamingKebab,
            _ => return None,
        })
    }

    /// Rename a snake_case field identifier the way serde does
    fn apply_to_field(self, field: &str) -> String {
        match self {
            Self::Lower | Self::Snake => field.to_string(),
            Self::Upper | Self::ScreamingSnake => field.to_ascii_uppercase(),
            Self::Pascal => {
                let mut pascal = String::new();
                let mut capitalize = true;
                for ch in field.chars() {
                    if ch == '_' {
                        capitalize = true;
                    } else if capitalize {
                        pascal.push(ch.to_ascii_uppercase());
                        capitalize = false;
                    } else {
                        pascal.push(ch);
                    }
                }
                pascal
            }
            Self::Camel => {
                let pascal = Self::Pascal.apply_to_field(field);
                let mut chars = pascal.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
                    None => pascal,
                }
            }
            Self::Kebab => field.replace('_', "-"),
            Self::ScreamingKebab => Self::ScreamingSnake.apply_to_field(field).replace('_', "-"),
        }
    }
}

/// `rename_all` from the container's #[serde(...)] attributes
///
/// The `rename_all(serialize = "...", deserialize = "...")` form is accepted
/// when both sides agree, since decoding round-trips through both.
fn parse_rename_all(attrs: &[Attribute]) -> syn::Result<Option<RenameRule>> {
    let mut rule = None;

    for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
        let Ok(nested) =
            attr.parse_args_with(Punctuated::<Meta, syn::Token![,]>::parse_terminated)
        else {
            continue;
        };
        for meta in nested {
            match meta {
                Meta::NameValue(nv) if nv.path.is_ident("rename_all") => {
                    rule = Some(rename_rule(&nv.value)?);
                }
                Meta::List(list) if list.path.is_ident("rename_all") => {
                    let sides = list.parse_args_with(
                        Punctuated::<syn::MetaNameValue, syn::Token![,]>::parse_terminated,
                    )?;
                    let mut rules = Vec::new();
                    for side in &sides {
                        if !side.path.is_ident("serialize") && !side.path.is_ident("deserialize") {
                            return Err(syn::Error::new_spanned(
                                &side.path,
                                "expected `serialize` or `deserialize` in rename_all(...)",
                            ));
                        }
                        rules.push(rename_rule(&side.value)?);
                    }
                    if rules.windows(2).any(|pair| pair[0] != pair[1]) {
                        return Err(syn::Error::new_spanned(
                            list,
                            "ConfigSchema needs the same rename_all rule for serialize and deserialize",
                        ));
                    }
                    if let Some(first) = rules.first() {
                        rule = Some(*first);
                    }
                }
                _ => {}
            }
        }
    }

    Ok(rule)
}

fn rename_rule(value: &Expr) -> syn::Result<RenameRule> {
    let text = match value {
        Expr::Lit(lit) => match &lit.lit {
            Lit::Str(s) => Some(s.value()),
            _ => None,
        },
        _ => None,
    };

    text.as_deref().and_then(RenameRule::parse).ok_or_else(|| {
        syn::Error::new_spanned(
            value,
            "unknown rename_all rule; expected one of \"lowercase\", \"UPPERCASE\", \"PascalCase\", \"camelCase\", \"snake_case\", \"SCREAMING_SNAKE_CASE\", \"kebab-case\", \"SCREAMING-KEBAB-CASE\"",
        )
    })
}

/// Map a Rust type to its `FieldKind` constructor
///
/// Paths are classified by their last segment, so `std::string::String` and
/// `core::primitive::u32` bind like `String` and `u32`. Generic types are
/// never nested structs.
fn field_kind(ty: &Type) -> proc_macro2::TokenStream {
    if let Type::Path(path) = ty {
        let last = path.path.segments.last();
        if let (None, Some(segment)) = (&path.qself, last) {
            if segment.arguments.is_none() {
                let name = segment.ident.to_string();
                match name.as_str() {
                    "String" => return quote! { ::cfgbind::FieldKind::String },
                    "bool" => return quote! { ::cfgbind::FieldKind::Bool },
                    n if INT_TYPES.contains(&n) => return quote! { ::cfgbind::FieldKind::Int },
                    n if SCALAR_TYPES.contains(&n) => {}
                    _ => return quote! { ::cfgbind::FieldKind::nested::<#ty>() },
                }
            }
        }
    }

    let type_name = quote!(#ty).to_string().replace(' ', "");
    quote! { ::cfgbind::FieldKind::Unsupported(#type_name) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind_of(ty: &str) -> String {
        let ty: Type = syn::parse_str(ty).unwrap();
        field_kind(&ty).to_string().replace(' ', "")
    }

    #[test]
    fn test_rename_rules_match_serde() {
        let cases = [
            (RenameRule::Lower, "max_conns"),
            (RenameRule::Upper, "MAX_CONNS"),
            (RenameRule::Pascal, "MaxConns"),
            (RenameRule::Camel, "maxConns"),
            (RenameRule::Snake, "max_conns"),
            (RenameRule::ScreamingSnake, "MAX_CONNS"),
            (RenameRule::Kebab, "max-conns"),
            (RenameRule::ScreamingKebab, "MAX-CONNS"),
        ];
        for (rule, expected) in cases {
            assert_eq!(rule.apply_to_field("max_conns"), expected, "{rule:?}");
        }
        assert_eq!(RenameRule::Camel.apply_to_field("url"), "url");
    }

    #[test]
    fn test_rename_all_attribute() {
        let input: DeriveInput = syn::parse_quote! {
            #[derive(Default)]
            #[serde(default, rename_all = "kebab-case")]
            struct Db { max_conns: u32 }
        };
        assert_eq!(parse_rename_all(&input.attrs).unwrap(), Some(RenameRule::Kebab));

        let input: DeriveInput = syn::parse_quote! {
            #[serde(rename_all(serialize = "camelCase", deserialize = "camelCase"))]
            struct Db { max_conns: u32 }
        };
        assert_eq!(parse_rename_all(&input.attrs).unwrap(), Some(RenameRule::Camel));

        let input: DeriveInput = syn::parse_quote! {
            #[serde(rename_all(serialize = "camelCase", deserialize = "snake_case"))]
            struct Db { max_conns: u32 }
        };
        assert!(parse_rename_all(&input.attrs).is_err());

        let input: DeriveInput = syn::parse_quote! {
            #[serde(rename_all = "Title Case")]
            struct Db { max_conns: u32 }
        };
        assert!(parse_rename_all(&input.attrs).is_err());
    }

    #[test]
    fn test_field_rename_beats_rename_all() {
        let input: DeriveInput = syn::parse_quote! {
            #[serde(rename_all = "camelCase")]
            struct Db {
                #[serde(rename = "pool")]
                max_conns: u32,
                read_only: bool,
            }
        };
        let output = expand(&input).unwrap().to_string();
        assert!(output.contains("\"pool\""));
        assert!(output.contains("\"readOnly\""));
        assert!(!output.contains("\"max_conns\""));
    }

    #[test]
    fn test_path_qualified_scalars() {
        assert_eq!(kind_of("std::string::String"), "::cfgbind::FieldKind::String");
        assert_eq!(kind_of("core::primitive::u32"), "::cfgbind::FieldKind::Int");
        assert_eq!(kind_of("::std::primitive::bool"), "::cfgbind::FieldKind::Bool");
        assert_eq!(
            kind_of("std::path::PathBuf"),
            "::cfgbind::FieldKind::Unsupported(\"std::path::PathBuf\")"
        );
        assert_eq!(
            kind_of("crate::config::Database"),
            "::cfgbind::FieldKind::nested::<crate::config::Database>()"
        );
        assert!(kind_of("Vec<String>").contains("Unsupported"));
    }
}
