//! `#[sql(...)]` attribute parsing.

use heck::{ToLowerCamelCase, ToShoutySnakeCase, ToSnakeCase, ToUpperCamelCase};
use syn::{Attribute, LitStr, Result};

/// Column naming rule for fields without `#[sql(column = ...)]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RenameRule {
    None,
    Pascal,
    Camel,
    Snake,
    ScreamingSnake,
}

impl RenameRule {
    fn parse(lit: &LitStr) -> Result<Self> {
        match lit.value().as_str() {
            "PascalCase" => Ok(Self::Pascal),
            "camelCase" => Ok(Self::Camel),
            "snake_case" => Ok(Self::Snake),
            "SCREAMING_SNAKE_CASE" => Ok(Self::ScreamingSnake),
            other => Err(syn::Error::new(
                lit.span(),
                format!(
                    "unknown rename_all rule '{other}' (expected PascalCase, camelCase, snake_case or SCREAMING_SNAKE_CASE)"
                ),
            )),
        }
    }

    pub(crate) fn apply(self, name: &str) -> String {
        match self {
            Self::None => name.to_string(),
            Self::Pascal => name.to_upper_camel_case(),
            Self::Camel => name.to_lower_camel_case(),
            Self::Snake => name.to_snake_case(),
            Self::ScreamingSnake => name.to_shouty_snake_case(),
        }
    }
}

/// Struct-level attributes.
pub(crate) struct EntityAttr {
    pub table: Option<String>,
    pub rename_all: RenameRule,
}

/// Field-level attributes.
#[derive(Default)]
pub(crate) struct FieldAttr {
    pub column: Option<String>,
}

/// One `key = "value"` entry.
struct KeyValue {
    key: syn::Ident,
    value: LitStr,
}

struct KeyValues(Vec<KeyValue>);

impl syn::parse::Parse for KeyValues {
    fn parse(input: syn::parse::ParseStream) -> Result<Self> {
        let mut entries = Vec::new();
        while !input.is_empty() {
            let key: syn::Ident = input.parse()?;
            let _: syn::Token![=] = input.parse()?;
            let value: LitStr = input.parse()?;
            entries.push(KeyValue { key, value });

            if input.peek(syn::Token![,]) {
                let _: syn::Token![,] = input.parse()?;
            } else {
                break;
            }
        }
        Ok(Self(entries))
    }
}

fn sql_entries(attrs: &[Attribute]) -> Result<Vec<KeyValue>> {
    let mut entries = Vec::new();
    for attr in attrs.iter().filter(|a| a.path().is_ident("sql")) {
        entries.extend(attr.parse_args::<KeyValues>()?.0);
    }
    Ok(entries)
}

pub(crate) fn entity_attr(attrs: &[Attribute]) -> Result<EntityAttr> {
    let mut parsed = EntityAttr {
        table: None,
        rename_all: RenameRule::None,
    };
    for KeyValue { key, value } in sql_entries(attrs)? {
        if key == "table" {
            parsed.table = Some(value.value());
        } else if key == "rename_all" {
            parsed.rename_all = RenameRule::parse(&value)?;
        } else {
            return Err(syn::Error::new(
                key.span(),
                format!("unknown #[sql] struct attribute '{key}' (expected table or rename_all)"),
            ));
        }
    }
    Ok(parsed)
}

pub(crate) fn field_attr(attrs: &[Attribute]) -> Result<FieldAttr> {
    let mut parsed = FieldAttr::default();
    for KeyValue { key, value } in sql_entries(attrs)? {
        if key == "column" {
            parsed.column = Some(value.value());
        } else {
            return Err(syn::Error::new(
                key.span(),
                format!("unknown #[sql] field attribute '{key}' (expected column)"),
            ));
        }
    }
    Ok(parsed)
}
