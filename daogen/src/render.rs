//! Rendering of the generated DAO module.

use proc_macro2::{Span, TokenStream};
use quote::{format_ident, quote};
use syn::Ident;

use crate::errors::{Error, Result};
use crate::imports::ResolvedImports;
use crate::model::EntityMapping;
use crate::statement::Statements;

/// Inputs of one rendering.
#[derive(Debug, Clone, Copy)]
pub struct RenderInput<'a> {
    /// Entity struct name, e.g. `Person`
    pub entity: &'a str,
    pub mapping: &'a EntityMapping,
    pub statements: &'a Statements,
    pub imports: &'a ResolvedImports,
}

/// File name of the generated module: `Person` + `_dao` -> `person_dao.rs`.
pub fn dao_file_name(entity: &str, suffix: &str) -> String {
    format!("{}{suffix}.rs", to_snake_case(entity))
}

/// `UserAccount` -> `user_account`, `HTTPServer` -> `http_server`.
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(char::is_lowercase),
                _ => false,
            };
            if boundary {
                result.push('_');
            }
            result.extend(c.to_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}

fn parse_ident(name: &str, what: &str) -> Result<Ident> {
    syn::parse_str::<Ident>(name).map_err(|_| Error::Render {
        reason: format!("{what} `{name}` is not a valid identifier"),
    })
}

/// Field names are stored unraw, so keywords need the `r#` form back.
fn field_ident(name: &str) -> Ident {
    syn::parse_str::<Ident>(name).unwrap_or_else(|_| Ident::new_raw(name, Span::call_site()))
}

/// Render the DAO module for one entity.
///
/// Without identity fields only `create` is generated since UPDATE and DELETE
/// would have no predicate.
pub fn render_dao(input: &RenderInput<'_>) -> Result<String> {
    let RenderInput {
        entity,
        mapping,
        statements,
        imports,
    } = *input;

    if let Some(field) = mapping.unmapped_field() {
        return Err(Error::UnmappedColumn {
            entity: entity.to_string(),
            field: field.field_name.clone(),
        });
    }

    let entity_ident = parse_ident(entity, "entity name")?;
    let dao_ident = format_ident!("{}Dao", entity_ident);
    let error_ident = format_ident!("{}DaoError", entity_ident);
    let entity_snake = to_snake_case(entity);
    let param = syn::parse_str::<Ident>(&entity_snake).unwrap_or_else(|_| format_ident!("entity"));

    let entity_ty = if imports.alias_needed {
        let alias = parse_ident(&imports.alias, "module alias")?;
        quote! { #alias::#entity_ident }
    } else {
        quote! { super::#entity_ident }
    };

    let uses = imports
        .groups()
        .iter()
        .map(|path| {
            syn::parse_str::<syn::UseTree>(path)
                .map(|tree| quote! { use #tree; })
                .map_err(|e| Error::Render {
                    reason: format!("invalid import `{path}`: {e}"),
                })
        })
        .collect::<Result<Vec<_>>>()?;

    let binds = |fields: &[String]| -> Vec<TokenStream> {
        fields
            .iter()
            .map(|name| {
                let field = field_ident(name);
                quote! { .bind(#param.#field.clone()) }
            })
            .collect()
    };

    let module_doc = format!(" Data access for [`{entity}`] rows stored in `{}`.", mapping.table_name);
    let error_doc = format!(" Error returned by [`{dao_ident}`] operations.");
    let dao_doc = format!(" Statements for the `{}` table.", mapping.table_name);
    let insert_sql = &statements.insert.sql;
    let insert_binds = binds(&statements.insert.bind_fields);

    let keyed_items = if statements.is_keyed() {
        let update_sql = &statements.update;
        let delete_sql = &statements.delete;
        let update_binds = binds(&statements.update_bind_fields);
        let key_binds = binds(&statements.key_bind_fields);
        quote! {
            pub const UPDATE_QUERY: &'static str = #update_sql;
            pub const DELETE_QUERY: &'static str = #delete_sql;

            /// Update the row matching the key fields. Returns the number of affected rows.
            pub async fn update(&self, #param: &#entity_ty) -> Result<u64, #error_ident> {
                let query = sqlx::query(Self::UPDATE_QUERY) #(#update_binds)*;
                let result = self
                    .pool
                    .execute(query)
                    .await
                    .map_err(|source| #error_ident { operation: "updating", source })?;
                Ok(result.rows_affected())
            }

            /// Delete the row matching the key fields. Returns the number of affected rows.
            pub async fn delete(&self, #param: &#entity_ty) -> Result<u64, #error_ident> {
                let query = sqlx::query(Self::DELETE_QUERY) #(#key_binds)*;
                let result = self
                    .pool
                    .execute(query)
                    .await
                    .map_err(|source| #error_ident { operation: "deleting", source })?;
                Ok(result.rows_affected())
            }
        }
    } else {
        TokenStream::new()
    };

    let tokens = quote! {
        //! Generated by daogen. Do not edit manually.
        #![doc = ""]
        #![doc = #module_doc]

        #![allow(unused_imports)]

        #(#uses)*

        #[doc = #error_doc]
        #[derive(Debug)]
        pub struct #error_ident {
            operation: &'static str,
            source: sqlx::Error,
        }

        impl fmt::Display for #error_ident {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "error {} {}: {}", self.operation, #entity_snake, self.source)
            }
        }

        impl std::error::Error for #error_ident {
            fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
                Some(&self.source)
            }
        }

        #[doc = #dao_doc]
        pub struct #dao_ident {
            pool: any::AnyPool,
        }

        impl #dao_ident {
            pub const INSERT_QUERY: &'static str = #insert_sql;

            pub fn new(pool: any::AnyPool) -> Self {
                Self { pool }
            }

            /// Insert a new row. Returns the generated key when the driver reports one.
            pub async fn create(&self, #param: &#entity_ty) -> Result<Option<i64>, #error_ident> {
                let query = sqlx::query(Self::INSERT_QUERY) #(#insert_binds)*;
                let result = self
                    .pool
                    .execute(query)
                    .await
                    .map_err(|source| #error_ident { operation: "creating", source })?;
                Ok(result.last_insert_id())
            }

            #keyed_items
        }
    };

    let file = syn::parse2::<syn::File>(tokens).map_err(|e| Error::Render { reason: e.to_string() })?;
    Ok(prettyplease::unparse(&file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imports::ImportSet;
    use crate::model::FieldMapping;
    use crate::module::ModuleInfo;

    fn people() -> EntityMapping {
        EntityMapping::with_fields(
            "people",
            vec![
                FieldMapping::new("id", "id").identity(),
                FieldMapping::new("first_name", "first_name"),
                FieldMapping::new("email", "email").updatable(false),
            ],
        )
    }

    fn imports(alias_needed: bool) -> ResolvedImports {
        let home_module = ModuleInfo::new("shop", vec!["dto".into(), "person".into()]);
        let output_module = if alias_needed {
            ModuleInfo::new("shop", vec!["storage".into()])
        } else {
            home_module.clone()
        };
        let mut set = ImportSet::base();
        if alias_needed {
            set.add("crate::dto::person as model");
        }
        ResolvedImports {
            output_module,
            home_module,
            imports: set,
            alias_needed,
            alias: "model".to_string(),
        }
    }

    fn render(mapping: &EntityMapping, alias_needed: bool) -> Result<String> {
        let statements = Statements::from_mapping(mapping);
        let imports = imports(alias_needed);
        render_dao(&RenderInput {
            entity: "Person",
            mapping,
            statements: &statements,
            imports: &imports,
        })
    }

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("Person"), "person");
        assert_eq!(to_snake_case("UserAccount"), "user_account");
        assert_eq!(to_snake_case("HTTPServer"), "http_server");
        assert_eq!(to_snake_case("Order2Line"), "order2_line");
        assert_eq!(dao_file_name("UserAccount", "_dao"), "user_account_dao.rs");
    }

    #[test]
    fn test_render_with_alias() {
        let code = render(&people(), true).unwrap();
        syn::parse_file(&code).unwrap();

        assert!(code.contains("use std::fmt;"));
        assert!(code.contains("use sqlx::Executor;"));
        assert!(code.contains("use crate::dto::person as model;"));
        assert!(code.contains("pub struct PersonDao"));
        assert!(code.contains("person: &model::Person"));
        assert!(code.contains("\"INSERT INTO people (first_name,email) VALUES (?,?)\""));
        assert!(code.contains("\"UPDATE people SET first_name = ?,email = ? WHERE id = ?\""));
        assert!(code.contains("\"DELETE FROM people WHERE id = ?\""));
        assert!(code.contains(".bind(person.first_name.clone())"));
        assert!(code.find("use std::fmt;").unwrap() < code.find("use sqlx::Executor;").unwrap());
    }

    #[test]
    fn test_render_without_alias() {
        let code = render(&people(), false).unwrap();
        assert!(code.contains("person: &super::Person"));
        assert!(!code.contains(" as model"));
    }

    #[test]
    fn test_unkeyed_mapping_only_creates() {
        let mapping = EntityMapping::with_fields("logs", vec![FieldMapping::new("line", "line")]);
        let code = render(&mapping, true).unwrap();
        assert!(code.contains("pub async fn create"));
        assert!(!code.contains("UPDATE_QUERY"));
        assert!(!code.contains("pub async fn delete"));
    }

    #[test]
    fn test_unmapped_column_is_rejected() {
        let mapping = EntityMapping::with_fields(
            "people",
            vec![FieldMapping::new("id", "id").identity(), FieldMapping::new("nickname", "")],
        );
        let err = render(&mapping, true).unwrap_err();
        assert!(matches!(err, Error::UnmappedColumn { ref field, .. } if field == "nickname"));
    }

    #[test]
    fn test_keyword_field_names() {
        let mapping = EntityMapping::with_fields(
            "people",
            vec![FieldMapping::new("id", "id").identity(), FieldMapping::new("type", "kind")],
        );
        let code = render(&mapping, true).unwrap();
        assert!(code.contains("person.r#type.clone()"));
    }
}
