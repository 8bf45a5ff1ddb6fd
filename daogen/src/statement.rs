//! SQL statement synthesis from an [`EntityMapping`].
//!
//! Statements use positional `?` placeholders. Table and column names are
//! developer-supplied identifiers and are interpolated as-is.
//!
//! | Statement | Columns |
//! |-----------|---------|
//! | `INSERT`  | every non-identity field |
//! | `UPDATE`  | every non-identity field in `SET`, identity fields in `WHERE` |
//! | `DELETE`  | identity fields in `WHERE` |
//!
//! The `is_insertable` / `is_updatable` flags are carried by the model but do
//! not filter columns here.

use serde::Serialize;

use crate::model::EntityMapping;

/// INSERT statement together with its bind order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsertStatement {
    /// Full statement, e.g. `INSERT INTO people (a,b) VALUES (?,?)`
    pub sql: String,
    /// Parenthesized column list
    pub columns: String,
    /// Parenthesized placeholder list
    pub placeholders: String,
    /// Field names whose values bind to the placeholders, in column order
    pub bind_fields: Vec<String>,
}

/// Every statement derived from one mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statements {
    /// `col = ? and col = ?` over the identity fields; empty without any
    pub where_clause: String,
    pub insert: InsertStatement,
    pub update: String,
    pub delete: String,
    /// SET fields followed by identity fields
    pub update_bind_fields: Vec<String>,
    /// Identity fields, in WHERE order
    pub key_bind_fields: Vec<String>,
}

impl Statements {
    pub fn from_mapping(mapping: &EntityMapping) -> Self {
        let key_bind_fields: Vec<String> = mapping.identity_fields().map(|f| f.field_name.clone()).collect();
        let update_bind_fields = mapping
            .value_fields()
            .map(|f| f.field_name.clone())
            .chain(key_bind_fields.iter().cloned())
            .collect();

        Self {
            where_clause: where_clause(mapping),
            insert: insert_statement(mapping),
            update: update_statement(mapping),
            delete: delete_statement(mapping),
            update_bind_fields,
            key_bind_fields,
        }
    }

    /// False when the mapping has no identity field. UPDATE and DELETE then end
    /// in a bare `WHERE ` and must not be executed.
    pub fn is_keyed(&self) -> bool {
        !self.where_clause.is_empty()
    }
}

/// Predicate over the identity fields, in field order.
pub fn where_clause(mapping: &EntityMapping) -> String {
    mapping
        .identity_fields()
        .map(|f| format!("{} = ?", f.column_name))
        .collect::<Vec<_>>()
        .join(" and ")
}

pub fn insert_statement(mapping: &EntityMapping) -> InsertStatement {
    let mut columns = Vec::new();
    let mut placeholders = Vec::new();
    let mut bind_fields = Vec::new();

    // TODO: decide whether `is_insertable` should drop columns here; today only
    // identity fields are left out.
    for field in mapping.value_fields() {
        columns.push(field.column_name.as_str());
        placeholders.push("?");
        bind_fields.push(field.field_name.clone());
    }

    let columns = format!("({})", columns.join(","));
    let placeholders = format!("({})", placeholders.join(","));
    let sql = format!("INSERT INTO {} {columns} VALUES {placeholders}", mapping.table_name);

    InsertStatement {
        sql,
        columns,
        placeholders,
        bind_fields,
    }
}

/// `SET` list of the UPDATE statement.
pub fn update_assignments(mapping: &EntityMapping) -> String {
    mapping
        .value_fields()
        .map(|f| format!("{} = ?", f.column_name))
        .collect::<Vec<_>>()
        .join(",")
}

pub fn update_statement(mapping: &EntityMapping) -> String {
    format!(
        "UPDATE {} SET {} WHERE {}",
        mapping.table_name,
        update_assignments(mapping),
        where_clause(mapping)
    )
}

pub fn delete_statement(mapping: &EntityMapping) -> String {
    format!("DELETE FROM {} WHERE {}", mapping.table_name, where_clause(mapping))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldMapping;

    fn people() -> EntityMapping {
        EntityMapping::with_fields(
            "people",
            vec![
                FieldMapping::new("id", "id").identity(),
                FieldMapping::new("first_name", "first_name"),
                FieldMapping::new("last_name", "last_name"),
                FieldMapping::new("email", "email").updatable(false),
            ],
        )
    }

    #[test]
    fn test_person_statements() {
        let statements = Statements::from_mapping(&people());

        assert_eq!(statements.insert.columns, "(first_name,last_name,email)");
        assert_eq!(statements.insert.placeholders, "(?,?,?)");
        assert_eq!(statements.insert.bind_fields, vec!["first_name", "last_name", "email"]);
        assert_eq!(
            statements.insert.sql,
            "INSERT INTO people (first_name,last_name,email) VALUES (?,?,?)"
        );
        assert_eq!(
            statements.update,
            "UPDATE people SET first_name = ?,last_name = ?,email = ? WHERE id = ?"
        );
        assert_eq!(statements.delete, "DELETE FROM people WHERE id = ?");
        assert_eq!(
            statements.update_bind_fields,
            vec!["first_name", "last_name", "email", "id"]
        );
        assert_eq!(statements.key_bind_fields, vec!["id"]);
        assert!(statements.is_keyed());
    }

    #[test]
    fn test_composite_key() {
        let mapping = EntityMapping::with_fields(
            "memberships",
            vec![
                FieldMapping::new("tenant_id", "tenant_id").identity(),
                FieldMapping::new("id", "id").identity(),
                FieldMapping::new("role", "role"),
            ],
        );
        assert_eq!(where_clause(&mapping), "tenant_id = ? and id = ?");
        assert_eq!(
            delete_statement(&mapping),
            "DELETE FROM memberships WHERE tenant_id = ? and id = ?"
        );
    }

    #[test]
    fn test_without_identity_fields() {
        let mapping = EntityMapping::with_fields(
            "logs",
            vec![FieldMapping::new("line", "line"), FieldMapping::new("level", "level")],
        );
        let statements = Statements::from_mapping(&mapping);

        assert_eq!(statements.where_clause, "");
        assert!(!statements.is_keyed());
        assert_eq!(statements.update, "UPDATE logs SET line = ?,level = ? WHERE ");
        assert_eq!(statements.delete, "DELETE FROM logs WHERE ");
        assert!(statements.key_bind_fields.is_empty());
    }

    #[test]
    fn test_flags_do_not_filter_columns() {
        let mapping = EntityMapping::with_fields(
            "people",
            vec![
                FieldMapping::new("id", "id").identity(),
                FieldMapping::new("created_at", "created_at").insertable(false).updatable(false),
            ],
        );
        let insert = insert_statement(&mapping);
        assert_eq!(insert.columns, "(created_at)");
        assert_eq!(update_assignments(&mapping), "created_at = ?");
    }

    #[test]
    fn test_bind_order_matches_columns() {
        let mapping = EntityMapping::with_fields(
            "t",
            vec![
                FieldMapping::new("b_field", "b"),
                FieldMapping::new("key", "k").identity(),
                FieldMapping::new("a_field", "a"),
                FieldMapping::new("c_field", "c"),
            ],
        );
        let insert = insert_statement(&mapping);
        let columns: Vec<&str> = insert.columns.trim_matches(['(', ')']).split(',').collect();
        let placeholders = insert.placeholders.trim_matches(['(', ')']).split(',').count();

        assert_eq!(columns.len(), 3);
        assert_eq!(placeholders, 3);
        for (column, field) in columns.iter().zip(&insert.bind_fields) {
            let mapped = mapping.fields.iter().find(|f| &f.field_name == field).unwrap();
            assert_eq!(&mapped.column_name, column);
        }
    }

    #[test]
    fn test_synthesis_is_idempotent() {
        let mapping = people();
        assert_eq!(Statements::from_mapping(&mapping), Statements::from_mapping(&mapping));
    }

    #[test]
    fn test_empty_mapping() {
        let insert = insert_statement(&EntityMapping::new("people"));
        assert_eq!(insert.sql, "INSERT INTO people () VALUES ()");
        assert!(insert.bind_fields.is_empty());
    }
}
