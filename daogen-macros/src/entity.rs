use daogen::locator::ANNOTATION_ATTR;
use syn::{Data, DeriveInput, Error, Field, Fields, Result, spanned::Spanned};

/// Check every `#[dao]` annotation of the struct. All bad fields are
/// reported, not only the first.
pub(crate) fn validate(input: &DeriveInput) -> Result<()> {
    let entity = input.ident.to_string();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => return Err(Error::new(input.ident.span(), "DaoEntity requires named fields")),
        },
        _ => return Err(Error::new(input.ident.span(), "DaoEntity can only be derived for structs")),
    };

    let mut errors: Option<Error> = None;
    for field in fields {
        if let Err(err) = validate_field(&entity, field) {
            match errors.as_mut() {
                Some(existing) => existing.combine(err),
                None => errors = Some(err),
            }
        }
    }

    errors.map_or(Ok(()), Err)
}

fn validate_field(entity: &str, field: &Field) -> Result<()> {
    let span = field
        .attrs
        .iter()
        .find(|attr| attr.path().is_ident(ANNOTATION_ATTR))
        .map_or_else(|| field.span(), |attr| attr.span());

    let mapping = daogen::field_mapping(entity, field).map_err(|err| Error::new(span, err.to_string()))?;

    if let Some(mapping) = mapping
        && mapping.column_name.is_empty()
    {
        return Err(Error::new(
            span,
            format!(
                "field `{}` is annotated but has no column, add `column:\"...\"`",
                mapping.field_name
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn accepts_well_formed_annotations() {
        let input: DeriveInput = parse_quote! {
            pub struct Person {
                #[dao(r#"column:"id" identity:"true""#)]
                pub id: i64,
                #[dao(r#"column:"email" updatable:"false""#)]
                pub email: String,
                #[dao(r#"json:"ignored""#)]
                pub note: String,
                pub cache: Option<String>,
            }
        };
        assert!(validate(&input).is_ok());
    }

    #[test]
    fn rejects_bad_boolean() {
        let input: DeriveInput = parse_quote! {
            pub struct Person {
                #[dao(r#"column:"email" updatable:"notabool""#)]
                pub email: String,
            }
        };
        let err = validate(&input).unwrap_err();
        assert!(err.to_string().contains("updatable"));
    }

    #[test]
    fn reports_every_bad_field() {
        let input: DeriveInput = parse_quote! {
            pub struct Person {
                #[dao(r#"column:"id" identity:"yes""#)]
                pub id: i64,
                #[dao(r#"identity:"true""#)]
                pub key: i64,
                #[dao(column = "name")]
                pub name: String,
            }
        };
        let err = validate(&input).unwrap_err();
        assert_eq!(err.into_iter().count(), 3);
    }

    #[test]
    fn rejects_non_structs() {
        let input: DeriveInput = parse_quote! {
            pub enum Kind { A, B }
        };
        assert!(validate(&input).is_err());

        let input: DeriveInput = parse_quote! {
            pub struct Pair(#[dao(r#"column:"a""#)] i64, i64);
        };
        assert!(validate(&input).is_err());
    }
}
