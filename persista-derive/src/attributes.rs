//! Parsing of `#[equatable(...)]` attributes.

use syn::{Attribute, Field};

const ATTRIBUTE_NAME: &str = "equatable";

/// Options given on the deriving type itself.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ContainerOptions {
    /// Delegate to the type's `PartialEq` instead of comparing fields.
    pub native: bool,
}

/// Reads `#[equatable(native)]` from the attributes of the deriving type.
pub fn container_options(attributes: &[Attribute]) -> syn::Result<ContainerOptions> {
    let mut options = ContainerOptions::default();

    for attribute in attributes {
        if !attribute.path().is_ident(ATTRIBUTE_NAME) {
            continue;
        }
        attribute.parse_nested_meta(|meta| {
            if meta.path.is_ident("native") {
                options.native = true;
                Ok(())
            } else if meta.path.is_ident("skip") {
                Err(meta.error("`skip` is only allowed on fields"))
            } else {
                Err(meta.error("unsupported equatable attribute, expected `native`"))
            }
        })?;
    }

    Ok(options)
}

/// Returns `true` when the field carries `#[equatable(skip)]`.
pub fn is_skipped(field: &Field) -> syn::Result<bool> {
    let mut skipped = false;

    for attribute in &field.attrs {
        if !attribute.path().is_ident(ATTRIBUTE_NAME) {
            continue;
        }
        attribute.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                skipped = true;
                Ok(())
            } else if meta.path.is_ident("native") {
                Err(meta.error("`native` is only allowed on the type"))
            } else {
                Err(meta.error("unsupported equatable attribute, expected `skip`"))
            }
        })?;
    }

    Ok(skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use syn::{DeriveInput, parse_quote};

    #[rstest]
    fn test_container_without_attribute_is_structural() {
        let input: DeriveInput = parse_quote! {
            struct Point { x: i32 }
        };
        let options = container_options(&input.attrs).unwrap();
        assert!(!options.native);
    }

    #[rstest]
    fn test_container_native_attribute() {
        let input: DeriveInput = parse_quote! {
            #[equatable(native)]
            struct Point { x: i32 }
        };
        let options = container_options(&input.attrs).unwrap();
        assert!(options.native);
    }

    #[rstest]
    fn test_container_rejects_skip() {
        let input: DeriveInput = parse_quote! {
            #[equatable(skip)]
            struct Point { x: i32 }
        };
        assert!(container_options(&input.attrs).is_err());
    }

    #[rstest]
    fn test_field_skip_attribute() {
        let field: Field = parse_quote! {
            #[equatable(skip)]
            cached: usize
        };
        assert!(is_skipped(&field).unwrap());
    }

    #[rstest]
    fn test_field_unknown_attribute_is_an_error() {
        let field: Field = parse_quote! {
            #[equatable(ignore)]
            cached: usize
        };
        assert!(is_skipped(&field).is_err());
    }

    #[rstest]
    fn test_unrelated_attributes_are_ignored() {
        let field: Field = parse_quote! {
            #[serde(rename = "x")]
            value: usize
        };
        assert!(!is_skipped(&field).unwrap());
    }
}
