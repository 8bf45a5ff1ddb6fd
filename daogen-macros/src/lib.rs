//! `#[derive(DaoEntity)]` for daogen entities.
//!
//! The derive registers the `dao` field attribute and checks every
//! annotation string at compile time with the same parser the generator
//! uses, so a typo like `updatable:"flase"` fails the build instead of the
//! next `daogen generate` run. It emits no items.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod entity;

#[proc_macro_derive(DaoEntity, attributes(dao))]
pub fn derive_dao_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match entity::validate(&input) {
        Ok(()) => TokenStream::new(),
        Err(err) => err.to_compile_error().into(),
    }
}
