//! Compile tests for `#[derive(DaoEntity)]`.

#[test]
fn well_formed_entities_compile() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/pass/*.rs");
}
