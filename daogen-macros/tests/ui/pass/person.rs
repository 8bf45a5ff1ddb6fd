use daogen_macros::DaoEntity;

#[derive(Debug, Clone, DaoEntity)]
pub struct Person {
    #[dao(r#"column:"id" identity:"true""#)]
    pub id: i64,
    #[dao(r#"column:"first_name""#)]
    pub first_name: String,
    #[dao(r#"column:"last_name""#)]
    pub last_name: String,
    #[dao(r#"column:"email" updatable:"false""#)]
    pub email: String,
    pub display_name: Option<String>,
}

fn main() {
    let person = Person {
        id: 1,
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        email: "ada@example.com".into(),
        display_name: None,
    };
    assert_eq!(person.id, 1);
}
