use daogen_macros::DaoEntity;

#[derive(DaoEntity)]
pub struct Membership {
    #[dao(r#"column:"tenant_id" identity:"true""#)]
    pub tenant_id: i64,
    #[dao(r#"column:"id" identity:"true" insertable:"false""#)]
    pub id: i64,
    #[dao(r#"column:"type""#)]
    pub r#type: String,
    #[dao(r#"serde:"skip""#)]
    pub cached: bool,
    #[dao(r#"column:"note" updatable:"""#)]
    pub note: String,
}

fn main() {
    let m = Membership {
        tenant_id: 7,
        id: 1,
        r#type: "admin".into(),
        cached: false,
        note: String::new(),
    };
    let _ = (m.tenant_id, m.id, m.r#type, m.cached, m.note);
}
