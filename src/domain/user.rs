#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub name: String,
    pub display_name: Option<String>,
    pub email_address: Option<String>,
    pub active: bool,
}
