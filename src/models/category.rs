use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub id: Option<i64>,
    pub name: String,
    pub icon: String,
    pub color: String,
}
