use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub id: i32,
    pub initial_capital: f64,
    pub theme: String,
    pub language: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateSettingsInput {
    pub initial_capital: Option<f64>,
    pub theme: Option<String>,
    pub language: Option<String>,
}
