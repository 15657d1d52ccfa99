use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Identity record owned by the Identity Store. The core only ever
/// reads these; provisioning happens elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Participant {
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub avatar_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}
