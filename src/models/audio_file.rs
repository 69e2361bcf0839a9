use serde::{Deserialize, Serialize};
use surrealdb::sql::Datetime;

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AudioFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub file_name: String,
    pub content_type: String,
    pub size: u64,
    pub created_at: Datetime,
}
