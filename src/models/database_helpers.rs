use surrealdb::sql::Thing;

#[derive(serde::Deserialize)]
pub struct RelationId {
    pub id: Thing,
}
