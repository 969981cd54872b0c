use serde::Deserialize;

#[derive(Deserialize)]
pub struct ContactIdPath {
    pub contact_id: String,
}
