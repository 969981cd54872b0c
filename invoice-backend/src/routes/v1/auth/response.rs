use serde::Serialize;

#[derive(Serialize)]
pub struct PostRegister {
    pub message: String,
    #[serde(rename = "userId")]
    pub user_id: String,
}

#[derive(Serialize)]
pub struct PostLogin {
    pub access_token: String,
    pub username: String,
}

#[derive(Serialize)]
pub struct GetProfile {
    pub logged_in_as_id: String,
    pub username: String,
    #[serde(rename = "tenantId")]
    pub tenant_id: String,
    pub roles: Vec<String>,
}

#[derive(Serialize)]
pub struct TestUser {
    pub username: String,
    pub email: Option<String>,
}
