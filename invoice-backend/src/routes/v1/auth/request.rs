use serde::Deserialize;

#[derive(Deserialize)]
pub struct PostRegisterBody {
    pub username: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
}

#[derive(Deserialize)]
pub struct PostLoginBody {
    pub username: Option<String>,
    pub password: Option<String>,
}
