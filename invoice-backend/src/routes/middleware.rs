use std::{
    collections::{HashMap, HashSet},
    task::{Context, Poll},
};

use axum::{
    extract::Request,
    http::Method,
    response::{IntoResponse, Response},
};
use futures::future::BoxFuture;
use tower::{Layer, Service};

use invoice_corelib::{err::ErrResp, http::parse_header_auth};

use crate::libs::jwt::{Error as JwtError, Jwt};

/// The information of the access token that is passed to handlers as an extension.
#[derive(Clone, Debug)]
pub struct TokenInfo {
    pub user_id: String,
    pub username: String,
    pub roles: Vec<String>,
    pub tenant_id: String,
}

/// Required roles of each method. An empty list means any authenticated user.
pub type RoleType = Vec<&'static str>;

#[derive(Clone)]
pub struct AuthService {
    jwt: Jwt,
    roles: HashMap<Method, RoleType>,
}

#[derive(Clone)]
pub struct AuthMiddleware<S> {
    jwt: Jwt,
    roles: HashMap<Method, HashSet<&'static str>>,
    service: S,
}

impl AuthService {
    pub fn new(jwt: &Jwt, roles: HashMap<Method, RoleType>) -> Self {
        AuthService {
            jwt: jwt.clone(),
            roles,
        }
    }
}

impl<S> Layer<S> for AuthService {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        let mut roles: HashMap<Method, HashSet<&'static str>> = HashMap::new();
        for (k, r) in self.roles.iter() {
            roles.insert(k.clone(), r.iter().map(|&r| r).collect());
        }
        AuthMiddleware {
            jwt: self.jwt.clone(),
            roles,
            service: inner,
        }
    }
}

impl<S> Service<Request> for AuthMiddleware<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let mut svc = self.service.clone();
        let jwt = self.jwt.clone();
        let roles = self.roles.clone();

        Box::pin(async move {
            let token_info = match get_token_info(&jwt, &roles, &req) {
                Err(e) => return Ok(e.into_response()),
                Ok(info) => info,
            };
            req.extensions_mut().insert(token_info);

            let res = svc.call(req).await?;
            Ok(res)
        })
    }
}

fn get_token_info(
    jwt: &Jwt,
    roles: &HashMap<Method, HashSet<&'static str>>,
    req: &Request,
) -> Result<TokenInfo, ErrResp> {
    let auth = match parse_header_auth(req)? {
        None => return Err(ErrResp::ErrParam(Some("missing token".to_string()))),
        Some(auth) => auth,
    };
    let token = match auth.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && token.len() > 0 => {
            token.trim()
        }
        _ => {
            return Err(ErrResp::ErrAuth(Some(
                "invalid Authorization scheme".to_string(),
            )));
        }
    };
    let claims = match jwt.verify(token) {
        Err(JwtError::Expired) => {
            return Err(ErrResp::ErrAuth(Some("token expired".to_string())));
        }
        Err(JwtError::Invalid(e)) => return Err(ErrResp::ErrAuth(Some(e))),
        Ok(claims) => claims,
    };

    if let Some(api_roles) = roles.get(req.method()) {
        if api_roles.len() > 0 {
            let user_roles: HashSet<&str> = claims.roles.iter().map(|r| r.as_str()).collect();
            if api_roles.is_disjoint(&user_roles) {
                return Err(ErrResp::ErrPerm(Some("invalid role".to_string())));
            }
        }
    }

    Ok(TokenInfo {
        user_id: claims.sub,
        username: claims.username,
        roles: claims.roles,
        tenant_id: claims.tenant_id,
    })
}
