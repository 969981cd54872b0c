use std::{
    env,
    error::Error as StdError,
    fs,
    net::{Ipv6Addr, SocketAddr, SocketAddrV6},
    time::Duration,
};

use axum::http::{HeaderValue, StatusCode};
use axum_server::{self, tls_rustls::RustlsConfig};
use clap::{Arg as ClapArg, Command};
use json5;
use log::{self, error, info, warn};
use serde::Deserialize;
use tokio::{self, net::TcpListener};
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    normalize_path::NormalizePathLayer,
    services::ServeDir,
    timeout::TimeoutLayer,
};

use invoice_backend::{
    libs::{self, form},
    routes,
};
use invoice_corelib::{
    logger::{self, LoggerLayer},
    server_config,
};

#[derive(Deserialize)]
struct AppConfig {
    log: logger::Config,
    server: server_config::Config,
    backend: libs::config::Config,
}

const PROJ_NAME: &'static str = env!("CARGO_BIN_NAME");
const PROJ_VER: &'static str = env!("CARGO_PKG_VERSION");
const ANY_ORIGIN: &'static str = "*";

#[tokio::main]
async fn main() -> std::io::Result<()> {
    const FN_NAME: &'static str = "main";

    let (conf, random_secret) = match init_config() {
        Err(e) => {
            let conf = &logger::Config {
                ..Default::default()
            };
            logger::init(&conf);
            error!("[{}] read config error: {}", FN_NAME, e);
            return Ok(());
        }
        Ok(conf) => conf,
    };

    logger::init(&conf.log);
    if random_secret {
        warn!(
            "[{}] no JWT secret configured, tokens are valid only until the process exits",
            FN_NAME
        );
    }

    let state = match routes::new_state(&conf.backend).await {
        Err(e) => {
            error!("[{}] new routes state error: {}", FN_NAME, e);
            return Ok(());
        }
        Ok(state) => state,
    };
    form::ensure_upload_folders(&[
        state.logo_path.as_str(),
        state.expense_invoice_path.as_str(),
    ]);

    let mut app = routes::new_service(&state);
    if let Some(static_path) = conf.server.static_path.as_ref() {
        app = app.fallback_service(ServeDir::new(static_path));
    }
    let app = app
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(60),
        ))
        .layer(cors_layer(conf.backend.cors_origins.as_ref()))
        .layer(NormalizePathLayer::trim_trailing_slash())
        .layer(LoggerLayer::new());

    // Serve HTTP.
    let ipv6_addr = Ipv6Addr::from([0u8; 16]);
    let http_addr = match conf.server.http_port {
        None => SocketAddr::V6(SocketAddrV6::new(
            ipv6_addr,
            server_config::DEF_HTTP_PORT,
            0,
            0,
        )),
        Some(port) => SocketAddr::V6(SocketAddrV6::new(ipv6_addr, port, 0, 0)),
    };

    // Serve HTTPS.
    if let Some(cert_file) = conf.server.cert_file.as_ref() {
        if let Some(key_file) = conf.server.key_file.as_ref() {
            if let Err(_e) = rustls::crypto::aws_lc_rs::default_provider().install_default() {
                error!("[{}] init crypto error", FN_NAME);
                return Ok(());
            }
            let config = match RustlsConfig::from_pem_file(cert_file, key_file).await {
                Err(e) => {
                    error!("[{}] read cert/key error: {}", FN_NAME, e);
                    return Ok(());
                }
                Ok(config) => config,
            };
            let addr = match conf.server.https_port {
                None => SocketAddr::V6(SocketAddrV6::new(
                    ipv6_addr,
                    server_config::DEF_HTTPS_PORT,
                    0,
                    0,
                )),
                Some(port) => SocketAddr::V6(SocketAddrV6::new(ipv6_addr, port, 0, 0)),
            };
            let http_app = app.clone();
            let http_serv = tokio::spawn(async move {
                if let Err(e) = axum_server::bind(http_addr)
                    .serve(http_app.into_make_service_with_connect_info::<SocketAddr>())
                    .await
                {
                    error!("[{}] launch HTTP server error: {}", FN_NAME, e);
                }
            });
            let https_serv = tokio::spawn(async move {
                if let Err(e) = axum_server::bind_rustls(addr, config)
                    .serve(app.into_make_service_with_connect_info::<SocketAddr>())
                    .await
                {
                    error!("[{}] launch HTTPS server error: {}", FN_NAME, e);
                }
            });
            info!(
                "[{}] running {} service (v{})",
                FN_NAME, PROJ_NAME, PROJ_VER
            );
            let _ = tokio::join!(http_serv, https_serv);
            return Ok(());
        }
    }

    let listener = match TcpListener::bind(http_addr).await {
        Err(e) => {
            error!("[{}] bind addr {} error: {}", FN_NAME, http_addr, e);
            return Ok(());
        }
        Ok(listener) => listener,
    };
    info!(
        "[{}] running {} service (v{})",
        FN_NAME, PROJ_NAME, PROJ_VER
    );
    if let Err(e) = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    {
        error!("[{}] launch server error: {}", FN_NAME, e);
        return Ok(());
    }
    Ok(())
}

/// Returns the configuration and whether the JWT secret is generated randomly.
fn init_config() -> Result<(AppConfig, bool), Box<dyn StdError>> {
    let mut args = Command::new(PROJ_NAME).version(PROJ_VER).arg(
        ClapArg::new("file")
            .short('f')
            .long("file")
            .help("config file")
            .num_args(1),
    );
    args = logger::reg_args(args);
    args = server_config::reg_args(args);
    args = libs::config::reg_args(args);
    let args = args.get_matches();

    if let Some(v) = args.get_one::<String>("file") {
        let conf_str = fs::read_to_string(v)?;
        let conf: AppConfig = json5::from_str(conf_str.as_str())?;
        let random_secret = libs::config::is_random_secret(&conf.backend);
        return Ok((
            AppConfig {
                log: logger::apply_default(&conf.log),
                server: server_config::apply_default(&conf.server),
                backend: libs::config::apply_default(&conf.backend),
            },
            random_secret,
        ));
    }

    let secret = match args.get_one::<String>("backend.jwt.secret") {
        None => env::var("BACKEND_JWT_SECRET").ok(),
        Some(v) => Some(v.clone()),
    };
    let random_secret = libs::config::is_random_secret(&libs::config::Config {
        jwt: Some(libs::config::Jwt {
            secret,
            expires_in: None,
        }),
        ..Default::default()
    });
    Ok((
        AppConfig {
            log: logger::read_args(&args),
            server: server_config::read_args(&args),
            backend: libs::config::read_args(&args),
        },
        random_secret,
    ))
}

/// Credentials are allowed so `*` mirrors the request origin.
fn cors_layer(origins: Option<&Vec<String>>) -> CorsLayer {
    const FN_NAME: &'static str = "cors_layer";

    let origins = match origins {
        None => vec![],
        Some(origins) => origins.clone(),
    };
    let allow_origin = match origins.iter().any(|o| o.as_str() == ANY_ORIGIN) {
        true => AllowOrigin::mirror_request(),
        false => {
            let mut list = vec![];
            for origin in origins.iter() {
                match HeaderValue::from_str(origin.as_str()) {
                    Err(e) => warn!("[{}] invalid origin {}: {}", FN_NAME, origin, e),
                    Ok(value) => list.push(value),
                }
            }
            AllowOrigin::list(list)
        }
    };
    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
