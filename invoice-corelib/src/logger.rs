//! To configure the logger and to log HTTP requests.

use std::{
    env,
    net::SocketAddr,
    task::{Context, Poll},
    time::Instant,
};

use anyhow::Result;
use axum::{
    extract::{ConnectInfo, Request},
    response::Response,
};
use chrono::{SecondsFormat, Utc};
use clap::{Arg, ArgMatches, Command};
use futures::future::BoxFuture;
use log::{Level, LevelFilter, Record, info};
use log4rs::{
    self,
    append::console::ConsoleAppender,
    config::{Appender, Root},
    encode::{Encode, Write},
};
use serde::{Deserialize, Serialize};
use tower::{Layer, Service};

/// Logger configuration object.
#[derive(Default, Deserialize)]
pub struct Config {
    /// Log level. Can be `off`, `error`, `warn`, `info`, `debug`.
    ///
    /// Default is `info`.
    pub level: Option<String>,
    /// Log style. Can be `json`, `log4j`.
    ///
    /// Default is `json`.
    pub style: Option<String>,
}

/// The tower layer that writes one access log line for each API request.
#[derive(Clone, Default)]
pub struct LoggerLayer;

#[derive(Clone)]
pub struct LoggerMiddleware<S> {
    service: S,
}

/// The log4rs encoder for JSON format.
#[derive(Debug)]
struct JsonEncoder;

/// The log4rs encoder for log4j format.
#[derive(Debug)]
struct Log4jEncoder;

/// Normal log information.
#[derive(Debug, Serialize)]
struct JsonEncoderMsg {
    pub ts: String,
    pub level: String,
    pub module: String,
    pub msg: String,
}

/// HTTP log information.
#[derive(Debug, Serialize)]
struct JsonEncoderHttpMsg {
    pub ts: String,
    pub level: String,
    pub remote: String,
    pub status: String,
    pub method: String,
    pub url: String,
    #[serde(rename = "latencyMs")]
    pub latency_ms: String,
}

/// The log target of access lines. The message format is
/// `[remote] [status] [latency-ms] [url] [method]`.
pub const HTTP_LOGGER_TARGET: &'static str = "http_access";

pub const LEVEL_OFF: &'static str = "off";
pub const LEVEL_ERROR: &'static str = "error";
pub const LEVEL_WARN: &'static str = "warn";
pub const LEVEL_INFO: &'static str = "info";
pub const LEVEL_DEBUG: &'static str = "debug";

pub const STYLE_JSON: &'static str = "json";
pub const STYLE_LOG4J: &'static str = "log4j";

pub const DEF_LEVEL: &'static str = LEVEL_INFO;
pub const DEF_STYLE: &'static str = STYLE_JSON;

pub const FILTER_ONLY: [&'static str; 1] = ["/api/"];

impl LoggerLayer {
    pub fn new() -> Self {
        LoggerLayer {}
    }
}

impl<S> Layer<S> for LoggerLayer {
    type Service = LoggerMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        LoggerMiddleware { service: inner }
    }
}

impl<S> Service<Request> for LoggerMiddleware<S>
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

    fn call(&mut self, req: Request) -> Self::Future {
        let mut svc = self.service.clone();

        Box::pin(async move {
            let start = Instant::now();
            let remote = match req.extensions().get::<ConnectInfo<SocketAddr>>() {
                None => "-".to_string(),
                Some(info) => info.0.to_string(),
            };
            let url = req.uri().to_string();
            let method = req.method().to_string();

            let res = svc.call(req).await?;
            info!(
                target: HTTP_LOGGER_TARGET,
                "{} {} {} {} {}",
                remote,
                res.status().as_u16(),
                start.elapsed().as_millis(),
                url,
                method
            );
            Ok(res)
        })
    }
}

impl Encode for Log4jEncoder {
    fn encode(&self, w: &mut dyn Write, record: &Record<'_>) -> Result<()> {
        let str = match record.target().eq(HTTP_LOGGER_TARGET) {
            false => {
                let module = match get_module_name(record) {
                    None => return Ok(()),
                    Some(module) => module,
                };
                format!(
                    "{} {} [{}] {}\n",
                    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
                    record.level(),
                    module,
                    record.args().to_string().replace("\n", "\\n")
                )
            }
            true => {
                let msg = match get_http_msg(record) {
                    None => return Ok(()),
                    Some(msg) => msg,
                };
                format!(
                    "{} {} [{}] {} {} {} ({} ms)\n",
                    msg.ts,
                    msg.level.to_uppercase(),
                    msg.remote,
                    msg.status,
                    msg.method,
                    msg.url,
                    msg.latency_ms,
                )
            }
        };
        w.write_all(str.as_bytes())?;
        Ok(())
    }
}

impl Encode for JsonEncoder {
    fn encode(&self, w: &mut dyn Write, record: &Record<'_>) -> Result<()> {
        let str = match record.target().eq(HTTP_LOGGER_TARGET) {
            false => {
                let module = match get_module_name(record) {
                    None => return Ok(()),
                    Some(module) => module,
                };
                let msg = JsonEncoderMsg {
                    ts: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
                    level: record.level().to_string().to_lowercase(),
                    module,
                    msg: record.args().to_string(),
                };
                serde_json::to_string(&msg)? + "\n"
            }
            true => {
                let msg = match get_http_msg(record) {
                    None => return Ok(()),
                    Some(msg) => msg,
                };
                serde_json::to_string(&msg)? + "\n"
            }
        };
        w.write_all(str.as_bytes())?;
        Ok(())
    }
}

/// To initialize the logger with configurations.
///
/// The logger can be initialized only once. The following calls are ignored.
pub fn init(conf: &Config) {
    let conf = apply_default(&conf);

    let level = match conf.level.as_deref() {
        Some(LEVEL_OFF) => LevelFilter::Off,
        Some(LEVEL_ERROR) => LevelFilter::Error,
        Some(LEVEL_WARN) => LevelFilter::Warn,
        Some(LEVEL_DEBUG) => LevelFilter::Debug,
        _ => LevelFilter::Info,
    };
    let style = match conf.style.as_deref() {
        Some(STYLE_LOG4J) => STYLE_LOG4J,
        _ => STYLE_JSON,
    };

    let log4j_encoder = ConsoleAppender::builder()
        .encoder(Box::new(Log4jEncoder))
        .build();
    let json_encoder = ConsoleAppender::builder()
        .encoder(Box::new(JsonEncoder))
        .build();
    let config = match log4rs::Config::builder()
        .appender(Appender::builder().build(STYLE_LOG4J, Box::new(log4j_encoder)))
        .appender(Appender::builder().build(STYLE_JSON, Box::new(json_encoder)))
        .build(Root::builder().appender(style).build(level))
    {
        Err(e) => {
            eprintln!("build logger config error: {}", e);
            return;
        }
        Ok(config) => config,
    };
    let _ = log4rs::init_config(config);
}

/// To register Clap arguments.
pub fn reg_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("log.level")
            .long("log.level")
            .help("log level")
            .num_args(1)
            .value_parser([LEVEL_OFF, LEVEL_ERROR, LEVEL_WARN, LEVEL_INFO, LEVEL_DEBUG]),
    )
    .arg(
        Arg::new("log.style")
            .long("log.style")
            .help("log style")
            .num_args(1)
            .value_parser([STYLE_JSON, STYLE_LOG4J]),
    )
}

/// To read input arguments from command-line arguments and environment variables.
///
/// This function will call [`apply_default()`] to fill missing values so you do not need call it
/// again.
pub fn read_args(args: &ArgMatches) -> Config {
    apply_default(&Config {
        level: match args.get_one::<String>("log.level") {
            None => env::var("LOG_LEVEL").ok(),
            Some(v) => Some(v.clone()),
        },
        style: match args.get_one::<String>("log.style") {
            None => env::var("LOG_STYLE").ok(),
            Some(v) => Some(v.clone()),
        },
    })
}

/// Fill missing configuration with default values.
pub fn apply_default(config: &Config) -> Config {
    Config {
        level: match config.level.as_deref() {
            Some(v @ (LEVEL_OFF | LEVEL_ERROR | LEVEL_WARN | LEVEL_INFO | LEVEL_DEBUG)) => {
                Some(v.to_string())
            }
            _ => Some(DEF_LEVEL.to_string()),
        },
        style: match config.style.as_deref() {
            Some(STYLE_LOG4J) => Some(STYLE_LOG4J.to_string()),
            _ => Some(DEF_STYLE.to_string()),
        },
    }
}

/// To skip logs of third-party crates and to get `file:line` for printing logs.
fn get_module_name(record: &Record<'_>) -> Option<String> {
    let module = record.module_path()?;
    match record.file() {
        None => Some(module.to_string()),
        Some(file) => match file.contains("/.cargo/") {
            true => None,
            false => match record.line() {
                None => Some(file.to_string()),
                Some(line) => Some(format!("{}:{}", file, line)),
            },
        },
    }
}

/// Parse the access line written by [`LoggerLayer`]. Requests that are not API calls are
/// filtered out.
fn get_http_msg(record: &Record<'_>) -> Option<JsonEncoderHttpMsg> {
    let msg = record.args().to_string();
    let mut split = msg.split(' ');
    let remote = split.next()?;
    let status = split.next()?;
    let latency_ms = split.next()?;
    let url = split.next()?;
    let method = split.next()?;
    if !FILTER_ONLY.iter().any(|filter| url.contains(filter)) {
        return None;
    }
    let level = match status.chars().next() {
        Some('4') => Level::Warn,
        Some('5') => Level::Error,
        _ => Level::Info,
    };
    Some(JsonEncoderHttpMsg {
        ts: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        level: level.as_str().to_lowercase(),
        remote: remote.to_string(),
        status: status.to_string(),
        method: method.to_string(),
        url: url.to_string(),
        latency_ms: latency_ms.to_string(),
    })
}
