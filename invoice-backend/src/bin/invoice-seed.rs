use std::{collections::HashMap, error::Error as StdError, fs};

use chrono::Utc;
use clap::{Arg as ClapArg, ArgMatches, Command};
use json5;
use log::{self, error, info};
use serde::Deserialize;
use tokio;

use invoice_backend::{
    libs,
    models::{
        self, Model,
        document_rules::{BusinessRule, DocumentRules, OtherRule},
        dropdown::Dropdown,
        user::{QueryCond, Updates as UserUpdates, User},
    },
    routes,
};
use invoice_corelib::{logger, role::Role, strings};

#[derive(Deserialize)]
struct AppConfig {
    log: logger::Config,
    backend: libs::config::Config,
}

const PROJ_NAME: &'static str = env!("CARGO_BIN_NAME");
const PROJ_VER: &'static str = env!("CARGO_PKG_VERSION");
const SEED_USER: &'static str = "System_Seed";
const SALT_LEN: usize = 8;
const DROPDOWN_CHECK_TYPE: &'static str = "gst_type";

/// (type, value, label, locked)
const DEFAULT_DROPDOWNS: [(&'static str, &'static str, &'static str, bool); 5] = [
    ("gst_type", "regular", "Regular", true),
    ("gst_type", "composition", "Composition", true),
    ("gst_type", "unregistered", "Unregistered", true),
    ("gst_type", "consumer", "Consumer", false),
    ("gst_type", "overseas", "Overseas", false),
];

#[tokio::main]
async fn main() -> std::io::Result<()> {
    const FN_NAME: &'static str = "main";

    let args = init_args().get_matches();
    let conf = match read_config(&args) {
        Err(e) => {
            logger::init(&logger::Config::default());
            error!("[{}] read config error: {}", FN_NAME, e);
            return Ok(());
        }
        Ok(conf) => conf,
    };
    logger::init(&conf.log);

    let state = match routes::new_state(&conf.backend).await {
        Err(e) => {
            error!("[{}] new routes state error: {}", FN_NAME, e);
            return Ok(());
        }
        Ok(state) => state,
    };
    let model = state.model.as_ref();

    let result = match args.subcommand() {
        Some(("rules", _)) => seed_rules(model).await,
        Some(("dropdowns", _)) => seed_dropdowns(model).await,
        Some(("admin", sub_args)) => seed_admin(model, sub_args, state.default_tenant.as_str()).await,
        _ => Err("use -h".to_string()),
    };
    if let Err(e) = result {
        error!("[{}] seed error: {}", FN_NAME, e);
    }
    if let Err(e) = model.close().await {
        error!("[{}] close database error: {}", FN_NAME, e);
    }
    Ok(())
}

fn init_args() -> Command {
    let mut args = Command::new(PROJ_NAME)
        .version(PROJ_VER)
        .about("Seeds default data into the database")
        .subcommand_required(true)
        .arg(
            ClapArg::new("file")
                .short('f')
                .long("file")
                .help("config file")
                .num_args(1)
                .global(true),
        )
        .subcommand(Command::new("rules").about("Insert the default document rules"))
        .subcommand(Command::new("dropdowns").about("Insert the default dropdown values"))
        .subcommand(
            Command::new("admin")
                .about("Create or promote an administrator")
                .arg(
                    ClapArg::new("username")
                        .long("username")
                        .help("user name")
                        .num_args(1)
                        .required(true),
                )
                .arg(
                    ClapArg::new("password")
                        .long("password")
                        .help("password of a new user")
                        .num_args(1)
                        .required(true),
                )
                .arg(
                    ClapArg::new("tenant")
                        .long("tenant")
                        .help("tenant of a new user")
                        .num_args(1),
                ),
        );
    args = logger::reg_args(args);
    args = libs::config::reg_args(args);
    args
}

fn read_config(args: &ArgMatches) -> Result<AppConfig, Box<dyn StdError>> {
    if let Some(v) = args.get_one::<String>("file") {
        let conf_str = fs::read_to_string(v)?;
        let conf: AppConfig = json5::from_str(conf_str.as_str())?;
        return Ok(AppConfig {
            log: logger::apply_default(&conf.log),
            backend: libs::config::apply_default(&conf.backend),
        });
    }
    Ok(AppConfig {
        log: logger::read_args(args),
        backend: libs::config::read_args(args),
    })
}

async fn seed_rules(model: &dyn Model) -> Result<(), String> {
    const FN_NAME: &'static str = "seed_rules";

    match model.document_rules().get().await {
        Err(e) => return Err(format!("get rules error: {}", e)),
        Ok(Some(_)) => {
            info!("[{}] document rules exist, skip", FN_NAME);
            return Ok(());
        }
        Ok(None) => (),
    }
    let rules = default_rules();
    if let Err(e) = model.document_rules().save(&rules).await {
        return Err(format!("save rules error: {}", e));
    }
    info!("[{}] document rules seeded", FN_NAME);
    Ok(())
}

async fn seed_dropdowns(model: &dyn Model) -> Result<(), String> {
    const FN_NAME: &'static str = "seed_dropdowns";

    match model.dropdown().list_by_type(DROPDOWN_CHECK_TYPE).await {
        Err(e) => return Err(format!("list dropdowns error: {}", e)),
        Ok(list) => {
            if list.len() > 0 {
                info!(
                    "[{}] dropdowns of type {} exist, skip",
                    FN_NAME, DROPDOWN_CHECK_TYPE
                );
                return Ok(());
            }
        }
    }
    let now = Utc::now();
    for (dropdown_type, value, label, is_locked) in DEFAULT_DROPDOWNS {
        let dropdown = Dropdown {
            dropdown_id: models::new_id(),
            dropdown_type: dropdown_type.to_string(),
            value: value.to_string(),
            label: label.to_string(),
            is_locked,
            created_at: now,
            modified_at: now,
            modified_by: Some(SEED_USER.to_string()),
        };
        if let Err(e) = model.dropdown().add(&dropdown).await {
            return Err(format!("add dropdown {} error: {}", value, e));
        }
    }
    info!(
        "[{}] {} dropdown values seeded",
        FN_NAME,
        DEFAULT_DROPDOWNS.len()
    );
    Ok(())
}

async fn seed_admin(model: &dyn Model, args: &ArgMatches, def_tenant: &str) -> Result<(), String> {
    const FN_NAME: &'static str = "seed_admin";

    let username = match args.get_one::<String>("username") {
        None => return Err("missing username".to_string()),
        Some(username) => username.to_lowercase(),
    };
    if !strings::is_username(username.as_str()) {
        return Err(format!("invalid username {}", username));
    }
    let password = match args.get_one::<String>("password") {
        Some(password) if password.len() > 0 => password.as_str(),
        _ => return Err("missing password".to_string()),
    };
    let tenant_id = match args.get_one::<String>("tenant") {
        None => def_tenant,
        Some(tenant) => tenant.as_str(),
    };

    let cond = QueryCond {
        username: Some(username.as_str()),
        ..Default::default()
    };
    let user = match model.user().get(&cond).await {
        Err(e) => return Err(format!("get user error: {}", e)),
        Ok(user) => user,
    };
    let now = Utc::now();
    match user {
        Some(user) => {
            let mut roles = user.roles.clone();
            roles.insert(Role::ADMIN.to_string(), true);
            let updates = UserUpdates {
                modified_at: Some(now),
                roles: Some(&roles),
                is_active: Some(true),
                ..Default::default()
            };
            if let Err(e) = model.user().update(user.user_id.as_str(), &updates).await {
                return Err(format!("update user error: {}", e));
            }
            info!("[{}] user {} promoted to admin", FN_NAME, username);
        }
        None => {
            let salt = strings::randomstring(SALT_LEN);
            let mut roles = HashMap::new();
            roles.insert(Role::ADMIN.to_string(), true);
            roles.insert(Role::USER.to_string(), true);
            let user = User {
                user_id: models::new_id(),
                username: username.clone(),
                email: None,
                created_at: now,
                modified_at: now,
                roles,
                password: strings::password_hash(password, salt.as_str()),
                salt,
                tenant_id: tenant_id.to_string(),
                is_active: true,
            };
            if let Err(e) = model.user().add(&user).await {
                return Err(format!("add user error: {}", e));
            }
            info!("[{}] admin {} created", FN_NAME, username);
        }
    }
    Ok(())
}

fn default_rules() -> DocumentRules {
    let business_rules = [
        (
            "Private Company",
            "Registered under the Companies Act.",
            "Required for all transactions.",
            "Required if turnover exceeds threshold.",
            "Required for TDS deduction.",
            true,
        ),
        (
            "Public Company",
            "A company whose shares are traded freely on a stock exchange.",
            "Mandatory for all financial transactions.",
            "Mandatory.",
            "Mandatory.",
            false,
        ),
        (
            "Sole Proprietorship",
            "An unincorporated business owned and run by one individual.",
            "Owner's PAN can be used.",
            "Required if turnover exceeds threshold.",
            "Required for TDS deduction.",
            false,
        ),
    ];
    let other_rules = [
        (
            "Aadhaar Card Rules",
            "Format: 12-digit numeric\nExample: 1234 5678 9012\nIssued By: UIDAI",
            true,
        ),
        (
            "Director Identification Number (DIN)",
            "Format: 8-digit numeric\nExample: 01234567\nIssued By: Ministry of Corporate Affairs (MCA)",
            false,
        ),
        (
            "Corporate Identity Number (CIN)",
            "Format: 21-digit alphanumeric\nExample: U74899DL2021PTC123456\nIssued By: Registrar of Companies (ROC)",
            false,
        ),
    ];

    DocumentRules {
        business_rules: business_rules
            .iter()
            .map(|(name, desc, pan, gstin, tan, locked)| BusinessRule {
                rule_id: models::new_id(),
                name: name.to_string(),
                description: desc.to_string(),
                pan_rules: pan.to_string(),
                gstin_rules: gstin.to_string(),
                tan_rules: tan.to_string(),
                is_locked: *locked,
            })
            .collect(),
        other_rules: other_rules
            .iter()
            .map(|(name, desc, locked)| OtherRule {
                rule_id: models::new_id(),
                name: name.to_string(),
                description: desc.to_string(),
                is_locked: *locked,
            })
            .collect(),
        modified_at: Some(Utc::now()),
        modified_by: Some(SEED_USER.to_string()),
    }
}
