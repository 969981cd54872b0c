use std::collections::HashMap;

use chrono::{DateTime, SubsecRound, TimeZone, Utc};
use laboratory::{SpecContext, expect};

use invoice_backend::models::{
    self, Model,
    user::{QueryCond, Updates, User},
};

use super::STATE;
use crate::TestState;

fn new_user(username: &str, now: DateTime<Utc>) -> User {
    let mut roles = HashMap::new();
    roles.insert("user".to_string(), true);
    User {
        user_id: models::new_id(),
        username: username.to_string(),
        email: None,
        created_at: now,
        modified_at: now,
        roles,
        password: "password".to_string(),
        salt: "salt".to_string(),
        tenant_id: crate::TEST_TENANT.to_string(),
        is_active: true,
    }
}

/// Test `add()` and `get()`.
pub fn add_get(context: &mut SpecContext<TestState>) -> Result<(), String> {
    let state = context.state.borrow();
    let state = state.get(STATE).unwrap();
    let runtime = state.runtime.as_ref().unwrap();
    let model = match state.mongodb.as_ref() {
        None => return Ok(()),
        Some(model) => model.user(),
    };

    let now = Utc::now().trunc_subsecs(3);
    let mut user = new_user("model_add_get", now);
    user.email = Some("add_get@example.com".to_string());
    if let Err(e) = runtime.block_on(async { model.add(&user).await }) {
        return Err(format!("add error: {}", e));
    }

    let cond = QueryCond {
        username: Some("model_add_get"),
        ..Default::default()
    };
    let item = match runtime.block_on(async { model.get(&cond).await }) {
        Err(e) => return Err(format!("get by username error: {}", e)),
        Ok(None) => return Err("should get by username".to_string()),
        Ok(Some(item)) => item,
    };
    expect(item).to_equal(user.clone())?;

    let cond = QueryCond {
        user_id: Some(user.user_id.as_str()),
        ..Default::default()
    };
    match runtime.block_on(async { model.get(&cond).await }) {
        Err(e) => return Err(format!("get by ID error: {}", e)),
        Ok(item) => expect(item.is_some()).to_equal(true)?,
    }

    let cond = QueryCond {
        username: Some("model_not_exist"),
        ..Default::default()
    };
    match runtime.block_on(async { model.get(&cond).await }) {
        Err(e) => Err(format!("get not exist error: {}", e)),
        Ok(item) => expect(item.is_none()).to_equal(true),
    }
}

/// Test `add()` with a duplicate user name.
pub fn add_dup(context: &mut SpecContext<TestState>) -> Result<(), String> {
    let state = context.state.borrow();
    let state = state.get(STATE).unwrap();
    let runtime = state.runtime.as_ref().unwrap();
    let model = match state.mongodb.as_ref() {
        None => return Ok(()),
        Some(model) => model.user(),
    };

    let now = Utc::now().trunc_subsecs(3);
    if let Err(e) = runtime.block_on(async { model.add(&new_user("model_dup", now)).await }) {
        return Err(format!("add error: {}", e));
    }
    let result = runtime.block_on(async { model.add(&new_user("model_dup", now)).await });
    expect(result.is_err()).to_equal(true)
}

/// Test `update()`.
pub fn update(context: &mut SpecContext<TestState>) -> Result<(), String> {
    let state = context.state.borrow();
    let state = state.get(STATE).unwrap();
    let runtime = state.runtime.as_ref().unwrap();
    let model = match state.mongodb.as_ref() {
        None => return Ok(()),
        Some(model) => model.user(),
    };

    let now = Utc::now().trunc_subsecs(3);
    let user = new_user("model_update", now);
    if let Err(e) = runtime.block_on(async { model.add(&user).await }) {
        return Err(format!("add error: {}", e));
    }

    let mut roles = HashMap::new();
    roles.insert("admin".to_string(), true);
    let modified_at = now + chrono::TimeDelta::try_seconds(5).unwrap();
    let updates = Updates {
        modified_at: Some(modified_at),
        email: Some(Some("update@example.com")),
        roles: Some(&roles),
        password: Some("password2".to_string()),
        salt: Some("salt2".to_string()),
        tenant_id: Some(crate::TEST_OTHER_TENANT),
        is_active: Some(false),
    };
    if let Err(e) = runtime.block_on(async { model.update(user.user_id.as_str(), &updates).await })
    {
        return Err(format!("update error: {}", e));
    }

    let cond = QueryCond {
        user_id: Some(user.user_id.as_str()),
        ..Default::default()
    };
    let item = match runtime.block_on(async { model.get(&cond).await }) {
        Err(e) => return Err(format!("get error: {}", e)),
        Ok(None) => return Err("should get the updated one".to_string()),
        Ok(Some(item)) => item,
    };
    expect(item.modified_at).to_equal(modified_at)?;
    expect(item.created_at).to_equal(now)?;
    expect(item.email.as_deref()).to_equal(Some("update@example.com"))?;
    expect(item.roles).to_equal(roles.clone())?;
    expect(item.password.as_str()).to_equal("password2")?;
    expect(item.salt.as_str()).to_equal("salt2")?;
    expect(item.tenant_id.as_str()).to_equal(crate::TEST_OTHER_TENANT)?;
    expect(item.is_active).to_equal(false)?;

    let updates = Updates {
        email: Some(None),
        ..Default::default()
    };
    if let Err(e) = runtime.block_on(async { model.update(user.user_id.as_str(), &updates).await })
    {
        return Err(format!("update email error: {}", e));
    }
    match runtime.block_on(async { model.get(&cond).await }) {
        Err(e) => Err(format!("get error: {}", e)),
        Ok(None) => Err("should get the updated one".to_string()),
        Ok(Some(item)) => expect(item.email).to_equal(None),
    }
}

/// Test `list_recent()`.
pub fn list_recent(context: &mut SpecContext<TestState>) -> Result<(), String> {
    let state = context.state.borrow();
    let state = state.get(STATE).unwrap();
    let runtime = state.runtime.as_ref().unwrap();
    let model = match state.mongodb.as_ref() {
        None => return Ok(()),
        Some(model) => model.user(),
    };

    for (i, name) in ["model_recent1", "model_recent2", "model_recent3"]
        .iter()
        .enumerate()
    {
        let created_at = Utc.with_ymd_and_hms(2000, 1, 1 + i as u32, 0, 0, 0).unwrap();
        if let Err(e) = runtime.block_on(async { model.add(&new_user(name, created_at)).await }) {
            return Err(format!("add {} error: {}", name, e));
        }
    }
    let list = match runtime.block_on(async { model.list_recent(2).await }) {
        Err(e) => return Err(format!("list_recent error: {}", e)),
        Ok(list) => list,
    };
    let names: Vec<&str> = list.iter().map(|u| u.username.as_str()).collect();
    expect(names).to_equal(vec!["model_recent1", "model_recent2"])
}
