//! String libraries.

use chrono::{DateTime, SecondsFormat, Utc};
use hmac::Hmac;
use rand::{Rng, distr::Alphanumeric};
use regex::Regex;
use sha2::Sha256;

const PASSWORD_ROUNDS: u32 = 10000;

/// To check if the user name is valid. A name is an identifier or an e-mail address.
///
/// The name is compared in lower case.
pub fn is_username(name: &str) -> bool {
    let name = name.to_lowercase();
    let name_regex = match Regex::new(r"^[a-z0-9][a-z0-9_.-]*$") {
        Err(_) => return false,
        Ok(regex) => regex,
    };
    name_regex.is_match(name.as_str()) || is_email(name.as_str())
}

/// To check if the string looks like an e-mail address.
pub fn is_email(email: &str) -> bool {
    match Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$") {
        Err(_) => false,
        Ok(regex) => regex.is_match(email),
    }
}

/// To hash the password.
pub fn password_hash(password: &str, salt: &str) -> String {
    let mut res: [u8; 32] = [0; 32];
    let _ = pbkdf2::pbkdf2::<Hmac<Sha256>>(
        password.as_bytes(),
        salt.as_bytes(),
        PASSWORD_ROUNDS,
        &mut res,
    );
    hex::encode(res)
}

/// To generate random alphanumeric string with the specified length.
pub fn randomstring(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// To convert time to ISO8601 format with milliseconds precision (`YYYY-MM-DDThh:mm:ss.SSSZ`).
pub fn time_str(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// To generate a transaction number in `[prefix]-[YYYYMMDD]-[6 upper-case hex]` format.
pub fn transaction_number(prefix: &str, time: &DateTime<Utc>) -> String {
    let suffix: u32 = rand::rng().random_range(0..0x100_0000);
    format!("{}-{}-{:06X}", prefix, time.format("%Y%m%d"), suffix)
}
