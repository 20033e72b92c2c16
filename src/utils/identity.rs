// src/utils/identity.rs
//! Local OS user identity lookup
//!
//! The first-run page greets the user by name. The display name (the GECOS
//! field of the passwd entry on Unix) is preferred, the login name is the
//! fallback and an empty string means nothing could be resolved.

use std::env;
use std::fs;
use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System, UpdateKind, Users};

const PASSWD_FILE: &str = "/etc/passwd";

/// Resolves the identity of the user running this process
///
/// Never fails; lookup problems yield an empty string.
pub fn current_identity() -> String {
    let Some(login) = login_name() else {
        return String::new();
    };

    match display_name(&login) {
        Some(name) => name,
        None => login,
    }
}

/// Login name of the process owner, from the process table, then the environment
fn login_name() -> Option<String> {
    process_owner()
        .or_else(|| env::var("USER").ok())
        .or_else(|| env::var("USERNAME").ok())
        .filter(|name| !name.is_empty())
}

fn process_owner() -> Option<String> {
    let pid = sysinfo::get_current_pid().ok()?;
    let mut system = System::new();
    system.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[pid]),
        true,
        ProcessRefreshKind::nothing().with_user(UpdateKind::Always),
    );
    let uid = system.process(pid)?.user_id()?.clone();
    let users = Users::new_with_refreshed_list();
    users.get_user_by_id(&uid).map(|user| user.name().to_string())
}

fn display_name(login: &str) -> Option<String> {
    let passwd = fs::read_to_string(PASSWD_FILE).ok()?;
    gecos_name(&passwd, login)
}

/// Extracts the full-name part of the GECOS field for `login`
pub(crate) fn gecos_name(passwd: &str, login: &str) -> Option<String> {
    passwd
        .lines()
        .filter(|line| !line.starts_with('#'))
        .find_map(|line| {
            let mut fields = line.split(':');
            if fields.next()? != login {
                return None;
            }
            // password, uid, gid, then gecos
            let gecos = fields.nth(3)?;
            let name = gecos.split(',').next()?.trim();
            (!name.is_empty()).then(|| name.to_string())
        })
}
