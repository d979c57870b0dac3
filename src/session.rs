//! Session state and the permission gate.
//!
//! The token, user name and granted permissions are read once at startup
//! from a key=value session file and passed around as an explicit value,
//! never looked up ambiently. `logout` clears the whole triple at once.
//!
//! The gate itself is a pure, synchronous decision: no network, no state.

use std::fmt::Write as _;
use std::path::Path;

/// Permission that short-circuits every check.
pub const ADMIN: &str = "admin";

/// Priority-ordered (route, permission) pairs the fallback resolver walks
/// when access to the requested screen is denied. When none match, the
/// caller redirects to the login entry.
pub const ROUTE_PRIORITY: &[(&str, &str)] = &[
    ("/customer", "customer"),
    ("/product", "product"),
    ("/inventory", "inventory"),
    ("/category", "category"),
    ("/users", "admin-users"),
];

#[derive(Clone, Debug, Default)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<String>,
    pub permissions: Vec<String>,
}

impl Session {
    pub fn new(token: Option<String>, user: Option<String>, permissions: Vec<String>) -> Self {
        Self { token, user, permissions }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.as_deref().map(|t| !t.trim().is_empty()).unwrap_or(false)
    }

    /// Allow when the user holds `admin` or any one of the alternatives
    /// (OR semantics, never AND).
    pub fn allows(&self, required: &[&str]) -> bool {
        allows(required, &self.permissions)
    }

    /// First route from [`ROUTE_PRIORITY`] the user may enter, or `None`
    /// (meaning: back to login).
    pub fn fallback_route(&self) -> Option<&'static str> {
        ROUTE_PRIORITY
            .iter()
            .find(|(_, perm)| allows(&[perm], &self.permissions))
            .map(|(route, _)| *route)
    }

    /// Parse a session file. A missing file yields an empty (logged-out)
    /// session; malformed lines are skipped.
    pub fn load(path: &str) -> Self {
        let Ok(contents) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        let mut session = Self::default();
        for raw in contents.lines() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.splitn(2, '=');
            let key = parts.next().map(|s| s.trim()).unwrap_or("");
            let val = parts.next().map(|s| s.trim()).unwrap_or("");
            if key.is_empty() || val.is_empty() {
                continue;
            }
            match key {
                "token" => session.token = Some(val.to_string()),
                "user" => session.user = Some(val.to_string()),
                "permissions" => {
                    session.permissions = val
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect();
                }
                _ => {}
            }
        }
        session
    }

    pub fn write_file(&self, path: &str) -> std::io::Result<()> {
        let mut buf = String::new();
        buf.push_str("# backdesk session\n");
        if let Some(token) = &self.token {
            let _ = writeln!(&mut buf, "token = {token}");
        }
        if let Some(user) = &self.user {
            let _ = writeln!(&mut buf, "user = {user}");
        }
        if !self.permissions.is_empty() {
            let _ = writeln!(&mut buf, "permissions = {}", self.permissions.join(","));
        }
        std::fs::write(path, buf)
    }

    /// Logout: token, user and permissions go away together.
    pub fn clear_file(path: &str) -> std::io::Result<()> {
        if Path::new(path).exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

/// The pure gate. `required` lists acceptable alternatives; empty means
/// unrestricted.
pub fn allows(required: &[&str], held: &[String]) -> bool {
    if required.is_empty() {
        return true;
    }
    if held.iter().any(|p| p == ADMIN) {
        return true;
    }
    required.iter().any(|req| held.iter().any(|p| p == req))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn held(perms: &[&str]) -> Vec<String> {
        perms.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn admin_short_circuits_every_check() {
        assert!(allows(&["customer"], &held(&["admin"])));
        assert!(allows(&["anything-at-all"], &held(&["admin"])));
    }

    #[test]
    fn single_permission_and_or_semantics() {
        assert!(allows(&["customer"], &held(&["customer"])));
        assert!(!allows(&["product"], &held(&["customer"])));
        // list of alternatives: intersection suffices
        assert!(allows(&["product", "customer"], &held(&["customer"])));
        assert!(!allows(&["product", "inventory"], &held(&["customer"])));
    }

    #[test]
    fn denied_admin_request_falls_back_to_first_held_route() {
        let s = Session::new(Some("t".into()), None, held(&["customer"]));
        assert!(!s.allows(&["admin"]));
        assert_eq!(s.fallback_route(), Some("/customer"));
    }

    #[test]
    fn no_held_permission_means_back_to_login() {
        let s = Session::new(Some("t".into()), None, vec![]);
        assert_eq!(s.fallback_route(), None);
    }

    #[test]
    fn admin_falls_back_to_the_top_priority_route() {
        let s = Session::new(Some("t".into()), None, held(&["admin"]));
        assert_eq!(s.fallback_route(), Some("/customer"));
    }
}
