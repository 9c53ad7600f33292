//! Post-login redirect selection

use tt_models::Role;

const LOGIN_PATH: &str = "/account/login";

/// Default landing page for a role
pub fn landing_path(role: Role) -> &'static str {
    match role {
        Role::Manager | Role::Admin => "/employees",
        Role::Employee => "/time-entries",
    }
}

/// Accept a return URL only when it is a local path.
///
/// The value must start with exactly one `/`, must not be protocol-relative
/// (`//host`, `/\host`), must not carry a scheme and must not lead back to
/// the login page.
pub fn safe_return_url(return_url: Option<&str>) -> Option<String> {
    let url = return_url?.trim();

    if !url.starts_with('/') || url.starts_with("//") || url.starts_with("/\\") {
        return None;
    }
    if url.contains("://") || url.chars().any(char::is_control) {
        return None;
    }
    if url.to_ascii_lowercase().contains(LOGIN_PATH) {
        return None;
    }

    Some(url.to_string())
}

/// Where to send a user after a successful login
pub fn post_login_redirect(return_url: Option<&str>, role: Role) -> String {
    safe_return_url(return_url).unwrap_or_else(|| landing_path(role).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landing_paths() {
        assert_eq!(landing_path(Role::Admin), "/employees");
        assert_eq!(landing_path(Role::Manager), "/employees");
        assert_eq!(landing_path(Role::Employee), "/time-entries");
    }

    #[test]
    fn test_local_return_url_is_kept() {
        assert_eq!(
            post_login_redirect(Some("/reports/monthly?month=3"), Role::Employee),
            "/reports/monthly?month=3"
        );
    }

    #[test]
    fn test_rejects_foreign_targets() {
        for url in [
            "//evil.example.com",
            "/\\evil.example.com",
            "https://evil.example.com",
            "evil.example.com/x",
            "/redirect?to=https://evil.example.com",
            "",
        ] {
            assert_eq!(safe_return_url(Some(url)), None, "{url}");
        }
    }

    #[test]
    fn test_rejects_login_page() {
        assert_eq!(safe_return_url(Some("/Account/Login?returnUrl=/x")), None);
        assert_eq!(post_login_redirect(Some("/account/login"), Role::Admin), "/employees");
    }

    #[test]
    fn test_missing_return_url_uses_role() {
        assert_eq!(post_login_redirect(None, Role::Employee), "/time-entries");
    }
}
