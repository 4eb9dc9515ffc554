/// Access requirements a handler declares at registration.
///
/// The defaults are the strict ones: login required, enabled users only, no
/// public access, no admin requirement, and email verification following the
/// global setting.
///
/// # Examples
///
/// ```
/// use request_gate::Requirements;
///
/// let reqs = Requirements::default().allow_public();
/// assert!(reqs.requires_login);
/// assert!(reqs.allows_public);
///
/// let admin = Requirements::default().require_admin();
/// assert!(admin.requires_admin);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requirements {
    /// The caller must be logged in (unless public access applies)
    pub requires_login: bool,
    /// The caller must be an administrator
    pub requires_admin: bool,
    /// Disabled accounts are turned away
    pub requires_enabled_user: bool,
    /// Anonymous callers may use the handler when public access is enabled globally
    pub allows_public: bool,
    /// Overrides the global email-verification default when set
    pub requires_email_verification: Option<bool>,
}

impl Default for Requirements {
    fn default() -> Self {
        Self {
            requires_login: true,
            requires_admin: false,
            requires_enabled_user: true,
            allows_public: false,
            requires_email_verification: None,
        }
    }
}

impl Requirements {
    /// Requirements for handlers anyone may reach, logged in or not.
    ///
    /// Disabled accounts are still turned away; use
    /// [`allow_disabled`](Self::allow_disabled) to lift that too.
    pub fn open() -> Self {
        Self {
            requires_login: false,
            ..Self::default()
        }
    }

    /// Lets anonymous callers in when public access is enabled globally.
    pub fn allow_public(mut self) -> Self {
        self.allows_public = true;
        self
    }

    /// Restricts the handler to administrators.
    pub fn require_admin(mut self) -> Self {
        self.requires_admin = true;
        self
    }

    /// Lets disabled accounts through.
    pub fn allow_disabled(mut self) -> Self {
        self.requires_enabled_user = false;
        self
    }

    /// Overrides the email-verification requirement.
    pub fn email_verification(mut self, required: bool) -> Self {
        self.requires_email_verification = Some(required);
        self
    }

    /// Resolves the email-verification requirement against the global default.
    pub fn requires_email_verification(&self, global_default: bool) -> bool {
        self.requires_email_verification.unwrap_or(global_default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_strict() {
        let reqs = Requirements::default();
        assert!(reqs.requires_login);
        assert!(reqs.requires_enabled_user);
        assert!(!reqs.allows_public);
        assert!(!reqs.requires_admin);
    }

    #[test]
    fn email_verification_falls_back_to_global() {
        let reqs = Requirements::default();
        assert!(reqs.requires_email_verification(true));
        assert!(!reqs.requires_email_verification(false));

        let overridden = Requirements::default().email_verification(false);
        assert!(!overridden.requires_email_verification(true));
    }

    #[test]
    fn open_handlers_skip_login_only() {
        let reqs = Requirements::open();
        assert!(!reqs.requires_login);
        assert!(reqs.requires_enabled_user);
        assert!(!Requirements::open().allow_disabled().requires_enabled_user);
    }
}
