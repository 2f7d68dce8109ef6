use crate::api::UploadKind;

/// Backend role of the signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Role {
    Admin,
    ViewAndWithdraw,
    /// Any other role, or no role known yet
    #[default]
    Restricted,
}

impl Role {
    pub fn from_name(name: &str) -> Self {
        match name {
            "admin" => Role::Admin,
            "view_and_withdraw" => Role::ViewAndWithdraw,
            _ => Role::Restricted,
        }
    }
}

/// Actions the current role may see.
///
/// This only decides what the dashboard offers; the backend enforces the real
/// authorization. A pending or failed role lookup grants nothing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoleGate {
    role: Role,
    user_name: Option<String>,
}

impl RoleGate {
    pub fn for_user(name: impl Into<String>, role_name: &str) -> Self {
        Self {
            role: Role::from_name(role_name),
            user_name: Some(name.into()),
        }
    }

    /// Most restrictive gate, used before and after a failed role lookup
    pub fn restricted() -> Self {
        Self::default()
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    pub fn user_name(&self) -> Option<&str> {
        self.user_name.as_deref()
    }

    pub fn allowed_uploads(&self) -> &'static [UploadKind] {
        match self.role {
            Role::Admin => &UploadKind::ALL,
            Role::ViewAndWithdraw => &[UploadKind::Withdraw],
            Role::Restricted => &[],
        }
    }

    pub fn can_upload(&self, kind: UploadKind) -> bool {
        self.allowed_uploads().contains(&kind)
    }

    pub fn can_withdraw(&self) -> bool {
        matches!(self.role, Role::Admin | Role::ViewAndWithdraw)
    }

    pub fn has_mutating_actions(&self) -> bool {
        self.can_withdraw() || !self.allowed_uploads().is_empty()
    }
}
