use super::principal::Principal;
use crate::error::AppError;

/// Operations gated by the access policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ListParticipants,
    CreateParticipant,
    ReadParticipant,
    DeleteParticipant,
    SetEpisode,
    AppendEpisode,
    PatchEpisode,
    DeleteEpisode,
    AddComment,
    ListComments,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    User,
    Admin,
}

impl Action {
    pub fn tier(self) -> Tier {
        match self {
            Action::ListParticipants | Action::ListComments => Tier::User,
            Action::CreateParticipant
            | Action::ReadParticipant
            | Action::DeleteParticipant
            | Action::SetEpisode
            | Action::AppendEpisode
            | Action::PatchEpisode
            | Action::DeleteEpisode
            | Action::AddComment => Tier::Admin,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    InsufficientPrivilege,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(self) -> bool { matches!(self, Decision::Allow) }

    pub fn into_result(self, action: Action) -> Result<(), AppError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(DenyReason::InsufficientPrivilege) => Err(AppError::forbidden(
                "insufficient_privilege".to_string(),
                format!("{:?} requires an administrator", action),
            )),
        }
    }
}

/// Pure tier check; never consults storage.
pub fn authorize_tier(principal: &Principal, tier: Tier) -> Decision {
    match tier {
        Tier::User => Decision::Allow,
        Tier::Admin if principal.is_admin => Decision::Allow,
        Tier::Admin => Decision::Deny(DenyReason::InsufficientPrivilege),
    }
}

pub fn authorize(principal: &Principal, action: Action) -> Decision {
    authorize_tier(principal, action.tier())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADMIN_ACTIONS: [Action; 8] = [
        Action::CreateParticipant,
        Action::ReadParticipant,
        Action::DeleteParticipant,
        Action::SetEpisode,
        Action::AppendEpisode,
        Action::PatchEpisode,
        Action::DeleteEpisode,
        Action::AddComment,
    ];

    #[test]
    fn admin_actions_require_admin() {
        let user = Principal::user("u");
        let admin = Principal::admin("a");
        for action in ADMIN_ACTIONS {
            assert_eq!(authorize(&user, action), Decision::Deny(DenyReason::InsufficientPrivilege), "{:?}", action);
            assert_eq!(authorize(&admin, action), Decision::Allow, "{:?}", action);
        }
    }

    #[test]
    fn user_actions_allow_any_principal() {
        for p in [Principal::user("u"), Principal::admin("a")] {
            assert!(authorize(&p, Action::ListParticipants).is_allowed());
            assert!(authorize(&p, Action::ListComments).is_allowed());
        }
    }

    #[test]
    fn denial_maps_to_insufficient_privilege() {
        let err = authorize(&Principal::user("u"), Action::DeleteParticipant)
            .into_result(Action::DeleteParticipant)
            .unwrap_err();
        assert!(matches!(err, AppError::InsufficientPrivilege { .. }));
        assert_eq!(err.http_status(), 401);
    }
}
