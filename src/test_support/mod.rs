#[cfg(all(test, not(target_arch = "wasm32")))]
pub mod ssr;

#[cfg(test)]
pub mod helpers {
    use crate::state::session::{GrantedRoles, Profile, Session, SessionContext};
    use leptos::*;
    use std::collections::HashMap;

    pub fn authenticated_session(roles: &[&str]) -> Session {
        Session {
            access_token: Some("test-token".into()),
            expires_at: Some(i64::MAX),
            authenticated: true,
            profile: Profile {
                username: Some("rex".into()),
                first_name: Some("Rex".into()),
                last_name: Some("Raptor".into()),
                email: Some("rex@example.com".into()),
            },
            granted_roles: GrantedRoles {
                realm_roles: roles.iter().map(|r| r.to_string()).collect(),
                resource_roles: HashMap::new(),
            },
            loading: false,
        }
    }

    pub fn provide_session(session: Session) -> SessionContext {
        let ctx = create_signal(session);
        provide_context::<SessionContext>(ctx);
        ctx
    }
}
