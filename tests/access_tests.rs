use igreja_api::access::{
    AccessDenied, CONTENT_EDITORS, Role, USER_ADMINS, authorize, effective_role,
};
use igreja_api::error::ApiError;

#[test]
fn test_effective_role_prefers_admin_over_editor() {
    assert_eq!(effective_role(&[Role::Editor, Role::Admin]), Some(Role::Admin));
    assert_eq!(effective_role(&[Role::Admin, Role::Editor]), Some(Role::Admin));
}

#[test]
fn test_effective_role_single_and_empty() {
    assert_eq!(effective_role(&[Role::Editor]), Some(Role::Editor));
    assert_eq!(effective_role(&[]), None);
}

#[test]
fn test_authorize_allows_roles_on_the_list() {
    assert_eq!(authorize(Some(Role::Admin), CONTENT_EDITORS), Ok(Role::Admin));
    assert_eq!(authorize(Some(Role::Editor), CONTENT_EDITORS), Ok(Role::Editor));
    assert_eq!(authorize(Some(Role::Admin), USER_ADMINS), Ok(Role::Admin));
}

#[test]
fn test_authorize_forbids_roles_off_the_list() {
    assert_eq!(
        authorize(Some(Role::Editor), USER_ADMINS),
        Err(AccessDenied::Forbidden(Role::Editor))
    );
    assert_eq!(
        authorize(Some(Role::Admin), &[]),
        Err(AccessDenied::Forbidden(Role::Admin))
    );
}

#[test]
fn test_authorize_without_role_is_unauthenticated() {
    assert_eq!(authorize(None, CONTENT_EDITORS), Err(AccessDenied::Unauthenticated));
    assert_eq!(authorize(None, USER_ADMINS), Err(AccessDenied::Unauthenticated));
}

#[test]
fn test_access_denied_maps_to_http_errors() {
    let unauthenticated = ApiError::from(AccessDenied::Unauthenticated);
    assert_eq!(unauthenticated.status_code(), 401);
    assert_eq!(unauthenticated.kind(), "Unauthorized");

    let forbidden = ApiError::from(AccessDenied::Forbidden(Role::Editor));
    assert_eq!(forbidden.status_code(), 403);
    assert_eq!(forbidden.kind(), "Forbidden");
}

#[test]
fn test_role_string_forms() {
    assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
    assert_eq!("editor".parse::<Role>(), Ok(Role::Editor));
    assert!("owner".parse::<Role>().is_err());
    assert!("Admin".parse::<Role>().is_err());

    assert_eq!(Role::Editor.to_string(), "editor");
    assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
    assert_eq!(serde_json::from_str::<Role>("\"editor\"").unwrap(), Role::Editor);
}
