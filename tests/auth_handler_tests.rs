
use test_doubles::*;
use uuid::Uuid;

use image_service_backend::auth::jwt::JwtService;
use image_service_backend::auth::password::hash_password;
use image_service_backend::entities::user::{LoginUser, NewUser};
use image_service_backend::errors::{AppError, AuthError};
use image_service_backend::use_cases::auth::AuthHandler;

fn jwt_service() -> JwtService {
    JwtService::new(&test_config())
}

#[actix_rt::test]
async fn register_creates_the_user_and_issues_a_token() {
    let mut repo = MockUserRepo::new();
    repo.expect_find_by_email_or_username()
        .times(1)
        .returning(|_, _| Ok(None));
    repo.expect_create_user().times(1).returning(|insert| {
        let mut user = sample_user(Uuid::new_v4(), &insert.password_hash);
        user.username = insert.username.clone();
        user.email = insert.email.clone();
        Ok(user)
    });

    let handler = AuthHandler::new(repo, jwt_service());

    let response = handler
        .register(NewUser {
            username: "testuser".into(),
            email: "test@example.com".into(),
            password: "secret123".into(),
        })
        .await
        .unwrap();

    assert_eq!(response.username, "testuser");
    assert!(!response.token.is_empty());

    let decoded = jwt_service().decode_token(&response.token).unwrap();
    assert_eq!(decoded.claims.sub, response.id.to_string());
}

#[actix_rt::test]
async fn register_rejects_duplicate_accounts() {
    let mut repo = MockUserRepo::new();
    repo.expect_find_by_email_or_username()
        .times(1)
        .returning(|_, _| Ok(Some(sample_user(Uuid::new_v4(), "hash"))));
    repo.expect_create_user().times(0);

    let handler = AuthHandler::new(repo, jwt_service());

    let result = handler
        .register(NewUser {
            username: "testuser".into(),
            email: "test@example.com".into(),
            password: "secret123".into(),
        })
        .await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[actix_rt::test]
async fn register_rejects_short_usernames() {
    let mut repo = MockUserRepo::new();
    repo.expect_find_by_email_or_username().times(0);

    let handler = AuthHandler::new(repo, jwt_service());

    let result = handler
        .register(NewUser {
            username: "ab".into(),
            email: "test@example.com".into(),
            password: "secret123".into(),
        })
        .await;

    assert!(matches!(result, Err(AppError::ValidationError(_))));
}

#[actix_rt::test]
async fn login_returns_a_bearer_credential() {
    let password_hash = hash_password("secret123").unwrap();

    let mut repo = MockUserRepo::new();
    repo.expect_find_by_email()
        .times(1)
        .returning(move |_| Ok(Some(sample_user(Uuid::new_v4(), &password_hash))));

    let handler = AuthHandler::new(repo, jwt_service());

    let auth = handler
        .login(LoginUser {
            email: "test@example.com".into(),
            password: "secret123".into(),
        })
        .await
        .unwrap();

    assert_eq!(auth.token_type, "Bearer");
    assert!(!auth.access_token.is_empty());
}

#[actix_rt::test]
async fn login_with_wrong_password_is_rejected() {
    let password_hash = hash_password("secret123").unwrap();

    let mut repo = MockUserRepo::new();
    repo.expect_find_by_email()
        .times(1)
        .returning(move |_| Ok(Some(sample_user(Uuid::new_v4(), &password_hash))));

    let handler = AuthHandler::new(repo, jwt_service());

    let result = handler
        .login(LoginUser {
            email: "test@example.com".into(),
            password: "not-the-password".into(),
        })
        .await;

    assert!(matches!(result, Err(AuthError::WrongCredentials)));
}

#[actix_rt::test]
async fn login_for_unknown_email_is_rejected() {
    let mut repo = MockUserRepo::new();
    repo.expect_find_by_email().times(1).returning(|_| Ok(None));

    let handler = AuthHandler::new(repo, jwt_service());

    let result = handler
        .login(LoginUser {
            email: "nobody@example.com".into(),
            password: "secret123".into(),
        })
        .await;

    assert!(matches!(result, Err(AuthError::WrongCredentials)));
}

#[actix_rt::test]
async fn authenticate_resolves_the_token_subject() {
    let user_id = Uuid::new_v4();
    let service = jwt_service();
    let token = service.issue_token(&user_id).unwrap();

    let mut repo = MockUserRepo::new();
    repo.expect_find_by_id()
        .times(1)
        .returning(move |id| Ok(Some(sample_user(*id, "hash"))));

    let handler = AuthHandler::new(repo, service);

    let (claims, user) = handler.authenticate(&token).await.unwrap();
    assert_eq!(claims.sub, user_id.to_string());
    assert_eq!(user.id, user_id);
}

#[actix_rt::test]
async fn authenticate_rejects_a_token_for_a_deleted_subject() {
    let service = jwt_service();
    let token = service.issue_token(&Uuid::new_v4()).unwrap();

    let mut repo = MockUserRepo::new();
    repo.expect_find_by_id().times(1).returning(|_| Ok(None));

    let handler = AuthHandler::new(repo, service);

    assert!(matches!(
        handler.authenticate(&token).await,
        Err(AuthError::SubjectNotFound)
    ));
}

#[actix_rt::test]
async fn authenticate_rejects_garbage_tokens() {
    let mut repo = MockUserRepo::new();
    repo.expect_find_by_id().times(0);

    let handler = AuthHandler::new(repo, jwt_service());

    assert!(matches!(
        handler.authenticate("not-a-jwt").await,
        Err(AuthError::InvalidToken)
    ));
}
