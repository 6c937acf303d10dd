use std::sync::Arc;

use chrono::{Duration, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::application::notifier::Notifier;
use crate::auth;
use crate::domain::{
    entities::users::RegisterUserEntity,
    repositories::{password_resets::PasswordResetRepository, users::UserRepository},
    value_objects::{
        enums::user_roles::UserRole,
        iam::{
            AuthTokenModel, LoginModel, RegisterUserModel, RegisteredUserModel, ResetPasswordModel,
            VerifyResetCodeModel,
        },
    },
};

const RESET_CODE_TTL_MINUTES: i64 = 15;
const RESET_CODE_MAX_ATTEMPTS: i32 = 3;

#[derive(Debug, Error)]
pub enum IamError {
    #[error("email already registered")]
    EmailTaken,
    #[error("password too weak: {0}")]
    WeakPassword(String),
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("user not found")]
    UserNotFound,
    #[error("invalid recovery code")]
    CodeInvalid,
    #[error("recovery code has expired")]
    CodeExpired,
    #[error("too many failed attempts")]
    TooManyAttempts,
    #[error("recovery code has not been verified")]
    CodeNotVerified,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IamError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            IamError::EmailTaken => StatusCode::CONFLICT,
            IamError::WeakPassword(_)
            | IamError::CodeInvalid
            | IamError::CodeExpired
            | IamError::CodeNotVerified => StatusCode::BAD_REQUEST,
            IamError::TooManyAttempts => StatusCode::TOO_MANY_REQUESTS,
            IamError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            IamError::UserNotFound => StatusCode::NOT_FOUND,
            IamError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type IamResult<T> = std::result::Result<T, IamError>;

pub struct IamUseCase<U, R, N>
where
    U: UserRepository + Send + Sync,
    R: PasswordResetRepository + Send + Sync,
    N: Notifier,
{
    user_repo: Arc<U>,
    reset_repo: Arc<R>,
    notifier: Arc<N>,
    jwt_secret: String,
    jwt_ttl_seconds: u64,
}

impl<U, R, N> IamUseCase<U, R, N>
where
    U: UserRepository + Send + Sync,
    R: PasswordResetRepository + Send + Sync,
    N: Notifier,
{
    pub fn new(
        user_repo: Arc<U>,
        reset_repo: Arc<R>,
        notifier: Arc<N>,
        jwt_secret: String,
        jwt_ttl_seconds: u64,
    ) -> Self {
        Self {
            user_repo,
            reset_repo,
            notifier,
            jwt_secret,
            jwt_ttl_seconds,
        }
    }

    pub async fn register(&self, model: RegisterUserModel) -> IamResult<RegisteredUserModel> {
        validate_password(&model.password)?;

        let existing = self
            .user_repo
            .find_by_email(&model.email)
            .await
            .map_err(IamError::Internal)?;
        if existing.is_some() {
            return Err(IamError::EmailTaken);
        }

        let password_hash = auth::hash_password(&model.password)?;
        let now = Utc::now();
        let user = self
            .user_repo
            .register(RegisterUserEntity {
                name: model.name,
                email: model.email,
                password_hash,
                role: UserRole::Affiliate.to_string(),
                payout_email: model.payout_email,
                commission_balance_minor: 0,
                created_at: now,
                updated_at: now,
            })
            .await
            .map_err(|err| {
                error!(db_error = ?err, "iam: failed to register user");
                IamError::Internal(err)
            })?;

        info!(user_id = %user.id, "iam: user registered");

        if let Err(err) = self.notifier.welcome_registered(&user.email, &user.name).await {
            warn!(user_id = %user.id, error = ?err, "iam: welcome notification failed");
        }

        Ok(RegisteredUserModel {
            user_id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        })
    }

    pub async fn login(&self, model: LoginModel) -> IamResult<AuthTokenModel> {
        let user = self
            .user_repo
            .find_by_email(&model.email)
            .await
            .map_err(IamError::Internal)?
            .ok_or(IamError::InvalidCredentials)?;

        if !auth::verify_password(&model.password, &user.password_hash) {
            warn!(user_id = %user.id, "iam: failed login attempt");
            return Err(IamError::InvalidCredentials);
        }

        let token = auth::issue_token(
            &self.jwt_secret,
            self.jwt_ttl_seconds,
            user.id,
            &user.role,
            Some(user.email.clone()),
        )?;

        info!(user_id = %user.id, role = %user.role, "iam: login succeeded");

        Ok(AuthTokenModel {
            token,
            user_id: user.id,
            role: user.role,
        })
    }

    /// Issues a short-lived recovery code, persisted with its expiry and
    /// attempt count so it survives restarts and multiple instances.
    pub async fn request_password_reset(&self, email: &str) -> IamResult<()> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await
            .map_err(IamError::Internal)?
            .ok_or(IamError::UserNotFound)?;

        let code = generate_reset_code();
        let expires_at = Utc::now() + Duration::minutes(RESET_CODE_TTL_MINUTES);

        self.reset_repo
            .issue_code(&user.email, &digest_code(&code), expires_at)
            .await
            .map_err(|err| {
                error!(db_error = ?err, "iam: failed to persist recovery code");
                IamError::Internal(err)
            })?;

        info!(user_id = %user.id, "iam: recovery code issued");

        if let Err(err) = self.notifier.reset_code_issued(&user.email, &code).await {
            warn!(user_id = %user.id, error = ?err, "iam: recovery code notification failed");
        }

        Ok(())
    }

    pub async fn verify_reset_code(&self, model: VerifyResetCodeModel) -> IamResult<()> {
        let record = self
            .reset_repo
            .find_by_email(&model.email)
            .await
            .map_err(IamError::Internal)?
            .ok_or(IamError::CodeInvalid)?;

        if record.expires_at < Utc::now() {
            self.reset_repo
                .delete_for_email(&model.email)
                .await
                .map_err(IamError::Internal)?;
            return Err(IamError::CodeExpired);
        }

        if record.attempts >= RESET_CODE_MAX_ATTEMPTS {
            self.reset_repo
                .delete_for_email(&model.email)
                .await
                .map_err(IamError::Internal)?;
            return Err(IamError::TooManyAttempts);
        }

        if record.code_hash != digest_code(&model.code) {
            let attempts = self
                .reset_repo
                .record_attempt(record.id)
                .await
                .map_err(IamError::Internal)?;
            warn!(email = %model.email, attempts, "iam: wrong recovery code");
            return Err(IamError::CodeInvalid);
        }

        self.reset_repo
            .mark_verified(record.id)
            .await
            .map_err(IamError::Internal)?;

        info!(email = %model.email, "iam: recovery code verified");
        Ok(())
    }

    pub async fn reset_password(&self, model: ResetPasswordModel) -> IamResult<()> {
        let record = self
            .reset_repo
            .find_by_email(&model.email)
            .await
            .map_err(IamError::Internal)?
            .ok_or(IamError::CodeInvalid)?;

        if record.verified_at.is_none() {
            return Err(IamError::CodeNotVerified);
        }
        if record.expires_at < Utc::now() {
            return Err(IamError::CodeExpired);
        }
        if record.code_hash != digest_code(&model.code) {
            return Err(IamError::CodeInvalid);
        }

        validate_password(&model.new_password)?;
        let password_hash = auth::hash_password(&model.new_password)?;

        let updated = self
            .user_repo
            .update_password(&model.email, &password_hash)
            .await
            .map_err(IamError::Internal)?;
        if !updated {
            return Err(IamError::UserNotFound);
        }

        self.reset_repo
            .delete_for_email(&model.email)
            .await
            .map_err(IamError::Internal)?;

        info!(email = %model.email, "iam: password reset completed");
        Ok(())
    }
}

fn validate_password(password: &str) -> IamResult<()> {
    if password.len() < 8 {
        return Err(IamError::WeakPassword(
            "must be at least 8 characters".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(IamError::WeakPassword(
            "must contain an uppercase letter".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(IamError::WeakPassword(
            "must contain a lowercase letter".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(IamError::WeakPassword("must contain a digit".to_string()));
    }
    Ok(())
}

fn generate_reset_code() -> String {
    rand::thread_rng().gen_range(100_000..1_000_000).to_string()
}

fn digest_code(code: &str) -> String {
    hex::encode(Sha256::digest(code.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::notifier::MockNotifier;
    use crate::domain::{
        entities::{password_reset_codes::PasswordResetCodeEntity, users::UserEntity},
        repositories::{
            password_resets::MockPasswordResetRepository, users::MockUserRepository,
        },
    };
    use uuid::Uuid;

    fn usecase(
        users: MockUserRepository,
        resets: MockPasswordResetRepository,
        notifier: MockNotifier,
    ) -> IamUseCase<MockUserRepository, MockPasswordResetRepository, MockNotifier> {
        IamUseCase::new(
            Arc::new(users),
            Arc::new(resets),
            Arc::new(notifier),
            "test-secret".to_string(),
            3600,
        )
    }

    fn user_with_password(password: &str) -> UserEntity {
        UserEntity {
            id: Uuid::new_v4(),
            name: "Ada".to_string(),
            email: "ada@example.test".to_string(),
            password_hash: auth::hash_password(password).unwrap(),
            role: "affiliate".to_string(),
            payout_email: None,
            commission_balance_minor: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn reset_record(code: &str, attempts: i32, expired: bool, verified: bool) -> PasswordResetCodeEntity {
        PasswordResetCodeEntity {
            id: 1,
            email: "ada@example.test".to_string(),
            code_hash: digest_code(code),
            expires_at: if expired {
                Utc::now() - Duration::minutes(1)
            } else {
                Utc::now() + Duration::minutes(10)
            },
            attempts,
            verified_at: verified.then(Utc::now),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn register_rejects_weak_password() {
        let result = usecase(
            MockUserRepository::new(),
            MockPasswordResetRepository::new(),
            MockNotifier::new(),
        )
        .register(RegisterUserModel {
            name: "Ada".to_string(),
            email: "ada@example.test".to_string(),
            password: "short".to_string(),
            payout_email: None,
        })
        .await;

        assert!(matches!(result, Err(IamError::WeakPassword(_))));
    }

    #[tokio::test]
    async fn register_rejects_duplicate_email() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .returning(|_| Ok(Some(user_with_password("Passw0rdX"))));
        users.expect_register().never();

        let result = usecase(users, MockPasswordResetRepository::new(), MockNotifier::new())
            .register(RegisterUserModel {
                name: "Ada".to_string(),
                email: "ada@example.test".to_string(),
                password: "Passw0rdX".to_string(),
                payout_email: None,
            })
            .await;

        assert!(matches!(result, Err(IamError::EmailTaken)));
    }

    #[tokio::test]
    async fn register_creates_affiliate_and_sends_welcome() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(|_| Ok(None));
        users
            .expect_register()
            .withf(|entity| entity.role == "affiliate" && entity.commission_balance_minor == 0)
            .returning(|entity| {
                Ok(UserEntity {
                    id: Uuid::new_v4(),
                    name: entity.name,
                    email: entity.email,
                    password_hash: entity.password_hash,
                    role: entity.role,
                    payout_email: entity.payout_email,
                    commission_balance_minor: entity.commission_balance_minor,
                    created_at: entity.created_at,
                    updated_at: entity.updated_at,
                })
            });

        let mut notifier = MockNotifier::new();
        notifier
            .expect_welcome_registered()
            .times(1)
            .returning(|_, _| Ok(()));

        let registered = usecase(users, MockPasswordResetRepository::new(), notifier)
            .register(RegisterUserModel {
                name: "Ada".to_string(),
                email: "ada@example.test".to_string(),
                password: "Passw0rdX".to_string(),
                payout_email: None,
            })
            .await
            .unwrap();

        assert_eq!(registered.role, "affiliate");
    }

    #[tokio::test]
    async fn login_rejects_wrong_password() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .returning(|_| Ok(Some(user_with_password("Passw0rdX"))));

        let result = usecase(users, MockPasswordResetRepository::new(), MockNotifier::new())
            .login(LoginModel {
                email: "ada@example.test".to_string(),
                password: "NotThePassword1".to_string(),
            })
            .await;

        assert!(matches!(result, Err(IamError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn login_issues_token_for_valid_credentials() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .returning(|_| Ok(Some(user_with_password("Passw0rdX"))));

        let token = usecase(users, MockPasswordResetRepository::new(), MockNotifier::new())
            .login(LoginModel {
                email: "ada@example.test".to_string(),
                password: "Passw0rdX".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(token.role, "affiliate");
        assert!(!token.token.is_empty());
    }

    #[tokio::test]
    async fn expired_code_is_purged_and_rejected() {
        let mut resets = MockPasswordResetRepository::new();
        resets
            .expect_find_by_email()
            .returning(|_| Ok(Some(reset_record("123456", 0, true, false))));
        resets
            .expect_delete_for_email()
            .times(1)
            .returning(|_| Ok(()));

        let result = usecase(MockUserRepository::new(), resets, MockNotifier::new())
            .verify_reset_code(VerifyResetCodeModel {
                email: "ada@example.test".to_string(),
                code: "123456".to_string(),
            })
            .await;

        assert!(matches!(result, Err(IamError::CodeExpired)));
    }

    #[tokio::test]
    async fn exhausted_attempts_lock_out_the_code() {
        let mut resets = MockPasswordResetRepository::new();
        resets
            .expect_find_by_email()
            .returning(|_| Ok(Some(reset_record("123456", 3, false, false))));
        resets
            .expect_delete_for_email()
            .times(1)
            .returning(|_| Ok(()));

        let result = usecase(MockUserRepository::new(), resets, MockNotifier::new())
            .verify_reset_code(VerifyResetCodeModel {
                email: "ada@example.test".to_string(),
                code: "123456".to_string(),
            })
            .await;

        assert!(matches!(result, Err(IamError::TooManyAttempts)));
    }

    #[tokio::test]
    async fn wrong_code_counts_an_attempt() {
        let mut resets = MockPasswordResetRepository::new();
        resets
            .expect_find_by_email()
            .returning(|_| Ok(Some(reset_record("123456", 0, false, false))));
        resets
            .expect_record_attempt()
            .times(1)
            .returning(|_| Ok(1));

        let result = usecase(MockUserRepository::new(), resets, MockNotifier::new())
            .verify_reset_code(VerifyResetCodeModel {
                email: "ada@example.test".to_string(),
                code: "000000".to_string(),
            })
            .await;

        assert!(matches!(result, Err(IamError::CodeInvalid)));
    }

    #[tokio::test]
    async fn matching_code_is_marked_verified() {
        let mut resets = MockPasswordResetRepository::new();
        resets
            .expect_find_by_email()
            .returning(|_| Ok(Some(reset_record("123456", 1, false, false))));
        resets.expect_mark_verified().times(1).returning(|_| Ok(()));

        usecase(MockUserRepository::new(), resets, MockNotifier::new())
            .verify_reset_code(VerifyResetCodeModel {
                email: "ada@example.test".to_string(),
                code: "123456".to_string(),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn reset_requires_prior_verification() {
        let mut resets = MockPasswordResetRepository::new();
        resets
            .expect_find_by_email()
            .returning(|_| Ok(Some(reset_record("123456", 0, false, false))));

        let result = usecase(MockUserRepository::new(), resets, MockNotifier::new())
            .reset_password(ResetPasswordModel {
                email: "ada@example.test".to_string(),
                code: "123456".to_string(),
                new_password: "NewPassw0rd".to_string(),
            })
            .await;

        assert!(matches!(result, Err(IamError::CodeNotVerified)));
    }

    #[tokio::test]
    async fn reset_updates_password_and_consumes_code() {
        let mut users = MockUserRepository::new();
        users
            .expect_update_password()
            .times(1)
            .returning(|_, _| Ok(true));

        let mut resets = MockPasswordResetRepository::new();
        resets
            .expect_find_by_email()
            .returning(|_| Ok(Some(reset_record("123456", 0, false, true))));
        resets
            .expect_delete_for_email()
            .times(1)
            .returning(|_| Ok(()));

        usecase(users, resets, MockNotifier::new())
            .reset_password(ResetPasswordModel {
                email: "ada@example.test".to_string(),
                code: "123456".to_string(),
                new_password: "NewPassw0rd".to_string(),
            })
            .await
            .unwrap();
    }
}
