use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::checkout::CommissionModel;

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterUserModel {
    pub name: String,
    pub email: String,
    pub password: String,
    pub payout_email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginModel {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthTokenModel {
    pub token: String,
    pub user_id: Uuid,
    pub role: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisteredUserModel {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserEarningsModel {
    pub balance_minor: i64,
    pub commissions: Vec<CommissionModel>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForgotPasswordModel {
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyResetCodeModel {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResetPasswordModel {
    pub email: String,
    pub code: String,
    pub new_password: String,
}
