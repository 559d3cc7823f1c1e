use crate::data::admin_repository::AdminRepository;
use crate::domain::admin::{AdminResponse, LoginAdminRequest, RegisterAdminRequest};
use crate::domain::DomainError;
use crate::infrastructure::jwt::JwtService;
use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use std::sync::Arc;

const MIN_PASSWORD_LEN: usize = 8;

pub struct AuthService {
    admin_repo: Arc<dyn AdminRepository + Send + Sync>,
    jwt_service: Arc<JwtService>,
    registration_open: bool,
}

impl AuthService {
    pub fn new(
        admin_repo: Arc<dyn AdminRepository + Send + Sync>,
        jwt_service: Arc<JwtService>,
        registration_open: bool,
    ) -> Self {
        Self {
            admin_repo,
            jwt_service,
            registration_open,
        }
    }

    pub async fn register(
        &self,
        req: RegisterAdminRequest,
    ) -> Result<(String, AdminResponse), DomainError> {
        if !self.registration_open {
            tracing::warn!("Admin registration attempted while closed: {}", req.username);
            return Err(DomainError::Forbidden(
                "Admin registration is disabled".to_string(),
            ));
        }

        if req.username.trim().is_empty() || !req.email.contains('@') {
            return Err(DomainError::ValidationError(
                "Username and a valid email are required".to_string(),
            ));
        }
        if req.password.len() < MIN_PASSWORD_LEN {
            return Err(DomainError::ValidationError(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        if self.admin_repo.exists(&req.username, &req.email).await? {
            tracing::warn!("Registration failed: admin already exists");
            return Err(DomainError::AdminAlreadyExists);
        }

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(req.password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!("Password hashing failed: {}", e);
                DomainError::InternalError(format!("Password hashing failed: {}", e))
            })?
            .to_string();

        let admin = self.admin_repo.create(&req, password_hash).await?;
        let token = self
            .jwt_service
            .generate_token(admin.id, admin.username.clone())?;

        tracing::info!(
            "Admin registered successfully: id={}, username={}",
            admin.id,
            admin.username
        );

        Ok((token, AdminResponse::from(admin)))
    }

    pub async fn login(
        &self,
        req: LoginAdminRequest,
    ) -> Result<(String, AdminResponse), DomainError> {
        let admin = match self.admin_repo.find_by_username(&req.username).await {
            Ok(admin) => admin,
            Err(DomainError::AdminNotFound) => {
                tracing::warn!("Login for unknown admin: {}", req.username);
                return Err(DomainError::InvalidCredentials);
            }
            Err(e) => return Err(e),
        };

        let parsed_hash = PasswordHash::new(&admin.password_hash).map_err(|e| {
            tracing::error!("Invalid password hash format: {}", e);
            DomainError::InternalError(format!("Invalid password hash: {}", e))
        })?;

        if Argon2::default()
            .verify_password(req.password.as_bytes(), &parsed_hash)
            .is_err()
        {
            tracing::warn!("Invalid password for admin {}", admin.username);
            return Err(DomainError::InvalidCredentials);
        }

        let token = self
            .jwt_service
            .generate_token(admin.id, admin.username.clone())?;

        tracing::info!(
            "Admin logged in successfully: id={}, username={}",
            admin.id,
            admin.username
        );

        Ok((token, AdminResponse::from(admin)))
    }
}
