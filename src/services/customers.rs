//! Customer accounts: registration and credential checks.

use crate::entities::{customer, Customer};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use std::sync::Arc;
use tracing::{info, instrument};

#[derive(Clone)]
pub struct CustomerService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
}

fn hash_password(password: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServiceError::InternalError(format!("password hashing failed: {e}")))
}

fn verify_password(hash: &str, password: &str) -> Result<bool, ServiceError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| ServiceError::InternalError(format!("stored password hash invalid: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

impl CustomerService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> Result<customer::Model, ServiceError> {
        let email = input.email.trim().to_lowercase();
        let existing = Customer::find()
            .filter(customer::Column::Email.eq(email.clone()))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::ValidationError(
                "An account with this email already exists".to_string(),
            ));
        }

        let now = Utc::now();
        let created = customer::ActiveModel {
            first_name: Set(input.first_name.trim().to_string()),
            last_name: Set(input.last_name.trim().to_string()),
            email: Set(email),
            password_hash: Set(hash_password(&input.password)?),
            phone: Set(input.phone),
            address: Set(input.address),
            city: Set(input.city),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&*self.db)
        .await?;

        self.event_sender
            .send_or_log(Event::CustomerRegistered {
                customer_id: created.id,
            })
            .await;
        info!(customer_id = created.id, "customer registered");
        Ok(created)
    }

    /// Check credentials. The two failure messages are distinct on purpose;
    /// the storefront tells unknown emails to create an account.
    #[instrument(skip(self, password))]
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<customer::Model, ServiceError> {
        let customer = Customer::find()
            .filter(customer::Column::Email.eq(email.trim().to_lowercase()))
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::AuthError(
                    "Email not found. Please create an account first.".to_string(),
                )
            })?;

        if !verify_password(&customer.password_hash, password)? {
            return Err(ServiceError::AuthError("Incorrect password".to_string()));
        }

        self.event_sender
            .send_or_log(Event::CustomerLoggedIn {
                customer_id: customer.id,
            })
            .await;
        Ok(customer)
    }

    pub async fn get_customer(&self, id: i64) -> Result<customer::Model, ServiceError> {
        Customer::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Customer {id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashing_is_salted_and_verifiable() {
        let a = hash_password("s3cret-password").unwrap();
        let b = hash_password("s3cret-password").unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with("$argon2"));
        assert!(verify_password(&a, "s3cret-password").unwrap());
        assert!(!verify_password(&a, "wrong-password").unwrap());
    }

    #[test]
    fn malformed_stored_hash_is_an_error_not_a_match() {
        assert!(verify_password("plaintext-from-legacy-row", "anything").is_err());
    }
}
