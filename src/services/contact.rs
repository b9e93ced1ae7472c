//! Contact-form messages.

use crate::entities::contact_message;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use std::sync::Arc;
use tracing::{info, instrument};

#[derive(Clone)]
pub struct ContactService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

#[derive(Debug, Clone)]
pub struct ContactInput {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
}

impl ContactService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn submit(
        &self,
        input: ContactInput,
    ) -> Result<contact_message::Model, ServiceError> {
        let created = contact_message::ActiveModel {
            name: Set(input.name.trim().to_string()),
            email: Set(input.email.trim().to_string()),
            phone: Set(input.phone),
            subject: Set(input.subject.trim().to_string()),
            message: Set(input.message),
            is_read: Set(false),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&*self.db)
        .await?;

        self.event_sender
            .send_or_log(Event::ContactMessageReceived {
                message_id: created.id,
            })
            .await;
        info!(message_id = created.id, "contact message received");
        Ok(created)
    }
}
