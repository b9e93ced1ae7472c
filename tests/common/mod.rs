//! Shared integration-test harness: an in-memory SQLite database with the
//! full schema applied, seeding helpers, and a router with the session
//! layer wired the same way `main` wires it.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use boutique_api::config::AppConfig;
use boutique_api::entities::{category, customer, product, ProductKind};
use boutique_api::events::{self, EventSender};
use boutique_api::handlers::AppServices;
use boutique_api::migrator::Migrator;
use boutique_api::services::customers::RegisterInput;
use boutique_api::{api_routes, AppState};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use tower_sessions::{MemoryStore, SessionManagerLayer};

pub struct TestApp {
    pub db: Arc<DatabaseConnection>,
    pub services: AppServices,
    pub config: AppConfig,
    pub event_sender: Arc<EventSender>,
}

/// One HTTP exchange against the test router. `cookie` is the first
/// `Set-Cookie` segment, ready to send back as a `Cookie` header.
pub struct TestResponse {
    pub status: StatusCode,
    pub cookie: Option<String>,
    pub body: Value,
}

impl TestResponse {
    pub fn field(&self, name: &str) -> &Value {
        &self.body[name]
    }
}

pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request build failed"),
        None => builder.body(Body::empty()).expect("request build failed"),
    };
    // MemoryStore is shared behind an Arc, so the clone sees every session
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("request failed");
    let status = response.status();
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body read failed");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response body was not JSON")
    };
    TestResponse {
        status,
        cookie,
        body,
    }
}

impl TestApp {
    pub async fn new() -> Self {
        // one connection: each in-memory SQLite connection is its own db
        let mut options = ConnectOptions::new("sqlite::memory:".to_string());
        options.max_connections(1).min_connections(1);
        let db = Database::connect(options)
            .await
            .expect("failed to open in-memory sqlite");
        Migrator::up(&db, None).await.expect("migrations failed");

        let (event_tx, event_rx) = tokio::sync::mpsc::channel(64);
        tokio::spawn(events::process_events(event_rx));
        let event_sender = Arc::new(EventSender::new(event_tx));

        let config = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            0,
            "test".to_string(),
        );
        let db = Arc::new(db);
        let services = AppServices::new(db.clone(), event_sender.clone(), &config);
        Self {
            db,
            services,
            config,
            event_sender,
        }
    }

    /// The API router with an in-memory session layer, sharing this app's
    /// database and services.
    pub fn router(&self) -> Router {
        let state = Arc::new(AppState {
            db: self.db.clone(),
            config: self.config.clone(),
            event_sender: (*self.event_sender).clone(),
            services: self.services.clone(),
        });
        let session_layer = SessionManagerLayer::new(MemoryStore::default()).with_secure(false);
        api_routes().layer(session_layer).with_state(state)
    }

    pub async fn register_customer(&self, email: &str) -> customer::Model {
        self.services
            .customers
            .register(RegisterInput {
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                email: email.to_string(),
                password: "correct-horse-battery".to_string(),
                phone: None,
                address: None,
                city: None,
            })
            .await
            .expect("customer registration failed")
    }

    pub async fn seed_category(&self, name: &str, slug: &str) -> category::Model {
        category::ActiveModel {
            name: Set(name.to_string()),
            slug: Set(slug.to_string()),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .expect("category insert failed")
    }

    pub async fn seed_clothing(
        &self,
        title: &str,
        price: Decimal,
        category_id: Option<i64>,
    ) -> product::Model {
        self.seed_product(ProductKind::Clothing, title, price, category_id)
            .await
    }

    pub async fn seed_product(
        &self,
        kind: ProductKind,
        title: &str,
        price: Decimal,
        category_id: Option<i64>,
    ) -> product::Model {
        let now = Utc::now();
        // slugs are unique; suffix with the clock so repeated titles work
        let slug = format!(
            "{}-{}",
            title.to_lowercase().replace(' ', "-"),
            now.timestamp_nanos_opt().unwrap_or_default()
        );
        let sizes = if kind.is_sized() {
            serde_json::json!(["S", "M", "L", "XL", "XXL"])
        } else {
            serde_json::json!([])
        };
        product::ActiveModel {
            kind: Set(kind),
            category_id: Set(category_id),
            title: Set(title.to_string()),
            slug: Set(slug),
            description: Set(Some(format!("{title} description"))),
            sizes: Set(sizes),
            colors: Set(serde_json::json!(["Black", "Red"])),
            brand: Set(Some("Zara".to_string())),
            collections: Set(serde_json::json!(["Trending"])),
            price: Set(price),
            image_url: Set(Some(format!("/media/{kind}/{title}.jpg"))),
            hover_image_url: Set(None),
            available: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .expect("product insert failed")
    }
}
