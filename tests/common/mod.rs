use std::env;
use std::sync::Arc;

use anyhow::{anyhow, ensure, Context, Result};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::PgConnection;
use diesel_migrations::MigrationHarness;
use estate_agent::auth::jwt::JwtService;
use estate_agent::auth::password::hash_password;
use estate_agent::calls::{CallProvider, OutboundCall, PlacedCall, ProviderError};
use estate_agent::config::{AppConfig, CallSettings};
use estate_agent::db::{self, PgPool, MIGRATIONS};
use estate_agent::models::{NewAdminUser, NewProperty};
use estate_agent::routes;
use estate_agent::state::AppState;
use http_body_util::BodyExt;
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tower::util::ServiceExt;
use uuid::Uuid;

static DB_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

/// Stands in for a voice platform. Records every call and either answers
/// with a fresh call id or rejects with a fixed status.
#[derive(Default)]
pub struct FakeCaller {
    placed: Mutex<Vec<OutboundCall>>,
    reject_with: Mutex<Option<(u16, String)>>,
    fixed_call_id: Mutex<Option<String>>,
}

#[async_trait]
impl CallProvider for FakeCaller {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn place_call(&self, call: &OutboundCall) -> Result<PlacedCall, ProviderError> {
        if let Some((status, body)) = self.reject_with.lock().await.clone() {
            return Err(ProviderError::Rejected { status, body });
        }
        self.placed.lock().await.push(call.clone());
        let call_id = match self.fixed_call_id.lock().await.clone() {
            Some(call_id) => call_id,
            None => format!("fake-{}", Uuid::new_v4()),
        };
        Ok(PlacedCall {
            call_id: call_id.clone(),
            agent_id: "fake-agent".to_string(),
            raw: json!({ "call_id": call_id }),
        })
    }
}

impl FakeCaller {
    #[allow(dead_code)]
    pub async fn placed(&self) -> Vec<OutboundCall> {
        self.placed.lock().await.clone()
    }

    #[allow(dead_code)]
    pub async fn reject(&self, status: u16, body: &str) {
        *self.reject_with.lock().await = Some((status, body.to_string()));
    }

    /// Answers every call with the same id instead of a fresh one.
    #[allow(dead_code)]
    pub async fn reuse_call_id(&self, call_id: &str) {
        *self.fixed_call_id.lock().await = Some(call_id.to_string());
    }
}

pub struct TestApp {
    pub state: AppState,
    router: Router,
    caller: Arc<FakeCaller>,
}

impl TestApp {
    /// Builds the app against `TEST_DATABASE_URL`. Returns `None` when no test
    /// database is configured so database-backed tests are skipped.
    pub async fn new() -> Result<Option<Self>> {
        let Ok(database_url) = env::var("TEST_DATABASE_URL") else {
            eprintln!("TEST_DATABASE_URL not set, skipping database test");
            return Ok(None);
        };

        let config = AppConfig {
            database_url,
            database_max_pool_size: db::DEFAULT_MAX_POOL_SIZE,
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
            jwt_secret: "test-secret".to_string(),
            jwt_issuer: "test-issuer".to_string(),
            jwt_audience: "test-audience".to_string(),
            jwt_expiry_minutes: 60,
            cors_allowed_origin: None,
            calls: CallSettings::local("http://127.0.0.1:9"),
        };

        let pool = db::init_pool_with_size(&config.database_url, config.database_max_pool_size)?;
        prepare_database(&pool).await?;

        let caller = Arc::new(FakeCaller::default());
        let caller_for_state: Arc<dyn CallProvider> = caller.clone();
        let jwt = JwtService::from_config(&config)?;
        let state = AppState::new(pool, config, jwt, caller_for_state);
        let router = routes::create_router(state.clone());

        Ok(Some(Self {
            state,
            router,
            caller,
        }))
    }

    #[allow(dead_code)]
    pub fn caller(&self) -> Arc<FakeCaller> {
        self.caller.clone()
    }

    pub async fn cleanup(&self) -> Result<()> {
        self.with_conn(truncate_all).await
    }

    pub async fn insert_user(&self, email: &str, password: &str, role: &str) -> Result<Uuid> {
        let email = email.to_lowercase();
        let password = password.to_string();
        let role = role.to_string();
        self.with_conn(move |conn| {
            let user = NewAdminUser {
                id: Uuid::new_v4(),
                email,
                password_hash: hash_password(&password)?,
                role,
            };
            diesel::insert_into(estate_agent::schema::admin_users::table)
                .values(&user)
                .execute(conn)
                .context("failed to insert user")?;
            Ok(user.id)
        })
        .await
    }

    #[allow(dead_code)]
    pub async fn insert_property(
        &self,
        title: &str,
        location: &str,
        price: &str,
        beds: i32,
        featured: bool,
    ) -> Result<Uuid> {
        let property = NewProperty {
            id: Uuid::new_v4(),
            title: title.to_string(),
            location: location.to_string(),
            price: price.to_string(),
            sqft: None,
            beds: Some(beds),
            baths: Some(beds),
            description: None,
            primary_image_url: None,
            virtual_tour_url: None,
            featured,
        };
        self.with_conn(move |conn| {
            diesel::insert_into(estate_agent::schema::properties::table)
                .values(&property)
                .execute(conn)
                .context("failed to insert property")?;
            Ok(property.id)
        })
        .await
    }

    pub async fn login_token(&self, email: &str, password: &str) -> Result<String> {
        let response = self
            .post_json(
                "/api/auth/login",
                &json!({ "email": email, "password": password }),
                None,
            )
            .await?;

        ensure!(
            response.status() == StatusCode::OK,
            "login failed with status {}",
            response.status()
        );

        let body = json_body::<Value>(response).await?;
        body["data"]["session"]["access_token"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow!("login response carried no access token: {body}"))
    }

    /// Inserts an account with `role` and returns a bearer token for it.
    #[allow(dead_code)]
    pub async fn token_for(&self, email: &str, role: &str) -> Result<(Uuid, String)> {
        let password = "s3cret-pass";
        let id = self.insert_user(email, password, role).await?;
        let token = self.login_token(email, password).await?;
        Ok((id, token))
    }

    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
        token: Option<&str>,
    ) -> Result<hyper::Response<Body>> {
        self.send_json(Method::POST, path, payload, token).await
    }

    #[allow(dead_code)]
    pub async fn patch_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
        token: Option<&str>,
    ) -> Result<hyper::Response<Body>> {
        self.send_json(Method::PATCH, path, payload, token).await
    }

    #[allow(dead_code)]
    pub async fn get(&self, path: &str, token: Option<&str>) -> Result<hyper::Response<Body>> {
        self.send(Method::GET, path, Body::empty(), false, token).await
    }

    #[allow(dead_code)]
    pub async fn delete(&self, path: &str, token: Option<&str>) -> Result<hyper::Response<Body>> {
        self.send(Method::DELETE, path, Body::empty(), false, token).await
    }

    async fn send_json<T: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        payload: &T,
        token: Option<&str>,
    ) -> Result<hyper::Response<Body>> {
        let body = serde_json::to_vec(payload)?;
        self.send(method, path, Body::from(body), true, token).await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Body,
        json: bool,
        token: Option<&str>,
    ) -> Result<hyper::Response<Body>> {
        let mut builder = Request::builder().method(method).uri(path);
        if json {
            builder = builder.header("content-type", "application/json");
        }
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = builder.body(body)?;
        Ok(self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible response"))
    }

    pub async fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut PgConnection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.state.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool
                .get()
                .map_err(|err| anyhow!("failed to get database connection: {err}"))?;
            f(&mut conn)
        })
        .await
        .context("connection task panicked")?
    }
}

pub async fn acquire_db_lock() -> tokio::sync::MutexGuard<'static, ()> {
    DB_LOCK.lock().await
}

pub async fn body_to_vec(body: Body) -> Result<Vec<u8>> {
    let collected = body
        .collect()
        .await
        .map_err(|err| anyhow!("failed to read response body: {err}"))?;
    Ok(collected.to_bytes().to_vec())
}

pub async fn json_body<T: DeserializeOwned>(response: hyper::Response<Body>) -> Result<T> {
    let bytes = body_to_vec(response.into_body()).await?;
    serde_json::from_slice(&bytes).with_context(|| {
        format!(
            "response was not the expected JSON: {}",
            String::from_utf8_lossy(&bytes)
        )
    })
}

async fn prepare_database(pool: &PgPool) -> Result<()> {
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || -> Result<()> {
        let mut conn = pool
            .get()
            .map_err(|err| anyhow!("failed to acquire connection: {err}"))?;
        conn.run_pending_migrations(MIGRATIONS)
            .map_err(|err| anyhow!("failed to run migrations: {err}"))?;
        truncate_all(&mut conn)?;
        Ok(())
    })
    .await
    .context("database preparation panicked")?
}

fn truncate_all(conn: &mut PgConnection) -> Result<()> {
    conn.batch_execute(
        "TRUNCATE admin_audit_logs, admin_users, call_logs, appointments, \
         customer_inquiries, property_images, properties RESTART IDENTITY CASCADE",
    )
    .context("failed to truncate tables")?;
    Ok(())
}
