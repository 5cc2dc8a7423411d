use serde::Serialize;

use super::{envelope, ApiJson};

#[derive(Serialize)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health_check() -> ApiJson<Health> {
    envelope(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
