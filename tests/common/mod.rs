#![allow(dead_code)]

use karnue_admin::auth::SessionUser;
use karnue_admin::KarnueAdmin;
use serde_json::{json, Value};
use std::sync::Once;
use wiremock::MockServer;

static INIT: Once = Once::new();

pub fn init_logger() {
    INIT.call_once(|| {
        let _ = pretty_env_logger::formatted_builder()
            .is_test(true)
            .parse_filters(&std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string()))
            .try_init();
    });
}

pub const TOKEN: &str = "test-token";

/// Client pointed at `server` with an admin already signed in
pub fn signed_in_admin(server: &MockServer) -> KarnueAdmin {
    init_logger();
    let admin = KarnueAdmin::new(&server.uri()).unwrap();
    admin.auth_store().set_credentials(
        SessionUser {
            id: "1".to_string(),
            email: "a@b.com".to_string(),
            full_name: "Ada Admin".to_string(),
        },
        TOKEN.to_string(),
        Some("refresh".to_string()),
    );
    admin
}

pub fn rider_json(id: i64, status: &str) -> Value {
    json!({
        "id": id,
        "name": format!("Rider {}", id),
        "email": format!("rider{}@karnue.test", id),
        "phone": "555-0100",
        "totalRides": id * 3,
        "status": status,
        "joinDate": "2024-01-15",
        "rating": 4.5
    })
}

pub fn driver_json(id: i64, account_status: &str) -> Value {
    json!({
        "id": id,
        "fullName": format!("Driver {}", id),
        "email": format!("driver{}@karnue.test", id),
        "phone": "555-0200",
        "accountStatus": account_status,
        "backgroundCheckStatus": "in_progress"
    })
}

pub fn feedback_json(id: &str, name: &str, created_at: &str) -> Value {
    json!({
        "id": id,
        "fullName": name,
        "email": format!("{}@karnue.test", name.to_lowercase()),
        "message": "The app is great",
        "createdAt": created_at
    })
}
