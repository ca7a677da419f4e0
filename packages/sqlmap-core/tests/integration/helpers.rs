//! Shared records and engine setup.

use chrono::{DateTime, Utc};
use sqlmap_core::{record, Engine, EngineConfig};
use uuid::Uuid;

record! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Address {
        #[sql = "city,virtual_column=City"]
        pub city: String,
        pub zip: Option<u32>,
    }
}

record! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Audit {
        #[sql = "CreatedBy"]
        pub created_by: String,
    }
}

record! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct User {
        #[sql = "ID,primary_key"]
        pub id: Uuid,
        #[sql = "Name,size=64"]
        pub name: String,
        #[sql = "Active"]
        pub active: bool,
        #[sql = "Score"]
        pub score: f64,
        #[sql = "Address"]
        pub address: Address,
        #[sql = "Tags"]
        pub tags: Vec<String>,
        #[sql = "Nickname"]
        pub nickname: Option<String>,
        #[embed]
        pub audit: Audit,
        #[skip]
        pub scratch: String,
    }
}

record! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Post {
        #[sql = "ID,primary_key,auto_increment"]
        pub id: u64,
        #[sql = "Title"]
        pub title: String,
        #[sql = "PublishedAt"]
        pub published_at: DateTime<Utc>,
    }
}

/// Installs a test subscriber once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Engine with default configuration.
pub fn engine() -> Engine {
    init_tracing();
    Engine::new(EngineConfig::default()).unwrap()
}

/// Sample user with every column populated.
pub fn sample_user() -> User {
    User {
        id: Uuid::parse_str("0b6f4a1e-3c2d-4e5f-8a9b-1c2d3e4f5a6b").unwrap(),
        name: "Ada".into(),
        active: true,
        score: 9.5,
        address: Address {
            city: "Ipoh".into(),
            zip: Some(30000),
        },
        tags: vec!["admin".into(), "ops".into()],
        nickname: None,
        audit: Audit {
            created_by: "seed".into(),
        },
        scratch: String::new(),
    }
}
