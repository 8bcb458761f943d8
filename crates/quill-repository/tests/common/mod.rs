//! MySQL fixture for the store integration tests.

use quill_config::DatabaseConfig;
use quill_core::UserId;
use quill_repository::{DatabasePool, MySqlIdentityProvider, MySqlPostRepository};
use std::sync::Arc;
use std::time::Duration;
use testcontainers::{runners::AsyncRunner, ContainerAsync};
use testcontainers_modules::mysql::Mysql;
use tokio::time::Instant;

/// How long a fresh container gets to start accepting connections.
const STARTUP_DEADLINE: Duration = Duration::from_secs(60);

/// A migrated MySQL store in a throwaway container.
///
/// The container lives as long as the fixture.
pub struct StoreFixture {
    _mysql: ContainerAsync<Mysql>,
    pool: Arc<DatabasePool>,
    admin: UserId,
}

impl StoreFixture {
    pub async fn start() -> Self {
        let mysql = Mysql::default()
            .start()
            .await
            .expect("MySQL container did not start");
        let port = mysql
            .get_host_port_ipv4(3306)
            .await
            .expect("MySQL port not mapped");

        let config = DatabaseConfig {
            url: format!("mysql://root@127.0.0.1:{port}/test"),
            min_connections: 1,
            max_connections: 4,
            ..DatabaseConfig::default()
        };

        let pool = open_when_ready(&config).await;
        pool.run_migrations().await.expect("migrations failed");

        let admin_id: String = sqlx::query_scalar("SELECT id FROM users WHERE name = 'admin'")
            .fetch_one(pool.inner())
            .await
            .expect("admin author not seeded");

        Self {
            _mysql: mysql,
            pool: Arc::new(pool),
            admin: UserId::parse(&admin_id).expect("seeded admin id is not a UUID"),
        }
    }

    /// The author row the migrations seed.
    pub fn admin(&self) -> UserId {
        self.admin
    }

    pub fn posts(&self) -> MySqlPostRepository {
        MySqlPostRepository::new(Arc::clone(&self.pool))
    }

    pub fn identities(&self) -> MySqlIdentityProvider {
        MySqlIdentityProvider::new(Arc::clone(&self.pool))
    }
}

async fn open_when_ready(config: &DatabaseConfig) -> DatabasePool {
    let deadline = Instant::now() + STARTUP_DEADLINE;
    loop {
        match DatabasePool::new(config).await {
            Ok(pool) => return pool,
            Err(e) if Instant::now() >= deadline => {
                panic!("MySQL not accepting connections after {STARTUP_DEADLINE:?}: {e}")
            }
            Err(_) => tokio::time::sleep(Duration::from_millis(500)).await,
        }
    }
}
