//! # Quill Repository
//!
//! Primary store access for the feed:
//!
//! ```text
//! Service
//!   ↓  Arc<dyn PostRepository>, Arc<dyn IdentityProvider>
//! MySqlPostRepository / MySqlIdentityProvider   (SQLx)
//!   ↓
//! MySQL
//! ```
//!
//! [`InMemoryPostRepository`] implements both contracts without a database
//! and backs the service-level tests and local runs.

pub mod memory;
pub mod mysql;
pub mod pool;
pub mod traits;

pub use memory::InMemoryPostRepository;
pub use mysql::*;
pub use pool::*;
pub use traits::*;
