// CH Dashboard - Core Library
// Registry client, document proxy, follows and the dashboard view layer,
// shared by the CLI/TUI, the API server and tests

pub mod config;
pub mod dashboard;
pub mod document;
pub mod error;
pub mod follows;
pub mod http;
pub mod logging;
pub mod monitor;
pub mod officers;
pub mod registry;

#[cfg(feature = "server")]
pub mod server;

// Re-export commonly used types
pub use config::Config;
pub use dashboard::{DashboardClient, Poller, Update, View};
pub use document::{pdf_filename, DocumentResolver, MetadataSource, Stage, StageError};
pub use error::{DashboardError, Result};
pub use follows::{FollowStore, Follows, JsonFileStore, MemoryStore, FOLLOWS_KEY};
pub use http::{HttpClient, HttpResponse, MockHttpClient, ReqwestHttpClient};
pub use logging::{init_file_logging, init_logging, Verbosity};
pub use monitor::{ChangeSet, Monitor};
pub use officers::{group_officers, summarize_appointments, OfficerGroup, RoleStatus};
pub use registry::{RegistryClient, DEFAULT_API_BASE};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
