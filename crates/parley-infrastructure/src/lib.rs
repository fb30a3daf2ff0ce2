pub mod config;
pub mod folder_scan;
pub mod history_store;
pub mod paths;
pub mod system_context;

pub use crate::config::AppConfig;
pub use crate::folder_scan::{ScanEntry, ScanError, scan_folder};
pub use crate::history_store::FileConversationRepository;
pub use crate::paths::{HistoryChoice, ParleyPaths};
pub use crate::system_context::EnvironmentContext;
