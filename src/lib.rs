// 公开导出的模块，供外部使用
pub mod models;
pub mod errors;
pub mod config;
pub mod scrapers;
pub mod services;
pub mod util;

// 重新导出常用类型，方便使用
pub use config::{CleanupMode, Config};
pub use errors::{DataHubError, Result};
pub use models::record::{DailyRecord, ScrapedRow};
pub use scrapers::base::DailySource;
pub use scrapers::sharesansar::ShareSansarScraper;
pub use services::data_service::{DataService, RunSummary};
