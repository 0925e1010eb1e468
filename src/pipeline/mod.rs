pub mod report;
pub mod stage;
pub mod static_assets;

pub use report::{Report, ReportDefinition};
pub use stage::{Stage, StageDataMap, StageInput};
pub use static_assets::{EmbeddedFile, StaticGroup, StaticRoot};

pub type DataInfo = serde_json::Map<String, serde_json::Value>;

pub const REPORT_DIR: &str = "report";
pub const STATIC_DIR: &str = "static";
