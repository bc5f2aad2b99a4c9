pub mod error;
pub mod models;
pub mod policy;
pub mod storage;

pub use error::{PipelineError, PublishError, TransformError};
pub use models::{
    DemandTable, InventoryRecord, ModelRow, ModelTable, SourceSnapshot, StockLine, UsageRecord,
    columns,
};
pub use policy::ForecastPolicy;
pub use storage::{PublishReceipt, PublishTarget, UsageSource};
