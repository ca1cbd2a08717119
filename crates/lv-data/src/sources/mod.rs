//! Sources that produce the two linked tables

pub mod csv_source;
pub mod widget_source;

use async_trait::async_trait;

use crate::{DataError, LoadedData};

pub use csv_source::{CsvPairSource, CsvTable};
pub use widget_source::{WidgetPayload, WidgetPayloadSource};

/// Anything that can hand the linked views a point table and a histogram table
#[async_trait]
pub trait LinkedDataSource: Send + Sync {
    /// Load both tables
    async fn load(&self) -> Result<LoadedData, DataError>;

    /// Human readable name, shown in the status bar
    fn source_name(&self) -> &str;
}
