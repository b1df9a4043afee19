use std::sync::Arc;

use crate::fetch::TabSource;
use crate::models::DataSet;

#[derive(Clone)]
pub struct AppState {
    pub data: Arc<tokio::sync::RwLock<DataSet>>,
    pub source: Arc<dyn TabSource>,
}

impl AppState {
    pub fn new(data: DataSet, source: Arc<dyn TabSource>) -> Self {
        Self {
            data: Arc::new(tokio::sync::RwLock::new(data)),
            source,
        }
    }
}
