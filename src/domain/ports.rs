use crate::domain::filter::RecordFilter;
use crate::domain::model::{Dataset, GrowthReport};
use crate::domain::period::Granularity;
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    /// File names (not paths) directly under `dir`, sorted.
    fn list_files(&self, dir: &str)
        -> impl std::future::Future<Output = Result<Vec<String>>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn data_dir(&self) -> &str;
    fn file_pattern(&self) -> &str;
    fn output_path(&self) -> &str;
    fn granularity(&self) -> Option<Granularity>;
    fn filter(&self) -> RecordFilter;
    /// Fill empty category/manufacturer selections with defaults.
    fn apply_default_selection(&self) -> bool;
    fn top_n(&self) -> usize;
    fn trend_manufacturers(&self) -> &[String];
    fn output_formats(&self) -> &[String];
    fn bundle(&self) -> bool;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Dataset>;
    async fn transform(&self, data: Dataset) -> Result<GrowthReport>;
    async fn load(&self, report: &GrowthReport) -> Result<String>;
}
