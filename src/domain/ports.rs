use crate::domain::model::{AnalysisReport, Dataset, DatasetPolicy};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn alpha(&self) -> f64;
    fn policy(&self) -> &DatasetPolicy;
    fn output_formats(&self) -> &[String];
    fn archive(&self) -> bool;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Dataset>;
    async fn transform(&self, dataset: Dataset) -> Result<AnalysisReport>;
    async fn load(&self, report: &AnalysisReport) -> Result<String>;
}
