use std::path::Path;

use clinica_core::response::ErrorBody;
use tokio::io::AsyncWriteExt;
use utoipa::OpenApi;

use crate::app::controller::SystemControllerApi;

#[derive(OpenApi)]
#[openapi(
    nest(
        (path = "/api", api = SystemControllerApi)
    ),
    components(schemas(ErrorBody)),
    info(title = "clinica", description = "Clinic booking gateway")
)]
pub struct MainApiDoc;

pub async fn generate_docs(output: &Path) -> anyhow::Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(output)
        .await?;

    let docs = MainApiDoc::openapi().to_pretty_json()?;

    file.write_all(docs.as_bytes()).await?;
    file.flush().await?;

    tracing::info!("wrote OpenAPI document to {}", output.display());

    Ok(())
}
