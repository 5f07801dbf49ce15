//! Example importing documents from a Lark folder into a new dataset
//!
//! Besides the client variables, reads `LARK_APP_ID`, `LARK_APP_SECRET` and
//! `LARK_FOLDER_TOKEN`.

use anyhow::Context;
use dataset_client::{DatasetClient, LarkDatasetRequest, Loading, SecretString};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let client = DatasetClient::from_env()?;

    let app_id = std::env::var("LARK_APP_ID").context("LARK_APP_ID not set")?;
    let app_secret = std::env::var("LARK_APP_SECRET").context("LARK_APP_SECRET not set")?;
    let folder_token = std::env::var("LARK_FOLDER_TOKEN").context("LARK_FOLDER_TOKEN not set")?;

    let spinner = Loading::new(|loading: bool| {
        if loading {
            println!("  ...");
        }
    });

    println!("Creating Lark dataset...");
    let dataset = client
        .create_dataset()
        .request(LarkDatasetRequest {
            name: "lark-wiki".to_string(),
            desc: "Imported from Lark".to_string(),
            app_id,
            app_secret: SecretString::new(app_secret),
            folder_token: folder_token.clone(),
            embedding_mode_id: None,
        })
        .loading(spinner.clone())
        .call()
        .await?
        .into_result()?;
    println!(" Created dataset {}", dataset.id);

    println!("\nListing folder documents...");
    let documents = client
        .list_lark_documents()
        .dataset_id(&dataset.id)
        .folder_token(&folder_token)
        .loading(spinner.clone())
        .call()
        .await?
        .into_result()?;

    for document in &documents {
        println!(
            " {} ({})",
            document.name.as_deref().unwrap_or(&document.token),
            document.doc_type.as_deref().unwrap_or("unknown")
        );
    }

    if documents.is_empty() {
        println!(" Folder is empty, nothing to import");
        return Ok(());
    }

    println!("\nImporting {} documents...", documents.len());
    let imported = client
        .import_lark_documents()
        .dataset_id(&dataset.id)
        .documents(documents)
        .loading(spinner)
        .call()
        .await?;

    match imported.into_result() {
        Ok(results) => println!(" Imported {} documents", results.len()),
        Err(failure) => println!("  Import failed: {}", failure),
    }

    Ok(())
}
