//! Example demonstrating dataset management functionality

use dataset_client::{
    ApiResponse, DatasetClient, DocumentPayload, GenericDatasetRequest, HitTestQuery,
    LoadingFlag, PageRequest, ParagraphPayload, UpdateDatasetRequest,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    // Create client from environment variables
    let client = DatasetClient::from_env()?;

    println!("  Dataset Management Example");
    println!("=============================");

    // Create a dataset from inline documents
    println!("\n1. Creating a dataset...");
    let created = client
        .create_dataset()
        .request(GenericDatasetRequest {
            name: "example-handbook".to_string(),
            desc: "An example dataset for testing".to_string(),
            embedding_mode_id: None,
            documents: vec![DocumentPayload {
                name: "leave.md".to_string(),
                paragraphs: vec![ParagraphPayload {
                    title: Some("Annual leave".to_string()),
                    content: "Employees get 15 days of annual leave.".to_string(),
                    ..Default::default()
                }],
            }],
        })
        .call()
        .await?;

    let dataset = match created {
        ApiResponse::Success { data, .. } => data,
        ApiResponse::Failure(failure) => {
            println!("  Server refused to create the dataset: {}", failure.message);
            return Ok(());
        }
    };
    println!(
        " Created dataset: {}",
        serde_json::to_string_pretty(&dataset)?
    );

    // List datasets, watching the loading flag
    println!("\n2. Listing datasets...");
    let loading = LoadingFlag::new();
    let page = client
        .list_datasets()
        .page(PageRequest::new(1, 10))
        .loading(loading.clone())
        .call()
        .await?
        .into_result()?;
    println!(" {} datasets, loading now {}", page.total, loading.is_loading());

    // Rename it
    println!("\n3. Updating dataset...");
    let updated = client
        .update_dataset()
        .dataset_id(&dataset.id)
        .request(UpdateDatasetRequest {
            desc: Some("Updated by the example".to_string()),
            ..Default::default()
        })
        .call()
        .await?;
    println!(" Update succeeded: {}", updated.is_success());

    // Hit test
    println!("\n4. Running a hit test...");
    match client
        .hit_test()
        .dataset_id(&dataset.id)
        .query(HitTestQuery::new("how many days of leave"))
        .call()
        .await?
    {
        ApiResponse::Success { data, .. } => {
            for hit in data {
                println!(" {:?} {}", hit.similarity, hit.content);
            }
        }
        ApiResponse::Failure(failure) => println!("  Hit test failed: {}", failure),
    }

    // Export
    println!("\n5. Exporting dataset...");
    if let Some(file) = client
        .export_dataset()
        .dataset_name(&dataset.name)
        .dataset_id(&dataset.id)
        .call()
        .await?
        .into_data()
    {
        let path = file.write_to(std::env::temp_dir()).await?;
        println!(" Wrote {}", path.display());
    }

    // Delete
    println!("\n6. Deleting dataset...");
    let deleted = client
        .delete_dataset()
        .dataset_id(&dataset.id)
        .call()
        .await?;
    println!(" Deleted: {:?}", deleted.into_data());

    println!("\n Dataset management example completed!");
    Ok(())
}
