use actix_web::{middleware, web, App, HttpServer};
use anyhow::Result;

mod category;
mod conversation;
mod error;
mod knowledge;
mod model;
mod response;
mod server;
mod settings;
mod similarity;
mod text;
mod tokenizer;

use conversation::TourismContext;
use knowledge::KnowledgeStore;
use model::SequenceClassifier;
use settings::Settings;
use similarity::Similarity;

/// Loads the model, datasets and optional word vectors. Missing required
/// files abort startup.
fn build_context(settings: &Settings) -> Result<TourismContext> {
    let missing: Vec<_> = settings
        .model
        .required_files()
        .into_iter()
        .chain([settings.data.tourism_path(), settings.data.qa_path()])
        .filter(|path| !path.exists())
        .collect();
    if !missing.is_empty() {
        for path in &missing {
            log::error!("Required file {:?} not found.", path);
        }
        return Err(anyhow::anyhow!("Model or dataset files not found."));
    }

    let classifier = SequenceClassifier::load(&settings.model)?;
    log::info!(
        "Loaded intent model with {} labels (sequence length {})",
        classifier.labels().len(),
        classifier.config.max_len
    );
    let store = KnowledgeStore::load(&settings.data)?;
    log::info!(
        "Loaded {} points of interest and {} QA pairs",
        store.item_count(),
        store.qa_count()
    );
    let similarity = Similarity::select(settings.data.word_vectors_path().as_deref());

    Ok(TourismContext::new(
        Box::new(classifier),
        store,
        similarity,
        settings.logic.clone(),
    ))
}

#[actix_web::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = Settings::load()?;
    let context = build_context(&settings)?;
    log::info!(
        "Bangalore tourism assistant ready ({} similarity)",
        context.similarity().name()
    );
    let data = web::Data::new(context);

    let host = settings.server.host.clone();
    let port = settings.server.port;
    log::info!("Starting server at http://{}:{}", host, port);
    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .wrap(server::cors())
            .app_data(data.clone())
            .configure(server::configure)
    })
    .bind((host, port))?
    .run()
    .await?;
    Ok(())
}
