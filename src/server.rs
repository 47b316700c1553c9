use actix_web::http::Method;
use actix_web::middleware::DefaultHeaders;
use actix_web::{get, post, web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::conversation::TourismContext;
use crate::error::ChatError;

#[derive(Deserialize)]
struct ChatRequest {
    #[serde(default)]
    message: Option<String>,
}

#[post("/api/chat")]
async fn chat(
    req: web::Json<ChatRequest>,
    context: web::Data<TourismContext>,
) -> Result<HttpResponse, ChatError> {
    let request_id = Uuid::new_v4();
    let message = match req.into_inner().message {
        Some(message) if !message.is_empty() => message,
        _ => {
            log::warn!("[{}] Rejected chat request without a message", request_id);
            return Err(ChatError::EmptyMessage);
        }
    };
    log::info!("[{}] Chat request ({} chars)", request_id, message.chars().count());

    let reply = web::block(move || context.handle_user_input(&message))
        .await
        .map_err(|e| ChatError::Worker(e.to_string()))
        .and_then(|result| result)
        .map_err(|e| {
            log::error!("[{}] Error processing request: {}", request_id, e);
            e
        })?;
    Ok(HttpResponse::Ok().json(reply))
}

#[get("/api/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "message": "Bangalore Tourism API is running"
    }))
}

async fn preflight() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

/// Open CORS policy: any origin, header and method.
pub fn cors() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("Access-Control-Allow-Origin", "*"))
        .add(("Access-Control-Allow-Headers", "*"))
        .add(("Access-Control-Allow-Methods", "*"))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    let json_config = web::JsonConfig::default().error_handler(|err, _req| {
        log::warn!("Rejected chat payload: {}", err);
        ChatError::EmptyMessage.into()
    });
    cfg.app_data(json_config)
        .service(chat)
        .service(health)
        .route("/{tail:.*}", web::method(Method::OPTIONS).to(preflight));
}
