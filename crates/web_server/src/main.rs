//! Main entry point for the rental marketplace backend server.
//! This crate provides REST API endpoints and serves the frontend application.

use std::path::Path;
use std::sync::Arc;

use actix_files::Files;
use actix_web::{App, HttpResponse, HttpServer, Result, middleware::Logger, web};

use auth_services::middleware::AuthMiddleware;
use booking_engine::BookingService;
use media_store::{HttpImageStore, ImageStore, MockImageStore};
use postgres::database::*;
use web_handlers::*;

mod notify_manager;
use notify_manager::NotifyManager;

async fn api_hello() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Hello from the rental marketplace backend!",
        "status": "running"
    })))
}

fn get_frontend_path() -> &'static str {
    // Check multiple possible locations for frontend files
    if Path::new("./frontend-build").exists() {
        log::info!("✅ Using Docker frontend path: ./frontend-build");
        "./frontend-build"
    } else if Path::new("../frontend/dist").exists() {
        log::info!("✅ Using local frontend path: ../frontend/dist");
        "../frontend/dist"
    } else {
        log::info!("❌ Frontend files not found in either location");
        "./frontend-build" // fallback
    }
}

fn build_image_store() -> Arc<dyn ImageStore> {
    match HttpImageStore::new() {
        Ok(store) => {
            log::info!("🖼️ Using hosted media store for vehicle images");
            Arc::new(store)
        }
        Err(e) => {
            log::warn!("Media store not configured ({}), using mock store", e);
            Arc::new(MockImageStore)
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    log::info!("🚀 Starting rental marketplace server...");

    // Create database connection pool
    let pool = match create_connection_pool().await {
        Ok(pool) => {
            log::info!("🗃️ Database pool created successfully");

            if let Err(e) = test_connection(&pool).await {
                log::error!("❌ Database connection test failed: {}", e);
            }
            pool
        }
        Err(e) => {
            log::error!("❌ Failed to create database pool: {}", e);
            log::error!("💡 Make sure PostgreSQL is running and DATABASE_URL is set");
            std::process::exit(1);
        }
    };

    // Create the image store the vehicle handlers upload through
    let image_store = web::Data::from(build_image_store());

    // Start the push dispatcher and hand its queue to the booking engine
    let mut notify_manager = NotifyManager::new(pool.clone());
    let dispatcher = notify_manager.start();
    let booking_service = web::Data::new(BookingService::new(pool.clone(), Arc::new(dispatcher)));

    let frontend_path = get_frontend_path();
    log::info!("📁 Frontend files location: {}", frontend_path);
    log::info!("🌐 Server will be available at: http://0.0.0.0:8080");

    let result = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(booking_service.clone())
            .app_data(image_store.clone())
            .wrap(Logger::default())
            .service(
                web::scope("/api")
                    // Public routes
                    .route("/hello", web::get().to(api_hello))
                    .service(
                        web::scope("/vehicles")
                            .service(
                                web::resource("")
                                    .route(web::get().to(list_vehicles))
                                    .route(web::post().to(create_vehicle)),
                            )
                            .service(web::resource("/mine").route(web::get().to(my_vehicles)))
                            .service(
                                web::resource("/{vehicle_id}")
                                    .route(web::get().to(get_vehicle))
                                    .route(web::put().to(update_vehicle))
                                    .route(web::delete().to(delete_vehicle)),
                            )
                            .service(
                                web::resource("/{vehicle_id}/availability")
                                    .route(web::get().to(vehicle_calendar)),
                            ),
                    )
                    // Booking routes (require authentication)
                    .service(
                        web::scope("/bookings")
                            .wrap(AuthMiddleware)
                            .route("", web::post().to(create_booking))
                            .route("/my", web::get().to(my_bookings))
                            .route("/owner", web::get().to(owner_bookings))
                            .route("/{booking_id}/status", web::patch().to(decide_booking)),
                    )
                    // Push subscription routes
                    .service(
                        web::scope("/push")
                            .route("/public-key", web::get().to(push_public_key))
                            .service(
                                web::scope("")
                                    .wrap(AuthMiddleware)
                                    .route("/subscribe", web::post().to(push_subscribe)),
                            ),
                    ),
            )
            .route(
                "/health",
                web::get().to(|| async { HttpResponse::Ok().body("OK") }),
            )
            .service(Files::new("/", frontend_path).index_file("index.html"))
    })
    .bind("0.0.0.0:8080")?
    .run()
    .await;

    notify_manager.stop().await;
    result
}
