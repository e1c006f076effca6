//! # Backend Module
//!
//! Contains all non-UI logic for the fee ledger.
//!
//! This module is the orchestration layer that brings together:
//! - **Domain**: challan generation, lifecycle, publishing and collection rules
//! - **Storage**: file-backed and in-memory persistence
//! - **IO**: the REST interface used by the student portal and admin dashboard
//!
//! ## Architecture
//!
//! ```text
//! IO Layer (REST API, CLI)
//!     ↓
//! Domain Layer (services, pure generator)
//!     ↓
//! Storage Layer (CSV/YAML files, memory)
//! ```

pub mod domain;
pub mod io;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_fixtures;

use anyhow::Result;
use axum::{http::Method, Router};
use log::info;
use std::path::Path;
use tower_http::cors::{Any, CorsLayer};

use crate::backend::domain::{
    CatalogService, ChallanService, CollectionService, ExportService, LedgerResult, PublishService,
    PublishedChallanStore, SiblingService,
};
use crate::backend::storage::csv::ConfigRepository;
use crate::backend::storage::{ChallanStorage, Connection, CsvConnection, LedgerConfig};

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState<C: Connection> {
    pub config: LedgerConfig,
    pub catalog_service: CatalogService<C>,
    pub sibling_service: SiblingService<C>,
    pub challan_service: ChallanService<C>,
    pub publish_service: PublishService,
    pub collection_service: CollectionService<C>,
    pub export_service: ExportService,
}

/// Wire every service to one connection. Challans already in storage are
/// published so the student views start out complete.
pub fn build_state<C: Connection>(connection: C, config: LedgerConfig) -> LedgerResult<AppState<C>> {
    let publish_service = PublishService::new(PublishedChallanStore::new(), &config);

    let existing = connection.create_challan_repository().list_challans()?;
    if !existing.is_empty() {
        let outcome = publish_service.publish(&existing);
        info!("Published {} existing challans", outcome.added);
    }

    Ok(AppState {
        catalog_service: CatalogService::new(&connection),
        sibling_service: SiblingService::new(&connection),
        challan_service: ChallanService::new(&connection, config.clone()).with_publisher(publish_service.clone()),
        collection_service: CollectionService::new(&connection),
        export_service: ExportService::new(),
        publish_service,
        config,
    })
}

/// Initialize the backend over a data directory
pub fn initialize_backend<P: AsRef<Path>>(data_dir: P) -> Result<AppState<CsvConnection>> {
    info!("Opening data directory {}", data_dir.as_ref().display());
    let connection = CsvConnection::new(data_dir)?;

    info!("Loading ledger config");
    let config = ConfigRepository::new(connection.clone()).load_or_create()?;

    info!("Setting up domain services");
    Ok(build_state(connection, config)?)
}

/// Create the Axum router with all routes configured
pub fn create_router<C: Connection + 'static>(app_state: AppState<C>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    let api_routes = Router::new()
        .nest("/students", io::rest::student_apis::router())
        .nest("/challans", io::rest::challan_apis::router())
        .merge(io::rest::collection_apis::router());

    Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(app_state)
}
