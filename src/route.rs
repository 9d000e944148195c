//! Route definitions for the contact directory API
//!
//! This module configures all HTTP routes and maps them to their respective handlers.

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::database::AppState;
use crate::handler::{
    create_contact, delete_contact, email_exists, get_contact, list_contacts, update_contact,
};

/// Creates and configures the Axum application router with all routes
///
/// # Route Definitions
///
/// - `GET /api/contacts` - Search contacts with sort and pagination
/// - `POST /api/contacts` - Create a contact
/// - `GET /api/contacts/email-exists` - Check whether an email is taken
/// - `GET /api/contacts/{id}` - Fetch one contact
/// - `PUT /api/contacts/{id}` - Replace a contact
/// - `DELETE /api/contacts/{id}` - Delete a contact
///
/// # Example Usage
///
/// ```no_run
/// # use contact_directory::database::{init_db, AppState};
/// # use contact_directory::route::create_app;
/// # let db = init_db("contacts.db").unwrap();
/// let app = create_app(AppState::new(db));
/// // axum::serve(listener, app).await.unwrap();
/// ```
pub fn create_app(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/contacts", get(list_contacts).post(create_contact))
        .route("/contacts/email-exists", get(email_exists))
        .route(
            "/contacts/{id}",
            get(get_contact).put(update_contact).delete(delete_contact),
        );

    Router::new()
        .nest("/api", api_routes)
        // The browser front end may be served from another origin
        .layer(CorsLayer::permissive())
        .with_state(state)
}
