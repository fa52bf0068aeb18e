// src/web/routes.rs
use crate::{
    state::AppState,
    web::{
        admin_handlers, auth_handlers, mw_admin, mw_auth, mw_role, officer_handlers,
        police_handlers, register_handlers, trends_handlers, user_handlers,
    },
};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};

pub fn create_router(app_state: AppState) -> Router {
    // --- Public routes ---
    let public_routes = Router::new()
        .route("/", get(auth_handlers::show_landing))
        .route(
            "/login",
            get(auth_handlers::show_login_form).post(auth_handlers::handle_login),
        )
        .route("/logout", get(auth_handlers::handle_logout))
        .route(
            "/register",
            get(register_handlers::show_police_form).post(register_handlers::handle_police_register),
        )
        .route(
            "/register/officer",
            get(register_handlers::show_officer_form)
                .post(register_handlers::handle_officer_register),
        )
        .route("/register/success", get(register_handlers::show_success));

    // --- Admin routes ---
    // Require login AND the Admin role
    let admin_routes = Router::new()
        .route("/users", get(admin_handlers::show_users_page))
        .route("/users/create", post(admin_handlers::handle_create_user))
        .route("/users/{id}/approve", post(admin_handlers::handle_approve_user))
        .route("/users/{id}/reject", post(admin_handlers::handle_reject_user))
        .route("/users/{id}/status", post(admin_handlers::handle_set_status))
        .route("/users/{id}/delete", post(admin_handlers::handle_delete_user))
        .route("/trends", get(trends_handlers::trends_page_handler))
        .route("/trends/ws", get(trends_handlers::trends_websocket_handler))
        // Only mw_admin here (require_auth is applied on the parent router)
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            mw_admin::require_admin,
        ));

    // --- Officer routes ---
    let officer_routes = Router::new()
        .route("/", get(officer_handlers::officer_page_handler))
        .route("/votes", post(officer_handlers::handle_submit_votes))
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            mw_role::require_officer,
        ));

    // --- Police routes ---
    let police_routes = Router::new()
        .route("/", get(police_handlers::police_page_handler))
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            mw_role::require_police,
        ));

    // --- Authenticated routes (everything nested below needs a session) ---
    let authenticated_routes = Router::new()
        .route(
            "/profile",
            get(user_handlers::profile_page_handler).post(user_handlers::handle_profile_update),
        )
        .nest("/admin", admin_routes)
        .nest("/officer", officer_routes)
        .nest("/police", police_routes)
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            mw_auth::require_auth,
        ));

    // --- Final router ---
    Router::new()
        .merge(public_routes)
        .merge(authenticated_routes)
        .with_state(app_state)
}
