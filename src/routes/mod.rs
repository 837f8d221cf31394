use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::handlers::{buses, facilities, orders, trips, users};
use crate::middleware::identity::identity_middleware;
use crate::middleware::rate_limit::create_public_governor;
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    // IP-based governor for the public catalog routes
    let public_governor = create_public_governor();

    let facility_routes = Router::new()
        .route("/", get(facilities::list_facilities))
        .route("/", post(facilities::create_facility))
        .route("/{id}", get(facilities::get_facility))
        .route("/{id}", put(facilities::update_facility))
        .route("/{id}", delete(facilities::delete_facility));

    let bus_routes = Router::new()
        .route("/", get(buses::list_buses))
        .route("/", post(buses::create_bus))
        .route("/{id}", get(buses::get_bus))
        .route("/{id}", put(buses::update_bus))
        .route("/{id}", delete(buses::delete_bus));

    let trip_routes = Router::new()
        .route("/", get(trips::list_trips))
        .route("/", post(trips::create_trip))
        .route("/{id}", get(trips::get_trip))
        .route("/{id}", put(trips::update_trip))
        .route("/{id}", delete(trips::delete_trip));

    let user_routes = Router::new()
        .route("/", post(users::create_user))
        .route("/{id}", get(users::get_user));

    // Order routes need a caller identity
    let order_routes = Router::new()
        .route("/", post(orders::create_order))
        .route("/", get(orders::my_orders))
        .route("/{id}", get(orders::get_order))
        .route("/{id}", delete(orders::cancel_order))
        .layer(middleware::from_fn(identity_middleware));

    Router::new()
        .nest("/api/facilities", facility_routes)
        .nest("/api/buses", bus_routes)
        .nest("/api/trips", trip_routes)
        .nest("/api/users", user_routes)
        .nest("/api/orders", order_routes)
        .layer(public_governor)
        .with_state(state)
}
