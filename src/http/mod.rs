// HTTP layer: request handlers and route composition.
//
// Handlers are small adapters over the repository and session layers;
// `create_http_routes(state)` returns the ready-to-serve router.

pub mod handlers;
pub mod routes;

pub use routes::create_http_routes;
