// Convenience test entry exposing per-endpoint-family integration tests
// Run with: `cargo test --test http_routes`

#[path = "common/mod.rs"]
mod common;

#[path = "http_routes/model_play.rs"]
mod model_play;

#[path = "http_routes/human_play.rs"]
mod human_play;

#[path = "http_routes/lifecycle.rs"]
mod lifecycle;
