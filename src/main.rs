#[tokio::main]
async fn main() {
    agent_arena_be::start_server().await;
}
