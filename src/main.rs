#[tokio::main]
async fn main() {
    food_order::start_server().await;
}
