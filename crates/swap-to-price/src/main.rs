#[tokio::main]
async fn main() {
    swap_to_price::start(std::env::args()).await;
}
