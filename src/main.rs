use chanakya::bot::{self, Variant};
use dotenv::dotenv;

#[tokio::main]
async fn main() -> Result<(), chanakya::Error> {
    dotenv().ok();
    bot::init_tracing();

    bot::start(Variant::Combined).await
}
