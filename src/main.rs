use concierge::{app::App, logging, ui};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let _logger = logging::init()?;

    let app = App::new();
    ui::run(app).await
}
