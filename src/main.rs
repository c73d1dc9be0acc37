use anyhow::Result;

mod cli;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();
    cli::run()
}
