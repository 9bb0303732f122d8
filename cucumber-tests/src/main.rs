use cucumber::{cli, World};
use cucumber_tests::features::DashgateWorld;

#[tokio::main]
async fn main() {
    DashgateWorld::cucumber()
        .with_cli::<()>(cli::Opts::parsed())
        .run_and_exit("features/")
        .await;
}
