use tracing_subscriber::EnvFilter;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let native_options = eframe::NativeOptions::default();
    eframe::run_native(
        "Node Groups",
        native_options,
        Box::new(|cc| Ok(Box::new(nodegroup::app::GraphApp::new(cc)))),
    )
}
