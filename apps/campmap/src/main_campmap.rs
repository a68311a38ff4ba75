#[cfg(feature = "ssr")]
#[tokio::main]
async fn main() {
    if let Err(err) = campmap::server::run().await {
        tracing::error!(?err, "server exited with error");
        std::process::exit(1);
    }
}

#[cfg(not(feature = "ssr"))]
fn main() {}
