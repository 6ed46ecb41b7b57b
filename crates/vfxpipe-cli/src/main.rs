//! `vfxpipe` binary.

#[tokio::main]
async fn main() {
    std::process::exit(vfxpipe_cli::run().await);
}
