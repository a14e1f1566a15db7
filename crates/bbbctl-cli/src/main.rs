use std::process;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let exit_code = bbbctl_cli::run().await;
    process::exit(exit_code);
}
