use hireflow_api::run;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("hireflow error: {err}");
        std::process::exit(1);
    }
}
