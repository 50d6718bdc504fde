use std::error::Error;
use std::time::Duration;

use requests::{Client, FileSource, Opt, Options, RedirectPolicy};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("=== GET with query params ===");

    let response = requests::get(
        "https://httpbin.org/get",
        Options::new()
            .params([("lang", "rust"), ("q", "http client")])
            .timeout(Duration::from_secs(10)),
    )
    .await?;
    println!("Status: {}", response.status_line());
    let body = response.text().await?;
    println!("First 200 chars: {}", &body[..body.len().min(200)]);

    println!("\n=== POST with JSON and basic auth ===");

    let options: Options = vec![
        Opt::headers([("Accept", "application/json")]),
        Opt::basic_auth("alice", "secret"),
        Opt::json(&serde_json::json!({
            "name": "requests",
            "language": "rust"
        })),
    ]
    .into();
    let response = requests::post("https://httpbin.org/post", options).await?;
    let echoed: serde_json::Value = response.json().await?;
    println!("Echoed JSON: {}", echoed["json"]);

    println!("\n=== PUT with a form ===");

    let response = requests::put(
        "https://httpbin.org/put",
        Options::new().form([("name", "John Doe"), ("age", "30")]),
    )
    .await?;
    println!("Status: {}", response.status());

    println!("\n=== POST with files ===");

    let options = Options::new().files([(
        "readme",
        FileSource::from_bytes("readme.txt", b"hello from requests".to_vec()),
    )]);
    let response = requests::post("https://httpbin.org/post", options).await?;
    println!("Status: {}", response.status());

    println!("\n=== Status errors keep the response ===");

    match requests::get("https://httpbin.org/status/404", Options::new()).await {
        Ok(response) => println!("Unexpected success: {}", response.status()),
        Err(err) if err.is_status() => {
            println!("Expected error: {}", err);
            if let Some(response) = err.into_response() {
                println!("Headers: {:?}", response.headers());
            }
        }
        Err(err) => return Err(err.into()),
    }

    println!("\n=== Caller-owned client without redirects ===");

    let client = Client::builder()
        .user_agent("requests-demo/0.1")
        .redirect(RedirectPolicy::none())
        .build()?;
    match client.get("https://httpbin.org/redirect/1", Options::new()).await {
        Ok(response) => println!("Followed to: {}", response.url()),
        Err(err) => println!("Stopped at: {}", err),
    }

    Ok(())
}
