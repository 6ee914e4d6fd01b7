//! Example walking through a Fayda login from the command line
//!
//! Configuration comes from the environment (or a `.env` file):
//!
//! ```text
//! FAYDA_CLIENT_ID=...
//! FAYDA_PRIVATE_KEY=...        # PEM, or Base64 of PEM / JWK / PKCS#8 DER
//! FAYDA_ENVIRONMENT=UAT
//! FAYDA_REDIRECT_URI=http://localhost:3000/callback
//! ```
//!
//! Run without arguments to get a login URL and PKCE verifier, then run again
//! with the `code` from the callback and the verifier:
//!
//! ```text
//! cargo run --example fayda_login
//! cargo run --example fayda_login -- <code> <code_verifier>
//! ```

use ras_identity_fayda::{AuthorizationOptions, ClientConfig, FaydaClient};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ClientConfig::from_env()?;
    println!("Fayda login example ({})", config.environment());
    println!("=============================");

    let client = FaydaClient::new(config)?;
    let args: Vec<String> = std::env::args().skip(1).collect();

    match args.as_slice() {
        [] => {
            let login = client.authorization_url(
                AuthorizationOptions::new().with_scope("openid profile email"),
            )?;

            println!("\n1. Redirect the user to:\n{}", login.url);
            println!(
                "\n2. Keep the PKCE verifier (e.g. in an encrypted cookie):\n{}",
                login.code_verifier
            );
            println!("\n3. Check that the callback carries state={}", login.state);
            println!("\nThen run again with: <code> <code_verifier>");
        }
        [code, code_verifier] => {
            let profile = client
                .exchange_code_for_user(code, code_verifier, None)
                .await?;

            println!("\nAuthenticated user:");
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
        _ => {
            eprintln!("usage: fayda_login [<code> <code_verifier>]");
            std::process::exit(2);
        }
    }

    Ok(())
}
