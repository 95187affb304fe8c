use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use lyric_catalog::auth::{AuthConfig, Credential, PasswordHasher};
use lyric_catalog::state::{CatalogStore, SledStore};
use reqwest::{Client, Response};
use serde_json::json;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lyric-catalog-cli")]
#[command(about = "Lyric Catalog CLI", long_about = None)]
struct Cli {
    #[arg(short, long, env = "LYRIC_CATALOG_ENDPOINT", default_value = "http://localhost:3000")]
    endpoint: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search songs by title or lyrics; wrap the query in quotes for an exact phrase
    Search {
        #[arg(value_name = "QUERY")]
        query: String,
    },

    /// Get song details
    Get {
        #[arg(value_name = "SONG_ID")]
        id: String,
    },

    /// List song lists
    Lists {
        #[arg(short, long)]
        query: Option<String>,
    },

    /// Show one song list, optionally searching inside it
    List {
        #[arg(value_name = "LIST_ID")]
        id: String,

        #[arg(short, long)]
        query: Option<String>,
    },

    /// Add a song (requires an admin token)
    AddSong {
        #[arg(short, long)]
        title: String,

        /// File holding the lyrics
        #[arg(short, long)]
        lyrics: Option<PathBuf>,

        #[arg(short, long)]
        author: Option<String>,

        #[arg(long, env = "LYRIC_CATALOG_TOKEN", hide_env_values = true)]
        token: String,
    },

    /// Log in as admin and print the session token
    Login {
        #[arg(short, long, env = "LYRIC_CATALOG_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Hash a password offline; writes it into a sled data directory when given
    HashPassword {
        #[arg(short, long, env = "LYRIC_CATALOG_PASSWORD", hide_env_values = true)]
        password: String,

        /// Sled data directory of a stopped server
        #[arg(short, long)]
        store: Option<PathBuf>,
    },

    /// Check server health
    Health,
}

async fn print_body(response: Response) -> Result<()> {
    let status = response.status();
    let body: serde_json::Value = response
        .json()
        .await
        .context("server returned a non-JSON body")?;
    println!("{}", serde_json::to_string_pretty(&body)?);

    if !status.is_success() {
        bail!("request failed with status {}", status);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = Client::new();

    match cli.command {
        Commands::Search { query } => {
            let response = client
                .get(format!("{}/v1/songs", cli.endpoint))
                .query(&[("q", query)])
                .send()
                .await?;

            print_body(response).await?;
        }

        Commands::Get { id } => {
            let response = client
                .get(format!("{}/v1/songs/{}", cli.endpoint, id))
                .send()
                .await?;

            print_body(response).await?;
        }

        Commands::Lists { query } => {
            let mut request = client.get(format!("{}/v1/lists", cli.endpoint));
            if let Some(q) = query {
                request = request.query(&[("q", q)]);
            }

            print_body(request.send().await?).await?;
        }

        Commands::List { id, query } => {
            let mut request = client.get(format!("{}/v1/lists/{}", cli.endpoint, id));
            if let Some(q) = query {
                request = request.query(&[("q", q)]);
            }

            print_body(request.send().await?).await?;
        }

        Commands::AddSong {
            title,
            lyrics,
            author,
            token,
        } => {
            let lyrics = match lyrics {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read lyrics from {}", path.display()))?,
                None => String::new(),
            };

            let response = client
                .post(format!("{}/v1/songs", cli.endpoint))
                .bearer_auth(token)
                .json(&json!({
                    "title": title,
                    "lyrics": lyrics,
                    "author": author,
                }))
                .send()
                .await?;

            print_body(response).await?;
        }

        Commands::Login { password } => {
            let response = client
                .post(format!("{}/v1/admin/login", cli.endpoint))
                .json(&json!({ "password": password }))
                .send()
                .await?;

            print_body(response).await?;
        }

        Commands::HashPassword { password, store } => {
            let hasher = PasswordHasher::new(&AuthConfig::default());
            let salt = hasher.generate_salt();
            let credential = Credential::hashed(hasher.hash(&password, &salt), salt);

            match store {
                Some(path) => {
                    let store = SledStore::new(&path)
                        .with_context(|| format!("failed to open store at {}", path.display()))?;
                    store.save_credential(&credential).await?;
                    println!("Admin credential written to {}", path.display());
                }
                None => println!("{}", serde_json::to_string_pretty(&credential)?),
            }
        }

        Commands::Health => {
            let response = client
                .get(format!("{}/health", cli.endpoint))
                .send()
                .await?;

            print_body(response).await?;
        }
    }

    Ok(())
}
