//! CLI entry point for the ballchasing client.

use anyhow::Result;
use ballchasing::api::{GroupFilter, NewGroup, Replay, ReplayFilter};
use ballchasing::listing::SERVER_PAGE_CAP;
use ballchasing::BallchasingClient;
use clap::Parser;
use futures::TryStreamExt;
use serde::Serialize;
use tracing::{debug, info, warn};

mod cli;

use cli::{Args, Command};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    // Load .env file if present
    let _ = dotenvy::dotenv();

    let client = match &args.config {
        Some(path) => BallchasingClient::with_config_path(path)?,
        None => BallchasingClient::new()?,
    };
    debug!(client = %client, "Client ready");

    run(&client, args.command).await
}

async fn run(client: &BallchasingClient, command: Command) -> Result<()> {
    match command {
        Command::Ping => print_json(&client.ping().await?),

        Command::Search {
            uploader,
            title,
            playlist,
            player_name,
            group,
            count,
            deep,
        } => {
            let mut filter = ReplayFilter::new();
            filter.uploader = uploader;
            filter.title = title;
            filter.playlists = playlist;
            filter.player_names = player_name;
            filter.group = group;

            if !deep && count <= SERVER_PAGE_CAP {
                print_json(&client.search(&filter, count).await?)
            } else {
                let replays: Vec<Replay> = client.replays(&filter, count, deep).try_collect().await?;
                info!(replays = replays.len(), "Search complete");
                print_json(&replays)
            }
        }

        Command::Replay { id } => print_json(&client.get_replay(&id).await?),

        Command::Upload {
            file,
            visibility,
            group,
        } => match client.upload_replay(&file, visibility, group.as_deref()).await {
            Ok(uploaded) => print_json(&uploaded),
            Err(e) if e.is_duplicate_replay() => {
                let existing = e.duplicate_replay_id();
                warn!(file = %file.display(), existing = ?existing, "Replay already uploaded");
                print_json(&serde_json::json!({ "duplicate": true, "id": existing }))
            }
            Err(e) => Err(e.into()),
        },

        Command::DeleteReplay { id } => {
            client.delete_replay(&id).await?;
            info!(id = %id, "Deleted replay");
            Ok(())
        }

        Command::Group { id } => print_json(&client.get_group(&id).await?),

        Command::Groups {
            name,
            creator,
            parent,
            count,
        } => {
            let mut filter = GroupFilter::new();
            filter.name = name;
            filter.creator = creator;
            filter.parent = parent;

            let groups: Vec<_> = client.groups(&filter, count).try_collect().await?;
            print_json(&groups)
        }

        Command::CreateGroup {
            name,
            player_identification,
            team_identification,
            parent,
        } => {
            let mut group = NewGroup::new(name, player_identification, team_identification);
            group.parent = parent;
            print_json(&client.create_group(&group).await?)
        }

        Command::DeleteGroup { id } => {
            client.delete_group(&id).await?;
            info!(id = %id, "Deleted group");
            Ok(())
        }

        Command::Download { id, folder } => {
            tokio::fs::create_dir_all(&folder).await?;
            let path = client.download_replay(&id, &folder).await?;
            info!(path = %path.display(), "Downloaded replay");
            Ok(())
        }

        Command::DownloadGroup { id, folder, flat } => {
            client.download_group(&id, &folder, !flat).await?;
            Ok(())
        }

        Command::Maps => print_json(&client.maps().await?),
    }
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
