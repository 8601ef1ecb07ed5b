use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use cli::{render, shell, watch};
use std::path::PathBuf;
use tagmark_core::config;
use tagmark_core::config::AppConfig;
use tagmark_core::platform;
use tagmark_core::reconciler::Reconciler;
use tagmark_core::search::filter_view;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref())?;
    let mut rec = Reconciler::from_config(platform::build_platform(&cfg)?, &cfg);
    rec.reload().await.context("loading bookmarks")?;

    match cli.command {
        Commands::List { tag, query, json } => run_list(&rec, tag, query, json),
        Commands::Tags { json } => run_tags(&rec, json),
        Commands::Assign { id, tag } => {
            let outcome = rec.assign_tag(&id, &tag).await?;
            println!("{id}: {outcome:?}, tags now {}", current_tags(&rec, &id));
            Ok(())
        }
        Commands::CreateTag { id, name } => {
            let outcome = rec.create_tag(&id, &name).await?;
            println!("{id}: {outcome:?}, tags now {}", current_tags(&rec, &id));
            Ok(())
        }
        Commands::Delete { id } => {
            rec.delete_bookmark(&id).await?;
            println!("deleted {id} (undo is only available inside `shell`)");
            Ok(())
        }
        Commands::Shell => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            shell::run_shell(&mut rec, stdin, &mut std::io::stdout()).await
        }
        Commands::Watch => run_watch(&cfg, &mut rec).await,
    }
}

#[derive(Parser)]
#[command(name = "tagmark")]
#[command(about = "Browse and tag browser bookmarks, using folders as tags", long_about = None)]
struct Cli {
    /// Path to config TOML
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List bookmarks, newest first
    List {
        /// Only bookmarks carrying this tag
        #[arg(long)]
        tag: Option<String>,
        /// Case-insensitive text matched against title, url and tags
        #[arg(short, long, default_value = "")]
        query: String,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Show tags, most used first
    Tags {
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Toggle a tag on a bookmark (removing moves it to the root container)
    Assign { id: String, tag: String },
    /// Create a new tag folder and move the bookmark into it
    CreateTag { id: String, name: String },
    /// Delete a bookmark
    Delete { id: String },
    /// Interactive session with search, tag picker and undo
    Shell,
    /// Re-read the bookmarks file whenever it changes
    Watch,
}

fn run_list(rec: &Reconciler, tag: Option<String>, query: String, json: bool) -> Result<()> {
    let shown = filter_view(rec.view().bookmarks(), tag.as_deref(), &query);
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&render::bookmarks_json(&shown))?
        );
        return Ok(());
    }
    println!("{} bookmarks", shown.len());
    for b in &shown {
        println!("{}", render::bookmark_line(b));
    }
    Ok(())
}

fn run_tags(rec: &Reconciler, json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&render::tags_json(rec.view()))?
        );
    } else {
        println!("{}", render::sidebar(rec.view()));
    }
    Ok(())
}

async fn run_watch(cfg: &AppConfig, rec: &mut Reconciler) -> Result<()> {
    if cfg.platform.provider != "chrome" {
        bail!("watch needs the chrome provider");
    }
    let path = cfg
        .platform
        .path
        .as_deref()
        .map(PathBuf::from)
        .context("platform.path is not set")?;
    watch::watch_file(rec, &path).await
}

fn current_tags(rec: &Reconciler, id: &str) -> String {
    rec.view()
        .find(id)
        .map(|b| render::tag_badges(&b.tags))
        .unwrap_or_else(|| "?".to_string())
}
