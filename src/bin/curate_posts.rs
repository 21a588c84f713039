//! Out-of-band editor for the curated post set (`data/linkedin-posts.json`).
//! The server only ever reads this file.
//!
//! ```text
//! curate-posts add "Shipped SignalNote today" --type post
//! curate-posts list
//! ```

use std::path::PathBuf;

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use portfolio_content::content::sources::CuratedPostSet;
use portfolio_content::content::{ActivityItem, ActivityKind};

#[derive(Parser)]
#[command(name = "curate-posts", about = "Maintain the curated LinkedIn post set")]
struct Cli {
    /// Curated posts file
    #[arg(long, default_value = "data/linkedin-posts.json")]
    file: PathBuf,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Prepend a post (newest first) and trim the set
    Add {
        content: String,
        #[arg(long = "type", value_enum, default_value_t = KindArg::Post)]
        kind: KindArg,
        /// Mark as having no comment of our own (bare reposts are hidden)
        #[arg(long)]
        no_comment: bool,
        /// Post date, defaults to today (UTC)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// How many posts to keep
        #[arg(long, default_value_t = 10)]
        keep: usize,
    },
    /// Print the current set
    List,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Post,
    Repost,
    Comment,
    Article,
}

impl From<KindArg> for ActivityKind {
    fn from(k: KindArg) -> Self {
        match k {
            KindArg::Post => ActivityKind::Post,
            KindArg::Repost => ActivityKind::Repost,
            KindArg::Comment => ActivityKind::Comment,
            KindArg::Article => ActivityKind::Article,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_target(false).init();
    let cli = Cli::parse();

    match cli.cmd {
        Cmd::Add {
            content,
            kind,
            no_comment,
            date,
            keep,
        } => {
            let mut set = if cli.file.exists() {
                CuratedPostSet::load(&cli.file).await?
            } else {
                CuratedPostSet::default()
            };
            let now = Utc::now();
            let item = ActivityItem {
                id: now.timestamp_millis().to_string(),
                content,
                kind: kind.into(),
                date: date.unwrap_or_else(|| now.date_naive()),
                has_comment: !no_comment,
            };
            tracing::info!(id = %item.id, "adding curated post");
            set.prepend(item, keep);
            set.save(&cli.file)?;
            println!("{} posts in {}", set.posts.len(), cli.file.display());
        }
        Cmd::List => {
            let set = CuratedPostSet::load(&cli.file).await?;
            for p in &set.posts {
                let preview: String = p.content.chars().take(80).collect();
                println!("{:>14}  {}  {:?}  {}", p.id, p.date, p.kind, preview);
            }
        }
    }
    Ok(())
}
