use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use loupe::client::HttpBackend;
use loupe::document::{Node, Path};
use loupe::session::{PageSession, open_shared};
use loupe::store::PageId;
use loupe::{Config, Document};

#[derive(Parser)]
#[command(name = "loupe", version, about = "Work with Loupe pages from the terminal")]
struct Cli {
    /// Backend URL, overriding the config file.
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List saved pages.
    List,
    /// Print a page as plain text.
    Show { id: PageId },
    /// Create a page, optionally with a first paragraph.
    New {
        title: String,
        #[arg(long)]
        text: Option<String>,
    },
    Delete { id: PageId },
    /// Mint a public link for a page.
    Share { id: PageId },
    /// Print a shared page by its token.
    Public { token: String },
    /// Fact-check part of a block and save the answer as a comment.
    FactCheck {
        id: PageId,
        /// Top-level block index.
        block: usize,
        start: Option<usize>,
        end: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("loupe=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    run(Cli::parse()).await
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(url) = cli.api_url {
        config.api_base_url = url;
    }
    let backend = HttpBackend::new(&config).context("Failed to set up HTTP client")?;
    let mut session = PageSession::new(&config);

    match cli.command {
        Commands::List => {
            for page in session.list_pages(&backend).await? {
                let title = page.title.as_deref().unwrap_or(&config.default_title);
                match page.created_at {
                    Some(at) => println!("{:>5}  {}  {title}", page.id, at.format("%Y-%m-%d")),
                    None => println!("{:>5}  {title}", page.id),
                }
            }
        }
        Commands::Show { id } => {
            session
                .open(&backend, id)
                .await
                .with_context(|| format!("Failed to open page {id}"))?;
            print_page(session.title(), session.document());
        }
        Commands::New { title, text } => {
            session.set_title(title);
            if let Some(text) = text {
                session.edit(|editor| {
                    editor.replace_document(Document::with_blocks(vec![Node::paragraph(text)]))
                });
            }
            let id = session.save(&backend).await.context("Failed to save page")?;
            println!("{id}");
        }
        Commands::Delete { id } => {
            session
                .delete(&backend, id)
                .await
                .with_context(|| format!("Failed to delete page {id}"))?;
        }
        Commands::Share { id } => {
            session
                .open(&backend, id)
                .await
                .with_context(|| format!("Failed to open page {id}"))?;
            let url = session.share(&backend).await.context("Failed to share page")?;
            println!("{url}");
        }
        Commands::Public { token } => {
            let view = open_shared(&backend, &token)
                .await
                .context("Failed to load shared page")?;
            print_page(&view.title, &view.document);
        }
        Commands::FactCheck {
            id,
            block,
            start,
            end,
        } => {
            session
                .open(&backend, id)
                .await
                .with_context(|| format!("Failed to open page {id}"))?;
            let range = session.editor().block_range(
                &Path::new_root(block),
                start.unwrap_or(0),
                end.unwrap_or(usize::MAX),
            );
            let Some(range) = range else {
                bail!("Page {id} has no text block at index {block}");
            };
            session.select(Some(range));
            let path = session
                .fact_check(&backend)
                .await
                .context("Fact-check failed")?;
            session.save(&backend).await.context("Failed to save page")?;
            if let Some(comment) = session.document().block(&path) {
                println!("{}", comment.plain_text());
            }
        }
    }

    Ok(())
}

fn print_page(title: &str, document: &Document) {
    println!("{title}");
    println!("{}", "=".repeat(title.chars().count()));
    println!("{}", document.to_plain_text());
}
