//! CLI entry point for blogfolio

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blogfolio::filter::FilterCriteria;
use blogfolio::Blog;

#[derive(Parser)]
#[command(name = "blogfolio")]
#[command(version)]
#[command(about = "A blog and portfolio site engine", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new site
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Create a new post
    New {
        /// Title of the new post
        title: String,

        /// File name for the new post, relative to _posts
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Generate static files
    #[command(alias = "g")]
    Generate {
        /// Watch for file changes
        #[arg(short, long)]
        watch: bool,
    },

    /// Start a local server
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,

        /// Enable static mode (no file watching)
        #[arg(long)]
        r#static: bool,
    },

    /// Clean the public folder
    Clean,

    /// List posts, categories or tags
    List {
        /// Type of content to list (post, category, tag)
        #[arg(default_value = "post")]
        r#type: String,

        /// Free-text search over title, excerpt and tags
        #[arg(short, long, default_value = "")]
        query: String,

        /// Exact category
        #[arg(long)]
        category: Option<String>,

        /// Exact tag
        #[arg(short, long)]
        tag: Option<String>,
    },

    /// Render a markdown file to HTML on stdout
    Render {
        /// Markdown file to render
        file: PathBuf,

        /// Print the block nodes as JSON instead of HTML
        #[arg(long)]
        json: bool,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug {
        "blogfolio=debug,info"
    } else {
        "blogfolio=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing site in {:?}", target_dir);
            blogfolio::commands::init::init_site(&target_dir)?;
            println!("Initialized site in {:?}", target_dir);
        }

        Commands::New { title, path } => {
            let blog = Blog::new(&base_dir)?;
            tracing::info!("Creating new post: {}", title);
            blogfolio::commands::new::create_post(&blog, &title, path.as_deref())?;
        }

        Commands::Generate { watch } => {
            let blog = Blog::new(&base_dir)?;
            tracing::info!("Generating static files...");

            blog.generate()?;
            println!("Generated successfully!");

            if watch {
                tracing::info!("Watching for file changes...");
                tokio::task::spawn_blocking(move || blogfolio::commands::generate::watch(&blog))
                    .await??;
            }
        }

        Commands::Server {
            port,
            ip,
            open,
            r#static,
        } => {
            let blog = Blog::new(&base_dir)?;
            tracing::info!("Starting server at http://{}:{}", ip, port);
            blogfolio::server::start(&blog, &ip, port, !r#static, open).await?;
        }

        Commands::Clean => {
            let blog = Blog::new(&base_dir)?;
            tracing::info!("Cleaning public folder...");
            blog.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::List {
            r#type,
            query,
            category,
            tag,
        } => {
            let blog = Blog::new(&base_dir)?;
            let criteria = FilterCriteria {
                query,
                category,
                tag,
            }
            .normalized();
            blogfolio::commands::list::run(&blog, &r#type, &criteria)?;
        }

        Commands::Render { file, json } => {
            let path = if file.is_absolute() {
                file
            } else {
                base_dir.join(file)
            };
            let output = if json {
                blogfolio::commands::render::render_file_nodes(&path)?
            } else {
                blogfolio::commands::render::render_file(&path)?
            };
            print!("{}", output);
        }

        Commands::Version => {
            println!("blogfolio version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
