//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use shelf_core::config::Config;
use shelf_core::{AppContext, logging};

mod commands;
mod output;

#[derive(Parser)]
#[command(name = "shelf")]
#[command(version)]
#[command(about = "Browse, publish and review books from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Browse and manage books
    Books {
        #[command(subcommand)]
        command: BookCommands,
    },
    /// Browse and create categories
    Categories {
        #[command(subcommand)]
        command: CategoryCommands,
    },
    /// Read and write reviews
    Reviews {
        #[command(subcommand)]
        command: ReviewCommands,
    },
    /// Browse users
    Users {
        #[command(subcommand)]
        command: UserCommands,
    },
    /// Create an account and log in
    Register {
        #[arg(long)]
        username: String,
        #[arg(long, env = "SHELF_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long, default_value = "")]
        bio: String,
        /// Birth date (YYYY-MM-DD)
        #[arg(long, default_value = "")]
        birth_date: String,
        #[arg(long, default_value = "")]
        nationality: String,
    },
    /// Log in and store the session
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "SHELF_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Clear the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Live review notifications
    Notifications {
        #[command(subcommand)]
        command: NotificationCommands,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum BookCommands {
    /// Lists all books
    List,
    /// Shows one book with its reviews
    Show {
        #[arg(value_name = "BOOK_ID")]
        id: String,
    },
    /// Publishes a book as the logged-in user
    Create {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Publish year (defaults to the current year)
        #[arg(long)]
        year: Option<String>,
        /// Category id; repeat for several
        #[arg(long = "category", value_name = "CATEGORY_ID")]
        categories: Vec<String>,
    },
    /// Edits a book you published; omitted fields keep their value
    Update {
        #[arg(value_name = "BOOK_ID")]
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        year: Option<String>,
        /// Replaces the categories; repeat for several
        #[arg(long = "category", value_name = "CATEGORY_ID")]
        categories: Option<Vec<String>>,
    },
    /// Deletes a book you published
    Delete {
        #[arg(value_name = "BOOK_ID")]
        id: String,
    },
}

#[derive(clap::Subcommand)]
enum CategoryCommands {
    /// Lists all categories
    List,
    /// Creates a category
    Create {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Icon URL
        #[arg(long, default_value = "")]
        icon: String,
        #[arg(long, value_name = "CATEGORY_ID", default_value = "")]
        parent: String,
    },
}

#[derive(clap::Subcommand)]
enum ReviewCommands {
    /// Lists the reviews of a book
    List {
        #[arg(value_name = "BOOK_ID")]
        book_id: String,
    },
    /// Reviews a book as the logged-in user
    Add {
        #[arg(value_name = "BOOK_ID")]
        book_id: String,
        /// Rating from 1 to 5
        #[arg(long)]
        rating: u8,
        #[arg(long, default_value = "")]
        comment: String,
    },
    /// Deletes one of your reviews
    Delete {
        #[arg(value_name = "REVIEW_ID")]
        id: String,
        /// Book the review belongs to
        #[arg(long = "book", value_name = "BOOK_ID")]
        book_id: String,
    },
}

#[derive(clap::Subcommand)]
enum UserCommands {
    /// Lists all users
    List,
    /// Shows one user
    Show {
        #[arg(value_name = "USER_ID")]
        id: String,
    },
}

#[derive(clap::Subcommand)]
enum NotificationCommands {
    /// Prints review notifications as they arrive
    Watch {
        /// Exit after this many notifications
        #[arg(long)]
        count: Option<usize>,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Save the GraphQL endpoint to the config file
    SetApiUrl {
        #[arg(value_name = "URL")]
        url: String,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    // Config commands must work even when the file is broken.
    if let Some(Commands::Config { command }) = &cli.command {
        return match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
            ConfigCommands::SetApiUrl { url } => commands::config::set_api_url(url),
        };
    }

    let config = Config::load().context("load config")?;
    let _log_guard = match logging::init(&config) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: logging disabled: {e:#}");
            None
        }
    };
    let ctx = AppContext::from_config(config)?;

    // default to the interactive view
    let Some(command) = cli.command else {
        return crate::modes::run_interactive(ctx);
    };

    match command {
        Commands::Books { command } => match command {
            BookCommands::List => commands::books::list(&ctx).await,
            BookCommands::Show { id } => commands::books::show(&ctx, &id).await,
            BookCommands::Create {
                title,
                description,
                year,
                categories,
            } => {
                commands::books::create(&ctx, &title, &description, year.as_deref(), &categories)
                    .await
            }
            BookCommands::Update {
                id,
                title,
                description,
                year,
                categories,
            } => {
                commands::books::update(
                    &ctx,
                    &id,
                    commands::books::BookChanges {
                        title,
                        description,
                        year,
                        categories,
                    },
                )
                .await
            }
            BookCommands::Delete { id } => commands::books::delete(&ctx, &id).await,
        },

        Commands::Categories { command } => match command {
            CategoryCommands::List => commands::categories::list(&ctx).await,
            CategoryCommands::Create {
                title,
                description,
                icon,
                parent,
            } => commands::categories::create(&ctx, &title, &description, &icon, &parent).await,
        },

        Commands::Reviews { command } => match command {
            ReviewCommands::List { book_id } => commands::reviews::list(&ctx, &book_id).await,
            ReviewCommands::Add {
                book_id,
                rating,
                comment,
            } => commands::reviews::add(&ctx, &book_id, rating, &comment).await,
            ReviewCommands::Delete { id, book_id } => {
                commands::reviews::delete(&ctx, &id, &book_id).await
            }
        },

        Commands::Users { command } => match command {
            UserCommands::List => commands::users::list(&ctx).await,
            UserCommands::Show { id } => commands::users::show(&ctx, &id).await,
        },

        Commands::Register {
            username,
            password,
            bio,
            birth_date,
            nationality,
        } => {
            commands::auth::register(
                &ctx,
                shelf_core::models::RegisterUserInput {
                    username,
                    password,
                    bio,
                    birth_date,
                    nationality,
                },
            )
            .await
        }
        Commands::Login { username, password } => {
            commands::auth::login(&ctx, username, password).await
        }
        Commands::Logout => {
            commands::auth::logout(&ctx);
            Ok(())
        }
        Commands::Whoami => {
            commands::auth::whoami(&ctx);
            Ok(())
        }

        Commands::Notifications { command } => match command {
            NotificationCommands::Watch { count } => {
                commands::notifications::watch(&ctx, count).await
            }
        },

        // Handled before the config was loaded.
        Commands::Config { .. } => Ok(()),
    }
}
