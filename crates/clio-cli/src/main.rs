//! Clio CLI
//!
//! Thin wrapper around clio-core for command-line usage.
//!
//! ## Usage
//!
//! ```bash
//! # Create an account (stays signed in for later invocations)
//! clio signup --email reader@example.com --password secret1
//!
//! # Save a book as a guest
//! clio --guest saved add b1 --title "Dune" --author "Frank Herbert"
//!
//! # Create a reading list and add a book to it
//! clio lists create "Summer Reads"
//! clio lists add <list_id> b1 --title "Dune" --author "Frank Herbert"
//!
//! # Print the share link of a list
//! clio lists share <list_id>
//!
//! # Open someone's shared list
//! clio --guest shared open <share_token>
//!
//! # Route a deep link and open it
//! clio link --shared <share_token>
//!
//! # Browse moods with a curated catalogue
//! clio moods --catalogue lists.json
//! ```

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use clio_core::{
    Book, BookList, ClioConfig, ClioEngine, Identity, LinkTarget, MoodTag, ReadingList,
    SharedList,
};

/// Clio - mood-based book discovery
#[derive(Parser)]
#[command(name = "clio")]
#[command(version = "0.1.0")]
#[command(about = "Clio - saved books, reading lists and share links")]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Data directory (default: ~/.clio/data)
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Host used in share links
    #[arg(long, global = true)]
    app_domain: Option<String>,

    /// Continue as guest when no account is signed in
    #[arg(short, long, global = true)]
    guest: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current identity
    Whoami,

    /// Create an account and sign in
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Sign in to an existing account
    Signin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Sign out
    Signout,

    /// Saved books
    Saved {
        #[command(subcommand)]
        action: SavedAction,
    },

    /// Your reading lists
    Lists {
        #[command(subcommand)]
        action: ListsAction,
    },

    /// Lists shared by other readers
    Shared {
        #[command(subcommand)]
        action: SharedAction,
    },

    /// Route a deep link and open it
    Link {
        /// Share token of a public list
        #[arg(long, conflicts_with = "list")]
        shared: Option<String>,
        /// Id of one of your own lists
        #[arg(long)]
        list: Option<String>,
    },

    /// Show the mood catalogue
    Moods {
        /// Curated book lists (JSON) to show under each mood
        #[arg(long)]
        catalogue: Option<PathBuf>,
    },
}

/// Book fields accepted on the command line
#[derive(Args)]
struct BookArgs {
    /// Book id
    id: String,
    #[arg(long)]
    title: String,
    #[arg(long)]
    author: String,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    cover: Option<String>,
    #[arg(long)]
    pages: Option<u32>,
}

impl From<BookArgs> for Book {
    fn from(args: BookArgs) -> Self {
        let mut book = Book::new(args.id, args.title, args.author);
        if let Some(description) = args.description {
            book = book.with_description(description);
        }
        if let Some(cover) = args.cover {
            book = book.with_cover(cover);
        }
        if let Some(pages) = args.pages {
            book = book.with_page_count(pages);
        }
        book
    }
}

#[derive(Subcommand)]
enum SavedAction {
    /// List saved books
    List,
    /// Save a book
    Add(BookArgs),
    /// Remove a saved book
    Remove {
        /// Book id
        id: String,
    },
    /// Save if absent, remove if present
    Toggle(BookArgs),
}

#[derive(Subcommand)]
enum ListsAction {
    /// Show your lists
    Show,
    /// Create a list
    Create {
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        cover: Option<String>,
    },
    /// Show the books of a list
    Books { list_id: String },
    /// Add a book to a list
    Add {
        list_id: String,
        #[command(flatten)]
        book: BookArgs,
    },
    /// Remove a book from a list
    Remove { list_id: String, book_id: String },
    /// Delete a list
    Delete { list_id: String },
    /// Print a list's share link
    Share { list_id: String },
}

#[derive(Subcommand)]
enum SharedAction {
    /// Open a public list by share token
    Open { token: String },
    /// Follow a public list
    Follow { token: String },
    /// Stop following a list
    Unfollow { token: String },
    /// Show the lists you follow
    Following,
}

fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();
}

/// Get the default data directory (~/.clio/data)
fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".clio")
        .join("data")
}

fn print_list(list: &ReadingList) {
    let visibility = if list.is_public { "public" } else { "private" };
    println!(
        "  {} {} ({} books, {})",
        list.id.as_deref().unwrap_or("-"),
        list.title,
        list.book_ids.len(),
        visibility
    );
}

fn print_books(books: &[Book]) {
    for book in books {
        println!("  {} {} by {}", book.id, book.title, book.author);
    }
}

fn print_shared(shared: &SharedList) {
    println!("List: {}", shared.list.title);
    if let Some(description) = &shared.list.description {
        println!("  {}", description);
    }
    println!("  Share token: {}", shared.list.share_token);
    println!(
        "  Created: {}",
        shared.list.created_at.format("%Y-%m-%d %H:%M")
    );
    if shared.books.is_empty() {
        println!("  (no books)");
    } else {
        println!("Books ({}):", shared.books.len());
        print_books(&shared.books);
    }
}

/// Find one of the actor's own lists, fetching it if it is not cached
async fn own_list(engine: &ClioEngine, list_id: &str) -> Result<ReadingList> {
    let cached = engine
        .lists()
        .lists()
        .into_iter()
        .find(|l| l.id.as_deref() == Some(list_id));
    match cached {
        Some(list) => Ok(list),
        None => Ok(engine.lists().get(list_id).await?),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let mut config = ClioConfig::with_data_dir(cli.data_dir.unwrap_or_else(default_data_dir));
    if let Some(domain) = cli.app_domain {
        config = config.app_domain(domain);
    }
    let engine = ClioEngine::open(config)?;

    engine.bootstrap().await;
    if cli.guest && engine.identity() == Identity::Uninitialized {
        engine.continue_as_guest().await;
    }
    tracing::debug!(identity = %engine.identity(), "Engine ready");

    match cli.command {
        Commands::Whoami => match engine.identity() {
            Identity::Uninitialized => {
                println!("Not signed in. Use --guest or `clio signin`.");
            }
            Identity::Guest => {
                println!("Guest");
                println!("  Saved books: {}", engine.saved().len());
            }
            Identity::SignedIn(uid) => {
                println!("Signed in");
                println!("  User ID: {}", uid);
                println!("  Saved books: {}", engine.saved().len());
                println!("  Reading lists: {}", engine.lists().lists().len());
                println!("  Following: {}", engine.lists().followed().len());
            }
        },

        Commands::Signup { email, password } => {
            let uid = engine.create_account(&email, &password).await?;
            println!("Account created.");
            println!("  User ID: {}", uid);
        }

        Commands::Signin { email, password } => {
            let uid = engine.sign_in(&email, &password).await?;
            println!("Signed in.");
            println!("  User ID: {}", uid);
        }

        Commands::Signout => {
            engine.sign_out().await;
            println!("Signed out.");
        }

        Commands::Saved { action } => match action {
            SavedAction::List => {
                let books = engine.saved().books();
                if books.is_empty() {
                    println!("No saved books.");
                } else {
                    println!("Saved books ({}):", books.len());
                    print_books(&books);
                }
            }
            SavedAction::Add(args) => {
                let book: Book = args.into();
                let id = book.id.clone();
                if engine.saved().save(book).await? {
                    println!("Saved {}.", id);
                } else {
                    println!("{} is already saved.", id);
                }
            }
            SavedAction::Remove { id } => {
                if engine.saved().remove(&id).await? {
                    println!("Removed {}.", id);
                } else {
                    println!("{} was not saved.", id);
                }
            }
            SavedAction::Toggle(args) => {
                let book: Book = args.into();
                let id = book.id.clone();
                if engine.saved().toggle(book).await? {
                    println!("Saved {}.", id);
                } else {
                    println!("Removed {}.", id);
                }
            }
        },

        Commands::Lists { action } => match action {
            ListsAction::Show => {
                let lists = engine.lists().list().await?;
                if lists.is_empty() {
                    println!("No reading lists.");
                } else {
                    println!("Reading lists ({}):", lists.len());
                    for list in &lists {
                        print_list(list);
                    }
                }
            }
            ListsAction::Create {
                title,
                description,
                cover,
            } => {
                let list = engine.lists().create(&title, description, cover).await?;
                println!("Created list: {}", list.title);
                println!("  ID: {}", list.id.as_deref().unwrap_or("-"));
                println!("  Share token: {}", list.share_token);
                println!("  Link: {}", engine.share_link(&list));
            }
            ListsAction::Books { list_id } => {
                let list = engine.lists().get(&list_id).await?;
                let books = engine.lists().books_for(&list_id);
                print_shared(&SharedList { list, books });
            }
            ListsAction::Add { list_id, book } => {
                let list = own_list(&engine, &list_id).await?;
                let book: Book = book.into();
                let list = engine.lists().add_book(&list, &book).await?;
                println!("Added {} to {}.", book.id, list.title);
            }
            ListsAction::Remove { list_id, book_id } => {
                let list = own_list(&engine, &list_id).await?;
                let list = engine.lists().remove_book(&list, &book_id).await?;
                println!("Removed {} from {}.", book_id, list.title);
            }
            ListsAction::Delete { list_id } => {
                let list = own_list(&engine, &list_id).await?;
                engine.lists().delete(&list).await?;
                println!("Deleted {}.", list.title);
            }
            ListsAction::Share { list_id } => {
                let list = own_list(&engine, &list_id).await?;
                println!("{}", engine.share_link(&list));
            }
        },

        Commands::Shared { action } => match action {
            SharedAction::Open { token } => {
                let shared = engine.sharing().resolve(&token).await?;
                print_shared(&shared);
            }
            SharedAction::Follow { token } => {
                let list = engine.follow_shared(&token).await?;
                println!("Following {}.", list.title);
            }
            SharedAction::Unfollow { token } => {
                engine.lists().unfollow(&token).await?;
                println!("Unfollowed {}.", token);
            }
            SharedAction::Following => {
                let followed = engine.lists().refresh_followed().await?;
                if followed.is_empty() {
                    println!("Not following any lists.");
                } else {
                    println!("Following ({}):", followed.len());
                    for list in &followed {
                        println!("  {} {}", list.share_token, list.title);
                    }
                }
            }
        },

        Commands::Link { shared, list } => {
            let target = match (shared, list) {
                (Some(token), _) => LinkTarget::shared(token),
                (None, Some(id)) => LinkTarget::list(id),
                (None, None) => bail!("pass --shared <token> or --list <id>"),
            };
            engine.links().emit(Some(target));
            match engine.open_pending().await? {
                Some(opened) => print_shared(&opened),
                None => println!("Nothing to open."),
            }
        }

        Commands::Moods { catalogue } => {
            let curated = match catalogue {
                Some(path) => BookList::load_all(path)?,
                None => Vec::new(),
            };
            println!("Moods:");
            for mood in MoodTag::ALL {
                println!(
                    "  {:<14} {:<16} {}",
                    mood.id(),
                    mood.display_name(),
                    mood.keyword()
                );
                for list in BookList::for_mood(&curated, mood) {
                    println!("    {} ({} books)", list.title, list.books.len());
                }
            }
        }
    }

    Ok(())
}
