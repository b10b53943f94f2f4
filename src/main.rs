use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser as _;
use tokio_util::sync::CancellationToken;

use libraryai::api::Api;
use libraryai::app::admin::NewBookForm;
use libraryai::app::catalog::CatalogView;
use libraryai::app::detail::{DetailState, DetailView};
use libraryai::app::recommend::RecommendationView;
use libraryai::app::review::ReviewForm;
use libraryai::cli::{BooksCommand, Cli, Command, ListsCommand};
use libraryai::config::Config;
use libraryai::identity::{CognitoIdentity, IdentityProvider};
use libraryai::model::{Book, BookUpdate, NewReadingList, ReadingListUpdate, User};
use libraryai::session::AuthSession;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    libraryai::logging::init().context("init logging")?;

    let cli = Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    let config = Config::from_env().context("load configuration")?;
    let identity: Arc<dyn IdentityProvider> = Arc::new(CognitoIdentity::new(&config));
    let session = AuthSession::new(Arc::clone(&identity));
    let api = Arc::new(Api::new(&config, identity));

    // One token scoped to this invocation; Ctrl-C discards in-flight results.
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    match cli.command {
        Command::Login(args) => {
            session
                .login(&args.email, &args.password)
                .await
                .context("login")?;
            match session.current().user() {
                Some(user) => println!("Signed in as {} ({:?}).", user.display_name(), user.role),
                None => println!("Signed in, but the session could not be hydrated."),
            }
        }
        Command::Logout => {
            session.logout().await;
            println!("Signed out.");
        }
        Command::Signup(args) => {
            session
                .signup(&args.email, &args.password, &args.name)
                .await
                .context("signup")?;
            println!("Account created. Check your email for a confirmation code.");
        }
        Command::Verify(args) => {
            session
                .confirm(&args.email, &args.code)
                .await
                .context("verify")?;
            println!("Account confirmed. You can now log in.");
        }
        Command::Whoami => {
            session.hydrate().await;
            match session.current().user() {
                Some(user) => {
                    println!("id:    {}", user.id);
                    println!("email: {}", user.email);
                    println!("name:  {}", user.name);
                    println!("role:  {:?}", user.role);
                }
                None => println!("Not signed in."),
            }
        }
        Command::Books { command } => {
            run_books(command, &api, &session, &cancel).await?;
        }
        Command::Recommend(args) => {
            let mut view = RecommendationView::new();
            view.submit(&api, &args.query, &cancel)
                .await
                .context("recommend")?;
            if let Some(notice) = view.notice() {
                println!("{notice}");
            }
            for item in view.items() {
                println!(
                    "{} - {} (confidence: {}%)",
                    item.book.title,
                    item.book.author,
                    (item.confidence * 100.0).round() as i64
                );
                println!("  {}", item.reason);
            }
        }
        Command::Lists { command } => {
            run_lists(command, &api, &session).await?;
        }
        Command::Review(args) => {
            let user = require_user(&session).await?;
            let form = ReviewForm {
                rating: args.rating,
                comment: args.comment,
            };
            form.submit(&api.reviews, &args.book_id, &user, &cancel)
                .await
                .context("submit review")?;
            println!("Review submitted.");
        }
    }

    Ok(())
}

async fn run_books(
    command: BooksCommand,
    api: &Api,
    session: &AuthSession,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    match command {
        BooksCommand::List(args) => {
            let mut view = CatalogView::new();
            view.load(&api.books, cancel).await.context("list books")?;
            if let Some(query) = args.search.as_deref() {
                view.search(query);
            }
            if let Some(key) = args.sort.as_deref() {
                view.sort(key);
            }
            println!("Showing {} of {} books", view.visible().len(), view.total());
            for book in view.visible() {
                print_book_line(book);
            }
        }
        BooksCommand::Show(args) => {
            let mut view = DetailView::new();
            view.load(&api.books, &args.id, cancel)
                .await
                .context("show book")?;
            match view.state() {
                DetailState::Found(book) => print_book_detail(book),
                DetailState::NotFound => {
                    println!("Book not found: {}", args.id);
                    return Ok(());
                }
                DetailState::Loading => return Ok(()),
            }
            if args.add_to_list {
                let user = require_user(session).await?;
                view.add_to_reading_list(&api.reading_lists, Some(&user), cancel)
                    .await
                    .context("add to reading list")?;
                println!("Book added to reading list!");
            }
        }
        BooksCommand::Add(args) => {
            require_admin(session).await?;
            let form = NewBookForm {
                title: args.title,
                author: args.author,
                description: args.description,
            };
            match form.submit(&api.books, cancel).await.context("add book")? {
                Some(book) => println!("Created book {}.", book.id),
                None => println!("Book created."),
            }
        }
        BooksCommand::Update(args) => {
            require_admin(session).await?;
            let patch = BookUpdate {
                title: args.title,
                author: args.author,
                genre: args.genre,
                description: args.description,
                rating: args.rating,
                published_year: args.published_year,
                isbn: args.isbn,
                ..BookUpdate::default()
            };
            api.books
                .update(&args.id, &patch)
                .await
                .context("update book")?;
            println!("Updated book {}.", args.id);
        }
        BooksCommand::Rm(args) => {
            require_admin(session).await?;
            api.books.delete(&args.id).await.context("delete book")?;
            println!("Deleted book {}.", args.id);
        }
    }
    Ok(())
}

async fn run_lists(
    command: ListsCommand,
    api: &Api,
    session: &AuthSession,
) -> anyhow::Result<()> {
    let user = require_user(session).await?;
    match command {
        ListsCommand::Show => {
            let lists = api
                .reading_lists
                .for_user(&user.id)
                .await
                .context("fetch reading lists")?;
            if lists.is_empty() {
                println!("No reading lists yet.");
            }
            for list in lists {
                println!("{} - {} ({} books)", list.id, list.name, list.book_ids.len());
                for book_id in &list.book_ids {
                    println!("  {book_id}");
                }
            }
        }
        ListsCommand::Create(args) => {
            let list = NewReadingList {
                user_id: user.id.clone(),
                name: args.name,
                book_ids: if args.books.is_empty() {
                    None
                } else {
                    Some(args.books)
                },
            };
            api.reading_lists
                .create(&list)
                .await
                .context("create reading list")?;
            println!("Reading list created.");
        }
        ListsCommand::Update(args) => {
            let patch = ReadingListUpdate {
                user_id: user.id.clone(),
                name: args.name,
                book_ids: args.books,
            };
            api.reading_lists
                .update(&args.id, &patch)
                .await
                .context("update reading list")?;
            println!("Reading list updated.");
        }
        ListsCommand::Rm(args) => {
            api.reading_lists
                .delete(&args.id, &user.id)
                .await
                .context("delete reading list")?;
            println!("Reading list deleted.");
        }
    }
    Ok(())
}

async fn require_user(session: &AuthSession) -> anyhow::Result<User> {
    session.hydrate().await;
    session
        .current()
        .user()
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("you must be logged in"))
}

/// Visibility gating only; the role comes from an advisory token claim and
/// the server enforces authorization on every write regardless.
async fn require_admin(session: &AuthSession) -> anyhow::Result<User> {
    let user = require_user(session).await?;
    if !user.is_admin() {
        anyhow::bail!("this command is restricted to administrators");
    }
    Ok(user)
}

fn print_book_line(book: &Book) {
    println!(
        "{}  {} - {} [{}] {:.1}",
        book.id, book.title, book.author, book.genre, book.rating
    );
}

fn print_book_detail(book: &Book) {
    println!("{} ({})", book.title, book.published_year);
    println!("by {}", book.author);
    println!("genre:  {}", book.genre);
    println!("rating: {:.1}", book.rating);
    if !book.isbn.is_empty() {
        println!("isbn:   {}", book.isbn);
    }
    if !book.description.is_empty() {
        println!();
        println!("{}", book.description);
    }
}
