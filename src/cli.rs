use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and cache the session locally.
    Login(LoginArgs),
    /// Sign out and clear the cached session.
    Logout,
    /// Register a new account (requires email confirmation).
    Signup(SignupArgs),
    /// Confirm a registration with the emailed code.
    Verify(VerifyArgs),
    /// Show the current session identity.
    Whoami,
    Books {
        #[command(subcommand)]
        command: BooksCommand,
    },
    /// Ask for AI book recommendations.
    Recommend(RecommendArgs),
    Lists {
        #[command(subcommand)]
        command: ListsCommand,
    },
    /// Submit a review for a book.
    Review(ReviewArgs),
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub password: String,
}

#[derive(Debug, Args)]
pub struct SignupArgs {
    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub password: String,

    /// Full display name; also used to derive given/family names.
    #[arg(long)]
    pub name: String,
}

#[derive(Debug, Args)]
pub struct VerifyArgs {
    #[arg(long)]
    pub email: String,

    /// Confirmation code from the signup email.
    #[arg(long)]
    pub code: String,
}

#[derive(Debug, Subcommand)]
pub enum BooksCommand {
    /// List the catalog, with optional client-side search and sort.
    List(BooksListArgs),
    /// Show one book by id.
    Show(ShowBookArgs),
    /// Add a catalog entry (admin).
    Add(AddBookArgs),
    /// Update fields of a catalog entry (admin).
    Update(UpdateBookArgs),
    /// Remove a catalog entry (admin).
    Rm(BookIdArg),
}

#[derive(Debug, Args)]
pub struct BooksListArgs {
    /// Substring match across title, author and genre.
    #[arg(long)]
    pub search: Option<String>,

    /// Sort key: title or author.
    #[arg(long)]
    pub sort: Option<String>,
}

#[derive(Debug, Args)]
pub struct BookIdArg {
    pub id: String,
}

#[derive(Debug, Args)]
pub struct ShowBookArgs {
    pub id: String,

    /// Also add the book to a fresh "My Reading List" (requires login).
    #[arg(long)]
    pub add_to_list: bool,
}

#[derive(Debug, Args)]
pub struct AddBookArgs {
    #[arg(long)]
    pub title: String,

    #[arg(long)]
    pub author: String,

    #[arg(long)]
    pub description: String,
}

#[derive(Debug, Args)]
pub struct UpdateBookArgs {
    pub id: String,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub author: Option<String>,

    #[arg(long)]
    pub genre: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub rating: Option<f64>,

    #[arg(long)]
    pub published_year: Option<i32>,

    #[arg(long)]
    pub isbn: Option<String>,
}

#[derive(Debug, Args)]
pub struct RecommendArgs {
    /// Free-text description of what to read next.
    pub query: String,
}

#[derive(Debug, Subcommand)]
pub enum ListsCommand {
    /// Show the signed-in user's reading lists.
    Show,
    /// Create a reading list.
    Create(CreateListArgs),
    /// Rename a reading list or replace its books.
    Update(UpdateListArgs),
    /// Delete a reading list.
    Rm(ListIdArg),
}

#[derive(Debug, Args)]
pub struct CreateListArgs {
    #[arg(long)]
    pub name: String,

    /// Book ids to seed the list with.
    #[arg(long = "book")]
    pub books: Vec<String>,
}

#[derive(Debug, Args)]
pub struct UpdateListArgs {
    pub id: String,

    #[arg(long)]
    pub name: Option<String>,

    /// Replacement set of book ids.
    #[arg(long = "book")]
    pub books: Option<Vec<String>>,
}

#[derive(Debug, Args)]
pub struct ListIdArg {
    pub id: String,
}

#[derive(Debug, Args)]
pub struct ReviewArgs {
    pub book_id: String,

    /// Star rating, 1 to 5.
    #[arg(long)]
    pub rating: u8,

    #[arg(long)]
    pub comment: String,
}
