use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Subcommand};

use super::macros::{define_delete_command, define_get_command};
use super::print_json;
use crate::domain::book_items::{NewBook, UpdateBook};
use crate::domain::ids::BookId;
use crate::infrastructure::client::ReadlogClient;

#[derive(Debug, Subcommand)]
pub enum BookCommands {
    /// Log a book
    Add(AddBookCommand),
    /// List logged books, newest first
    List(ListBooksCommand),
    /// Get a book by ID
    Get(GetBookCommand),
    /// Update a book
    Update(UpdateBookCommand),
    /// Delete a book
    Delete(DeleteBookCommand),
}

pub async fn run(client: &ReadlogClient, cmd: BookCommands) -> Result<()> {
    match cmd {
        BookCommands::Add(c) => add_book(client, c).await,
        BookCommands::List(c) => list_books(client, c).await,
        BookCommands::Get(c) => get_book(client, c).await,
        BookCommands::Update(c) => update_book(client, c).await,
        BookCommands::Delete(c) => delete_book(client, c).await,
    }
}

#[derive(Debug, Args)]
pub struct AddBookCommand {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub author: String,
    /// 0 to 5 in half steps
    #[arg(long)]
    pub rating: Option<f64>,
    /// Date finished (YYYY-MM-DD)
    #[arg(long)]
    pub date_read: Option<NaiveDate>,
    /// Comma separated, e.g. "fiction, classics"
    #[arg(long)]
    pub tags: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
    /// Skip the automatic cover lookup by supplying one
    #[arg(long)]
    pub cover_url: Option<String>,
}

pub async fn add_book(client: &ReadlogClient, command: AddBookCommand) -> Result<()> {
    let payload = NewBook {
        title: command.title,
        author: command.author,
        rating: command.rating,
        notes: command.notes,
        date_read: command.date_read,
        tags: command.tags,
        cover_url: command.cover_url,
    };

    let book = client.books().create(&payload).await?;
    print_json(&book)
}

#[derive(Debug, Args)]
pub struct ListBooksCommand {
    /// Case-insensitive match on title or author
    #[arg(long)]
    pub search: Option<String>,
}

pub async fn list_books(client: &ReadlogClient, command: ListBooksCommand) -> Result<()> {
    let books = client.books().list(command.search.as_deref()).await?;
    print_json(&books)
}

define_get_command!(GetBookCommand, get_book, BookId, books);

#[derive(Debug, Args)]
pub struct UpdateBookCommand {
    #[arg(long)]
    pub id: i64,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub author: Option<String>,
    #[arg(long, conflicts_with = "clear_rating")]
    pub rating: Option<f64>,
    /// Remove the rating
    #[arg(long)]
    pub clear_rating: bool,
    #[arg(long)]
    pub date_read: Option<NaiveDate>,
    #[arg(long)]
    pub tags: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
    #[arg(long)]
    pub cover_url: Option<String>,
}

impl From<UpdateBookCommand> for UpdateBook {
    fn from(command: UpdateBookCommand) -> Self {
        let rating = if command.clear_rating {
            Some(None)
        } else {
            command.rating.map(Some)
        };
        Self {
            title: command.title,
            author: command.author,
            rating,
            notes: command.notes.map(Some),
            date_read: command.date_read.map(Some),
            tags: command.tags.map(Some),
            cover_url: command.cover_url.map(Some),
        }
    }
}

pub async fn update_book(client: &ReadlogClient, command: UpdateBookCommand) -> Result<()> {
    let id = BookId::new(command.id);
    let payload = UpdateBook::from(command);
    let book = client.books().update(id, &payload).await?;
    print_json(&book)
}

define_delete_command!(DeleteBookCommand, delete_book, BookId, books, "book");
