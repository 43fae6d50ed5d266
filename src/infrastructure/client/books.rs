use anyhow::Result;

use super::ReadlogClient;
use super::define_client_crud;
use crate::domain::book_items::{Book, NewBook, UpdateBook};
use crate::domain::ids::BookId;

pub struct BooksClient<'a> {
    client: &'a ReadlogClient,
}

impl<'a> BooksClient<'a> {
    pub fn new(client: &'a ReadlogClient) -> Self {
        Self { client }
    }

    define_client_crud!(
        entity_path: "api/v1/books",
        id_type: BookId,
        entity_type: Book,
        new_type: NewBook,
        update_type: UpdateBook
    );

    pub async fn list(&self, search: Option<&str>) -> Result<Vec<Book>> {
        let mut url = self.client.endpoint("api/v1/books")?;
        if let Some(term) = search {
            url.query_pairs_mut().append_pair("search", term);
        }
        let response = self
            .client
            .request(reqwest::Method::GET, url)
            .send()
            .await?;
        self.client.handle_response(response).await
    }
}
