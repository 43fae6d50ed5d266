use anyhow::Result;

use super::ReadlogClient;
use crate::domain::sessions::{Credentials, LoginResponse};

pub struct AuthClient<'a> {
    client: &'a ReadlogClient,
}

impl<'a> AuthClient<'a> {
    pub fn new(client: &'a ReadlogClient) -> Self {
        Self { client }
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse> {
        let url = self.client.endpoint("api/v1/auth/login")?;
        let response = self
            .client
            .request(reqwest::Method::POST, url)
            .json(credentials)
            .send()
            .await?;
        self.client.handle_response(response).await
    }
}
