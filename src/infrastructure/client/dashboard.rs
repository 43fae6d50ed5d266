use anyhow::Result;

use super::ReadlogClient;
use crate::domain::dashboard::DashboardSnapshot;

pub struct DashboardClient<'a> {
    client: &'a ReadlogClient,
}

impl<'a> DashboardClient<'a> {
    pub fn new(client: &'a ReadlogClient) -> Self {
        Self { client }
    }

    pub async fn get(&self, year: Option<i32>) -> Result<DashboardSnapshot> {
        let mut url = self.client.endpoint("api/v1/dashboard")?;
        if let Some(year) = year {
            url.query_pairs_mut().append_pair("year", &year.to_string());
        }
        let response = self
            .client
            .request(reqwest::Method::GET, url)
            .send()
            .await?;
        self.client.handle_response(response).await
    }
}
