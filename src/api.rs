use crate::error::ClientError;
use crate::types::{AccessAttempt, NewPlate, Plate, ServerStatus, StatusUpdate};
use bytes::Bytes;
use log::debug;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use url::Url;

/// Thin wrapper over the backend's REST endpoints. Cheap to clone; clones
/// share one connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base: Url,
}

impl ApiClient {
    pub fn new(base: Url) -> ApiClient {
        ApiClient {
            client: Client::new(),
            base,
        }
    }

    /// Resolves `path` against the base url, keeping any path prefix the
    /// base url carries.
    pub fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        let mut base = self.base.clone();
        if !base.path().ends_with('/') {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }
        Ok(base.join(path.trim_start_matches('/'))?)
    }

    pub fn image_url(&self, filename: &str) -> Result<Url, ClientError> {
        self.endpoint(&format!("image/{}", filename))
    }

    pub async fn server_status(&self) -> Result<String, ClientError> {
        let status: ServerStatus = self.get_json("status").await?;
        Ok(status.status)
    }

    pub async fn plates(&self) -> Result<Vec<Plate>, ClientError> {
        self.get_json("getPlates").await
    }

    pub async fn update_plate_status(&self, id: u64, status: bool) -> Result<(), ClientError> {
        let url = self.endpoint(&format!("updatePlate/{}", id))?;
        let response = self
            .client
            .patch(url)
            .json(&StatusUpdate { status })
            .send()
            .await?;
        discard_body(check_status(response)?).await
    }

    pub async fn add_plate(&self, plate: &str) -> Result<(), ClientError> {
        let url = self.endpoint("addPlate")?;
        let response = self
            .client
            .post(url)
            .json(&NewPlate { plate })
            .send()
            .await?;
        discard_body(check_status(response)?).await
    }

    pub async fn access_attempts(&self) -> Result<Vec<AccessAttempt>, ClientError> {
        self.get_json("getAccess").await
    }

    pub async fn access_attempt(&self, id: u64) -> Result<AccessAttempt, ClientError> {
        self.get_json(&format!("getAccess/{}", id)).await
    }

    pub async fn image(&self, filename: &str) -> Result<Bytes, ClientError> {
        let url = self.image_url(filename)?;
        let response = check_status(self.client.get(url).send().await?)?;
        Ok(response.bytes().await?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = self.endpoint(path)?;
        debug!("GET {}", url);
        let response = check_status(self.client.get(url).send().await?)?;
        Ok(response.json::<T>().await?)
    }
}

fn check_status(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ClientError::Status(status))
    }
}

// The backend echoes the stored record; only the HTTP status is used.
async fn discard_body(response: Response) -> Result<(), ClientError> {
    let url = response.url().clone();
    let body = response.text().await?;
    debug!("{} responded: {}", url, body);
    Ok(())
}
