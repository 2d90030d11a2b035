use ams_shared::account::handle::{AuthResult, LoginDescriptor, RegisterDescriptor};
use reqwest::{RequestBuilder, Response};

use crate::Error;

pub struct Login {
    pub descriptor: LoginDescriptor,
}

#[async_trait::async_trait]
impl super::Request for Login {
    type Output = AuthResult;

    fn path(&self) -> Vec<&str> {
        vec!["auth", "login"]
    }

    fn make_req(&self, req: RequestBuilder) -> Result<RequestBuilder, Error> {
        Ok(req.json(&self.descriptor))
    }

    async fn parse_res(&mut self, response: Response) -> Result<Self::Output, Error> {
        response.json().await.map_err(Error::Decode)
    }
}

pub struct Register {
    pub descriptor: RegisterDescriptor,
}

#[async_trait::async_trait]
impl super::Request for Register {
    type Output = AuthResult;

    fn path(&self) -> Vec<&str> {
        vec!["auth", "register"]
    }

    fn make_req(&self, req: RequestBuilder) -> Result<RequestBuilder, Error> {
        Ok(req.json(&self.descriptor))
    }

    async fn parse_res(&mut self, response: Response) -> Result<Self::Output, Error> {
        response.json().await.map_err(Error::Decode)
    }
}

/// Verifies the persisted token.
pub struct Verify;

#[async_trait::async_trait]
impl super::Request for Verify {
    type Output = AuthResult;
    const METHOD: reqwest::Method = reqwest::Method::GET;

    fn path(&self) -> Vec<&str> {
        vec!["auth", "verify"]
    }

    async fn parse_res(&mut self, response: Response) -> Result<Self::Output, Error> {
        response.json().await.map_err(Error::Decode)
    }
}
