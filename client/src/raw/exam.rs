use ams_shared::{
    announcement::handle::MessageResult,
    exam::{
        MarksDescriptor, RecordedMark, StudentSummary, StudentsQuery, StudentsResult,
        SubmitMarksResult, TestDescriptor, TestMarksResult,
    },
};
use reqwest::{RequestBuilder, Response};

use crate::{Error, ResponseError};

pub struct CreateTest {
    pub descriptor: TestDescriptor,
}

#[async_trait::async_trait]
impl super::Request for CreateTest {
    type Output = MessageResult;

    fn path(&self) -> Vec<&str> {
        vec!["tests"]
    }

    fn make_req(&self, req: RequestBuilder) -> Result<RequestBuilder, Error> {
        Ok(req.json(&self.descriptor))
    }

    async fn parse_res(&mut self, response: Response) -> Result<Self::Output, Error> {
        Ok(response.json().await.unwrap_or_default())
    }
}

pub struct Students {
    pub query: StudentsQuery,
}

#[async_trait::async_trait]
impl super::Request for Students {
    type Output = Vec<StudentSummary>;
    const METHOD: reqwest::Method = reqwest::Method::GET;

    fn path(&self) -> Vec<&str> {
        vec!["students"]
    }

    fn make_req(&self, req: RequestBuilder) -> Result<RequestBuilder, Error> {
        Ok(req.query(&self.query))
    }

    async fn parse_res(&mut self, response: Response) -> Result<Self::Output, Error> {
        response
            .json::<StudentsResult>()
            .await
            .map(|res| res.students)
            .map_err(Error::Decode)
    }
}

pub struct TestMarks<'a> {
    pub id: &'a str,
}

#[async_trait::async_trait]
impl super::Request for TestMarks<'_> {
    type Output = Vec<RecordedMark>;
    const METHOD: reqwest::Method = reqwest::Method::GET;

    fn path(&self) -> Vec<&str> {
        vec!["tests", self.id, "marks"]
    }

    async fn parse_res(&mut self, response: Response) -> Result<Self::Output, Error> {
        response
            .json::<TestMarksResult>()
            .await
            .map(|res| res.marks)
            .map_err(Error::Decode)
    }
}

pub struct SubmitMarks<'a> {
    pub id: &'a str,
    pub descriptor: &'a MarksDescriptor,
}

#[async_trait::async_trait]
impl super::Request for SubmitMarks<'_> {
    type Output = SubmitMarksResult;

    fn path(&self) -> Vec<&str> {
        vec!["tests", self.id, "marks"]
    }

    fn make_req(&self, req: RequestBuilder) -> Result<RequestBuilder, Error> {
        Ok(req.json(self.descriptor))
    }

    /// A `success: false` body is a refusal even under a 2xx status.
    async fn parse_res(&mut self, response: Response) -> Result<Self::Output, Error> {
        let status = response.status();
        let res: SubmitMarksResult = response.json().await.unwrap_or_default();

        if res.success == Some(false) {
            return Err(ResponseError {
                status,
                message: res.message,
            }
            .into());
        }
        Ok(res)
    }
}
