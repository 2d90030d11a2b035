use ams_shared::announcement::{
    handle::{
        Applicant, ApplicantsResult, AnnouncementDescriptor, CreateAnnouncementResult,
        GetAnnouncementResult, ListAnnouncementsQuery, ListAnnouncementsResult, MessageResult,
        UploadResumeResult,
    },
    Announcement,
};
use reqwest::{RequestBuilder, Response};

use crate::Error;

pub struct List {
    pub query: ListAnnouncementsQuery,
}

#[async_trait::async_trait]
impl super::Request for List {
    type Output = Vec<Announcement>;
    const METHOD: reqwest::Method = reqwest::Method::GET;

    fn path(&self) -> Vec<&str> {
        vec!["announcements"]
    }

    fn make_req(&self, req: RequestBuilder) -> Result<RequestBuilder, Error> {
        Ok(req.query(&self.query))
    }

    async fn parse_res(&mut self, response: Response) -> Result<Self::Output, Error> {
        response
            .json::<ListAnnouncementsResult>()
            .await
            .map(|res| res.announcements)
            .map_err(Error::Decode)
    }
}

pub struct Get<'a> {
    pub id: &'a str,
}

#[async_trait::async_trait]
impl super::Request for Get<'_> {
    type Output = Announcement;
    const METHOD: reqwest::Method = reqwest::Method::GET;

    fn path(&self) -> Vec<&str> {
        vec!["announcements", self.id]
    }

    async fn parse_res(&mut self, response: Response) -> Result<Self::Output, Error> {
        response
            .json::<GetAnnouncementResult>()
            .await
            .map(GetAnnouncementResult::into_inner)
            .map_err(Error::Decode)
    }
}

pub struct Create<'a> {
    pub descriptor: &'a AnnouncementDescriptor,
}

#[async_trait::async_trait]
impl super::Request for Create<'_> {
    type Output = Announcement;

    fn path(&self) -> Vec<&str> {
        vec!["announcements"]
    }

    fn make_req(&self, req: RequestBuilder) -> Result<RequestBuilder, Error> {
        Ok(req.json(self.descriptor))
    }

    async fn parse_res(&mut self, response: Response) -> Result<Self::Output, Error> {
        response
            .json::<CreateAnnouncementResult>()
            .await
            .map(|res| res.announcement)
            .map_err(Error::Decode)
    }
}

pub struct Update<'a> {
    pub id: &'a str,
    pub descriptor: &'a AnnouncementDescriptor,
}

#[async_trait::async_trait]
impl super::Request for Update<'_> {
    type Output = MessageResult;
    const METHOD: reqwest::Method = reqwest::Method::PUT;

    fn path(&self) -> Vec<&str> {
        vec!["announcements", self.id]
    }

    fn make_req(&self, req: RequestBuilder) -> Result<RequestBuilder, Error> {
        Ok(req.json(self.descriptor))
    }

    async fn parse_res(&mut self, response: Response) -> Result<Self::Output, Error> {
        Ok(response.json().await.unwrap_or_default())
    }
}

pub struct Delete<'a> {
    pub id: &'a str,
}

#[async_trait::async_trait]
impl super::Request for Delete<'_> {
    type Output = MessageResult;
    const METHOD: reqwest::Method = reqwest::Method::DELETE;

    fn path(&self) -> Vec<&str> {
        vec!["announcements", self.id]
    }

    async fn parse_res(&mut self, response: Response) -> Result<Self::Output, Error> {
        Ok(response.json().await.unwrap_or_default())
    }
}

/// Uploads a resume as the multipart field `resume`.
pub struct UploadResume<'a> {
    pub id: &'a str,
    pub file: &'a crate::apply::ResumeFile,
}

#[async_trait::async_trait]
impl super::Request for UploadResume<'_> {
    type Output = UploadResumeResult;

    fn path(&self) -> Vec<&str> {
        vec!["announcements", self.id, "upload-resume"]
    }

    fn make_req(&self, req: RequestBuilder) -> Result<RequestBuilder, Error> {
        let part = reqwest::multipart::Part::stream_with_length(
            self.file.bytes().clone(),
            self.file.len(),
        )
        .file_name(self.file.name().to_owned())
        .mime_str(self.file.mime().as_ref())?;

        Ok(req.multipart(reqwest::multipart::Form::new().part("resume", part)))
    }

    async fn parse_res(&mut self, response: Response) -> Result<Self::Output, Error> {
        Ok(response.json().await.unwrap_or_default())
    }
}

/// Submits the application after the resume was uploaded. Carries no body.
pub struct Apply<'a> {
    pub id: &'a str,
}

#[async_trait::async_trait]
impl super::Request for Apply<'_> {
    type Output = MessageResult;

    fn path(&self) -> Vec<&str> {
        vec!["announcements", self.id, "apply"]
    }

    async fn parse_res(&mut self, response: Response) -> Result<Self::Output, Error> {
        Ok(response.json().await.unwrap_or_default())
    }
}

pub struct Applicants<'a> {
    pub id: &'a str,
}

#[async_trait::async_trait]
impl super::Request for Applicants<'_> {
    type Output = Vec<Applicant>;
    const METHOD: reqwest::Method = reqwest::Method::GET;

    fn path(&self) -> Vec<&str> {
        vec!["announcements", self.id, "applicants"]
    }

    async fn parse_res(&mut self, response: Response) -> Result<Self::Output, Error> {
        response
            .json::<ApplicantsResult>()
            .await
            .map(|res| res.applicants)
            .map_err(Error::Decode)
    }
}
