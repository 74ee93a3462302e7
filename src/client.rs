//! YouTrack API client implementation.
//!
//! This module provides the main client for interacting with the YouTrack
//! REST API. It handles authentication, request/response processing and
//! error handling; entities do their own wire mapping.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{header, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::auth::Token;
use crate::entities::{
    Agile, Issue, IssueAttachment, IssueComment, IssueCustomField, IssueLink, IssueLinkType,
    IssueWorkItem, LinkDirection, Project, Sprint, Tag, User, WorkItemType,
};
use crate::error::{Error, Result};
use crate::fields::FieldSelection;
use crate::opt::Opt;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// A file to upload as an attachment: file name and raw content.
pub type AttachmentFile = (String, Vec<u8>);

/// The YouTrack API client.
///
/// Wraps an HTTP client plus a base URL and a permanent token, and exposes
/// one async method per documented endpoint. Entities are serialized with
/// tri-state semantics: untouched fields stay out of write payloads and
/// explicit nulls go through.
#[derive(Debug)]
pub struct Client {
    /// The HTTP client.
    http: reqwest::Client,
    /// The YouTrack instance URL, without a trailing slash.
    base_url: String,
    /// Permanent token credential.
    token: Token,
}

/// Builder for [`Client`].
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: String,
    token: Token,
    timeout: Duration,
}

impl ClientBuilder {
    /// Overrides how long to wait for the server before giving up.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn build(self) -> Result<Client> {
        let http = reqwest::Client::builder().timeout(self.timeout).build()?;
        Ok(Client {
            http,
            base_url: self.base_url,
            token: self.token,
        })
    }
}

/// Query-string builder for API URLs.
///
/// Keys and values are percent-encoded, booleans render lowercase and
/// repeated keys are supported (`customFields`).
#[derive(Debug, Default)]
struct Query {
    pairs: Vec<(&'static str, String)>,
}

impl Query {
    fn new() -> Self {
        Self::default()
    }

    /// Adds the `fields` selection for `T`, when it names any.
    fn fields<T: FieldSelection>(mut self) -> Self {
        let spec = T::fields();
        if !spec.is_empty() {
            self.pairs.push(("fields", spec.to_string()));
        }
        self
    }

    /// Adds `$skip`/`$top` pagination parameters.
    fn page(mut self, offset: Option<u32>, count: Option<u32>) -> Self {
        if let Some(offset) = offset {
            self.pairs.push(("$skip", offset.to_string()));
        }
        if let Some(count) = count {
            self.pairs.push(("$top", count.to_string()));
        }
        self
    }

    fn param(mut self, key: &'static str, value: impl ToString) -> Self {
        self.pairs.push((key, value.to_string()));
        self
    }

    fn param_opt(mut self, key: &'static str, value: Option<&str>) -> Self {
        if let Some(value) = value {
            self.pairs.push((key, value.to_string()));
        }
        self
    }

    fn params<'a>(mut self, key: &'static str, values: impl IntoIterator<Item = &'a str>) -> Self {
        for value in values {
            self.pairs.push((key, value.to_string()));
        }
        self
    }

    fn encode(&self) -> String {
        self.pairs
            .iter()
            .map(|(key, value)| {
                format!(
                    "{}={}",
                    urlencoding::encode(key),
                    urlencoding::encode(value)
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl Client {
    /// Creates a client with default settings.
    ///
    /// * `base_url` - YouTrack instance URL (e.g. `https://example.com/youtrack`)
    /// * `token` - permanent YouTrack token
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        Self::builder(base_url, token).build()
    }

    /// Starts building a client, e.g. to set a custom timeout.
    pub fn builder(base_url: &str, token: impl Into<Token>) -> ClientBuilder {
        ClientBuilder {
            base_url: normalize_base_url(base_url),
            token: token.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// The normalized instance URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolves a server-relative path (e.g. [`Issue::url`]) against the
    /// instance URL.
    pub fn absolute_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn api_url(&self, path: &str, query: Query) -> String {
        format!("{}/api{}?{}", self.base_url, path, query.encode())
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        json: Option<String>,
        form: Option<Form>,
    ) -> Result<Vec<u8>> {
        let mut request = self
            .http
            .request(method.clone(), url)
            .header(header::AUTHORIZATION, self.token.header_value())
            .header(header::ACCEPT, "application/json");
        if let Some(json) = json {
            request = request
                .header(header::CONTENT_TYPE, "application/json")
                .body(json);
        }
        if let Some(form) = form {
            request = request.multipart(form);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            debug!(%status, %url, "request failed");
            return Err(Error::from_status(status, &format!("{method} {url}")));
        }

        Ok(response.bytes().await?.to_vec())
    }

    /// Decodes a response body, treating an empty body as an error.
    ///
    /// Void endpoints go through [`Client::send`] directly; everything else
    /// must produce an entity.
    fn decode<T: DeserializeOwned>(method: &Method, url: &str, body: &[u8]) -> Result<T> {
        if body.is_empty() {
            return Err(Error::InvalidResponse(format!(
                "empty response body from {method} {url}"
            )));
        }
        serde_json::from_slice(body).map_err(|e| {
            Error::InvalidResponse(format!("failed to decode response from {method} {url}: {e}"))
        })
    }

    fn encode<B: Serialize>(data: &B) -> Result<String> {
        serde_json::to_string(data)
            .map_err(|e| Error::InvalidRequest(format!("failed to encode request body: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let body = self.send(Method::GET, url, None, None).await?;
        Self::decode(&Method::GET, url, &body)
    }

    async fn post_json<T: DeserializeOwned, B: Serialize>(&self, url: &str, data: &B) -> Result<T> {
        let payload = Self::encode(data)?;
        let body = self.send(Method::POST, url, Some(payload), None).await?;
        Self::decode(&Method::POST, url, &body)
    }

    /// POST whose response body is irrelevant (often empty).
    async fn post_and_ignore<B: Serialize>(&self, url: &str, data: &B) -> Result<()> {
        let payload = Self::encode(data)?;
        self.send(Method::POST, url, Some(payload), None).await?;
        Ok(())
    }

    async fn post_multipart<T: DeserializeOwned>(&self, url: &str, form: Form) -> Result<T> {
        let body = self.send(Method::POST, url, None, Some(form)).await?;
        Self::decode(&Method::POST, url, &body)
    }

    async fn delete_and_ignore(&self, url: &str) -> Result<()> {
        self.send(Method::DELETE, url, None, None).await?;
        Ok(())
    }

    fn attachment_form(files: Vec<AttachmentFile>) -> Form {
        let mut form = Form::new();
        for (name, content) in files {
            let part = Part::bytes(content).file_name(name.clone());
            form = form.part(name, part);
        }
        form
    }

    /// Reads the issue with the given id.
    ///
    /// Calls `GET /api/issues/{issue_id}`.
    #[instrument(skip(self))]
    pub async fn get_issue(&self, issue_id: &str) -> Result<Issue> {
        let url = self.api_url(
            &format!("/issues/{issue_id}"),
            Query::new().fields::<Issue>(),
        );
        self.get_json(&url).await
    }

    /// Checks whether an issue exists, mapping a missing issue to `false`
    /// instead of an error.
    pub async fn issue_exists(&self, issue_id: &str) -> Result<bool> {
        match self.get_issue(issue_id).await {
            Ok(_) => Ok(true),
            Err(Error::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Reads all issues matching the search query; without a query the
    /// server returns every issue.
    ///
    /// Calls `GET /api/issues/`.
    pub async fn get_issues(
        &self,
        query: Option<&str>,
        custom_fields: &[&str],
        offset: Option<u32>,
        count: Option<u32>,
    ) -> Result<Vec<Issue>> {
        self.get_issues_as::<Issue>(query, custom_fields, offset, count)
            .await
    }

    /// Like [`Client::get_issues`], but fetches the projection declared by
    /// `T` instead of the full issue.
    #[instrument(skip(self, custom_fields))]
    pub async fn get_issues_as<T>(
        &self,
        query: Option<&str>,
        custom_fields: &[&str],
        offset: Option<u32>,
        count: Option<u32>,
    ) -> Result<Vec<T>>
    where
        T: FieldSelection + DeserializeOwned,
    {
        let url = self.api_url(
            "/issues/",
            Query::new()
                .fields::<T>()
                .page(offset, count)
                .param_opt("query", query)
                .params("customFields", custom_fields.iter().copied()),
        );
        self.get_json(&url).await
    }

    /// Creates a new issue and returns the server's version of it.
    ///
    /// Calls `POST /api/issues`.
    #[instrument(skip(self, issue))]
    pub async fn create_issue(&self, issue: &Issue) -> Result<Issue> {
        let url = self.api_url("/issues", Query::new().fields::<Issue>());
        self.post_json(&url, issue).await
    }

    /// Updates an existing issue.
    ///
    /// Calls `POST /api/issues/{issue_id}`.
    #[instrument(skip(self, issue))]
    pub async fn update_issue(
        &self,
        issue_id: &str,
        issue: &Issue,
        mute_update_notifications: bool,
    ) -> Result<Issue> {
        let url = self.api_url(
            &format!("/issues/{issue_id}"),
            Query::new()
                .fields::<Issue>()
                .param("muteUpdateNotifications", mute_update_notifications),
        );
        self.post_json(&url, issue).await
    }

    /// Deletes the issue.
    ///
    /// Calls `DELETE /api/issues/{issue_id}`.
    #[instrument(skip(self))]
    pub async fn delete_issue(&self, issue_id: &str) -> Result<()> {
        let url = self.api_url(&format!("/issues/{issue_id}"), Query::new());
        self.delete_and_ignore(&url).await
    }

    /// Reads the custom fields of the issue.
    ///
    /// Calls `GET /api/issues/{issue_id}/customFields`.
    pub async fn get_issue_custom_fields(
        &self,
        issue_id: &str,
        offset: Option<u32>,
        count: Option<u32>,
    ) -> Result<Vec<IssueCustomField>> {
        let url = self.api_url(
            &format!("/issues/{issue_id}/customFields"),
            Query::new().fields::<IssueCustomField>().page(offset, count),
        );
        self.get_json(&url).await
    }

    /// Updates one custom field of the issue; the field's id selects the
    /// target.
    ///
    /// Calls `POST /api/issues/{issue_id}/customFields/{field_id}`.
    #[instrument(skip(self, field))]
    pub async fn update_issue_custom_field(
        &self,
        issue_id: &str,
        field: &IssueCustomField,
        mute_update_notifications: bool,
    ) -> Result<IssueCustomField> {
        let field_id = field.id().ok_or_else(|| {
            Error::InvalidRequest("custom field id is required for updates".to_string())
        })?;
        let url = self.api_url(
            &format!("/issues/{issue_id}/customFields/{field_id}"),
            Query::new()
                .fields::<IssueCustomField>()
                .param("muteUpdateNotifications", mute_update_notifications),
        );
        self.post_json(&url, field).await
    }

    /// Reads all accessible comments of the issue.
    ///
    /// Calls `GET /api/issues/{issue_id}/comments`.
    pub async fn get_issue_comments(
        &self,
        issue_id: &str,
        offset: Option<u32>,
        count: Option<u32>,
    ) -> Result<Vec<IssueComment>> {
        let url = self.api_url(
            &format!("/issues/{issue_id}/comments"),
            Query::new().fields::<IssueComment>().page(offset, count),
        );
        self.get_json(&url).await
    }

    /// Adds a comment to the issue.
    ///
    /// Calls `POST /api/issues/{issue_id}/comments`.
    #[instrument(skip(self, comment))]
    pub async fn create_issue_comment(
        &self,
        issue_id: &str,
        comment: &IssueComment,
    ) -> Result<IssueComment> {
        let url = self.api_url(
            &format!("/issues/{issue_id}/comments"),
            Query::new().fields::<IssueComment>(),
        );
        self.post_json(&url, comment).await
    }

    /// Updates an existing comment; the comment's id selects the target.
    ///
    /// Calls `POST /api/issues/{issue_id}/comments/{comment_id}`.
    #[instrument(skip(self, comment))]
    pub async fn update_issue_comment(
        &self,
        issue_id: &str,
        comment: &IssueComment,
        mute_update_notifications: bool,
    ) -> Result<IssueComment> {
        let comment_id = comment.id.value().ok_or_else(|| {
            Error::InvalidRequest("comment id is required for updates".to_string())
        })?;
        let url = self.api_url(
            &format!("/issues/{issue_id}/comments/{comment_id}"),
            Query::new()
                .fields::<IssueComment>()
                .param("muteUpdateNotifications", mute_update_notifications),
        );
        self.post_json(&url, comment).await
    }

    /// Hides a comment by flagging it as deleted; the comment stays
    /// restorable on the server.
    pub async fn hide_issue_comment(
        &self,
        issue_id: &str,
        comment_id: &str,
    ) -> Result<IssueComment> {
        let comment = IssueComment {
            id: Opt::Set(comment_id.to_string()),
            deleted: Opt::Set(true),
            ..IssueComment::default()
        };
        self.update_issue_comment(issue_id, &comment, false).await
    }

    /// Permanently deletes a comment.
    ///
    /// Calls `DELETE /api/issues/{issue_id}/comments/{comment_id}`.
    #[instrument(skip(self))]
    pub async fn delete_issue_comment(&self, issue_id: &str, comment_id: &str) -> Result<()> {
        let url = self.api_url(
            &format!("/issues/{issue_id}/comments/{comment_id}"),
            Query::new(),
        );
        self.delete_and_ignore(&url).await
    }

    /// Reads all attachments of the issue.
    ///
    /// Calls `GET /api/issues/{issue_id}/attachments`.
    pub async fn get_issue_attachments(
        &self,
        issue_id: &str,
        offset: Option<u32>,
        count: Option<u32>,
    ) -> Result<Vec<IssueAttachment>> {
        let url = self.api_url(
            &format!("/issues/{issue_id}/attachments"),
            Query::new().fields::<IssueAttachment>().page(offset, count),
        );
        self.get_json(&url).await
    }

    /// Uploads files as attachments of the issue.
    ///
    /// Calls `POST /api/issues/{issue_id}/attachments` with a multipart
    /// form; each file becomes one part named after the file.
    #[instrument(skip(self, files))]
    pub async fn create_issue_attachments(
        &self,
        issue_id: &str,
        files: Vec<AttachmentFile>,
    ) -> Result<Vec<IssueAttachment>> {
        let url = self.api_url(
            &format!("/issues/{issue_id}/attachments"),
            Query::new().fields::<IssueAttachment>(),
        );
        self.post_multipart(&url, Self::attachment_form(files)).await
    }

    /// Uploads files as attachments of a comment.
    ///
    /// Calls `POST /api/issues/{issue_id}/comments/{comment_id}/attachments`.
    #[instrument(skip(self, files))]
    pub async fn create_comment_attachments(
        &self,
        issue_id: &str,
        comment_id: &str,
        files: Vec<AttachmentFile>,
    ) -> Result<Vec<IssueAttachment>> {
        let url = self.api_url(
            &format!("/issues/{issue_id}/comments/{comment_id}/attachments"),
            Query::new().fields::<IssueAttachment>(),
        );
        self.post_multipart(&url, Self::attachment_form(files)).await
    }

    /// Reads the work items of the issue.
    ///
    /// Calls `GET /api/issues/{issue_id}/timeTracking/workItems`.
    pub async fn get_issue_work_items(
        &self,
        issue_id: &str,
        offset: Option<u32>,
        count: Option<u32>,
    ) -> Result<Vec<IssueWorkItem>> {
        let url = self.api_url(
            &format!("/issues/{issue_id}/timeTracking/workItems"),
            Query::new().fields::<IssueWorkItem>().page(offset, count),
        );
        self.get_json(&url).await
    }

    /// Adds a work item to the issue.
    ///
    /// Calls `POST /api/issues/{issue_id}/timeTracking/workItems`.
    #[instrument(skip(self, work_item))]
    pub async fn create_issue_work_item(
        &self,
        issue_id: &str,
        work_item: &IssueWorkItem,
    ) -> Result<IssueWorkItem> {
        let url = self.api_url(
            &format!("/issues/{issue_id}/timeTracking/workItems"),
            Query::new().fields::<IssueWorkItem>(),
        );
        self.post_json(&url, work_item).await
    }

    /// Reads all projects visible to the current user.
    ///
    /// Calls `GET /api/admin/projects`.
    pub async fn get_projects(
        &self,
        offset: Option<u32>,
        count: Option<u32>,
    ) -> Result<Vec<Project>> {
        let url = self.api_url(
            "/admin/projects",
            Query::new().fields::<Project>().page(offset, count),
        );
        self.get_json(&url).await
    }

    /// Reads the work item types used in the project.
    ///
    /// Calls `GET /api/admin/projects/{project_id}/timeTrackingSettings/workItemTypes`.
    pub async fn get_project_work_item_types(
        &self,
        project_id: &str,
        offset: Option<u32>,
        count: Option<u32>,
    ) -> Result<Vec<WorkItemType>> {
        let url = self.api_url(
            &format!("/admin/projects/{project_id}/timeTrackingSettings/workItemTypes"),
            Query::new().fields::<WorkItemType>().page(offset, count),
        );
        self.get_json(&url).await
    }

    /// Reads all tags visible to the current user.
    ///
    /// Calls `GET /api/tags`.
    pub async fn get_tags(&self, offset: Option<u32>, count: Option<u32>) -> Result<Vec<Tag>> {
        let url = self.api_url("/tags", Query::new().fields::<Tag>().page(offset, count));
        self.get_json(&url).await
    }

    /// Tags the issue with an existing tag.
    ///
    /// Calls `POST /api/issues/{issue_id}/tags`.
    #[instrument(skip(self, tag))]
    pub async fn add_issue_tag(&self, issue_id: &str, tag: &Tag) -> Result<()> {
        let url = self.api_url(&format!("/issues/{issue_id}/tags"), Query::new());
        self.post_and_ignore(&url, tag).await
    }

    /// Reads the list of users.
    ///
    /// Calls `GET /api/users`.
    pub async fn get_users(&self, offset: Option<u32>, count: Option<u32>) -> Result<Vec<User>> {
        let url = self.api_url("/users", Query::new().fields::<User>().page(offset, count));
        self.get_json(&url).await
    }

    /// Reads the links of the issue, one entry per link type and direction.
    ///
    /// Calls `GET /api/issues/{issue_id}/links`.
    pub async fn get_issue_links(
        &self,
        issue_id: &str,
        offset: Option<u32>,
        count: Option<u32>,
    ) -> Result<Vec<IssueLink>> {
        let url = self.api_url(
            &format!("/issues/{issue_id}/links"),
            Query::new().fields::<IssueLink>().page(offset, count),
        );
        self.get_json(&url).await
    }

    /// Reads all available link types.
    ///
    /// Calls `GET /api/issueLinkTypes`.
    pub async fn get_issue_link_types(
        &self,
        offset: Option<u32>,
        count: Option<u32>,
    ) -> Result<Vec<IssueLinkType>> {
        let url = self.api_url(
            "/issueLinkTypes",
            Query::new().fields::<IssueLinkType>().page(offset, count),
        );
        self.get_json(&url).await
    }

    /// Links two issues; the direction picks which end the source issue is.
    ///
    /// Calls `POST /api/issues/{source}/links/{link_type_id}{s|t}/issues`.
    #[instrument(skip(self))]
    pub async fn link_issues(
        &self,
        source_issue_id: &str,
        target_issue_id: &str,
        link_type_id: &str,
        direction: LinkDirection,
    ) -> Result<Issue> {
        let url = self.api_url(
            &format!(
                "/issues/{source_issue_id}/links/{link_type_id}{}/issues",
                direction.url_suffix()
            ),
            Query::new().fields::<Issue>(),
        );
        let target = Issue {
            id: Opt::Set(target_issue_id.to_string()),
            ..Issue::default()
        };
        self.post_json(&url, &target).await
    }

    /// Removes the link between two issues.
    ///
    /// Calls `DELETE /api/issues/{source}/links/{link_type_id}/issues/{target}`.
    #[instrument(skip(self))]
    pub async fn delete_issue_link(
        &self,
        source_issue_id: &str,
        target_issue_id: &str,
        link_type_id: &str,
    ) -> Result<()> {
        let url = self.api_url(
            &format!("/issues/{source_issue_id}/links/{link_type_id}/issues/{target_issue_id}"),
            Query::new(),
        );
        self.delete_and_ignore(&url).await
    }

    /// Reads all agile boards.
    ///
    /// Calls `GET /api/agiles`.
    pub async fn get_agiles(&self, offset: Option<u32>, count: Option<u32>) -> Result<Vec<Agile>> {
        let url = self.api_url("/agiles", Query::new().fields::<Agile>().page(offset, count));
        self.get_json(&url).await
    }

    /// Reads the settings of one agile board.
    ///
    /// Calls `GET /api/agiles/{agile_id}`.
    #[instrument(skip(self))]
    pub async fn get_agile(&self, agile_id: &str) -> Result<Agile> {
        let url = self.api_url(&format!("/agiles/{agile_id}"), Query::new().fields::<Agile>());
        self.get_json(&url).await
    }

    /// Reads the sprints of an agile board.
    ///
    /// Calls `GET /api/agiles/{agile_id}/sprints`.
    pub async fn get_sprints(
        &self,
        agile_id: &str,
        offset: Option<u32>,
        count: Option<u32>,
    ) -> Result<Vec<Sprint>> {
        let url = self.api_url(
            &format!("/agiles/{agile_id}/sprints"),
            Query::new().fields::<Sprint>().page(offset, count),
        );
        self.get_json(&url).await
    }

    /// Reads one sprint of an agile board.
    ///
    /// Calls `GET /api/agiles/{agile_id}/sprints/{sprint_id}`.
    #[instrument(skip(self))]
    pub async fn get_sprint(&self, agile_id: &str, sprint_id: &str) -> Result<Sprint> {
        let url = self.api_url(
            &format!("/agiles/{agile_id}/sprints/{sprint_id}"),
            Query::new().fields::<Sprint>(),
        );
        self.get_json(&url).await
    }
}

/// Normalizes the base URL by removing trailing slashes.
fn normalize_base_url(url: &str) -> String {
    let url = url.trim_end_matches('/');

    if !url.starts_with("https://") && !url.contains("localhost") && !url.contains("127.0.0.1") {
        warn!("URL does not use HTTPS: {}. This is insecure for production use.", url);
    }

    url.to_string()
}
