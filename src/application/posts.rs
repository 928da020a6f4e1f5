use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::application::repos::{
    CreatePostParams, PostsRepo, PostsWriteRepo, RepoError, UpdatePostParams,
};
use crate::domain::entities::PostRecord;
use crate::domain::error::{DomainError, require_text};
use crate::domain::posts::{PostEdit, parse_post_date, sort_newest_first};
use crate::domain::slug::{SlugAsyncError, SlugError, generate_unique_slug_async};

#[derive(Debug, Error)]
pub enum PostServiceError {
    #[error(transparent)]
    Invalid(#[from] DomainError),
    #[error("title does not produce a usable slug")]
    UnsluggableTitle,
    #[error("no free slug left for `{0}`")]
    SlugExhausted(String),
    #[error("post not found")]
    NotFound,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone, Default)]
pub struct CreatePostCommand {
    pub title: Option<String>,
    pub content: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdatePostCommand {
    pub slug: String,
    pub title: Option<String>,
    pub content: Option<String>,
    pub date: Option<String>,
}

#[derive(Clone)]
pub struct PostService {
    reader: Arc<dyn PostsRepo>,
    writer: Arc<dyn PostsWriteRepo>,
}

impl PostService {
    pub fn new(reader: Arc<dyn PostsRepo>, writer: Arc<dyn PostsWriteRepo>) -> Self {
        Self { reader, writer }
    }

    pub async fn list_posts(&self) -> Result<Vec<PostRecord>, PostServiceError> {
        let mut posts = self.reader.list_posts().await?;
        sort_newest_first(&mut posts);
        debug!(target = "minblog::posts", count = posts.len(), "loaded posts");
        Ok(posts)
    }

    pub async fn find_post(&self, slug: &str) -> Result<PostRecord, PostServiceError> {
        self.reader
            .find_by_slug(slug)
            .await?
            .ok_or(PostServiceError::NotFound)
    }

    pub async fn create_post(
        &self,
        command: CreatePostCommand,
    ) -> Result<PostRecord, PostServiceError> {
        let title = require_text(command.title, "title")?;
        let content = require_text(command.content, "content")?;
        let date = require_text(command.date, "date")?;
        let date = parse_post_date(&date)?;

        let reader = self.reader.clone();
        let slug = generate_unique_slug_async(&title, move |candidate| {
            let reader = reader.clone();
            let candidate = candidate.to_string();
            async move {
                reader
                    .find_by_slug(&candidate)
                    .await
                    .map(|existing| existing.is_none())
            }
        })
        .await
        .map_err(|err| match err {
            SlugAsyncError::Slug(SlugError::Unrepresentable { .. }) => {
                PostServiceError::UnsluggableTitle
            }
            SlugAsyncError::Slug(SlugError::Exhausted { base }) => {
                PostServiceError::SlugExhausted(base)
            }
            SlugAsyncError::Predicate(err) => PostServiceError::Repo(err),
        })?;

        let post = self
            .writer
            .create_post(CreatePostParams {
                slug,
                title,
                content,
                date,
            })
            .await?;

        info!(target = "minblog::posts", slug = %post.slug, "post created");
        Ok(post)
    }

    pub async fn update_post(
        &self,
        command: UpdatePostCommand,
    ) -> Result<PostRecord, PostServiceError> {
        let edit = PostEdit {
            title: optional_text(command.title, "title")?,
            content: optional_text(command.content, "content")?,
            date: optional_text(command.date, "date")?
                .map(|raw| parse_post_date(&raw))
                .transpose()?,
        };

        let current = self.find_post(&command.slug).await?;
        if edit.is_empty() {
            return Ok(current);
        }

        let merged = edit.apply(current);
        let stored = self
            .writer
            .update_post(UpdatePostParams {
                slug: merged.slug.clone(),
                title: merged.title.clone(),
                content: merged.content.clone(),
                date: merged.date,
            })
            .await
            .map_err(|err| match err {
                RepoError::NotFound => PostServiceError::NotFound,
                other => PostServiceError::Repo(other),
            })?;

        info!(target = "minblog::posts", slug = %stored.slug, "post updated");
        Ok(stored)
    }

    pub async fn delete_post(&self, slug: &str) -> Result<u64, PostServiceError> {
        let removed = self.writer.delete_post(slug).await?;
        if removed == 0 {
            return Err(PostServiceError::NotFound);
        }

        info!(target = "minblog::posts", slug, removed, "post deleted");
        Ok(removed)
    }
}

/// Provided fields of an edit must not be blank.
fn optional_text(
    value: Option<String>,
    field: &'static str,
) -> Result<Option<String>, DomainError> {
    value.map(|text| require_text(Some(text), field)).transpose()
}
