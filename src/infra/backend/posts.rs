use async_trait::async_trait;
use reqwest::Method;

use crate::application::repos::{
    CreatePostParams, PostsRepo, PostsWriteRepo, RepoError, UpdatePostParams,
};
use crate::domain::entities::PostRecord;
use crate::domain::posts::format_post_date;

use super::RestRepositories;
use super::prefer_representation;
use super::rows::{PostInsert, PostPatch, PostRow};

const TABLE: &str = "posts";

fn slug_filter(slug: &str) -> (&'static str, String) {
    ("slug", format!("eq.{slug}"))
}

fn into_records(rows: Vec<PostRow>) -> Result<Vec<PostRecord>, RepoError> {
    rows.into_iter().map(PostRecord::try_from).collect()
}

#[async_trait]
impl PostsRepo for RestRepositories {
    async fn list_posts(&self) -> Result<Vec<PostRecord>, RepoError> {
        let url = self.table_url(
            TABLE,
            &[
                ("select", "*".to_string()),
                ("order", "date.desc".to_string()),
            ],
        )?;
        let rows: Vec<PostRow> = self.fetch_rows(self.request(Method::GET, url)).await?;
        into_records(rows)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<PostRecord>, RepoError> {
        let url = self.table_url(
            TABLE,
            &[
                ("select", "*".to_string()),
                slug_filter(slug),
                ("limit", "1".to_string()),
            ],
        )?;
        let row: Option<PostRow> = self.fetch_first(self.request(Method::GET, url)).await?;
        row.map(PostRecord::try_from).transpose()
    }
}

#[async_trait]
impl PostsWriteRepo for RestRepositories {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError> {
        let url = self.table_url(TABLE, &[])?;
        let body = PostInsert {
            slug: &params.slug,
            title: &params.title,
            content: &params.content,
            date: format_post_date(params.date),
        };

        let request = prefer_representation(self.request(Method::POST, url)).json(&body);
        let row: Option<PostRow> = self.fetch_first(request).await?;
        match row {
            Some(row) => PostRecord::try_from(row),
            // Stores configured to return nothing still accepted the insert.
            None => Ok(PostRecord {
                slug: params.slug,
                title: params.title,
                content: params.content,
                date: params.date,
            }),
        }
    }

    async fn update_post(&self, params: UpdatePostParams) -> Result<PostRecord, RepoError> {
        let url = self.table_url(TABLE, &[slug_filter(&params.slug)])?;
        let body = PostPatch::new(&params.title, &params.content, params.date);

        let request = prefer_representation(self.request(Method::PATCH, url)).json(&body);
        let row: Option<PostRow> = self.fetch_first(request).await?;
        row.map(PostRecord::try_from)
            .transpose()?
            .ok_or(RepoError::NotFound)
    }

    async fn delete_post(&self, slug: &str) -> Result<u64, RepoError> {
        let url = self.table_url(TABLE, &[slug_filter(slug)])?;
        let request = prefer_representation(self.request(Method::DELETE, url));
        let rows: Vec<PostRow> = self.fetch_rows(request).await?;
        Ok(rows.len() as u64)
    }
}
