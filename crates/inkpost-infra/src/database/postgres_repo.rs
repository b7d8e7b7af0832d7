//! PostgreSQL repository implementations.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Select, Set,
};
use uuid::Uuid;

use inkpost_core::domain::{PageWindow, Post, PostChanges, PostFilter, PostSort, User};
use inkpost_core::error::RepoError;
use inkpost_core::ports::{PostRepository, UserRepository};

use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, query_err, write_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// Escape `LIKE` wildcards so user text is matched literally.
pub(crate) fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn apply_filter(mut select: Select<PostEntity>, filter: &PostFilter) -> Select<PostEntity> {
    if let Some(category) = &filter.category {
        select = select.filter(post::Column::Category.eq(category.as_str()));
    }

    if let Some(needle) = &filter.title_contains {
        let pattern = format!("%{}%", escape_like(&needle.to_lowercase()));
        select = select.filter(
            Expr::expr(Func::lower(Expr::col(post::Column::Title)))
                .like(LikeExpr::new(pattern).escape('\\')),
        );
    }

    if let Some(author_id) = filter.author_id {
        select = select.filter(post::Column::UserId.eq(author_id));
    }

    if filter.featured_only {
        select = select.filter(post::Column::IsFeatured.eq(true));
    }

    if let Some(after) = filter.created_after {
        select = select.filter(post::Column::CreatedAt.gte(after));
    }

    select
}

fn apply_sort(select: Select<PostEntity>, sort: PostSort) -> Select<PostEntity> {
    match sort {
        PostSort::CreatedDesc => select.order_by_desc(post::Column::CreatedAt),
        PostSort::CreatedAsc => select.order_by_asc(post::Column::CreatedAt),
        PostSort::VisitDesc => select
            .order_by_desc(post::Column::Visit)
            .order_by_desc(post::Column::CreatedAt),
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: User) -> Result<User, RepoError> {
        let model: user::ActiveModel = user.into();
        let saved = model.insert(&*self.db).await.map_err(write_err)?;
        tracing::info!(user_id = %saved.id, "User created");
        Ok(saved.into())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_name = %name, "Finding user by name");

        let result = UserEntity::find()
            .filter(user::Column::Name.eq(name))
            .one(&*self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        // Mask email for logging to avoid PII in logs
        let masked = match email.split_once('@') {
            Some((local, domain)) => match local.chars().next() {
                Some(first) if local.chars().count() > 1 => format!("{first}***@{domain}"),
                _ => format!("***@{domain}"),
            },
            None => "***".to_string(),
        };
        tracing::debug!(user_email = %masked, "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&*self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let result = UserEntity::find()
            .filter(user::Column::Id.is_in(ids.iter().copied()))
            .all(&*self.db)
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find(
        &self,
        filter: &PostFilter,
        sort: PostSort,
        window: PageWindow,
    ) -> Result<Vec<Post>, RepoError> {
        // Postgres binds offset and limit as BIGINT.
        if !window.in_range() {
            return Err(RepoError::Query(format!(
                "page window out of range: offset {} limit {}",
                window.offset, window.limit
            )));
        }

        let select = apply_sort(apply_filter(PostEntity::find(), filter), sort);

        let result = select
            .offset(window.offset)
            .limit(window.limit)
            .all(&*self.db)
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn count_all(&self) -> Result<u64, RepoError> {
        PostEntity::find().count(&*self.db).await.map_err(query_err)
    }

    async fn find_by_slug(
        &self,
        slug: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<Option<Post>, RepoError> {
        let mut select = PostEntity::find().filter(post::Column::Slug.eq(slug));
        if let Some(id) = exclude_id {
            select = select.filter(post::Column::Id.ne(id));
        }

        let result = select.one(&*self.db).await.map_err(query_err)?;
        Ok(result.map(Into::into))
    }

    async fn create(&self, post: Post) -> Result<Post, RepoError> {
        let model: post::ActiveModel = post.into();
        let saved = model.insert(&*self.db).await.map_err(write_err)?;
        Ok(saved.into())
    }

    async fn update(&self, id: Uuid, changes: PostChanges) -> Result<Post, RepoError> {
        let mut model = post::ActiveModel {
            id: Set(id),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        };

        if let Some(title) = changes.title {
            model.title = Set(title);
        }
        if let Some(slug) = changes.slug {
            model.slug = Set(slug);
        }
        if let Some(desc) = changes.desc {
            model.description = Set(desc);
        }
        if let Some(category) = changes.category {
            model.category = Set(Some(category));
        }
        if let Some(content) = changes.content {
            model.content = Set(content);
        }
        if let Some(image) = changes.image {
            model.image_public_id = Set(Some(image.public_id));
            model.image_url = Set(Some(image.url));
        }

        let saved = model.update(&*self.db).await.map_err(write_err)?;
        Ok(saved.into())
    }

    async fn increment_visit(&self, slug: &str) -> Result<(), RepoError> {
        let result = PostEntity::update_many()
            .col_expr(post::Column::Visit, Expr::col(post::Column::Visit).add(1))
            .filter(post::Column::Slug.eq(slug))
            .exec(&*self.db)
            .await
            .map_err(query_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn set_featured(&self, id: Uuid, featured: bool) -> Result<Post, RepoError> {
        let model = post::ActiveModel {
            id: Set(id),
            is_featured: Set(featured),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        };

        let saved = model.update(&*self.db).await.map_err(write_err)?;
        Ok(saved.into())
    }
}
