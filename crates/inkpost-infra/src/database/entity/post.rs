//! Post entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use inkpost_core::domain::PostImage;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    #[sea_orm(unique)]
    pub slug: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub category: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub image_public_id: Option<String>,
    pub image_url: Option<String>,
    pub visit: i64,
    pub is_featured: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain Post.
impl From<Model> for inkpost_core::domain::Post {
    fn from(model: Model) -> Self {
        let image = match (model.image_public_id, model.image_url) {
            (Some(public_id), Some(url)) => Some(PostImage { public_id, url }),
            _ => None,
        };

        Self {
            id: model.id,
            user_id: model.user_id,
            title: model.title,
            slug: model.slug,
            desc: model.description,
            category: model.category,
            content: model.content,
            image,
            visit: model.visit,
            is_featured: model.is_featured,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

/// Conversion from Domain Post to SeaORM ActiveModel.
impl From<inkpost_core::domain::Post> for ActiveModel {
    fn from(post: inkpost_core::domain::Post) -> Self {
        let (image_public_id, image_url) = match post.image {
            Some(image) => (Some(image.public_id), Some(image.url)),
            None => (None, None),
        };

        Self {
            id: Set(post.id),
            user_id: Set(post.user_id),
            title: Set(post.title),
            slug: Set(post.slug),
            description: Set(post.desc),
            category: Set(post.category),
            content: Set(post.content),
            image_public_id: Set(image_public_id),
            image_url: Set(image_url),
            visit: Set(post.visit),
            is_featured: Set(post.is_featured),
            created_at: Set(post.created_at.into()),
            updated_at: Set(post.updated_at.into()),
        }
    }
}
