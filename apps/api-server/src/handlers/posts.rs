//! Post handlers.

use std::collections::HashMap;
use std::future::Future;

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use inkpost_core::cancel::run_cancellable;
use inkpost_core::domain::{ListingQuery, Post, SortMode, User};
use inkpost_core::error::DomainResult;
use inkpost_shared::dto::{AuthorDto, ImageDto, ListPostsParams, ListPostsResponse, PostResponse};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

#[cfg(feature = "auth")]
use inkpost_core::domain::{NewPost, PostUpdate};
#[cfg(feature = "auth")]
use inkpost_shared::ApiResponse;
#[cfg(feature = "auth")]
use inkpost_shared::dto::{CreatePostRequest, FeaturePostRequest, UpdatePostRequest};

#[cfg(feature = "auth")]
use crate::middleware::auth::Identity;

/// Run a core operation under the request deadline.
async fn with_deadline<T>(
    state: &AppState,
    operation: impl Future<Output = DomainResult<T>>,
) -> AppResult<T> {
    run_cancellable(tokio::time::sleep(state.request_timeout), operation)
        .await
        .map_err(AppError::from)
}

fn post_response(post: Post, author: Option<&User>) -> PostResponse {
    PostResponse {
        id: post.id,
        title: post.title,
        slug: post.slug,
        desc: post.desc,
        category: post.category,
        content: post.content,
        image: post.image.map(|image| ImageDto {
            public_id: image.public_id,
            url: image.url,
        }),
        visit: post.visit,
        is_featured: post.is_featured,
        user: AuthorDto {
            id: post.user_id,
            name: author.map(|a| a.name.clone()),
            avatar: author.and_then(|a| a.avatar.clone()),
        },
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

/// Attach author summaries with a single user lookup.
async fn render(state: &AppState, posts: Vec<Post>) -> DomainResult<Vec<PostResponse>> {
    let mut ids: Vec<Uuid> = posts.iter().map(|p| p.user_id).collect();
    ids.sort_unstable();
    ids.dedup();

    let authors: HashMap<Uuid, User> = state
        .users
        .find_by_ids(&ids)
        .await?
        .into_iter()
        .map(|user| (user.id, user))
        .collect();

    Ok(posts
        .into_iter()
        .map(|post| {
            let author = authors.get(&post.user_id);
            post_response(post, author)
        })
        .collect())
}

async fn render_one(state: &AppState, post: Post) -> DomainResult<PostResponse> {
    let author = state.users.find_by_id(post.user_id).await?;
    Ok(post_response(post, author.as_ref()))
}

/// GET /api/v1/posts
pub async fn list_posts(
    state: web::Data<AppState>,
    params: web::Query<ListPostsParams>,
) -> AppResult<HttpResponse> {
    let params = params.into_inner();
    let featured = params.featured_only();

    let query = ListingQuery {
        category: params.cat,
        author: params.author,
        search: params.search,
        sort: params.sort.as_deref().map(SortMode::parse).unwrap_or_default(),
        featured,
        page: params.page.unwrap_or(ListingQuery::default().page),
        limit: params.limit.unwrap_or(state.default_limit),
    };

    let (posts, has_more) = with_deadline(&state, async {
        let page = state.queries.list_posts(&query).await?;
        Ok((render(&state, page.posts).await?, page.has_more))
    })
    .await?;

    Ok(HttpResponse::Ok().json(ListPostsResponse {
        success: true,
        posts,
        has_more,
    }))
}

/// GET /api/v1/post/{slug}
pub async fn get_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let slug = path.into_inner();

    let post = with_deadline(&state, async {
        let post = state.posts.get_post(&slug).await?;
        render_one(&state, post).await
    })
    .await?;

    Ok(HttpResponse::Ok().json(post))
}

/// POST /api/v1/create-post
#[cfg(feature = "auth")]
pub async fn create_post(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    tracing::debug!(author = %identity.name, title = %req.title, "Creating post");

    let draft = NewPost {
        title: req.title,
        desc: req.desc,
        category: req.category,
        content: req.content,
        image: req.image,
    };

    let post = with_deadline(&state, async {
        let post = state.posts.create_post(identity.user_id, draft).await?;
        render_one(&state, post).await
    })
    .await?;

    Ok(HttpResponse::Created().json(post))
}

/// PUT /api/v1/update-post/{post_id}
#[cfg(feature = "auth")]
pub async fn update_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let req = body.into_inner();
    let update = PostUpdate {
        title: req.title,
        desc: req.desc,
        category: req.category,
        content: req.content,
        image: req.image,
    };

    let post = with_deadline(&state, async {
        let post = state
            .posts
            .update_post(identity.actor(), post_id, update)
            .await?;
        render_one(&state, post).await
    })
    .await?;

    Ok(HttpResponse::Ok().json(post))
}

/// DELETE /api/v1/delete/{post_id}
#[cfg(feature = "auth")]
pub async fn delete_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();

    with_deadline(&state, state.posts.delete_post(identity.actor(), post_id)).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::message("Post has been deleted")))
}

/// PUT /api/v1/feature
#[cfg(feature = "auth")]
pub async fn feature_post(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<FeaturePostRequest>,
) -> AppResult<HttpResponse> {
    let post_id = body.into_inner().post_id;

    let post = with_deadline(&state, async {
        let post = state
            .posts
            .toggle_featured(identity.actor(), post_id)
            .await?;
        render_one(&state, post).await
    })
    .await?;

    Ok(HttpResponse::Ok().json(post))
}

#[cfg(test)]
mod tests {
    use actix_web::{App, http::StatusCode, test, web};
    use serde_json::Value;

    use crate::config::AppConfig;
    use crate::handlers::configure_routes;
    use crate::state::AppState;

    fn app_state() -> web::Data<AppState> {
        web::Data::new(AppState::in_memory(&AppConfig::default()))
    }

    #[actix_web::test]
    async fn empty_listing_has_no_more_pages() {
        let app = test::init_service(
            App::new()
                .app_data(app_state())
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/v1/posts").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["success"], true);
        assert_eq!(body["hasMore"], false);
        assert_eq!(body["posts"].as_array().map(Vec::len), Some(0));
    }

    #[actix_web::test]
    async fn zero_page_is_rejected() {
        let app = test::init_service(
            App::new()
                .app_data(app_state())
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/v1/posts?page=0")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn page_beyond_bigint_range_is_rejected() {
        let app = test::init_service(
            App::new()
                .app_data(app_state())
                .configure(configure_routes),
        )
        .await;

        for uri in [
            "/api/v1/posts?page=9223372036854775807",
            "/api/v1/posts?limit=18446744073709551615",
        ] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
        }
    }

    #[actix_web::test]
    async fn unknown_author_is_not_found() {
        let app = test::init_service(
            App::new()
                .app_data(app_state())
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/v1/posts?author=nobody")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn missing_slug_is_not_found() {
        let app = test::init_service(
            App::new()
                .app_data(app_state())
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/v1/post/no-such-post")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[cfg(feature = "auth")]
    mod authenticated {
        use super::*;
        use inkpost_core::domain::User;
        use serde_json::json;

        async fn register(state: &web::Data<AppState>, name: &str) -> String {
            let hash = state.passwords.hash("correct horse battery").unwrap();
            let user = User::new(name.to_string(), format!("{name}@example.com"), hash);
            let user = state.users.create(user).await.unwrap();
            state
                .tokens
                .generate_token(user.id, &user.name, user.role)
                .unwrap()
        }

        #[actix_web::test]
        async fn writes_require_identity() {
            let app = test::init_service(
                App::new()
                    .app_data(app_state())
                    .configure(configure_routes),
            )
            .await;

            let req = test::TestRequest::post()
                .uri("/api/v1/create-post")
                .set_json(json!({ "title": "Hello" }))
                .to_request();
            let resp = test::call_service(&app, req).await;

            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        }

        #[actix_web::test]
        async fn repeated_titles_get_distinct_slugs() {
            let state = app_state();
            let token = register(&state, "alice").await;
            let app = test::init_service(
                App::new().app_data(state).configure(configure_routes),
            )
            .await;

            let mut slugs = Vec::new();
            for _ in 0..2 {
                let req = test::TestRequest::post()
                    .uri("/api/v1/create-post")
                    .insert_header(("Authorization", format!("Bearer {token}")))
                    .set_json(json!({ "title": "My Title", "desc": "d", "content": "c" }))
                    .to_request();
                let body: Value = test::call_and_read_body_json(&app, req).await;
                slugs.push(body["slug"].as_str().unwrap().to_string());
            }
            assert_eq!(slugs, vec!["my-title", "my-title-2"]);

            let req = test::TestRequest::get()
                .uri("/api/v1/post/my-title-2")
                .to_request();
            let body: Value = test::call_and_read_body_json(&app, req).await;
            assert_eq!(body["visit"], 1);
            assert_eq!(body["user"]["name"], "alice");
        }

        #[actix_web::test]
        async fn token_cookie_is_accepted() {
            let state = app_state();
            let token = register(&state, "bob").await;
            let app = test::init_service(
                App::new().app_data(state).configure(configure_routes),
            )
            .await;

            let req = test::TestRequest::post()
                .uri("/api/v1/create-post")
                .cookie(actix_web::cookie::Cookie::new("token", token))
                .set_json(json!({ "title": "Via Cookie" }))
                .to_request();
            let resp = test::call_service(&app, req).await;

            assert_eq!(resp.status(), StatusCode::CREATED);
        }

        #[actix_web::test]
        async fn featuring_needs_admin() {
            let state = app_state();
            let token = register(&state, "carol").await;
            let app = test::init_service(
                App::new().app_data(state).configure(configure_routes),
            )
            .await;

            let req = test::TestRequest::post()
                .uri("/api/v1/create-post")
                .insert_header(("Authorization", format!("Bearer {token}")))
                .set_json(json!({ "title": "Pick Me" }))
                .to_request();
            let post: Value = test::call_and_read_body_json(&app, req).await;

            let req = test::TestRequest::put()
                .uri("/api/v1/feature")
                .insert_header(("Authorization", format!("Bearer {token}")))
                .set_json(json!({ "postId": post["id"] }))
                .to_request();
            let resp = test::call_service(&app, req).await;

            assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        }
    }
}
