use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::blog::{Blog, CreateBlog, UpdateBlog};
use services::services::uploads::UploadKind;
use tracing::info;
use utils::{
    response::ApiResponse,
    text::{slugify, today},
};

use super::RequestUploads;
use crate::{AppState, error::ApiError, form::FormData, middleware::AdminSession};

/// GET /api/blogs
pub async fn get_blogs(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Blog>>>, ApiError> {
    let blogs = Blog::find_all(&state.db.pool).await?;
    Ok(ResponseJson(ApiResponse::success(blogs)))
}

/// GET /api/blogs/{id}
pub async fn get_blog(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Blog>>, ApiError> {
    let blog = Blog::find_by_id(&state.db.pool, id)
        .await?
        .ok_or(ApiError::NotFound("Blog post"))?;
    Ok(ResponseJson(ApiResponse::success(blog)))
}

/// GET /api/blogs/slug/{slug}
pub async fn get_blog_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<ResponseJson<ApiResponse<Blog>>, ApiError> {
    let blog = Blog::find_by_slug(&state.db.pool, &slug)
        .await?
        .ok_or(ApiError::NotFound("Blog post"))?;
    Ok(ResponseJson(ApiResponse::success(blog)))
}

/// POST /api/blogs
/// Slug defaults to the slugified title, date to today
pub async fn create_blog(
    _session: AdminSession,
    State(state): State<AppState>,
    form: FormData,
) -> Result<ResponseJson<ApiResponse<Blog>>, ApiError> {
    let title = form.required("title")?;
    let category = form.required("category")?;
    let mut uploads = RequestUploads::default();
    let image = uploads.file_or_text(&state, &form, "image", UploadKind::Image).await?;
    let slug = Some(slugify(&form.text("slug").unwrap_or_else(|| title.clone())))
        .filter(|s| !s.is_empty());

    let created = Blog::create(
        &state.db.pool,
        &CreateBlog {
            title,
            category,
            excerpt: form.text("excerpt"),
            content: form.text("content"),
            image,
            date: Some(form.text("date").unwrap_or_else(today)),
            author: form.text("author"),
            slug,
        },
    )
    .await
    .map_err(ApiError::from);
    let blog = uploads.settle(&state, created).await?;

    info!(blog_id = blog.id, slug = ?blog.slug, "Blog post created");
    state.content_changed("blog_created").await;
    Ok(ResponseJson(ApiResponse::success(blog)))
}

/// PUT /api/blogs/{id}
pub async fn update_blog(
    _session: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    form: FormData,
) -> Result<ResponseJson<ApiResponse<Blog>>, ApiError> {
    if Blog::find_by_id(&state.db.pool, id).await?.is_none() {
        return Err(ApiError::NotFound("Blog post"));
    }
    let mut uploads = RequestUploads::default();
    let image = uploads.file_or_text(&state, &form, "image", UploadKind::Image).await?;

    let updated = Blog::update(
        &state.db.pool,
        id,
        &UpdateBlog {
            title: form.text("title"),
            category: form.text("category"),
            excerpt: form.text("excerpt"),
            content: form.text("content"),
            image,
            date: form.text("date"),
            author: form.text("author"),
            slug: form
                .text("slug")
                .map(|s| slugify(&s))
                .filter(|s| !s.is_empty()),
        },
    )
    .await
    .map_err(ApiError::from)
    .and_then(|row| row.ok_or(ApiError::NotFound("Blog post")));
    let blog = uploads.settle(&state, updated).await?;

    info!(blog_id = id, "Blog post updated");
    state.content_changed("blog_updated").await;
    Ok(ResponseJson(ApiResponse::success(blog)))
}

/// DELETE /api/blogs/{id}
pub async fn delete_blog(
    _session: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    if Blog::delete(&state.db.pool, id).await? == 0 {
        return Err(ApiError::NotFound("Blog post"));
    }

    info!(blog_id = id, "Blog post deleted");
    state.content_changed("blog_deleted").await;
    Ok(ResponseJson(ApiResponse::success_with_message((), "Blog post deleted")))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/blogs",
        Router::new()
            .route("/", get(get_blogs).post(create_blog))
            .route("/slug/{slug}", get(get_blog_by_slug))
            .route("/{id}", get(get_blog).put(update_blog).delete(delete_blog)),
    )
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode, header},
    };
    use serde_json::json;
    use utils::text::today;

    use crate::routes::test_support::TestApp;

    #[tokio::test]
    async fn test_slug_and_date_defaults() {
        let app = TestApp::new().await;
        let token = app.token().await;

        let (status, body) = app
            .post_json(
                "/api/blogs",
                Some(&token),
                json!({ "title": "Design Conferences in 2022", "category": "Design" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["data"]["slug"], "design-conferences-in-2022");
        assert_eq!(body["data"]["date"], today());

        let (status, body) = app.get("/api/blogs/slug/design-conferences-in-2022").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["title"], "Design Conferences in 2022");

        assert!(app.page().contains("Design Conferences in 2022"));

        let (status, _) = app.get("/api/blogs/slug/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_duplicate_slug_conflicts() {
        let app = TestApp::new().await;
        let token = app.token().await;
        let post = json!({ "title": "Hello", "category": "News", "slug": "hello" });

        let (status, _) = app.post_json("/api/blogs", Some(&token), post.clone()).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = app.post_json("/api/blogs", Some(&token), post).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_rejected_post_leaves_no_uploaded_file() {
        let app = TestApp::new().await;
        let token = app.token().await;
        let (status, _) = app
            .post_json(
                "/api/blogs",
                Some(&token),
                json!({ "title": "Hello", "category": "News" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let boundary = "BLOG-BOUNDARY";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\nHello\r\n\
             --{b}\r\nContent-Disposition: form-data; name=\"category\"\r\n\r\nNews\r\n\
             --{b}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"cover.svg\"\r\nContent-Type: image/svg+xml\r\n\r\n<svg></svg>\r\n\
             --{b}--\r\n",
            b = boundary
        );
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/blogs")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();

        let (status, _) = app.request(request).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let leftovers = std::fs::read_dir(app.upload_dir())
            .map(|entries| entries.count())
            .unwrap_or(0);
        assert_eq!(leftovers, 0);
    }
}
