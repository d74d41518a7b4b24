use axum::{debug_handler, extract::State, response::{Html, IntoResponse, Redirect, Response}};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{AppResult, auth, include_res, res, users};

use super::{comments_for, like_count, visible_posts};

#[debug_handler]
pub(crate) async fn feed(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let Some(viewer) = auth::current_user(&session, &db_pool).await? else {
        return Ok(Redirect::to("/login?return_url=/f").into_response());
    };

    let mut items = String::new();
    for post in visible_posts(&db_pool, &viewer.id).await? {
        let author = match users::fetch(&db_pool, &post.user_id).await? {
            Some(user) => user.fullname,
            None => "Former member".to_owned(),
        };

        let mut body_html = String::new();
        pulldown_cmark::html::push_html(&mut body_html, pulldown_cmark::Parser::new(&post.body));

        let mut comment_items = String::new();
        for comment in comments_for(&db_pool, &post.id).await? {
            let commenter = match users::fetch(&db_pool, &comment.user_id).await? {
                Some(user) => user.fullname,
                None => "Former member".to_owned(),
            };
            comment_items += &include_res!(str, "/pages/posts/comment_item.html")
                .replace("{fullname}", &commenter)
                .replace("{body}", &comment.body)
                .replace("{ago}", &res::ago(comment.written_at));
        }

        let comment_form = if post.allow_comments {
            include_res!(str, "/pages/posts/comment_form.html").replace("{post_id}", &post.id)
        } else {
            String::new()
        };

        items += &include_res!(str, "/pages/posts/post_item.html")
            .replace("{post_id}", &post.id)
            .replace("{title}", &post.title)
            .replace("{author}", &author)
            .replace("{author_id}", &post.user_id)
            .replace("{body}", &body_html)
            .replace("{likes}", &like_count(&db_pool, &post.id).await?.to_string())
            .replace("{ago}", &res::ago(post.posted_at))
            .replace("{comments}", &comment_items)
            .replace("{comment_form}", &comment_form);
    }

    Ok(Html(
        include_res!(str, "/pages/posts/feed.html").replace("{posts}", &items),
    )
    .into_response())
}
