use axum::{http::StatusCode, response::{Html, IntoResponse, Response}};

use crate::AppResult;

#[macro_export]
macro_rules! include_res {
    (bytes, $p:expr) => {
        include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/res", $p))
    };
    (str, $p:expr) => {
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/res", $p))
    };
}

pub fn sorry(what: &str) -> AppResult<Response> {
    Ok((
        StatusCode::NOT_FOUND,
        Html(include_res!(str, "/pages/sorry.html").replace("{what}", what)),
    )
        .into_response())
}

/// Rough "3m ago" rendering for timestamps, coarsest unit that fits.
pub fn ago(unix: i64) -> String {
    let elapsed = time::OffsetDateTime::now_utc().unix_timestamp() - unix;
    if elapsed < 0 {
        "just now".to_owned()
    } else if elapsed < 60 {
        format!("{elapsed}s ago")
    } else if elapsed < 3600 {
        format!("{}m ago", elapsed / 60)
    } else if elapsed < 86400 {
        format!("{}h ago", elapsed / 3600)
    } else {
        format!("{}d ago", elapsed / 86400)
    }
}

#[cfg(test)]
mod tests {
    use super::ago;

    #[test]
    fn ago_picks_coarsest_unit() {
        let now = time::OffsetDateTime::now_utc().unix_timestamp();
        assert!(ago(now - 5).ends_with("s ago"));
        assert_eq!(ago(now - 150), "2m ago");
        assert_eq!(ago(now - 7300), "2h ago");
        assert_eq!(ago(now - 180000), "2d ago");
    }
}
