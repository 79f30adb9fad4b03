//! Text added to copied issues and comments

use chrono::{DateTime, Utc};

use crate::models::{Comment, Issue};

fn short_date(date: &DateTime<Utc>) -> String {
    date.format("%b %d, %Y").to_string()
}

/// Body of the target issue: author and date, the original text, and a
/// link back to the source issue
pub fn issue_body(issue: &Issue) -> String {
    format!(
        "_{} created the following on {}:_  \n\n{}\n\n_Original issue: {}_",
        issue.user.login,
        short_date(&issue.created_at),
        issue.body_text(),
        issue.html_url
    )
}

pub fn comment_body(comment: &Comment) -> String {
    format!(
        "_On {}, {} commented:_\n{}",
        short_date(&comment.created_at),
        comment.user.login,
        comment.body_text()
    )
}

/// Comment left on a source issue once it has been closed
pub fn moved_notice(target_url: &str) -> String {
    format!("This issue was moved to {}.", target_url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::decode;
    use serde_json::json;

    #[test]
    fn test_issue_body() {
        let issue: Issue = decode(
            "issue",
            json!({
                "number": 42,
                "title": "t",
                "body": "Broken since #17",
                "state": "open",
                "user": {"login": "octocat"},
                "created_at": "2022-04-08T13:45:00Z",
                "html_url": "https://github.com/acme/old/issues/42",
                "comments_url": "https://api.github.com/repos/acme/old/issues/42/comments"
            }),
        )
        .unwrap();

        assert_eq!(
            issue_body(&issue),
            "_octocat created the following on Apr 08, 2022:_  \n\nBroken since #17\n\n_Original issue: https://github.com/acme/old/issues/42_"
        );
    }

    #[test]
    fn test_comment_body() {
        let comment: Comment = decode(
            "comment",
            json!({
                "id": 1,
                "user": {"login": "hubot"},
                "body": "+1",
                "created_at": "2023-12-31T23:59:59Z",
                "url": "https://api.github.com/repos/acme/old/issues/comments/1"
            }),
        )
        .unwrap();

        assert_eq!(comment_body(&comment), "_On Dec 31, 2023, hubot commented:_\n+1");
    }
}
