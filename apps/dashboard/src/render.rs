//! Plain-text tables for the terminal.

use client_core::{
    audit_trail::{AuditEntryView, EMPTY_TEXT},
    directory::{contact_email, initials},
    views::{truncate, CommentRow, MediaItemRow, PostRow},
    Notification, Pager,
};
use shared::domain::User;

const CELL_PREVIEW: usize = 60;

/// Left-aligned columns separated by two spaces.
pub fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: Vec<&str>| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect();
        padded.join("  ").trim_end().to_string()
    };

    let mut out = vec![line(headers.to_vec())];
    out.extend(rows.iter().map(|row| line(row.iter().map(String::as_str).collect())));
    out.join("\n")
}

pub fn media_items(rows: &[MediaItemRow]) -> String {
    table(
        &[
            "UUID", "ID (ext)", "Platform", "Title", "Author", "Risk", "Status", "Score",
            "Created", "Fetched",
        ],
        &rows
            .iter()
            .map(|row| {
                vec![
                    row.id.clone(),
                    row.content_id.clone(),
                    row.platform.to_string(),
                    truncate(&row.title, CELL_PREVIEW),
                    row.author.clone(),
                    row.risk.to_string(),
                    row.status.to_string(),
                    row.score.clone(),
                    row.created.clone(),
                    row.fetched.clone(),
                ]
            })
            .collect::<Vec<_>>(),
    )
}

pub fn comments(rows: &[CommentRow]) -> String {
    table(
        &[
            "UUID", "Comment ID", "Media Item", "Author", "Body", "Platform", "Status", "Score",
            "Risk", "Urgency", "Created",
        ],
        &rows
            .iter()
            .map(|row| {
                vec![
                    row.id.clone(),
                    row.comment_id.clone(),
                    row.media_item.clone(),
                    row.author.clone(),
                    truncate(&row.body, CELL_PREVIEW),
                    row.platform.to_string(),
                    row.status.to_string(),
                    row.score.clone(),
                    row.risk.to_string(),
                    row.urgency.to_string(),
                    row.created.clone(),
                ]
            })
            .collect::<Vec<_>>(),
    )
}

pub fn posts(rows: &[PostRow]) -> String {
    table(
        &[
            "ID", "Platform", "Source", "Author", "Risk", "Status", "Label", "Assignee",
            "Relevance", "Text",
        ],
        &rows
            .iter()
            .map(|row| {
                vec![
                    row.id.clone(),
                    row.platform.to_string(),
                    row.source.clone(),
                    row.author.clone(),
                    row.risk.to_string(),
                    row.status.to_string(),
                    row.label.to_string(),
                    row.assignee.clone(),
                    row.relevance.clone(),
                    truncate(&row.text, CELL_PREVIEW),
                ]
            })
            .collect::<Vec<_>>(),
    )
}

pub fn users(users: &[User]) -> String {
    table(
        &["ID", "", "Name", "Role", "Email"],
        &users
            .iter()
            .map(|user| {
                vec![
                    user.id.to_string(),
                    initials(user),
                    user.name.clone(),
                    user.role.to_string(),
                    contact_email(user),
                ]
            })
            .collect::<Vec<_>>(),
    )
}

pub fn audit(entries: &[AuditEntryView]) -> String {
    if entries.is_empty() {
        return EMPTY_TEXT.to_string();
    }
    let mut out = Vec::new();
    for entry in entries {
        out.push(format!("[{}] {} ({})", entry.type_label, entry.description, entry.age));
        if let Some(payload) = &entry.payload {
            out.extend(payload.lines().map(|line| format!("    {line}")));
        }
    }
    out.join("\n")
}

pub fn pager(pager: &Pager, shown: usize) -> String {
    let flag = |on: bool| if on { "yes" } else { "no" };
    format!(
        "page {} ({shown} shown, previous: {}, next: {})",
        pager.page(),
        flag(pager.has_previous()),
        flag(pager.has_next())
    )
}

pub fn notification(notice: &Notification) -> String {
    match &notice.description {
        Some(description) => format!("{}: {description}", notice.title),
        None => notice.title.clone(),
    }
}
