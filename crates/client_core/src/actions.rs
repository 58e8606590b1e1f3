use shared::domain::{PostId, RiskLevel, Status, UserId};

use crate::{directory::UserDirectory, store::PostStore};

/// `"1 item selected"`, `"3 items selected"`.
pub fn selection_label(count: usize) -> String {
    if count == 1 {
        "1 item selected".to_string()
    } else {
        format!("{count} items selected")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostAction {
    AssignTo(UserId),
    MarkFalsePositive,
    SetStatus(Status),
    SetRisk(RiskLevel),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowAction {
    OpenDetails,
    Post(PostAction),
}

/// A menu section such as "Assign to" and its entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuGroup<A> {
    pub title: &'static str,
    pub items: Vec<(String, A)>,
}

fn post_groups(directory: &UserDirectory) -> Vec<MenuGroup<PostAction>> {
    vec![
        MenuGroup {
            title: "Assign to",
            items: directory
                .users()
                .iter()
                .map(|user| (user.name.clone(), PostAction::AssignTo(user.id.clone())))
                .collect(),
        },
        MenuGroup {
            title: "Mark False Positive",
            items: vec![("Mark False Positive".into(), PostAction::MarkFalsePositive)],
        },
        MenuGroup {
            title: "Set Status",
            items: Status::ALL
                .iter()
                .map(|status| (status.label().to_string(), PostAction::SetStatus(*status)))
                .collect(),
        },
        MenuGroup {
            title: "Set Risk",
            items: RiskLevel::ALL
                .iter()
                .map(|risk| (risk.label().to_string(), PostAction::SetRisk(*risk)))
                .collect(),
        },
    ]
}

pub fn bulk_menu(directory: &UserDirectory) -> Vec<MenuGroup<PostAction>> {
    post_groups(directory)
}

/// Row menu: "Open Details" first, then the bulk entries.
pub fn row_menu(directory: &UserDirectory) -> Vec<MenuGroup<RowAction>> {
    let mut menu = vec![MenuGroup {
        title: "Open Details",
        items: vec![("Open Details".into(), RowAction::OpenDetails)],
    }];
    menu.extend(post_groups(directory).into_iter().map(|group| MenuGroup {
        title: group.title,
        items: group
            .items
            .into_iter()
            .map(|(label, action)| (label, RowAction::Post(action)))
            .collect(),
    }));
    menu
}

/// Applies `action` to every selected post. An empty selection is a no-op.
pub fn dispatch_bulk(store: &mut PostStore, selection: &[PostId], action: &PostAction) {
    if selection.is_empty() {
        return;
    }
    match action {
        PostAction::AssignTo(user) => store.assign_many(selection, user),
        PostAction::MarkFalsePositive => store.mark_false_positive_many(selection),
        PostAction::SetStatus(status) => store.set_status_many(selection, *status),
        PostAction::SetRisk(risk) => store.set_risk_many(selection, *risk),
    }
}

/// Applies a row action. Returns the post to open for `OpenDetails`.
pub fn dispatch_row(store: &mut PostStore, id: &PostId, action: &RowAction) -> Option<PostId> {
    match action {
        RowAction::OpenDetails => return store.get(id).map(|post| post.id.clone()),
        RowAction::Post(PostAction::AssignTo(user)) => store.assign(id, user),
        RowAction::Post(PostAction::MarkFalsePositive) => store.mark_false_positive(id),
        RowAction::Post(PostAction::SetStatus(status)) => store.set_status(id, *status),
        RowAction::Post(PostAction::SetRisk(risk)) => store.set_risk(id, *risk),
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::{AuditEventType, Label};

    use crate::{notifications::Notification, store::Session};

    fn ids(raw: &[&str]) -> Vec<PostId> {
        raw.iter().map(|id| PostId::from(*id)).collect()
    }

    #[test]
    fn selection_label_pluralizes() {
        assert_eq!(selection_label(1), "1 item selected");
        assert_eq!(selection_label(0), "0 items selected");
        assert_eq!(selection_label(3), "3 items selected");
    }

    #[test]
    fn bulk_menu_lists_users_statuses_and_risks() {
        let menu = bulk_menu(&UserDirectory::demo());
        let titles: Vec<&str> = menu.iter().map(|group| group.title).collect();
        assert_eq!(titles, vec!["Assign to", "Mark False Positive", "Set Status", "Set Risk"]);

        let users: Vec<&str> = menu[0].items.iter().map(|(label, _)| label.as_str()).collect();
        assert_eq!(users, vec!["Sarah Chen", "Mike Rodriguez", "Emily Johnson", "David Park"]);
        assert_eq!(menu[2].items.len(), 6);
        assert_eq!(menu[2].items[5].0, "Closed – No Fit");
        assert_eq!(menu[3].items[0], ("Crisis".to_string(), PostAction::SetRisk(RiskLevel::Crisis)));
    }

    #[test]
    fn row_menu_starts_with_open_details() {
        let menu = row_menu(&UserDirectory::demo());
        assert_eq!(menu[0].items[0].1, RowAction::OpenDetails);
        assert_eq!(
            menu[1].items[1].1,
            RowAction::Post(PostAction::AssignTo("2".into()))
        );
    }

    #[test]
    fn bulk_dispatch_targets_only_the_selection() {
        let mut store = PostStore::demo(Session::new("1"));
        let mut rx = store.subscribe_notifications();
        let untouched = store.get(&"2".into()).cloned();

        dispatch_bulk(&mut store, &ids(&["1", "4"]), &PostAction::SetRisk(RiskLevel::Medium));

        for id in ["1", "4"] {
            assert_eq!(store.get(&id.into()).and_then(|p| p.risk_level), Some(RiskLevel::Medium));
        }
        assert_eq!(store.get(&"2".into()).cloned(), untouched);
        assert_eq!(
            rx.try_recv().expect("notification"),
            Notification::new("Risk level updated", "2 posts risk level changed to Medium.")
        );
    }

    #[test]
    fn empty_selection_does_nothing() {
        let mut store = PostStore::demo(Session::new("1"));
        let mut rx = store.subscribe_notifications();
        let before = store.posts().to_vec();

        dispatch_bulk(&mut store, &[], &PostAction::MarkFalsePositive);

        assert_eq!(store.posts(), before.as_slice());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn row_dispatch_updates_or_opens() {
        let mut store = PostStore::demo(Session::new("2"));

        let opened = dispatch_row(&mut store, &"3".into(), &RowAction::OpenDetails);
        assert_eq!(opened, Some(PostId::from("3")));
        assert_eq!(dispatch_row(&mut store, &"nope".into(), &RowAction::OpenDetails), None);

        let opened = dispatch_row(
            &mut store,
            &"3".into(),
            &RowAction::Post(PostAction::MarkFalsePositive),
        );
        assert_eq!(opened, None);
        let post = store.get(&"3".into()).expect("post");
        assert_eq!(post.label, Some(Label::NotRelevant));
        let last = post.audit.last().expect("entry");
        assert_eq!(last.event_type, AuditEventType::Triage);
        assert_eq!(last.actor_user_id.as_str(), "2");
    }
}
