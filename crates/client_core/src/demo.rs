use chrono::{DateTime, NaiveDate, Utc};
use serde_json::json;
use shared::domain::{
    AuditEvent, AuditEventType, Label, Note, OutreachEvent, OutreachKind, Platform, Post,
    PostSource, RiskLevel, Role, Status, User, UserId,
};

use crate::store::payload;

pub const SYSTEM_ACTOR: &str = "system";

fn at(month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(2024, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, 0))
        .map(|naive| naive.and_utc())
        .unwrap_or_default()
}

fn avatar(seed: &str) -> Option<String> {
    Some(format!(
        "https://api.dicebear.com/7.x/avataaars/svg?seed={seed}"
    ))
}

pub fn demo_users() -> Vec<User> {
    vec![
        User {
            id: "1".into(),
            name: "Sarah Chen".into(),
            role: Role::Admin,
            avatar_url: avatar("Sarah"),
        },
        User {
            id: "2".into(),
            name: "Mike Rodriguez".into(),
            role: Role::Reviewer,
            avatar_url: avatar("Mike"),
        },
        User {
            id: "3".into(),
            name: "Emily Johnson".into(),
            role: Role::Reviewer,
            avatar_url: avatar("Emily"),
        },
        User {
            id: "4".into(),
            name: "David Park".into(),
            role: Role::Reviewer,
            avatar_url: avatar("David"),
        },
    ]
}

fn created(audit_id: &str, post_id: &str, source: &str, when: DateTime<Utc>) -> AuditEvent {
    AuditEvent {
        id: audit_id.into(),
        post_id: post_id.into(),
        actor_user_id: SYSTEM_ACTOR.into(),
        event_type: AuditEventType::Create,
        payload: payload(json!({ "source": source })),
        at: when,
    }
}

fn note(id: &str, post_id: &str, author: &str, text: &str, when: DateTime<Utc>) -> Note {
    Note {
        id: id.into(),
        post_id: post_id.into(),
        author_user_id: author.into(),
        text: text.into(),
        at: when,
    }
}

fn first_contact(id: &str, post_id: &str, actor: &str, details: &str, when: DateTime<Utc>) -> OutreachEvent {
    OutreachEvent {
        id: id.into(),
        post_id: post_id.into(),
        actor_user_id: actor.into(),
        kind: OutreachKind::InitialDm,
        details: details.into(),
        at: when,
    }
}

fn hits(words: &[&str]) -> Vec<String> {
    words.iter().map(|word| (*word).to_string()).collect()
}

pub fn demo_posts() -> Vec<Post> {
    vec![
        Post {
            id: "1".into(),
            platform: Platform::Reddit,
            source: PostSource::subreddit("r/depression"),
            author: "struggling_student_23".into(),
            text: "I've been dealing with severe depression for the past 6 months and it's getting worse. I can barely get out of bed, my grades are failing, and I've stopped talking to my friends and family. I've thought about therapy but I can't afford it and my insurance doesn't cover mental health. I don't know what to do anymore. Has anyone been through something similar? I feel so alone and hopeless.".into(),
            url: "https://reddit.com/r/depression/post123".into(),
            timestamp: at(8, 20, 10, 30),
            keyword_hits: hits(&["severe depression", "can't afford therapy", "insurance doesn't cover", "hopeless"]),
            relevance_score: Some(5),
            label: Some(Label::PotentialLead),
            risk_level: Some(RiskLevel::Crisis),
            status: Status::New,
            assignee_id: None,
            last_update: at(8, 20, 10, 30),
            notes: Vec::new(),
            outreach_events: Vec::new(),
            audit: vec![created("audit_1", "1", "reddit_ingestion", at(8, 20, 10, 30))],
        },
        Post {
            id: "2".into(),
            platform: Platform::Youtube,
            source: PostSource::channel("MentalHealthSupport"),
            author: "Alex Recovery".into(),
            text: "Day 127 sober from alcohol and I'm struggling with anxiety attacks. They're getting more frequent and intense. I've been to AA meetings but I think I need professional help for the anxiety too. My sponsor suggested finding a therapist who specializes in addiction and anxiety disorders. Does anyone know how to find affordable mental health care? My job doesn't offer great insurance.".into(),
            url: "https://youtube.com/watch?v=abc123".into(),
            timestamp: at(8, 20, 9, 15),
            keyword_hits: hits(&["127 days sober", "anxiety attacks", "need professional help", "affordable mental health care"]),
            relevance_score: Some(4),
            label: Some(Label::PotentialLead),
            risk_level: Some(RiskLevel::High),
            status: Status::Assigned,
            assignee_id: Some(UserId::new("2")),
            last_update: at(8, 20, 9, 45),
            notes: vec![note(
                "note_1",
                "2",
                "2",
                "Person is in recovery but needs dual diagnosis support. Reached out via YouTube comment.",
                at(8, 20, 9, 45),
            )],
            outreach_events: vec![first_contact(
                "outreach_1",
                "2",
                "2",
                "Sent supportive YouTube comment with resource information",
                at(8, 20, 9, 45),
            )],
            audit: vec![
                created("audit_2", "2", "youtube_ingestion", at(8, 20, 9, 15)),
                AuditEvent {
                    id: "audit_3".into(),
                    post_id: "2".into(),
                    actor_user_id: "2".into(),
                    event_type: AuditEventType::Assign,
                    payload: payload(json!({ "assignee_id": "2" })),
                    at: at(8, 20, 9, 45),
                },
            ],
        },
        Post {
            id: "3".into(),
            platform: Platform::Reddit,
            source: PostSource::subreddit("r/mentalhealth"),
            author: "wellness_journey_99".into(),
            text: "Just wanted to share that I've been in therapy for 2 years now and it's completely changed my life! I was struggling with panic attacks and social anxiety, but with the right therapist and some medication, I'm doing so much better. For anyone on the fence about getting help, please don't wait like I did. There are sliding scale options and community mental health centers that can help.".into(),
            url: "https://reddit.com/r/mentalhealth/post456".into(),
            timestamp: at(8, 20, 8, 22),
            keyword_hits: hits(&["therapy for 2 years", "panic attacks", "social anxiety", "sliding scale options"]),
            relevance_score: Some(2),
            label: Some(Label::NotRelevant),
            risk_level: Some(RiskLevel::Low),
            status: Status::ClosedNoFit,
            assignee_id: None,
            last_update: at(8, 20, 8, 22),
            notes: Vec::new(),
            outreach_events: Vec::new(),
            audit: vec![created("audit_4", "3", "reddit_ingestion", at(8, 20, 8, 22))],
        },
        Post {
            id: "4".into(),
            platform: Platform::Reddit,
            source: PostSource::subreddit("r/addiction"),
            author: "clean_and_confused".into(),
            text: "I've been clean from opioids for 8 months but I'm having a really hard time with the emotional side of recovery. I feel empty and numb most of the time. My counselor at the rehab center said I might have underlying depression that was masked by my drug use. I need to find a therapist who understands addiction but my insurance is complicated and I don't know where to start looking. The thought of calling around to find someone feels overwhelming.".into(),
            url: "https://reddit.com/r/addiction/post789".into(),
            timestamp: at(8, 19, 16, 45),
            keyword_hits: hits(&["clean from opioids", "underlying depression", "insurance is complicated", "feels overwhelming"]),
            relevance_score: Some(4),
            label: Some(Label::PotentialLead),
            risk_level: Some(RiskLevel::High),
            status: Status::InOutreach,
            assignee_id: Some(UserId::new("3")),
            last_update: at(8, 19, 17, 30),
            notes: vec![note(
                "note_2",
                "4",
                "3",
                "Person in recovery needs dual diagnosis support. Reached out with insurance navigation help.",
                at(8, 19, 17, 30),
            )],
            outreach_events: vec![first_contact(
                "outreach_2",
                "4",
                "3",
                "Sent Reddit DM with insurance navigation resources and therapist directory",
                at(8, 19, 17, 30),
            )],
            audit: vec![created("audit_5", "4", "reddit_ingestion", at(8, 19, 16, 45))],
        },
        Post {
            id: "5".into(),
            platform: Platform::Youtube,
            source: PostSource::channel("AnxietySupport"),
            author: "Jennifer Anxious".into(),
            text: "Comment: I've been having panic attacks for 3 years and they're getting worse. I can't drive anymore because I'm afraid I'll have an attack while driving. I've tried meditation apps and breathing exercises but nothing works. My doctor wants to prescribe anti-anxiety medication but I'm scared of becoming dependent. I know I need therapy but I live in a small town and there aren't many options. Has anyone done online therapy? Is it effective?".into(),
            url: "https://youtube.com/watch?v=def456".into(),
            timestamp: at(8, 19, 14, 12),
            keyword_hits: hits(&["panic attacks for 3 years", "can't drive", "scared of becoming dependent", "small town", "online therapy"]),
            relevance_score: Some(4),
            label: Some(Label::PotentialLead),
            risk_level: Some(RiskLevel::Medium),
            status: Status::WaitingReply,
            assignee_id: Some(UserId::new("4")),
            last_update: at(8, 19, 15, 0),
            notes: vec![note(
                "note_3",
                "5",
                "4",
                "Person with severe panic disorder in rural area. Provided telehealth options.",
                at(8, 19, 15, 0),
            )],
            outreach_events: vec![first_contact(
                "outreach_3",
                "5",
                "4",
                "Sent supportive comment with telehealth therapy resources",
                at(8, 19, 15, 0),
            )],
            audit: vec![created("audit_6", "5", "youtube_ingestion", at(8, 19, 14, 12))],
        },
    ]
}
