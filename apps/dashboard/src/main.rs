use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use client_core::{
    actions::{dispatch_bulk, selection_label, PostAction},
    audit_trail,
    config::{load_settings, Settings},
    directory::UserDirectory,
    listing::Searchable,
    views::{CommentRow, MediaItemRow, PostRow},
    workers::{self, WorkerForm, ERROR_TITLE},
    FetchOutcome, HttpReviewApi, ListView, MediaItemPage, Notification, Notifier, PageFetcher,
    PostStore, Session,
};
use shared::{
    domain::{OutreachKind, Platform, PostFilter, PostId, RiskLevel, Status, UserId},
    protocol::{CommentRecord, MediaItemRecord},
    taxonomy,
};
use serde_json::json;
use tokio::sync::broadcast;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod render;

#[derive(Parser, Debug)]
#[command(name = "dashboard", about = "Outreach triage dashboard")]
struct Cli {
    /// Review API base URL.
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[arg(long, global = true)]
    page_size: Option<u32>,
    /// Acting user for demo edits.
    #[arg(long, global = true)]
    actor: Option<UserId>,
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,
    /// Do not send the tunnel bypass header.
    #[arg(long, global = true)]
    no_tunnel_bypass: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ingested posts and videos.
    Queue {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        json: bool,
    },
    Comments {
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Only comments under this media item.
        #[arg(long)]
        media_item: Option<String>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// One media item with a page of its comments.
    MediaItem {
        id: String,
        /// Comments page.
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        json: bool,
    },
    ProcessComments,
    RunWorkers {
        #[arg(long)]
        reddit: bool,
        #[arg(long)]
        youtube: bool,
        /// Comma separated.
        #[arg(long, default_value = "")]
        keywords: String,
        #[arg(long, default_value_t = workers::DEFAULT_WORKER_LIMIT)]
        limit: u32,
    },
    /// Local review workflow on the demo data set.
    Demo {
        #[command(subcommand)]
        command: DemoCommand,
    },
}

#[derive(Subcommand, Debug)]
enum DemoCommand {
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        platform: Option<Platform>,
        #[arg(long)]
        status: Option<Status>,
        #[arg(long)]
        risk: Option<RiskLevel>,
        #[arg(long)]
        assignee: Option<UserId>,
        #[arg(long)]
        min_relevance: Option<u8>,
    },
    Assign {
        user: UserId,
        #[arg(required = true)]
        ids: Vec<PostId>,
    },
    FalsePositive {
        #[arg(required = true)]
        ids: Vec<PostId>,
    },
    SetStatus {
        status: Status,
        #[arg(required = true)]
        ids: Vec<PostId>,
    },
    SetRisk {
        risk: RiskLevel,
        #[arg(required = true)]
        ids: Vec<PostId>,
    },
    Note {
        id: PostId,
        text: String,
    },
    Outreach {
        id: PostId,
        kind: OutreachKind,
        #[arg(default_value = "")]
        details: String,
    },
    Audit {
        id: PostId,
    },
    Users,
}

fn settings(cli: &Cli) -> Settings {
    let mut settings = load_settings();
    if let Some(url) = &cli.api_url {
        settings.api_base_url = url.clone();
    }
    if let Some(size) = cli.page_size.filter(|size| *size > 0) {
        settings.page_size = size;
    }
    if let Some(actor) = &cli.actor {
        settings.actor_user_id = actor.clone();
    }
    if let Some(secs) = cli.timeout_secs.filter(|secs| *secs > 0) {
        settings.request_timeout_secs = secs;
    }
    if cli.no_tunnel_bypass {
        settings.tunnel_bypass_header = false;
    }
    settings
}

fn drain(rx: &mut broadcast::Receiver<Notification>) {
    while let Ok(notice) = rx.try_recv() {
        eprintln!("{}", render::notification(&notice));
    }
}

async fn show_page<T>(
    view: &mut ListView<T>,
    api: &HttpReviewApi,
    page: u32,
    search: Option<String>,
) -> Result<()>
where
    T: Searchable,
    HttpReviewApi: PageFetcher<T>,
{
    if view.load_page(api, page).await == FetchOutcome::Failed {
        bail!("{ERROR_TITLE}: {}", view.last_error().unwrap_or_default());
    }
    filter_page(view, search);
    Ok(())
}

fn filter_page<T: Searchable>(view: &mut ListView<T>, search: Option<String>) {
    if let Some(search) = search {
        view.set_search(search);
    }
}

fn comment_rows(view: &ListView<CommentRecord>, now: DateTime<Utc>) -> Vec<CommentRow> {
    view.visible()
        .into_iter()
        .map(|record| CommentRow::from_record(record, now))
        .collect()
}

async fn run(command: Command, settings: &Settings) -> Result<()> {
    let command = match command {
        Command::Demo { command } => return run_demo(command, settings),
        remote => remote,
    };
    let api = HttpReviewApi::from_settings(settings)
        .with_context(|| format!("invalid api url {}", settings.api_base_url))?;
    let notifier = Notifier::new();
    let mut rx = notifier.subscribe();
    let now = Utc::now();

    match command {
        Command::Queue { page, search, json } => {
            let mut view: ListView<MediaItemRecord> = ListView::new(settings.page_size);
            show_page(&mut view, &api, page, search).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&view.visible())?);
            } else {
                let rows: Vec<MediaItemRow> = view
                    .visible()
                    .into_iter()
                    .map(|record| MediaItemRow::from_record(record, now))
                    .collect();
                println!("{}", render::media_items(&rows));
                println!("{}", render::pager(view.pager(), rows.len()));
            }
        }
        Command::Comments {
            page,
            media_item,
            search,
            json,
        } => {
            let mut view: ListView<CommentRecord> = match media_item {
                Some(id) => ListView::scoped(settings.page_size, id),
                None => ListView::new(settings.page_size),
            };
            show_page(&mut view, &api, page, search).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&view.visible())?);
            } else {
                let rows = comment_rows(&view, now);
                println!("{}", render::comments(&rows));
                println!("{}", render::pager(view.pager(), rows.len()));
            }
        }
        Command::MediaItem {
            id,
            page,
            search,
            json,
        } => {
            let mut loaded = match MediaItemPage::open(&api, &id, settings.page_size, page).await {
                Ok(loaded) => loaded,
                Err(err) => {
                    workers::notify_failure(&notifier, &err);
                    drain(&mut rx);
                    return Err(err).with_context(|| format!("loading media item {id}"));
                }
            };
            if let Some(err) = loaded.comments.last_error() {
                bail!("{ERROR_TITLE}: {err}");
            }
            filter_page(&mut loaded.comments, search);

            let MediaItemPage { item, comments } = &loaded;
            if json {
                let body = json!({ "item": item, "comments": comments.visible() });
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                let row = MediaItemRow::from_record(item, now);
                println!("{} ({}, {})", item.title, row.platform, row.status);
                println!("author: {}  risk: {}  score: {}", row.author, row.risk, row.score);
                println!("created: {}  fetched: {}", row.created, row.fetched);
                if let Some(url) = &item.url {
                    println!("url: {url}");
                }
                println!();
                println!("{}", item.body.as_deref().unwrap_or(taxonomy::PLACEHOLDER));
                println!();
                let rows = comment_rows(comments, now);
                println!("{}", render::comments(&rows));
                println!("{}", render::pager(comments.pager(), rows.len()));
            }
        }
        Command::ProcessComments => {
            let result = workers::process_comments(&api, &notifier).await;
            drain(&mut rx);
            result?;
        }
        Command::RunWorkers {
            reddit,
            youtube,
            keywords,
            limit,
        } => {
            let form = WorkerForm {
                reddit,
                youtube,
                keywords,
                limit,
            };
            let result = workers::run_workers(&api, &notifier, &form.request()).await;
            drain(&mut rx);
            result?;
        }
        Command::Demo { command } => return run_demo(command, settings),
    }

    drain(&mut rx);
    Ok(())
}

fn print_posts(store: &PostStore, directory: &UserDirectory, ids: &[PostId]) {
    let now = Utc::now();
    let rows: Vec<PostRow> = store
        .posts()
        .iter()
        .filter(|post| ids.is_empty() || ids.contains(&post.id))
        .map(|post| PostRow::from_post(post, directory, now))
        .collect();
    println!("{}", render::posts(&rows));
}

fn run_demo(command: DemoCommand, settings: &Settings) -> Result<()> {
    let mut store = PostStore::demo(Session::new(settings.actor_user_id.clone()));
    let directory = UserDirectory::demo();
    let mut rx = store.subscribe_notifications();

    let touched = match command {
        DemoCommand::List {
            search,
            platform,
            status,
            risk,
            assignee,
            min_relevance,
        } => {
            let filter = PostFilter {
                search,
                platform,
                status,
                risk_level: risk,
                assignee,
                min_relevance,
                ..PostFilter::default()
            };
            let ids: Vec<PostId> = store
                .filter(&filter)
                .into_iter()
                .map(|post| post.id.clone())
                .collect();
            if ids.is_empty() {
                println!("no posts match");
                return Ok(());
            }
            ids
        }
        DemoCommand::Assign { user, ids } => {
            if directory.get(&user).is_none() {
                bail!("unknown user {user}");
            }
            bulk(&mut store, ids, PostAction::AssignTo(user))
        }
        DemoCommand::FalsePositive { ids } => bulk(&mut store, ids, PostAction::MarkFalsePositive),
        DemoCommand::SetStatus { status, ids } => bulk(&mut store, ids, PostAction::SetStatus(status)),
        DemoCommand::SetRisk { risk, ids } => bulk(&mut store, ids, PostAction::SetRisk(risk)),
        DemoCommand::Note { id, text } => {
            store.add_note(&id, text);
            vec![id]
        }
        DemoCommand::Outreach { id, kind, details } => {
            store.log_outreach(&id, kind, details);
            vec![id]
        }
        DemoCommand::Audit { id } => {
            let post = store
                .get(&id)
                .with_context(|| format!("no post with id {id}"))?;
            let entries = audit_trail::entries(&post.audit, &directory, Utc::now());
            println!("{}", render::audit(&entries));
            return Ok(());
        }
        DemoCommand::Users => {
            println!("{}", render::users(directory.users()));
            return Ok(());
        }
    };

    drain(&mut rx);
    print_posts(&store, &directory, &touched);
    Ok(())
}

fn bulk(store: &mut PostStore, ids: Vec<PostId>, action: PostAction) -> Vec<PostId> {
    eprintln!("{}", selection_label(ids.len()));
    dispatch_bulk(store, &ids, &action);
    ids
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = settings(&cli);
    debug!(
        api = %settings.api_base_url,
        page_size = settings.page_size,
        actor = %settings.actor_user_id,
        "settings loaded"
    );

    run(cli.command, &settings).await
}
