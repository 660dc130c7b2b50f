use std::path::PathBuf;

use blog_client::api::types::{LoginRequest, PostDraft, ProfileUpdate, RegisterRequest};
use blog_client::api::{PageRequest, comments, posts, tags, users};
use blog_client::config::{
    DEFAULT_BASE_URL, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_CREDENTIALS_PATH, DEFAULT_REQUEST_TIMEOUT_SECS, Timeouts,
};
use blog_client::{ClientConfig, ClientError, ConfigError, Session};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("not signed in; run `blog login` first")]
    NotSignedIn,
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Client(#[from] ClientError),
    #[error("failed to read {path}: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("invalid JSON output: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "blog", about = "Blog API client")]
struct Cli {
    #[arg(long, env = "BLOG_API_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    #[arg(long, env = "BLOG_CREDENTIALS_PATH", default_value = DEFAULT_CREDENTIALS_PATH)]
    credentials_path: PathBuf,

    #[arg(
        long,
        env = "BLOG_REQUEST_TIMEOUT_SECS",
        default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    request_timeout_secs: u64,

    #[arg(
        long,
        env = "BLOG_CONNECT_TIMEOUT_SECS",
        default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    connect_timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and store the issued tokens.
    Login {
        #[arg(long)]
        user_name: String,
        #[arg(long, env = "BLOG_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account. Does not sign in.
    Register {
        #[arg(long)]
        user_name: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long, env = "BLOG_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Logout,
    /// Verify the stored session and print the signed-in user.
    Whoami,
    ForgotPassword {
        user_name: String,
    },
    ResetPassword {
        #[arg(long)]
        token: String,
        #[arg(long, env = "BLOG_NEW_PASSWORD", hide_env_values = true)]
        new_password: String,
    },
    Posts(PostsCommand),
    Comments(CommentsCommand),
    Tags(TagsCommand),
    Users(UsersCommand),
}

#[derive(Args, Debug)]
struct PageArgs {
    #[arg(long, default_value_t = 0)]
    page: u32,
    #[arg(long, default_value_t = blog_client::api::DEFAULT_PAGE_SIZE)]
    size: u32,
}

impl From<PageArgs> for PageRequest {
    fn from(args: PageArgs) -> Self {
        PageRequest::new(args.page, args.size)
    }
}

#[derive(Args, Debug)]
struct DraftArgs {
    #[arg(long)]
    title: String,
    #[arg(long)]
    content: String,
    #[arg(long = "tag")]
    tags: Vec<String>,
}

impl From<DraftArgs> for PostDraft {
    fn from(args: DraftArgs) -> Self {
        PostDraft { post_title: args.title, post_content: args.content, tags: args.tags }
    }
}

#[derive(Args, Debug)]
struct PostsCommand {
    #[command(subcommand)]
    command: PostsSubcommand,
}

#[derive(Subcommand, Debug)]
enum PostsSubcommand {
    List {
        #[command(flatten)]
        page: PageArgs,
        #[arg(long)]
        tag: Option<String>,
    },
    Search {
        query: String,
        #[command(flatten)]
        page: PageArgs,
    },
    Show {
        id: i64,
    },
    ByUser {
        user_id: i64,
        #[command(flatten)]
        page: PageArgs,
    },
    Create {
        #[command(flatten)]
        draft: DraftArgs,
        #[arg(long, help = "Image file to attach")]
        image: Option<PathBuf>,
    },
    Update {
        id: i64,
        #[command(flatten)]
        draft: DraftArgs,
    },
    Delete {
        id: i64,
    },
    /// Like or unlike a post as the signed-in user.
    Like {
        id: i64,
    },
    Likes {
        id: i64,
    },
}

#[derive(Args, Debug)]
struct CommentsCommand {
    #[command(subcommand)]
    command: CommentsSubcommand,
}

#[derive(Subcommand, Debug)]
enum CommentsSubcommand {
    List {
        post_id: i64,
    },
    Add {
        post_id: i64,
        #[arg(long)]
        content: String,
    },
    Delete {
        comment_id: i64,
    },
}

#[derive(Args, Debug)]
struct TagsCommand {
    #[command(subcommand)]
    command: TagsSubcommand,
}

#[derive(Subcommand, Debug)]
enum TagsSubcommand {
    List,
    Show { slug: String },
    Create { name: String },
}

#[derive(Args, Debug)]
struct UsersCommand {
    #[command(subcommand)]
    command: UsersSubcommand,
}

#[derive(Subcommand, Debug)]
enum UsersSubcommand {
    Me,
    Show {
        id: i64,
    },
    Update {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        avatar_url: Option<String>,
    },
    Password {
        #[arg(long, env = "BLOG_PASSWORD", hide_env_values = true)]
        current: String,
        #[arg(long, env = "BLOG_NEW_PASSWORD", hide_env_values = true)]
        new: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut config = ClientConfig::new(&cli.base_url)?;
    config.timeouts = Timeouts { request_secs: cli.request_timeout_secs, connect_secs: cli.connect_timeout_secs };
    config.credentials_path = cli.credentials_path;
    let session = Session::connect(&config)?;
    tracing::debug!(base_url = %config.base_url, store = %config.credentials_path.display(), "client configured");

    match cli.command {
        Command::Login { user_name, password } => {
            let user = session.sign_in(&LoginRequest { user_name, password }).await?;
            print_json(&user)
        }
        Command::Register { user_name, first_name, last_name, password } => {
            let user = session.sign_up(&RegisterRequest { user_name, first_name, last_name, password }).await?;
            print_json(&user)
        }
        Command::Logout => {
            session.sign_out().await;
            println!("signed out");
            Ok(())
        }
        Command::Whoami => run_whoami(&session).await,
        Command::ForgotPassword { user_name } => {
            session.forgot_password(&user_name).await?;
            println!("reset instructions requested for {user_name}");
            Ok(())
        }
        Command::ResetPassword { token, new_password } => {
            session.reset_password(&token, &new_password).await?;
            println!("password reset");
            Ok(())
        }
        Command::Posts(cmd) => run_posts(&session, cmd).await,
        Command::Comments(cmd) => run_comments(&session, cmd).await,
        Command::Tags(cmd) => run_tags(&session, cmd).await,
        Command::Users(cmd) => run_users(&session, cmd).await,
    }
}

async fn run_whoami(session: &Session) -> Result<(), CliError> {
    let state = session.initialize().await;
    if !state.is_authenticated {
        return Err(CliError::NotSignedIn);
    }
    match state.user {
        Some(user) => print_json(&user),
        None => print_json(&users::me(session.client()).await?),
    }
}

async fn run_posts(session: &Session, cmd: PostsCommand) -> Result<(), CliError> {
    let client = session.client();
    match cmd.command {
        PostsSubcommand::List { page, tag } => print_json(&posts::list(client, page.into(), tag.as_deref()).await?),
        PostsSubcommand::Search { query, page } => print_json(&posts::search(client, &query, page.into()).await?),
        PostsSubcommand::Show { id } => print_json(&posts::get(client, id).await?),
        PostsSubcommand::ByUser { user_id, page } => print_json(&posts::by_user(client, user_id, page.into()).await?),
        PostsSubcommand::Create { draft, image } => {
            let draft = PostDraft::from(draft);
            let created = match image {
                Some(path) => posts::create_with_image(client, &draft, read_image(path).await?).await?,
                None => posts::create(client, &draft).await?,
            };
            print_json(&created)
        }
        PostsSubcommand::Update { id, draft } => print_json(&posts::update(client, id, &draft.into()).await?),
        PostsSubcommand::Delete { id } => {
            posts::delete(client, id).await?;
            println!("deleted post {id}");
            Ok(())
        }
        PostsSubcommand::Like { id } => {
            let username = signed_in_username(session)?;
            print_json(&posts::toggle_like(client, id, &username).await?)
        }
        PostsSubcommand::Likes { id } => print_json(&posts::likes(client, id).await?),
    }
}

async fn run_comments(session: &Session, cmd: CommentsCommand) -> Result<(), CliError> {
    let client = session.client();
    match cmd.command {
        CommentsSubcommand::List { post_id } => print_json(&comments::list(client, post_id).await?),
        CommentsSubcommand::Add { post_id, content } => {
            let username = signed_in_username(session)?;
            print_json(&comments::add(client, post_id, &content, &username).await?)
        }
        CommentsSubcommand::Delete { comment_id } => {
            let username = signed_in_username(session)?;
            comments::delete(client, comment_id, &username).await?;
            println!("deleted comment {comment_id}");
            Ok(())
        }
    }
}

async fn run_tags(session: &Session, cmd: TagsCommand) -> Result<(), CliError> {
    let client = session.client();
    match cmd.command {
        TagsSubcommand::List => print_json(&tags::list(client).await?),
        TagsSubcommand::Show { slug } => print_json(&tags::by_slug(client, &slug).await?),
        TagsSubcommand::Create { name } => print_json(&tags::create(client, &name).await?),
    }
}

async fn run_users(session: &Session, cmd: UsersCommand) -> Result<(), CliError> {
    let client = session.client();
    match cmd.command {
        UsersSubcommand::Me => print_json(&users::me(client).await?),
        UsersSubcommand::Show { id } => print_json(&users::profile(client, id).await?),
        UsersSubcommand::Update { first_name, last_name, avatar_url } => {
            let update = ProfileUpdate { first_name, last_name, avatar_url };
            print_json(&users::update_me(client, &update).await?)
        }
        UsersSubcommand::Password { current, new } => {
            users::change_password(client, &current, &new).await?;
            println!("password changed");
            Ok(())
        }
    }
}

fn signed_in_username(session: &Session) -> Result<String, CliError> {
    session.credentials().username().map(str::to_owned).ok_or(CliError::NotSignedIn)
}

async fn read_image(path: PathBuf) -> Result<posts::ImageUpload, CliError> {
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|source| CliError::ReadFile { path: path.clone(), source })?;
    let file_name = path
        .file_name()
        .map_or_else(|| "image".to_owned(), |name| name.to_string_lossy().into_owned());
    let mime = image_mime(&file_name).to_owned();
    Ok(posts::ImageUpload { file_name, mime, bytes })
}

fn image_mime(file_name: &str) -> &'static str {
    let ext = file_name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
