use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use corpcrunch_client::models::{
    CreateCategoryRequest, CreatePostRequest, LoginRequest, Post, PostListQuery, RankedPost,
    RegisterRequest, TranslateRequest, UpdatePostRequest,
};
use corpcrunch_client::{CorpCrunchClientError, HttpClient};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(author, version, about = "CorpCrunch admin and reader CLI", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        env = "CORPCRUNCH_SERVER",
        default_value = "http://localhost:3000"
    )]
    server: String,

    #[arg(long)]
    token_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register an admin account (only when the server allows it)
    Register {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },

    Login {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        password: String,
    },

    Logout,

    Status,

    CreatePost {
        #[arg(short, long)]
        title: String,

        #[arg(short, long)]
        content: String,

        #[arg(long)]
        category_id: i64,

        #[command(flatten)]
        fields: PostFields,
    },

    UpdatePost {
        #[arg(short, long)]
        id: i64,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        content: Option<String>,

        #[arg(long)]
        category_id: Option<i64>,

        /// Remove the banner image
        #[arg(long, conflicts_with = "banner")]
        clear_banner: bool,

        /// Remove the publish date
        #[arg(long, conflicts_with = "publish_date")]
        clear_publish_date: bool,

        #[command(flatten)]
        fields: PostFields,
    },

    /// List posts in every status (admin)
    List {
        #[arg(short, long, default_value_t = 10)]
        limit: i64,

        #[arg(short, long, default_value_t = 0)]
        offset: i64,

        #[arg(long)]
        status: Option<String>,

        #[arg(long)]
        category_id: Option<i64>,
    },

    CreateCategory {
        #[arg(short, long)]
        name: String,

        #[arg(long)]
        slug: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(long)]
        inactive: bool,
    },

    Categories,

    /// Ranked lists for one category
    Category {
        #[arg(long)]
        slug: String,
    },

    Trending {
        #[arg(long)]
        per_bucket: Option<usize>,
    },

    Get {
        #[arg(long)]
        slug: String,
    },

    Translate {
        #[arg(long)]
        text: String,

        #[arg(long, default_value = "en")]
        from: String,

        #[arg(long)]
        to: String,
    },

    TranslatePost {
        #[arg(long)]
        slug: String,

        #[arg(long)]
        lang: String,
    },

    /// Trigger the scheduled publish sweep, once or every --watch seconds
    PublishScheduled {
        #[arg(long, env = "CRON_SECRET", hide_env_values = true)]
        secret: Option<String>,

        #[arg(long, value_name = "SECS")]
        watch: Option<u64>,
    },
}

#[derive(Args)]
struct PostFields {
    #[arg(long)]
    slug: Option<String>,

    #[arg(long)]
    banner: Option<String>,

    /// draft, review, scheduled or published
    #[arg(long)]
    status: Option<String>,

    /// RFC 3339 timestamp, e.g. 2026-05-01T09:00:00Z
    #[arg(long, value_parser = parse_datetime)]
    publish_date: Option<DateTime<Utc>>,

    /// public, private, internal or members-only
    #[arg(long)]
    visibility: Option<String>,

    #[arg(long)]
    language: Option<String>,

    /// article, video or magazine
    #[arg(long)]
    content_type: Option<String>,
}

struct TokenManager {
    token_path: PathBuf,
}

impl TokenManager {
    fn new(custom_path: Option<PathBuf>) -> Result<Self> {
        let token_path = match custom_path {
            Some(path) => path,
            None => {
                let home = dirs::home_dir().context("Failed to get home directory")?;
                home.join(".corpcrunch_token")
            }
        };

        Ok(Self { token_path })
    }

    fn save_token(&self, token: &str) -> Result<()> {
        fs::write(&self.token_path, token)
            .with_context(|| format!("Failed to save token to {:?}", self.token_path))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&self.token_path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&self.token_path, perms)?;
        }

        println!("✓ Token saved to {:?}", self.token_path);
        Ok(())
    }

    fn load_token(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.token_path) {
            Ok(token) => {
                let token = token.trim().to_string();
                if token.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(token))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).context("Failed to read token file"),
        }
    }

    fn clear_token(&self) -> Result<bool> {
        if !self.token_path.exists() {
            return Ok(false);
        }
        fs::remove_file(&self.token_path)
            .with_context(|| format!("Failed to remove token file {:?}", self.token_path))?;
        Ok(true)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut client =
        HttpClient::new(cli.server.clone()).context("Failed to initialize HTTP client")?;

    let token_manager = TokenManager::new(cli.token_file)?;
    if let Some(token) = token_manager.load_token()? {
        client.set_token(token);
    }

    match cli.command {
        Commands::Register {
            username,
            email,
            password,
        } => {
            println!("📝 Registering admin: {}", username);

            let req = RegisterRequest {
                username,
                email,
                password,
            };
            match client.register(req).await {
                Ok(response) => {
                    println!("{}", "✅ Registration successful!".green());
                    println!("   Admin ID: {}", response.admin.id);
                    println!("   Username: {}", response.admin.username);
                    println!("   Email: {}", response.admin.email);

                    token_manager.save_token(&response.token)?;
                }
                Err(e) => fail("Registration failed", &e),
            }
        }

        Commands::Login { username, password } => {
            println!("🔑 Logging in as: {}", username);

            match client.login(LoginRequest { username, password }).await {
                Ok(response) => {
                    println!("{}", "✅ Login successful!".green());
                    println!("   Admin ID: {}", response.admin.id);
                    println!("   Username: {}", response.admin.username);

                    token_manager.save_token(&response.token)?;
                }
                Err(e) => fail("Login failed", &e),
            }
        }

        Commands::Logout => {
            if token_manager.clear_token()? {
                println!("✓ Token file removed");
            } else {
                println!("No saved token");
            }
        }

        Commands::Status => match token_manager.load_token()? {
            Some(token) => {
                println!("🔑 Token file: {:?}", token_manager.token_path);
                println!("   Token: {}...", truncate(&token, 20));
                println!("   Length: {} characters", token.len());
                println!("   Server: {}", cli.server);
            }
            None => {
                println!("{}", "❌ No token found".red());
                println!("   Please login first: corpcrunch login --username <username> --password <password>");
            }
        },

        Commands::CreatePost {
            title,
            content,
            category_id,
            fields,
        } => {
            println!("📝 Creating new post...");

            let req = CreatePostRequest {
                title,
                content,
                category_id,
                slug: fields.slug,
                banner_image_url: fields.banner,
                publish_status: fields.status,
                publish_date: fields.publish_date,
                visibility: fields.visibility,
                language: fields.language,
                content_type: fields.content_type,
            };
            match client.create_post(&req).await {
                Ok(post) => {
                    println!("{}", "✅ Post created successfully!".green());
                    print_post(&post);
                }
                Err(e) => fail("Failed to create post", &e),
            }
        }

        Commands::UpdatePost {
            id,
            title,
            content,
            category_id,
            clear_banner,
            clear_publish_date,
            fields,
        } => {
            let req = UpdatePostRequest {
                title,
                content,
                slug: fields.slug,
                banner_image_url: clearable(fields.banner, clear_banner),
                category_id,
                publish_status: fields.status,
                publish_date: clearable(fields.publish_date, clear_publish_date),
                visibility: fields.visibility,
                language: fields.language,
                content_type: fields.content_type,
            };
            if req.is_empty() {
                println!("{}", "❌ Nothing to update, pass at least one field".red());
                std::process::exit(2);
            }

            println!("✏️ Updating post #{}", id);
            match client.update_post(id, &req).await {
                Ok(post) => {
                    println!("{}", "✅ Post updated successfully!".green());
                    print_post(&post);
                }
                Err(e) => fail("Failed to update post", &e),
            }
        }

        Commands::List {
            limit,
            offset,
            status,
            category_id,
        } => {
            println!("📋 Listing posts (limit={}, offset={})", limit, offset);

            let query = PostListQuery {
                limit: Some(limit),
                offset: Some(offset),
                status,
                category_id,
            };
            match client.list_admin_posts(&query).await {
                Ok(response) => {
                    println!(
                        "✅ Found {} posts (total: {})",
                        response.posts.len(),
                        response.total
                    );
                    println!();

                    if response.posts.is_empty() {
                        println!("   No posts found");
                    }
                    for (i, post) in response.posts.iter().enumerate() {
                        println!(
                            "   {}. [{}] {} ({}, {})",
                            i + 1,
                            post.id,
                            post.title.bold(),
                            post.publish_status,
                            post.visibility
                        );
                        println!("      Slug: {}", post.slug);
                        if let Some(date) = post.publish_date {
                            println!("      Publish date: {}", date);
                        }
                        println!("      Content: {}", truncate(&post.content, 50));
                        println!();
                    }
                }
                Err(e) => fail("Failed to list posts", &e),
            }
        }

        Commands::CreateCategory {
            name,
            slug,
            description,
            inactive,
        } => {
            let req = CreateCategoryRequest {
                name,
                slug,
                description,
                is_active: Some(!inactive),
            };
            match client.create_category(&req).await {
                Ok(category) => {
                    println!("{}", "✅ Category created!".green());
                    println!("   ID: {}", category.id);
                    println!("   Name: {}", category.name);
                    println!("   Slug: {}", category.slug);
                    println!("   Active: {}", category.is_active);
                }
                Err(e) => fail("Failed to create category", &e),
            }
        }

        Commands::Categories => match client.list_categories().await {
            Ok(categories) => {
                if categories.is_empty() {
                    println!("   No active categories");
                }
                for category in categories {
                    println!("   [{}] {} ({})", category.id, category.name.bold(), category.slug);
                    if let Some(description) = category.description {
                        println!("      {}", truncate(&description, 70));
                    }
                }
            }
            Err(e) => fail("Failed to list categories", &e),
        },

        Commands::Category { slug } => match client.category_page(&slug).await {
            Ok(page) => {
                println!(
                    "📂 {} ({} visible posts)",
                    page.category.name.bold(),
                    page.total_posts
                );
                print_ranked("Trending", &page.trending);
                print_ranked("Most viewed", &page.most_viewed);
                print_ranked("Newest", &page.newest);
            }
            Err(e) => fail("Failed to load category", &e),
        },

        Commands::Trending { per_bucket } => match client.trending(per_bucket).await {
            Ok(buckets) => {
                print_ranked("News", &buckets.news);
                print_ranked("Articles", &buckets.articles);
                print_ranked("Stories", &buckets.stories);
                print_ranked("Videos", &buckets.videos);
            }
            Err(e) => fail("Failed to load trending posts", &e),
        },

        Commands::Get { slug } => match client.get_post(&slug).await {
            Ok(post) => {
                print_post(&post);
                println!();
                println!("{}", post.content);
            }
            Err(e) => fail("Failed to load post", &e),
        },

        Commands::Translate { text, from, to } => {
            let req = TranslateRequest {
                text,
                source_lang: from,
                target_lang: to,
            };
            match client.translate(&req).await {
                Ok(translation) => {
                    if translation.degraded {
                        println!("{}", "⚠ Translation unavailable, original text returned".yellow());
                    }
                    println!("{}", translation.text);
                    if let Some(provider) = translation.provider {
                        let cached = if translation.cached { ", cached" } else { "" };
                        println!("   ({}{})", provider, cached);
                    }
                }
                Err(e) => fail("Translation failed", &e),
            }
        }

        Commands::TranslatePost { slug, lang } => match client.translate_post(&slug, &lang).await
        {
            Ok(translated) => {
                if translated.degraded {
                    println!("{}", "⚠ Translation unavailable, original text returned".yellow());
                }
                println!(
                    "🌐 {} ({} → {})",
                    translated.title.bold(),
                    translated.source_language,
                    translated.language
                );
                println!();
                println!("{}", translated.content);
            }
            Err(e) => fail("Translation failed", &e),
        },

        Commands::PublishScheduled { secret, watch } => match watch {
            None => match client.publish_scheduled(secret.as_deref()).await {
                Ok(report) => print_sweep(&report),
                Err(e) => fail("Publish sweep failed", &e),
            },
            Some(secs) => {
                let secs = secs.max(1);
                println!("⏱ Triggering publish sweep every {}s (Ctrl-C to stop)", secs);

                let mut ticker = tokio::time::interval(Duration::from_secs(secs));
                loop {
                    tokio::select! {
                        _ = ticker.tick() => {
                            match client.publish_scheduled(secret.as_deref()).await {
                                Ok(report) => print_sweep(&report),
                                Err(e) if matches!(e, CorpCrunchClientError::Conflict(_)) => {
                                    println!("   Previous sweep still running, skipped");
                                }
                                Err(e) => eprintln!("{} {}", "❌ Publish sweep failed:".red(), e),
                            }
                        }
                        _ = tokio::signal::ctrl_c() => {
                            println!("Stopped");
                            break;
                        }
                    }
                }
            }
        },
    }

    Ok(())
}

/// `Some(None)` asks the server to clear the field.
fn clearable<T>(value: Option<T>, clear: bool) -> Option<Option<T>> {
    if clear {
        Some(None)
    } else {
        value.map(Some)
    }
}

fn fail(action: &str, err: &CorpCrunchClientError) -> ! {
    eprintln!("{} {}", format!("❌ {}:", action).red(), err);
    if err.is_unauthorized() {
        eprintln!("   Please login first: corpcrunch login --username <username> --password <password>");
    } else if let CorpCrunchClientError::RateLimited {
        retry_after: Some(secs),
        ..
    } = err
    {
        eprintln!("   Retry in {} seconds", secs);
    }
    std::process::exit(1);
}

fn print_post(post: &Post) {
    println!("   ID: {}", post.id);
    println!("   Title: {}", post.title);
    println!("   Slug: {}", post.slug);
    println!("   Status: {}", post.publish_status);
    if let Some(date) = post.publish_date {
        println!("   Publish date: {}", date);
    }
    println!("   Visibility: {}", post.visibility);
    println!("   Type: {} ({})", post.content_type, post.language);
    println!("   Views: {}  Shares: {}", post.views_count, post.shares_count);
}

fn print_ranked(title: &str, posts: &[RankedPost]) {
    println!();
    println!("{}", title.bold().underline());
    if posts.is_empty() {
        println!("   (none)");
    }
    for (i, ranked) in posts.iter().enumerate() {
        println!(
            "   {}. {} [{}] score={} views={} shares={}",
            i + 1,
            ranked.post.title,
            ranked.post.slug,
            ranked.score,
            ranked.post.views_count,
            ranked.post.shares_count
        );
    }
}

fn print_sweep(report: &corpcrunch_client::models::SweepReport) {
    println!(
        "✅ Sweep at {}: {} published, {} skipped, {} failed",
        report.checked_at,
        report.published.len(),
        report.skipped.len(),
        report.errors.len()
    );
    for post in &report.published {
        println!("   + [{}] {}", post.id, post.slug);
    }
    for error in &report.errors {
        println!("   {} [{}] {}: {}", "!".red(), error.id, error.slug, error.error);
    }
}

fn parse_datetime(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 timestamp: {}", e))
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
