use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};

use gram_app::backend::{FileUpload, HttpBackend};
use gram_app::infrastructure::settings::Settings;
use gram_app::infrastructure::{init_logging, session_file};
use gram_app::routes::Route;
use gram_app::sync::{FetchState, filter_users};
use gram_app::{
    AuthService, CreatePostRequest, DomainError, Post, PostService, SigninRequest, SignupRequest,
    UpdatePostRequest, UpdateProfileRequest, User, UserService,
};

const SESSION_FILE: &str = ".gram_session";

#[derive(Debug, Parser)]
#[command(name = "gram-cli", version, about = "CLI клиент социальной ленты")]
struct Cli {
    /// Адрес бэкенда (по умолчанию из GRAM_ENDPOINT).
    #[arg(long, global = true)]
    endpoint: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Регистрация пользователя.
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Вход пользователя.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Выход: сессия уничтожается на бэкенде и локально.
    Logout,
    /// Текущий пользователь.
    Whoami,
    /// Создание поста с изображением (требует вход).
    CreatePost {
        #[arg(long)]
        caption: String,
        /// Путь к файлу изображения.
        #[arg(long)]
        image: PathBuf,
        #[arg(long)]
        location: String,
        /// Теги через запятую.
        #[arg(long, default_value = "")]
        tags: String,
    },
    /// Обновление поста (требует вход).
    ///
    /// Поля, не указанные явно, берутся из текущего поста.
    UpdatePost {
        #[arg(long)]
        id: String,
        #[arg(long)]
        caption: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        tags: Option<String>,
        /// Новый файл изображения; без него прежнее изображение
        /// остаётся как есть.
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Удаление поста вместе с файлом изображения (требует вход).
    DeletePost {
        #[arg(long)]
        id: String,
    },
    /// Просмотр поста по идентификатору.
    GetPost {
        #[arg(long)]
        id: String,
    },
    /// Главная лента: последние посты.
    Feed,
    /// Лента «обзор» с курсорной пагинацией и поиском по подписи.
    Explore {
        /// Поисковый запрос по подписи поста.
        #[arg(long)]
        search: Option<String>,
        /// Идентификатор поста, после которого продолжить выдачу.
        #[arg(long)]
        after: Option<String>,
    },
    /// Список пользователей с клиентским поиском.
    Users {
        #[arg(long)]
        limit: Option<u32>,
        /// Фильтр по логину или имени (без учёта регистра).
        #[arg(long)]
        search: Option<String>,
    },
    /// Профиль пользователя и его посты.
    Profile {
        #[arg(long)]
        id: String,
    },
    /// Посты, лайкнутые пользователем.
    LikedPosts {
        #[arg(long)]
        id: String,
    },
    /// Лайк/снятие лайка текущим пользователем (требует вход).
    Like {
        #[arg(long)]
        id: String,
    },
    /// Добавить пост в закладки (требует вход).
    Save {
        #[arg(long)]
        id: String,
    },
    /// Убрать пост из закладок по идентификатору записи (требует вход).
    Unsave {
        #[arg(long)]
        id: String,
    },
    /// Закладки текущего пользователя (требует вход).
    Saved,
    /// Обновление профиля текущего пользователя (требует вход).
    ///
    /// Поля, не указанные явно, берутся из текущего профиля.
    UpdateProfile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        bio: Option<String>,
        /// Новый аватар; без него прежний остаётся как есть.
        #[arg(long)]
        avatar: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Ошибка: {err}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut settings = Settings::from_env()?;
    if let Some(endpoint) = cli.endpoint {
        settings.endpoint = normalize_endpoint(endpoint);
    }
    init_logging(&settings.log_level)?;

    let backend = HttpBackend::new(
        &settings.endpoint,
        &settings.project_id,
        &settings.database_id,
        &settings.bucket_id,
    );

    let session_path = Path::new(SESSION_FILE);
    if let Some(secret) =
        session_file::load_session(session_path).context("не удалось прочитать .gram_session")?
    {
        backend.set_session(secret);
    }

    let auth = AuthService::new(backend.clone(), settings.collections());
    let posts = PostService::new(backend.clone(), settings.collections());
    let users = UserService::new(backend.clone(), settings.collections());

    match cli.command {
        Command::Register {
            name,
            username,
            email,
            password,
        } => {
            let user = auth
                .sign_up(SignupRequest {
                    name,
                    username,
                    email: email.clone(),
                    password: password.clone(),
                })
                .await
                .map_err(map_domain_error)?;
            println!("Регистрация успешна");
            print_user(&user);

            // сразу входим, как это делает веб-клиент после регистрации
            auth.sign_in(SigninRequest { email, password })
                .await
                .map_err(map_domain_error)?;
            persist_session(&backend, session_path)?;
        }
        Command::Login { email, password } => {
            let session = auth
                .sign_in(SigninRequest { email, password })
                .await
                .map_err(map_domain_error)?;
            persist_session(&backend, session_path)?;
            println!("Вход выполнен: session={}", session.id);
        }
        Command::Logout => {
            if let Err(err) = auth.sign_out().await {
                eprintln!("Не удалось завершить сессию на бэкенде: {err}");
            }
            session_file::clear_session(session_path)
                .context("не удалось удалить .gram_session")?;
            println!("Выход выполнен");
        }
        Command::Whoami => {
            let user = require_current_user(&auth).await?;
            print_user(&user);
        }
        Command::CreatePost {
            caption,
            image,
            location,
            tags,
        } => {
            let user = require_current_user(&auth).await?;
            let file = read_upload(&image)?;
            let post = posts
                .create_post(
                    CreatePostRequest {
                        creator_id: user.id,
                        caption,
                        location,
                        tags,
                    },
                    Some(file),
                )
                .await
                .map_err(map_domain_error)?;
            println!("Пост создан");
            print_post(&post);
        }
        Command::UpdatePost {
            id,
            caption,
            location,
            tags,
            image,
        } => {
            let current = posts.get_post(&id).await.map_err(map_domain_error)?;
            let file = image.as_deref().map(read_upload).transpose()?;

            let post = posts
                .update_post(
                    UpdatePostRequest {
                        post_id: id,
                        caption: caption.unwrap_or(current.caption),
                        location: location.unwrap_or(current.location),
                        tags: tags.unwrap_or_else(|| current.tags.join(",")),
                        image_id: current.image_id,
                        image_url: current.image_url,
                    },
                    file,
                )
                .await
                .map_err(map_domain_error)?;
            println!("Пост обновлён");
            print_post(&post);
        }
        Command::DeletePost { id } => {
            let post = posts.get_post(&id).await.map_err(map_domain_error)?;
            posts
                .delete_post(&post.id, &post.image_id)
                .await
                .map_err(map_domain_error)?;
            println!("Пост удалён: id={id}");
        }
        Command::GetPost { id } => {
            let post = posts.get_post(&id).await.map_err(map_domain_error)?;
            print_post(&post);
        }
        Command::Feed => {
            let state = FetchState::from(posts.recent_posts().await);
            render_posts("Лента", &state);
        }
        Command::Explore { search, after } => match search {
            Some(term) => {
                let state = FetchState::from(posts.search_posts(&term).await);
                render_posts(&format!("Поиск: {term}"), &state);
            }
            None => {
                let state = FetchState::from(posts.explore_posts(after).await);
                render_posts("Обзор", &state);
            }
        },
        Command::Users { limit, search } => {
            let state = FetchState::from(users.get_users(limit).await);
            match &state {
                FetchState::Pending => println!("Загрузка..."),
                FetchState::Failed(cause) => println!("Не удалось загрузить: {cause}"),
                FetchState::Succeeded(all_users) => {
                    let term = search.unwrap_or_default();
                    let filtered = filter_users(all_users, &term);
                    println!("Пользователей: {}", filtered.len());
                    for user in filtered {
                        println!("- [{}] {} (@{})", user.id, user.name, user.username);
                    }
                }
            }
        }
        Command::Profile { id } => {
            let user = users.get_user(&id).await.map_err(map_domain_error)?;
            print_user(&user);

            let state = FetchState::from(posts.user_posts(&id).await);
            render_posts("Посты", &state);
        }
        Command::LikedPosts { id } => {
            let state = FetchState::from(posts.liked_posts(&id).await);
            render_posts("Лайкнутые посты", &state);
        }
        Command::Like { id } => {
            let user = require_current_user(&auth).await?;
            let post = posts.get_post(&id).await.map_err(map_domain_error)?;

            let liked_now = !post.is_liked_by(&user.id);
            let likes = toggle_like(&post, &user.id);
            posts
                .like_post(&id, likes)
                .await
                .map_err(map_domain_error)?;
            if liked_now {
                println!("Лайк поставлен: id={id}");
            } else {
                println!("Лайк снят: id={id}");
            }
        }
        Command::Save { id } => {
            let user = require_current_user(&auth).await?;
            let record = posts
                .save_post(&user.id, &id)
                .await
                .map_err(map_domain_error)?;
            println!("Добавлено в закладки: record={}", record.id);
        }
        Command::Unsave { id } => {
            posts
                .delete_saved_post(&id)
                .await
                .map_err(map_domain_error)?;
            println!("Убрано из закладок: record={id}");
        }
        Command::Saved => {
            let user = require_current_user(&auth).await?;
            let records = posts
                .saved_records(&user.id)
                .await
                .map_err(map_domain_error)?;
            println!("Закладок: {}", records.len());
            for record in records {
                // пост мог быть удалён независимо от закладки
                match posts.get_post(&record.post_id).await {
                    Ok(post) => print_post_line(&post),
                    Err(DomainError::NotFound(_)) => {
                        println!("- [{}] пост удалён", record.post_id);
                    }
                    Err(err) => return Err(map_domain_error(err)),
                }
            }
        }
        Command::UpdateProfile {
            name,
            username,
            email,
            bio,
            avatar,
        } => {
            let current = require_current_user(&auth).await?;
            let file = avatar.as_deref().map(read_upload).transpose()?;

            let user = users
                .update_profile(
                    UpdateProfileRequest {
                        user_id: current.id,
                        name: name.unwrap_or(current.name),
                        username: username.unwrap_or(current.username),
                        email: email.unwrap_or(current.email),
                        bio: bio.unwrap_or(current.bio),
                        image_id: current.image_id,
                        image_url: current.image_url,
                    },
                    file,
                )
                .await
                .map_err(map_domain_error)?;
            println!("Профиль обновлён");
            print_user(&user);
        }
    }

    Ok(())
}

async fn require_current_user(auth: &AuthService<HttpBackend>) -> Result<User> {
    auth.current_user()
        .await
        .map_err(map_domain_error)?
        .ok_or_else(|| {
            anyhow!("требуется вход: выполните `gram-cli login ...` или `gram-cli register ...`")
        })
}

fn persist_session(backend: &HttpBackend, path: &Path) -> Result<()> {
    if let Some(secret) = backend.session_secret() {
        session_file::save_session(path, &secret).context("не удалось сохранить сессию")?;
    }
    Ok(())
}

fn normalize_endpoint(endpoint: String) -> String {
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        return endpoint;
    }

    format!("http://{endpoint}")
}

fn read_upload(path: &Path) -> Result<FileUpload> {
    let bytes =
        fs::read(path).with_context(|| format!("не удалось прочитать файл {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());

    Ok(FileUpload {
        content_type: content_type_for(path).to_string(),
        filename,
        bytes,
    })
}

fn content_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

fn toggle_like(post: &Post, user_id: &str) -> Vec<String> {
    let mut likes = post.likes.clone();
    if post.is_liked_by(user_id) {
        likes.retain(|id| id != user_id);
    } else {
        likes.push(user_id.to_string());
    }
    likes
}

fn map_domain_error(err: DomainError) -> anyhow::Error {
    let message = match err {
        DomainError::Validation { field, message } => {
            format!("некорректное поле `{field}`: {message}")
        }
        DomainError::Upload(cause) => format!("не удалось загрузить файл: {cause}"),
        DomainError::Auth(cause) => format!("отказ в авторизации: {cause}"),
        DomainError::NotFound(what) => format!("не найдено: {what}"),
        DomainError::OperationFailed(cause) => format!("операция не выполнена: {cause}"),
    };
    anyhow!(message)
}

fn render_posts(title: &str, state: &FetchState<Vec<Post>>) {
    match state {
        FetchState::Pending => println!("Загрузка..."),
        FetchState::Failed(cause) => println!("Не удалось загрузить: {cause}"),
        FetchState::Succeeded(posts) => {
            println!("{title}: {}", posts.len());
            for post in posts {
                print_post_line(post);
            }
        }
    }
}

fn print_post_line(post: &Post) {
    println!(
        "- [{}] {} (автор={}, лайков={})",
        post.id,
        post.caption,
        post.creator_id,
        post.likes.len()
    );
}

fn print_post(post: &Post) {
    println!("id: {}", post.id);
    println!("путь: {}", Route::PostDetails(post.id.clone()).path());
    println!("автор: {}", post.creator_id);
    println!("подпись: {}", post.caption);
    println!("место: {}", post.location);
    println!("теги: {}", post.tags.join(", "));
    println!("изображение: {}", post.image_url);
    println!("лайков: {}", post.likes.len());
    println!("создан: {}", post.created_at);
    println!("обновлён: {}", post.updated_at);
}

fn print_user(user: &User) {
    println!("id: {}", user.id);
    println!("путь: {}", Route::Profile(user.id.clone()).path());
    println!("имя: {}", user.name);
    println!("логин: {}", user.username);
    println!("email: {}", user.email);
    println!("аватар: {}", user.image_url);
    if !user.bio.is_empty() {
        println!("о себе: {}", user.bio);
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use chrono::Utc;

    use super::{content_type_for, normalize_endpoint, toggle_like};
    use gram_app::Post;

    #[test]
    fn normalize_endpoint_keeps_scheme() {
        let endpoint = normalize_endpoint("https://backend.example.com".to_string());
        assert_eq!(endpoint, "https://backend.example.com");
    }

    #[test]
    fn normalize_endpoint_adds_http_scheme() {
        let endpoint = normalize_endpoint("127.0.0.1:4080".to_string());
        assert_eq!(endpoint, "http://127.0.0.1:4080");
    }

    #[test]
    fn content_type_is_guessed_from_extension() {
        assert_eq!(content_type_for(Path::new("photo.PNG")), "image/png");
        assert_eq!(content_type_for(Path::new("photo.jpeg")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("archive.bin")), "application/octet-stream");
        assert_eq!(content_type_for(Path::new("noext")), "application/octet-stream");
    }

    #[test]
    fn toggle_like_adds_and_removes_current_user() {
        let now = Utc::now();
        let post = Post::new(
            "p1",
            "u1",
            "valid caption",
            "img1",
            "http://files.local/img1/preview",
            "somewhere",
            vec![],
            vec!["u2".to_string()],
            now,
            now,
        )
        .expect("post must be valid");

        assert_eq!(toggle_like(&post, "u3"), vec!["u2", "u3"]);
        assert_eq!(toggle_like(&post, "u2"), Vec::<String>::new());
    }
}
